use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use clap::Parser;
use queue_logger::{log_record, EasyLoggerConfig, Severity};
use tracing_subscriber::EnvFilter;

/// Spawns worker threads that all log into one file through a single
/// consumer.
#[derive(Parser, Debug)]
#[command(name = "queue_logger", version)]
struct Args {
    /// Destination log file (appended to).
    #[arg(short, long, default_value = "queue_logger.log")]
    path: PathBuf,

    /// Number of producer threads.
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Records emitted by each producer.
    #[arg(short, long, default_value_t = 1000)]
    records: usize,

    /// Minimum severity written (debug, info, warning, error, critical).
    #[arg(short, long, default_value = "info")]
    level: Severity,

    /// Logger name shown in each line.
    #[arg(long, default_value = queue_logger::DEFAULT_LOGGER_NAME)]
    name: String,
}

fn main() -> queue_logger::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let easy = EasyLoggerConfig::new(&args.path)
        .level(args.level)
        .logger_name(&args.name)
        .install(queue_logger::process_registry())?;
    println!("{}", easy);

    let start = Instant::now();
    let producers = (0..args.workers)
        .map(|worker| {
            let logger = easy.logger().clone();
            let records = args.records;
            thread::Builder::new()
                .name(format!("worker-{}", worker + 1))
                .spawn(move || {
                    for i in 0..records {
                        log_record!(logger, Severity::Info, "record {} of {}", i + 1, records);
                    }
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for producer in producers {
        if producer.join().is_err() {
            eprintln!("a producer thread panicked");
        }
    }
    let emitted = start.elapsed();

    easy.close();
    let report = easy.join();
    println!(
        "emitted {} records in {:?}, drained in {:?}: {:?}",
        easy.handler().stats().emitted,
        emitted,
        start.elapsed(),
        report
    );
    Ok(())
}
