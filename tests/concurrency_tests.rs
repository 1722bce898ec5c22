use queue_logger::{log_record, EasyLoggerConfig, LoggerRegistry, Severity, StopReason};
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::tempdir;

const PRODUCERS: usize = 8;
const RECORDS: usize = 500;

#[test]
fn test_no_loss_and_per_producer_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("concurrent.log");
    let registry = LoggerRegistry::new();
    let easy = EasyLoggerConfig::new(&path)
        .logger_name("load")
        .pattern("{process}|{message}")
        .install(&registry)
        .unwrap();

    let barrier = Arc::new(Barrier::new(PRODUCERS));
    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let logger = easy.logger().clone();
            let barrier = barrier.clone();
            thread::Builder::new()
                .name(format!("producer-{}", p))
                .spawn(move || {
                    barrier.wait();
                    for seq in 0..RECORDS {
                        log_record!(logger, Severity::Info, "{}", seq);
                    }
                })
                .unwrap()
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    easy.close();
    let report = easy.join().unwrap();
    assert_eq!(report.reason, StopReason::Shutdown);
    assert_eq!(report.written as usize, PRODUCERS * RECORDS);

    let content = fs::read_to_string(&path).unwrap();
    let mut next_expected: HashMap<String, usize> = HashMap::new();
    let mut total = 0;
    for line in content.lines() {
        let (producer, seq) = line.split_once('|').expect("line should not be torn");
        let seq: usize = seq.parse().expect("sequence should be intact");
        let expected = next_expected.entry(producer.to_string()).or_insert(0);
        assert_eq!(seq, *expected, "out of order for {}", producer);
        *expected += 1;
        total += 1;
    }

    assert_eq!(total, PRODUCERS * RECORDS);
    assert_eq!(next_expected.len(), PRODUCERS);
    assert!(next_expected.values().all(|&n| n == RECORDS));
}

#[test]
fn test_producers_never_wait_for_writer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("burst.log");
    let registry = LoggerRegistry::new();
    let easy = EasyLoggerConfig::new(&path).install(&registry).unwrap();
    let handler = easy.handler().clone();

    for i in 0..10_000 {
        log_record!(easy.logger(), Severity::Info, "burst {}", i);
    }
    assert_eq!(handler.stats().emitted, 10_000);

    easy.close();
    easy.join();
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 10_000);
}
