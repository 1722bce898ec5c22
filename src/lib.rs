//! # Queue Logger
//!
//! A log aggregator for programs where many threads log to the same file.
//! Producers never touch the file: they hand records to a channel, and a
//! single background consumer writes them one at a time, so lines from
//! different producers never interleave mid-line.
//!
//! ## Key Features
//!
//! * Non-blocking producers: the channel is unbounded and pushes never wait
//! * Arrival-order writes: one consumer per handler, one record at a time
//! * Transport-safe records: templates are merged with their arguments and
//!   failures are rendered to text before a record leaves its producer
//! * In-band shutdown: a `Shutdown` message queued behind pending records
//! * Logging never fails the caller: emit errors go to stderr
//!
//! ## Main Components
//!
//! * `transport`: the channel and its `Record | Shutdown` payload
//! * `normalizer`: makes a record transport-safe
//! * `AggregatingHandler`: producer-side handler feeding the channel
//! * `consumer`: the loop that drains the channel into a `RecordWriter`
//! * `EasyLogger`: one-call setup binding a logger name to a handler
//!
//! ## Quick Start
//!
//! ```no_run
//! use queue_logger::{log_record, EasyLogger, Severity};
//!
//! let easy = EasyLogger::new("app.log", Some(Severity::Info)).unwrap();
//! let logger = easy.logger().clone();
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|i| {
//!         let logger = logger.clone();
//!         std::thread::Builder::new()
//!             .name(format!("worker-{}", i))
//!             .spawn(move || log_record!(logger, Severity::Info, "job {} done", i))
//!             .unwrap()
//!     })
//!     .collect();
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//!
//! easy.close();
//! easy.join();
//! ```

pub mod bridge;
pub mod consumer;
pub mod error;
pub mod facade;
pub mod formatter;
pub mod handler;
pub mod loggable;
pub mod logger;
pub mod normalizer;
pub mod record;
pub mod severity;
pub mod template;
pub mod transport;
pub mod writer;

pub use bridge::{init_log_bridge, LogBridge};
pub use consumer::{ConsumerLoop, ConsumerReport, ConsumerState, StopReason};
pub use error::{Error, Result};
pub use facade::{EasyLogger, EasyLoggerConfig, DEFAULT_LOGGER_NAME};
pub use formatter::Formatter;
pub use handler::{AggregatingHandler, Handler, HandlerStats};
pub use loggable::{arg, Arg, Loggable};
pub use logger::{get_logger, process_registry, Logger, LoggerRegistry};
pub use normalizer::normalize;
pub use record::{Failure, LogRecord};
pub use severity::Severity;
pub use transport::{Message, TransportReceiver, TransportSender};
pub use writer::{FileWriter, RecordWriter};
