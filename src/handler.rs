use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::consumer::{ConsumerLoop, ConsumerReport};
use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::normalizer::normalize;
use crate::record::LogRecord;
use crate::severity::Severity;
use crate::transport::{self, TransportSender};
use crate::writer::{FileWriter, RecordWriter};

/// Contract shared by everything a [`Logger`](crate::Logger) dispatches to.
///
/// Handlers are shared between threads behind `Arc`, so every method takes
/// `&self`.
pub trait Handler: Send + Sync {
    fn level(&self) -> Severity;

    fn set_level(&self, level: Severity);

    fn set_formatter(&self, formatter: Formatter);

    /// Delivers a record that already passed the level checks.
    /// Must not panic or fail on the caller's behalf.
    fn emit(&self, record: LogRecord);

    /// Flushes and releases resources. Idempotent.
    fn close(&self);

    /// Applies the handler threshold, then emits.
    fn handle(&self, record: LogRecord) {
        if record.level >= self.level() {
            self.emit(record);
        }
    }

    /// Fallback reporting path for records that could not be emitted.
    fn handle_error(&self, record: &LogRecord, error: &Error) {
        eprintln!(
            "queue_logger: dropped {} record from {:?} ({:?}): {}",
            record.level, record.name, record.msg, error
        );
    }
}

/// Counters kept by an [`AggregatingHandler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerStats {
    /// Records pushed onto the transport channel.
    pub emitted: u64,
    /// Records that failed normalization or found the channel closed.
    pub failed: u64,
}

/// Handler that funnels records from any number of threads into one
/// background consumer writing to one destination.
///
/// `emit` normalizes the record and pushes it onto an unbounded channel
/// without blocking; the consumer thread spawned at construction formats
/// and writes records in arrival order. Closing pushes a single shutdown
/// marker and closes the writer without waiting for the consumer. Records
/// still queued at that point are written anyway because [`FileWriter`]
/// reopens on demand; use [`join_consumer`](Self::join_consumer) to wait
/// for them.
pub struct AggregatingHandler {
    path: Option<PathBuf>,
    level: AtomicU8,
    formatter: Mutex<Formatter>,
    sender: TransportSender,
    writer: Arc<Mutex<dyn RecordWriter>>,
    consumer: Mutex<Option<JoinHandle<ConsumerReport>>>,
    closed: AtomicBool,
    emitted: AtomicU64,
    failed: AtomicU64,
}

impl AggregatingHandler {
    /// Opens `path` for appending and starts the consumer.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let writer = FileWriter::open(path)?;
        let mut handler = Self::with_writer(writer)?;
        handler.path = Some(path.to_path_buf());
        Ok(handler)
    }

    /// Starts a consumer draining into an arbitrary writer.
    pub fn with_writer(writer: impl RecordWriter + 'static) -> Result<Self> {
        let writer: Arc<Mutex<dyn RecordWriter>> = Arc::new(Mutex::new(writer));
        let (sender, receiver) = transport::channel();

        let consumer = ConsumerLoop::new(receiver, Arc::clone(&writer));
        let handle = thread::Builder::new()
            .name("queue-logger-consumer".to_string())
            .spawn(move || consumer.run())?;

        Ok(Self {
            path: None,
            level: AtomicU8::new(Severity::Debug as u8),
            formatter: Mutex::new(Formatter::default()),
            sender,
            writer,
            consumer: Mutex::new(Some(handle)),
            closed: AtomicBool::new(false),
            emitted: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn formatter(&self) -> Formatter {
        self.formatter.lock().clone()
    }

    /// A producer handle onto this handler's channel.
    pub fn sender(&self) -> TransportSender {
        self.sender.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> HandlerStats {
        HandlerStats {
            emitted: self.emitted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// True once the consumer thread has ended (or was already joined).
    pub fn consumer_finished(&self) -> bool {
        match self.consumer.lock().as_ref() {
            Some(handle) => handle.is_finished(),
            None => true,
        }
    }

    /// Waits for the consumer thread to stop and returns its report.
    ///
    /// Returns `None` if the consumer was already joined. A panic in the
    /// consumer thread is resumed on the caller. Without a prior
    /// [`close`](Handler::close) (or another shutdown marker) this blocks
    /// until one arrives.
    pub fn join_consumer(&self) -> Option<ConsumerReport> {
        let handle = self.consumer.lock().take()?;
        match handle.join() {
            Ok(report) => Some(report),
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

impl Handler for AggregatingHandler {
    fn level(&self) -> Severity {
        Severity::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(Severity::Debug)
    }

    fn set_level(&self, level: Severity) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Stores the formatter and forwards it to the writer, which is where
    /// records are actually formatted.
    fn set_formatter(&self, formatter: Formatter) {
        self.writer.lock().set_formatter(formatter.clone());
        *self.formatter.lock() = formatter;
    }

    fn emit(&self, mut record: LogRecord) {
        let prepared = if self.is_closed() {
            Err(Error::Closed)
        } else {
            normalize(&mut record, &self.formatter.lock())
        };
        if let Err(e) = prepared {
            self.failed.fetch_add(1, Ordering::Relaxed);
            self.handle_error(&record, &e);
            return;
        }

        // Fails only once the consumer has stopped, which producers are
        // not told about.
        match self.sender.send_record(record) {
            Ok(()) => self.emitted.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.failed.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.sender.send_shutdown();
        self.writer.lock().close();
        tracing::debug!(path = ?self.path, "aggregating handler closed");
    }
}

impl Drop for AggregatingHandler {
    fn drop(&mut self) {
        self.close();
    }
}
