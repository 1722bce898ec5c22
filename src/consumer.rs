//! The single background worker that serializes records to the destination.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::transport::{Message, TransportReceiver};
use crate::writer::RecordWriter;

/// Why a consumer loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A shutdown marker was read.
    Shutdown,
    /// Every sender was dropped.
    Disconnected,
    /// The writer failed; the message is the error text.
    WriteFailed(String),
}

/// Outcome of a finished consumer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerReport {
    pub reason: StopReason,
    /// Records successfully handed to the writer.
    pub written: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumerState {
    Running,
    Stopped(StopReason),
}

/// Drains a transport channel into a writer, one record at a time.
///
/// The loop is RUNNING from construction and moves to STOPPED on a shutdown
/// marker, on channel teardown, or on the first write error. It never closes
/// the writer; that belongs to the handler that created it. Panics raised by
/// the writer are not caught and end the loop's thread.
pub struct ConsumerLoop {
    receiver: TransportReceiver,
    writer: Arc<Mutex<dyn RecordWriter>>,
    state: ConsumerState,
    written: u64,
}

impl ConsumerLoop {
    pub fn new(receiver: TransportReceiver, writer: Arc<Mutex<dyn RecordWriter>>) -> Self {
        Self {
            receiver,
            writer,
            state: ConsumerState::Running,
            written: 0,
        }
    }

    pub fn state(&self) -> &ConsumerState {
        &self.state
    }

    /// Runs until STOPPED; the only blocking point is the channel read.
    pub fn run(mut self) -> ConsumerReport {
        tracing::debug!("consumer loop running");

        while self.state == ConsumerState::Running {
            self.state = match self.receiver.recv() {
                Some(Message::Record(record)) => {
                    let result = self.writer.lock().write_record(&record);
                    match result {
                        Ok(()) => {
                            self.written += 1;
                            ConsumerState::Running
                        }
                        Err(e) => {
                            eprintln!("queue_logger: consumer stopped, write failed: {}", e);
                            ConsumerState::Stopped(StopReason::WriteFailed(e.to_string()))
                        }
                    }
                }
                Some(Message::Shutdown) => ConsumerState::Stopped(StopReason::Shutdown),
                None => ConsumerState::Stopped(StopReason::Disconnected),
            };
        }

        let reason = match self.state {
            ConsumerState::Stopped(reason) => reason,
            ConsumerState::Running => unreachable!("loop exits only when stopped"),
        };
        tracing::debug!(?reason, written = self.written, "consumer loop stopped");
        ConsumerReport {
            reason,
            written: self.written,
        }
    }
}
