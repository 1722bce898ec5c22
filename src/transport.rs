//! The channel between producers and the consumer loop.
//!
//! Any number of [`TransportSender`] clones feed exactly one
//! [`TransportReceiver`]. The channel is unbounded: a push never blocks and
//! never fails for lack of room, so a slow destination can only cost memory,
//! never producer latency.

use crossbeam_channel::{Receiver, RecvError, Sender, TrySendError};

use crate::error::{Error, Result};
use crate::record::LogRecord;

/// Payload of the transport channel.
///
/// Shutdown travels in-band, behind any records already queued, so the
/// consumer drains everything sent before it.
#[derive(Debug)]
pub enum Message {
    Record(LogRecord),
    Shutdown,
}

/// Creates a connected sender/receiver pair.
pub fn channel() -> (TransportSender, TransportReceiver) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (TransportSender { sender }, TransportReceiver { receiver })
}

/// Producer end. Cheap to clone and safe to use from any thread.
#[derive(Debug, Clone)]
pub struct TransportSender {
    sender: Sender<Message>,
}

impl TransportSender {
    /// Queues a record without blocking.
    pub fn send_record(&self, record: LogRecord) -> Result<()> {
        self.push(Message::Record(record))
    }

    /// Queues a shutdown marker.
    ///
    /// Returns false if the consumer is already gone; extra markers are
    /// harmless either way.
    pub fn send_shutdown(&self) -> bool {
        self.push(Message::Shutdown).is_ok()
    }

    /// Number of messages waiting for the consumer.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    fn push(&self, message: Message) -> Result<()> {
        match self.sender.try_send(message) {
            Ok(()) => Ok(()),
            // An unbounded channel is never full; only disconnection remains.
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => Err(Error::Closed),
        }
    }
}

/// Consumer end, owned by the consumer loop.
#[derive(Debug)]
pub struct TransportReceiver {
    receiver: Receiver<Message>,
}

impl TransportReceiver {
    /// Blocks until the next message.
    ///
    /// Returns `None` once every sender has been dropped and the queue is
    /// empty, i.e. the channel was torn down from the producer side.
    pub fn recv(&self) -> Option<Message> {
        match self.receiver.recv() {
            Ok(message) => Some(message),
            Err(RecvError) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    #[test]
    fn test_fifo_with_shutdown() {
        let (tx, rx) = channel();
        tx.send_record(LogRecord::new("t", Severity::Info, "one")).unwrap();
        tx.send_record(LogRecord::new("t", Severity::Info, "two")).unwrap();
        assert!(tx.send_shutdown());
        assert_eq!(tx.pending(), 3);

        match rx.recv() {
            Some(Message::Record(r)) => assert_eq!(r.msg, "one"),
            other => panic!("unexpected {:?}", other),
        }
        match rx.recv() {
            Some(Message::Record(r)) => assert_eq!(r.msg, "two"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(rx.recv(), Some(Message::Shutdown)));
    }

    #[test]
    fn test_teardown_reads_none() {
        let (tx, rx) = channel();
        let clone = tx.clone();
        drop(tx);
        clone.send_record(LogRecord::new("t", Severity::Info, "last")).unwrap();
        drop(clone);
        assert!(matches!(rx.recv(), Some(Message::Record(_))));
        assert!(rx.recv().is_none());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(!tx.send_shutdown());
        assert!(matches!(
            tx.send_record(LogRecord::new("t", Severity::Info, "lost")),
            Err(Error::Closed)
        ));
    }
}
