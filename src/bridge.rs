use std::sync::Arc;

use log::{Log, Metadata, Record, SetLoggerError};

use crate::logger::Logger;
use crate::record::LogRecord;
use crate::severity::Severity;

/// Routes the `log` crate's macros into a [`Logger`].
///
/// `log` hands over borrowed format arguments, so the message is rendered
/// right away and the record carries no arguments.
pub struct LogBridge {
    logger: Arc<Logger>,
}

impl LogBridge {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.logger.is_enabled_for(Severity::from(metadata.level()))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = Severity::from(record.level());
        let message = record.args().to_string();
        self.logger
            .handle(LogRecord::new(self.logger.name(), level, message));
    }

    fn flush(&self) {}
}

/// Installs a [`LogBridge`] for `logger` as the global `log` backend.
///
/// The `log` max level follows the logger's current threshold. Fails if a
/// backend is already installed.
pub fn init_log_bridge(logger: Arc<Logger>) -> Result<(), SetLoggerError> {
    let max_level = log::LevelFilter::from(logger.level());
    log::set_boxed_logger(Box::new(LogBridge::new(logger)))?;
    log::set_max_level(max_level);
    Ok(())
}
