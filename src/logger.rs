use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::handler::Handler;
use crate::loggable::Arg;
use crate::record::{Failure, LogRecord};
use crate::severity::Severity;

/// A named logger shared by every producer that asks the registry for the
/// same name.
///
/// The logger applies its own threshold first, then hands each record to
/// every installed handler, which applies its own threshold in turn.
pub struct Logger {
    name: String,
    level: AtomicU8,
    handlers: RwLock<Vec<Arc<dyn Handler>>>,
}

impl Logger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: AtomicU8::new(Severity::default() as u8),
            handlers: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Severity {
        Severity::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_level(&self, level: Severity) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn is_enabled_for(&self, level: Severity) -> bool {
        level >= self.level()
    }

    pub fn add_handler(&self, handler: Arc<dyn Handler>) {
        self.handlers.write().push(handler);
    }

    pub fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        self.handlers.read().clone()
    }

    /// Closes every installed handler and removes them all.
    pub fn close_handlers(&self) -> usize {
        let handlers = std::mem::take(&mut *self.handlers.write());
        for handler in &handlers {
            handler.close();
        }
        handlers.len()
    }

    /// Closes and removes the current handlers, then installs `handler`
    /// as the only one.
    pub fn replace_handlers(&self, handler: Arc<dyn Handler>) -> usize {
        // `close` may wait on a write in progress; keep it outside the lock.
        let previous = std::mem::replace(&mut *self.handlers.write(), vec![handler]);
        for old in &previous {
            old.close();
        }
        previous.len()
    }

    /// Dispatches a prepared record. Level filtering is the caller's job.
    pub fn handle(&self, record: LogRecord) {
        let handlers = self.handlers.read();
        if let Some((last, rest)) = handlers.split_last() {
            for handler in rest {
                handler.handle(record.clone());
            }
            last.handle(record);
        }
    }

    /// Logs `template` merged with `args` at `level`.
    pub fn log(&self, level: Severity, template: impl Into<String>, args: Vec<Arg>) {
        if self.is_enabled_for(level) {
            self.handle(LogRecord::new(self.name.as_str(), level, template).with_args(args));
        }
    }

    /// Like [`log`](Self::log), attaching failure context.
    pub fn log_failure(
        &self,
        level: Severity,
        template: impl Into<String>,
        args: Vec<Arg>,
        failure: Failure,
    ) {
        if self.is_enabled_for(level) {
            let record = LogRecord::new(self.name.as_str(), level, template)
                .with_args(args)
                .with_failure(failure);
            self.handle(record);
        }
    }

    pub fn debug(&self, msg: impl Into<String>) {
        self.log(Severity::Debug, msg, Vec::new());
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.log(Severity::Info, msg, Vec::new());
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.log(Severity::Warning, msg, Vec::new());
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.log(Severity::Error, msg, Vec::new());
    }

    pub fn critical(&self, msg: impl Into<String>) {
        self.log(Severity::Critical, msg, Vec::new());
    }

    /// Logs at ERROR with `failure` attached.
    pub fn exception(&self, msg: impl Into<String>, failure: impl Into<Failure>) {
        self.log_failure(Severity::Error, msg, Vec::new(), failure.into());
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}

/// Maps logger names to shared [`Logger`] instances.
///
/// A registry is an explicit context: code that should share loggers shares
/// the registry. [`process_registry`] is the one most programs want.
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the logger for `name`, creating it on first use.
    pub fn get_logger(&self, name: &str) -> Arc<Logger> {
        if let Some(logger) = self.loggers.read().get(name) {
            return Arc::clone(logger);
        }
        let mut loggers = self.loggers.write();
        Arc::clone(
            loggers
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Logger::new(name))),
        )
    }

    pub fn names(&self) -> Vec<String> {
        self.loggers.read().keys().cloned().collect()
    }

    /// Closes the handlers of every registered logger.
    pub fn close_all(&self) {
        for logger in self.loggers.read().values() {
            logger.close_handlers();
        }
    }
}

lazy_static! {
    /// Loggers shared by the whole process.
    static ref PROCESS_REGISTRY: LoggerRegistry = LoggerRegistry::new();
}

/// The process-wide registry.
pub fn process_registry() -> &'static LoggerRegistry {
    &PROCESS_REGISTRY
}

/// Shorthand for `process_registry().get_logger(name)`.
pub fn get_logger(name: &str) -> Arc<Logger> {
    process_registry().get_logger(name)
}

/// Logs a template with positional arguments on a [`Logger`].
///
/// ```
/// # use queue_logger::{log_record, Logger, Severity};
/// let logger = Logger::new("svc");
/// log_record!(logger, Severity::Info, "user {} logged in", "alice");
/// log_record!(logger, Severity::Warning, "no arguments here");
/// ```
#[macro_export]
macro_rules! log_record {
    ($logger:expr, $level:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {{
        $logger.log($level, $fmt, vec![$($crate::arg($arg)),*])
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::Formatter;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Weak;

    /// Looks at its logger's handler list while being closed.
    struct InspectingHandler {
        logger: Weak<Logger>,
        seen_on_close: AtomicUsize,
    }

    impl Handler for InspectingHandler {
        fn level(&self) -> Severity {
            Severity::Debug
        }

        fn set_level(&self, _level: Severity) {}

        fn set_formatter(&self, _formatter: Formatter) {}

        fn emit(&self, _record: LogRecord) {}

        fn close(&self) {
            if let Some(logger) = self.logger.upgrade() {
                self.seen_on_close.store(logger.handlers().len(), Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_replaced_handlers_close_outside_lock() {
        let logger = Arc::new(Logger::new("svc"));
        let old = Arc::new(InspectingHandler {
            logger: Arc::downgrade(&logger),
            seen_on_close: AtomicUsize::new(usize::MAX),
        });
        logger.add_handler(old.clone());

        let new = Arc::new(InspectingHandler {
            logger: Arc::downgrade(&logger),
            seen_on_close: AtomicUsize::new(usize::MAX),
        });
        assert_eq!(logger.replace_handlers(new), 1);

        // The new handler was already installed when the old one closed.
        assert_eq!(old.seen_on_close.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_records_below_threshold_are_dropped() {
        let logger = Logger::new("svc");
        logger.set_level(Severity::Error);
        assert!(!logger.is_enabled_for(Severity::Warning));
        assert!(logger.is_enabled_for(Severity::Critical));
    }
}
