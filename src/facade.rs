//! One-call setup of a shared logger writing through an
//! [`AggregatingHandler`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::consumer::ConsumerReport;
use crate::error::Result;
use crate::formatter::{Formatter, DEFAULT_DATE_FORMAT, DEFAULT_PATTERN};
use crate::handler::{AggregatingHandler, Handler};
use crate::logger::{process_registry, Logger, LoggerRegistry};
use crate::severity::Severity;
use crate::transport::TransportSender;

/// Logger name used when the configuration does not name one.
pub const DEFAULT_LOGGER_NAME: &str = "queue_logger";

/// Settings for [`EasyLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EasyLoggerConfig {
    pub path: PathBuf,
    pub level: Severity,
    pub logger_name: String,
    pub pattern: String,
    pub date_format: String,
}

impl EasyLoggerConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            level: Severity::Info,
            logger_name: DEFAULT_LOGGER_NAME.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    pub fn logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// Installs the configuration on `registry`.
    pub fn install(self, registry: &LoggerRegistry) -> Result<EasyLogger> {
        EasyLogger::install(registry, self)
    }
}

/// Binds one logger name to one [`AggregatingHandler`].
///
/// Installing replaces every handler the logger had, closing each of them so
/// that no earlier consumer thread is left running or writing. The facade
/// keeps its own producer handle onto the channel so that [`close`](Self::close)
/// can signal shutdown even after the handlers are gone.
pub struct EasyLogger {
    logpath: PathBuf,
    logger: Arc<Logger>,
    handler: Arc<AggregatingHandler>,
    queue: TransportSender,
}

impl EasyLogger {
    /// Sets up the process-wide logger named [`DEFAULT_LOGGER_NAME`] to
    /// write to `logpath`; `level` defaults to INFO.
    pub fn new(logpath: impl Into<PathBuf>, level: Option<Severity>) -> Result<Self> {
        let config = EasyLoggerConfig::new(logpath).level(level.unwrap_or_default());
        Self::install(process_registry(), config)
    }

    pub fn install(registry: &LoggerRegistry, config: EasyLoggerConfig) -> Result<Self> {
        let formatter = Formatter::new(&config.pattern, &config.date_format)?;
        let logger = registry.get_logger(&config.logger_name);

        let handler = Arc::new(AggregatingHandler::new(&config.path)?);
        handler.set_level(config.level);
        handler.set_formatter(formatter);
        let queue = handler.sender();

        logger.set_level(config.level);
        let replaced = logger.replace_handlers(handler.clone());
        tracing::debug!(
            logger = %config.logger_name,
            path = %config.path.display(),
            level = %config.level,
            replaced,
            "easy logger installed"
        );

        Ok(Self {
            logpath: config.path,
            logger,
            handler,
            queue,
        })
    }

    pub fn logpath(&self) -> &Path {
        &self.logpath
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    pub fn handler(&self) -> &Arc<AggregatingHandler> {
        &self.handler
    }

    /// Closes every handler currently on the logger, including ones
    /// installed by someone else since this facade was set up.
    pub fn close_handlers(&self) {
        self.logger.close_handlers();
        self.handler.close();
    }

    /// Pushes one more shutdown marker onto this facade's channel.
    pub fn close_queue(&self) {
        self.queue.send_shutdown();
    }

    /// Best-effort shutdown; safe to call any number of times.
    pub fn close(&self) {
        self.close_handlers();
        self.close_queue();
        tracing::debug!(path = %self.logpath.display(), "easy logger closed");
    }

    /// Waits for this facade's consumer to drain and stop.
    ///
    /// Only returns once a shutdown marker reached the consumer, so call
    /// [`close`](Self::close) first. Returns `None` if already joined.
    pub fn join(&self) -> Option<ConsumerReport> {
        self.handler.join_consumer()
    }
}

impl fmt::Display for EasyLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Logging with AggregatingHandler in {}", self.logpath.display())
    }
}

impl fmt::Debug for EasyLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EasyLogger")
            .field("logpath", &self.logpath)
            .field("logger", &self.logger.name())
            .field("closed", &self.handler.is_closed())
            .finish()
    }
}
