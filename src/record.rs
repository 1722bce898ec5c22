use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::loggable::Arg;
use crate::severity::Severity;
use crate::template;

/// Failure context attached to a record, e.g. the error that made a caller
/// log at ERROR level.
///
/// The wrapped error is shared so records stay cheap to clone. It is never
/// sent to the consumer: normalization renders it to text and drops it.
#[derive(Clone)]
pub struct Failure {
    error: Arc<dyn StdError + Send + Sync>,
}

impl Failure {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            error: Arc::new(error),
        }
    }

    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.error
    }

    /// Renders the error followed by its source chain, one cause per line.
    pub fn render(&self) -> String {
        let mut text = format!("Error: {}", self.error);
        let mut source = self.error.source();
        while let Some(cause) = source {
            text.push_str("\nCaused by: ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        text
    }
}

impl<E> From<E> for Failure
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Failure").field(&self.error.to_string()).finish()
    }
}

/// One log event.
///
/// A record leaves the producer only after normalization: `args` is empty,
/// `msg` holds the final text and `failure` has been replaced by
/// `failure_text`.
#[derive(Clone)]
pub struct LogRecord {
    pub created: DateTime<Local>,
    pub level: Severity,
    /// Name of the logger the record was emitted on.
    pub name: String,
    /// Name of the producing context (the emitting thread).
    pub process_name: String,
    pub process_id: u32,
    pub msg: String,
    pub args: Vec<Arg>,
    pub failure: Option<Failure>,
    pub failure_text: Option<String>,
}

impl LogRecord {
    /// Creates a record stamped with the current time and the calling
    /// thread's name.
    pub fn new(name: impl Into<String>, level: Severity, msg: impl Into<String>) -> Self {
        let current = thread::current();
        let process_name = match current.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", current.id()),
        };

        Self {
            created: Local::now(),
            level,
            name: name.into(),
            process_name,
            process_id: std::process::id(),
            msg: msg.into(),
            args: Vec::new(),
            failure: None,
            failure_text: None,
        }
    }

    pub fn with_args(mut self, args: Vec<Arg>) -> Self {
        self.args = args;
        self
    }

    pub fn with_failure(mut self, failure: Failure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn with_process_name(mut self, process_name: impl Into<String>) -> Self {
        self.process_name = process_name.into();
        self
    }

    /// The message with arguments merged in.
    pub fn message(&self) -> Result<Cow<'_, str>> {
        if self.args.is_empty() {
            Ok(Cow::Borrowed(&self.msg))
        } else {
            template::render(&self.msg, &self.args).map(Cow::Owned)
        }
    }

    /// Failure text, rendering the structured failure if it was not cached.
    pub fn failure_text(&self) -> Option<Cow<'_, str>> {
        match (&self.failure_text, &self.failure) {
            (Some(text), _) => Some(Cow::Borrowed(text)),
            (None, Some(failure)) => Some(Cow::Owned(failure.render())),
            (None, None) => None,
        }
    }

    /// True once the record holds only plain owned text.
    pub fn is_transport_safe(&self) -> bool {
        self.args.is_empty() && self.failure.is_none()
    }
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRecord")
            .field("created", &self.created)
            .field("level", &self.level)
            .field("name", &self.name)
            .field("process_name", &self.process_name)
            .field("process_id", &self.process_id)
            .field("msg", &self.msg)
            .field("args", &self.args.len())
            .field("failure", &self.failure)
            .field("failure_text", &self.failure_text)
            .finish()
    }
}
