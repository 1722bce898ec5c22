use std::io;

use thiserror::Error;

/// Errors raised while preparing, transporting or persisting log records.
#[derive(Debug, Error)]
pub enum Error {
    /// The template has more placeholders than there are arguments.
    #[error("not enough arguments for template {template:?}: placeholder {index} has no value")]
    MissingArgument { template: String, index: usize },

    /// The template consumed fewer arguments than were supplied.
    #[error("template {template:?} uses {used} of {supplied} arguments")]
    UnusedArguments {
        template: String,
        used: usize,
        supplied: usize,
    },

    #[error("malformed template {template:?} at byte {position}")]
    MalformedTemplate { template: String, position: usize },

    /// A formatter pattern referenced a field records do not have.
    #[error("unknown formatter field {0:?}")]
    UnknownField(String),

    #[error("invalid date format {0:?}")]
    InvalidDateFormat(String),

    #[error("unknown severity {0:?}")]
    UnknownSeverity(String),

    /// The consumer end of the transport channel is gone.
    #[error("transport channel is closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
