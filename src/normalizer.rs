//! Reduces records to plain owned text before they cross the transport
//! channel.

use crate::error::Result;
use crate::formatter::Formatter;
use crate::record::LogRecord;
use crate::template;

/// Makes `record` transport-safe.
///
/// * A template with arguments is merged into the final message and the
///   arguments are dropped, capturing their values as of now.
/// * A structured failure is rendered into `failure_text`, the whole record
///   is run through `formatter` once so formatting problems surface here,
///   and the failure itself is dropped.
///
/// No I/O happens. On error the record is left as it was and should be
/// reported, never enqueued.
pub fn normalize(record: &mut LogRecord, formatter: &Formatter) -> Result<()> {
    if !record.args.is_empty() {
        record.msg = template::render(&record.msg, &record.args)?;
        record.args.clear();
    }

    if let Some(failure) = &record.failure {
        if record.failure_text.is_none() {
            record.failure_text = Some(failure.render());
        }
        formatter.format(record)?;
        record.failure = None;
    }

    debug_assert!(record.is_transport_safe());
    Ok(())
}
