use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};

use crate::error::{Error, Result};
use crate::record::LogRecord;

/// Line layout used by the facade.
pub const DEFAULT_PATTERN: &str = "[{timestamp}] - {level} - {name} - {process} - {message}";

/// `chrono` strftime layout for `{timestamp}`, e.g. `2024-05-01 13:37:00,042`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Timestamp,
    Level,
    Name,
    Process,
    Pid,
    Message,
}

impl Field {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "timestamp" => Ok(Field::Timestamp),
            "level" => Ok(Field::Level),
            "name" => Ok(Field::Name),
            "process" => Ok(Field::Process),
            "pid" => Ok(Field::Pid),
            "message" => Ok(Field::Message),
            other => Err(Error::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// Turns a record into one line of text.
///
/// The pattern is parsed once; `{field}` names a record field and `{{`/`}}`
/// produce literal braces. Failure text, when the record carries any, is
/// appended after the formatted line on its own lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    pattern: String,
    date_format: String,
    segments: Vec<Segment>,
}

impl Formatter {
    pub fn new(pattern: &str, date_format: &str) -> Result<Self> {
        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidDateFormat(date_format.to_string()));
        }
        Ok(Self {
            pattern: pattern.to_string(),
            date_format: date_format.to_string(),
            segments: parse_pattern(pattern)?,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Formats `record`, merging any outstanding arguments.
    ///
    /// Fails only when the record's template and arguments disagree.
    pub fn format(&self, record: &LogRecord) -> Result<String> {
        let message = record.message()?;
        let mut line = String::with_capacity(self.pattern.len() + message.len() + 32);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Field(Field::Timestamp) => {
                    // The date format was checked in `new`, so this cannot fail.
                    let _ = write!(line, "{}", record.created.format(&self.date_format));
                }
                Segment::Field(Field::Level) => line.push_str(record.level.as_str()),
                Segment::Field(Field::Name) => line.push_str(&record.name),
                Segment::Field(Field::Process) => line.push_str(&record.process_name),
                Segment::Field(Field::Pid) => line.push_str(&record.process_id.to_string()),
                Segment::Field(Field::Message) => line.push_str(&message),
            }
        }

        if let Some(failure) = record.failure_text() {
            if !line.ends_with('\n') {
                line.push('\n');
            }
            line.push_str(&failure);
        }
        Ok(line)
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            segments: parse_pattern(DEFAULT_PATTERN).unwrap_or_default(),
        }
    }
}

fn parse_pattern(pattern: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, n) in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                if !closed {
                    return Err(Error::MalformedTemplate {
                        template: pattern.to_string(),
                        position: pos,
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(Field::parse(&name)?));
            }
            '}' => {
                return Err(Error::MalformedTemplate {
                    template: pattern.to_string(),
                    position: pos,
                })
            }
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loggable::arg;
    use crate::record::Failure;
    use crate::severity::Severity;
    use chrono::TimeZone;
    use std::io;

    fn fixed_record(msg: &str) -> LogRecord {
        let mut record = LogRecord::new("svc", Severity::Info, msg).with_process_name("worker-1");
        record.created = chrono::Local.with_ymd_and_hms(2024, 5, 1, 13, 37, 0).unwrap();
        record
    }

    #[test]
    fn test_default_line() {
        let line = Formatter::default().format(&fixed_record("hello")).unwrap();
        assert_eq!(line, "[2024-05-01 13:37:00,000] - INFO - svc - worker-1 - hello");
    }

    #[test]
    fn test_custom_pattern() {
        let formatter = Formatter::new("{{{level}}} {pid}:{message}", "%H").unwrap();
        let line = formatter.format(&fixed_record("x")).unwrap();
        assert_eq!(line, format!("{{INFO}} {}:x", std::process::id()));
    }

    #[test]
    fn test_pattern_validation() {
        assert!(matches!(
            Formatter::new("{levelname}", DEFAULT_DATE_FORMAT),
            Err(Error::UnknownField(name)) if name == "levelname"
        ));
        assert!(Formatter::new("{level", DEFAULT_DATE_FORMAT).is_err());
        assert!(Formatter::new("level}", DEFAULT_DATE_FORMAT).is_err());
        assert!(matches!(
            Formatter::new(DEFAULT_PATTERN, "%Y-%Q"),
            Err(Error::InvalidDateFormat(_))
        ));
    }

    #[test]
    fn test_merges_arguments() {
        let record = fixed_record("user %s logged in").with_args(vec![arg("alice")]);
        let line = Formatter::new("{message}", DEFAULT_DATE_FORMAT)
            .unwrap()
            .format(&record)
            .unwrap();
        assert_eq!(line, "user alice logged in");
    }

    #[test]
    fn test_appends_failure() {
        let record = fixed_record("boom")
            .with_failure(Failure::new(io::Error::new(io::ErrorKind::Other, "disk gone")));
        let line = Formatter::new("{message}", DEFAULT_DATE_FORMAT)
            .unwrap()
            .format(&record)
            .unwrap();
        assert_eq!(line, "boom\nError: disk gone");
    }
}
