use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::formatter::Formatter;
use crate::record::LogRecord;

/// Destination that persists formatted records.
///
/// Implementations are driven by exactly one consumer loop, so they need no
/// internal synchronization. The writer decides how a record becomes bytes
/// by way of its [`Formatter`].
pub trait RecordWriter: Send {
    /// Persists one record. An error here stops the consumer loop.
    fn write_record(&mut self, record: &LogRecord) -> Result<()>;

    fn set_formatter(&mut self, formatter: Formatter);

    /// Releases the destination. Must be safe to call more than once.
    fn close(&mut self);
}

/// Append-only text file writer, one formatted record per line.
///
/// The file is created if missing and never truncated. Every record is
/// flushed as soon as it is written. A write after [`close`](RecordWriter::close)
/// appends through a handle opened for that one record and released right
/// after, so records still queued when the owning handler shuts down are not
/// lost and no descriptor outlives the close.
#[derive(Debug)]
pub struct FileWriter {
    path: PathBuf,
    formatter: Formatter,
    stream: Option<LineWriter<File>>,
}

impl FileWriter {
    /// Opens (or creates) `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let stream = Some(open_append(&path)?);
        Ok(Self {
            path,
            formatter: Formatter::default(),
            stream,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl RecordWriter for FileWriter {
    fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        let line = self.formatter.format(record)?;
        match self.stream.as_mut() {
            Some(stream) => write_line(stream, &line),
            None => write_line(&mut open_append(&self.path)?, &line),
        }
    }

    fn set_formatter(&mut self, formatter: Formatter) {
        self.formatter = formatter;
    }

    fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.flush() {
                tracing::warn!(path = %self.path.display(), error = %e, "flush on close failed");
            }
        }
    }
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn write_line(stream: &mut LineWriter<File>, line: &str) -> Result<()> {
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()?;
    Ok(())
}

fn open_append(path: &Path) -> Result<LineWriter<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(LineWriter::new(file))
}
