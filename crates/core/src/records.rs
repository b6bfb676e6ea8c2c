//! Line-oriented reader shared by the judgment and run loaders
//!
//! Both file formats are one whitespace-separated record per line. Blank
//! lines are skipped; every other line is handed to the caller together with
//! its 1-based line number so parse errors can point at the offending input.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

/// A single non-blank line split into whitespace-separated fields
#[derive(Debug)]
pub(crate) struct Record<'a> {
    pub line_number: usize,
    pub raw: &'a str,
    pub fields: Vec<&'a str>,
}

impl Record<'_> {
    /// Builds a parse error pointing at this record
    pub fn error(&self, source: &str, message: impl Into<String>) -> Error {
        Error::parse(source, self.line_number, self.raw, message)
    }
}

/// Opens `path` for buffered reading, mapping a missing file to `FileNotFound`
pub(crate) fn open(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::file_not_found(path)),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Feeds every non-blank line of `reader` to `on_record`, stopping at the first error
///
/// A line that is not valid UTF-8 is a parse error naming `source`.
pub(crate) fn for_each_record<R, F>(reader: R, source: &str, mut on_record: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(Record<'_>) -> Result<()>,
{
    for (index, bytes) in reader.split(b'\n').enumerate() {
        let line_number = index + 1;
        let line = String::from_utf8(bytes?).map_err(|e| {
            let content = String::from_utf8_lossy(e.as_bytes());
            Error::parse(
                source,
                line_number,
                content.trim_end_matches('\r'),
                "line is not valid UTF-8",
            )
        })?;
        let raw = line.trim_end_matches('\r');
        if raw.trim().is_empty() {
            continue;
        }

        on_record(Record {
            line_number,
            raw,
            fields: raw.split_whitespace().collect(),
        })?;
    }
    Ok(())
}
