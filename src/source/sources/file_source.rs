use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::data::SalesRecord;
use crate::errors::RollupError;
use crate::source::SalesSource;
use crate::types::SourceId;

/// Reads one JSON-encoded `SalesRecord` per line.
///
/// Blank lines are skipped. A line that is not a valid record yields
/// `MalformedRecord` with its 1-based line number and the source moves on to
/// the next line; a read failure yields `Io` and ends the stream.
pub struct JsonLinesSource<R> {
    id: SourceId,
    reader: R,
    line: usize,
    buffer: String,
    failed: bool,
}

impl JsonLinesSource<BufReader<File>> {
    /// Open `path`, using its file name as the source id.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RollupError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(id, BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    /// Source named `id` reading JSON lines from `reader`.
    pub fn new(id: impl Into<SourceId>, reader: R) -> Self {
        Self {
            id: id.into(),
            reader,
            line: 0,
            buffer: String::new(),
            failed: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = Result<SalesRecord, RollupError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err.into()));
                }
            }
            self.line += 1;
            let text = self.buffer.trim();
            if text.is_empty() {
                continue;
            }
            return Some(serde_json::from_str(text).map_err(|err| {
                RollupError::MalformedRecord {
                    source_id: self.id.clone(),
                    line: self.line,
                    reason: err.to_string(),
                }
            }));
        }
    }
}

impl<R: BufRead> SalesSource for JsonLinesSource<R> {
    fn id(&self) -> &str {
        &self.id
    }
}
