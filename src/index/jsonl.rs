use super::{record_id, Indexer};
use crate::error::{CrawlError, CrawlResult};
use crate::types::FileEntry;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;
use std::sync::Mutex;

#[derive(Serialize)]
struct IndexedLine<'a> {
    id: &'a str,
    #[serde(flatten)]
    entry: &'a FileEntry,
}

/// Writes `{"id":…,"servers":[…],"filename":…,"size":…}` lines.
pub struct JsonLinesIndex<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesIndex<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|p| p.into_inner())
    }
}

impl JsonLinesIndex<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl JsonLinesIndex<BufWriter<File>> {
    /// Append to `path`, creating it if needed.
    pub fn append_to(path: impl AsRef<Path>) -> CrawlResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> Indexer for JsonLinesIndex<W> {
    fn add_file_entry(&self, entry: FileEntry) -> CrawlResult<String> {
        let id = record_id(&entry);
        let line = serde_json::to_string(&IndexedLine { id: &id, entry: &entry })
            .map_err(|e| CrawlError::index(e.to_string()))?;

        let mut out = self.out.lock().unwrap_or_else(|p| p.into_inner());
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(id)
    }
}
