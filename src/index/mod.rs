//! Indexing collaborators.
//!
//! The crawler hands every discovered file to an [`Indexer`] and forgets about
//! it. Three backends ship with the crate:
//! - `channel`: forwards records to an in-process consumer
//! - `jsonl`: one JSON object per line on any writer
//! - `sqlite`: a local SQLite store

mod channel;
mod jsonl;
mod sqlite;

pub use channel::ChannelIndex;
pub use jsonl::JsonLinesIndex;
pub use sqlite::SqliteIndex;

use crate::error::CrawlResult;
use crate::types::FileEntry;
use xxhash_rust::xxh3::xxh3_64;

/// Accepts file records. Ownership of the record moves to the index.
pub trait Indexer: Send + Sync {
    /// Store `entry`, returning the id it was stored under.
    fn add_file_entry(&self, entry: FileEntry) -> CrawlResult<String>;
}

/// Stable id for a record: xxh3 of its first `url|path`, as 16 hex digits.
pub fn record_id(entry: &FileEntry) -> String {
    let loc = entry.primary();
    let key = format!("{}|{}", loc.url(), loc.path());
    format!("{:016x}", xxh3_64(key.as_bytes()))
}
