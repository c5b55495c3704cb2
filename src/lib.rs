//! FTP crawler library.
//!
//! Walks the directory trees of anonymous or credentialed FTP servers and
//! forwards every file it finds to an index. Each server is a [`Target`]:
//! it connects and logs in with indefinite retry, keeps its control
//! connection alive with periodic `NOOP`s, and walks the tree depth-first,
//! with the keep-alive thread and the walker taking turns on the one
//! connection.
//!
//! Layout:
//! - `target`: the per-host aggregate plus its connect/login loops
//! - `keepalive`: background `NOOP` thread
//! - `walker`: depth-first traversal
//! - `emitter`: hand-off to the index
//! - `connection`: protocol seam over the `ftp` crate and the shared handle
//! - `parser`: `LIST` reply parsing
//! - `retry`: cancellable retry/backoff
//! - `index`: channel, JSON-lines and SQLite indexes
//! - `config`: JSON configuration
//! - `crawler`: registry running many targets

pub mod config;
pub mod connection;
pub mod crawler;
mod emitter;
pub mod error;
pub mod index;
pub mod keepalive;
pub mod logging;
pub mod parser;
pub mod paths;
pub mod retry;
pub mod target;
pub mod types;
mod walker;

pub use config::{CrawlSettings, CrawlerConfig, IndexConfig};
pub use connection::{Connector, ControlConnection, FtpConnector, SharedConnection};
pub use crawler::{CrawlOutcome, Crawler};
pub use error::{CrawlError, CrawlResult};
pub use index::{ChannelIndex, Indexer, JsonLinesIndex, SqliteIndex};
pub use keepalive::KeepAlive;
pub use logging::{CrawlLog, MemoryLog, StdLog};
pub use retry::{Backoff, CancelToken, Sleeper, ThreadSleeper};
pub use target::{Collaborators, Target};
pub use types::{
    CrawlStats, Credentials, EntryKind, FileEntry, FileLocation, ListEntry, TargetState,
};
