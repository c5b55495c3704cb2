//! Crawler configuration.
//!
//! Read from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!   "targets": ["ftp://ftp.example.org/"],
//!   "connect_retry_secs": 2,
//!   "login_backoff_secs": 1,
//!   "keepalive_interval_secs": 15,
//!   "max_depth": null,
//!   "index": { "kind": "sqlite", "path": "files.db" }
//! }
//! ```

use crate::error::CrawlResult;
use crate::index::{Indexer, JsonLinesIndex, SqliteIndex};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Timing and limits a target runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Wait between connect attempts.
    pub connect_retry_delay: Duration,
    /// The n-th failed login is followed by a wait of `n` times this.
    pub login_backoff_unit: Duration,
    /// Time between keep-alive `NOOP`s.
    pub keepalive_interval: Duration,
    /// Directories deeper than this below the root are not listed.
    pub max_depth: Option<usize>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            connect_retry_delay: Duration::from_secs(default_connect_retry_secs()),
            login_backoff_unit: Duration::from_secs(default_login_backoff_secs()),
            keepalive_interval: Duration::from_secs(default_keepalive_interval_secs()),
            max_depth: None,
        }
    }
}

/// Where discovered records go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexConfig {
    /// JSON lines on standard output.
    #[default]
    Stdout,
    JsonLines { path: PathBuf },
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default = "default_connect_retry_secs")]
    pub connect_retry_secs: u64,
    #[serde(default = "default_login_backoff_secs")]
    pub login_backoff_secs: u64,
    #[serde(default = "default_keepalive_interval_secs")]
    pub keepalive_interval_secs: u64,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub index: IndexConfig,
}

fn default_connect_retry_secs() -> u64 {
    2
}
fn default_login_backoff_secs() -> u64 {
    1
}
fn default_keepalive_interval_secs() -> u64 {
    15
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            connect_retry_secs: default_connect_retry_secs(),
            login_backoff_secs: default_login_backoff_secs(),
            keepalive_interval_secs: default_keepalive_interval_secs(),
            max_depth: None,
            index: IndexConfig::default(),
        }
    }
}

impl CrawlerConfig {
    pub fn load(path: impl AsRef<Path>) -> CrawlResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> CrawlResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn settings(&self) -> CrawlSettings {
        CrawlSettings {
            connect_retry_delay: Duration::from_secs(self.connect_retry_secs),
            login_backoff_unit: Duration::from_secs(self.login_backoff_secs),
            keepalive_interval: Duration::from_secs(self.keepalive_interval_secs),
            max_depth: self.max_depth,
        }
    }

    /// Open the configured index backend.
    pub fn open_index(&self) -> CrawlResult<Arc<dyn Indexer>> {
        let index: Arc<dyn Indexer> = match &self.index {
            IndexConfig::Stdout => Arc::new(JsonLinesIndex::stdout()),
            IndexConfig::JsonLines { path } => Arc::new(JsonLinesIndex::append_to(path)?),
            IndexConfig::Sqlite { path } => Arc::new(SqliteIndex::open(path)?),
        };
        Ok(index)
    }
}
