//! Crawler error type.

use thiserror::Error;

/// Everything that can go wrong while crawling a target.
///
/// Most of these never reach a caller: connect and login failures are retried,
/// listing and index failures are logged and absorbed. Only target creation and
/// the initial `PWD` surface errors.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid FTP URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported URL scheme '{0}', expected ftp")]
    UnsupportedScheme(String),

    #[error("FTP error: {0}")]
    Ftp(#[from] ftp::FtpError),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("no control connection is established")]
    NotConnected,

    #[error("target is obsolete")]
    Obsolete,

    #[error("index rejected entry: {0}")]
    Index(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("crawl worker for {0} panicked")]
    WorkerPanicked(String),
}

pub type CrawlResult<T> = Result<T, CrawlError>;

impl CrawlError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }
}
