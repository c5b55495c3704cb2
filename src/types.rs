//! Shared types: listing entries, emitted file records, crawl bookkeeping.

use serde::Serialize;
use std::fmt;

// ─── Listing ─────────────────────────────────────────────────────────

/// Kind of a directory listing entry as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Unknown,
}

/// One parsed line of a `LIST` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
}

impl ListEntry {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
        }
    }
}

// ─── Emitted records ─────────────────────────────────────────────────

/// One server's view of a file: the target URL plus the absolute path on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLocation {
    url: String,
    path: String,
}

impl FileLocation {
    pub fn new(url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// The record handed to the index.
///
/// `servers` is never empty. The crawler always emits exactly one location,
/// but mirrors of the same file can be merged with [`FileEntry::add_location`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    servers: Vec<FileLocation>,
    filename: String,
    size: u64,
}

impl FileEntry {
    pub fn new(filename: impl Into<String>, size: u64, location: FileLocation) -> Self {
        Self {
            servers: vec![location],
            filename: filename.into(),
            size,
        }
    }

    pub fn add_location(&mut self, location: FileLocation) {
        self.servers.push(location);
    }

    pub fn servers(&self) -> &[FileLocation] {
        &self.servers
    }

    /// First location the file was discovered at.
    pub fn primary(&self) -> &FileLocation {
        &self.servers[0]
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

// ─── Target bookkeeping ──────────────────────────────────────────────

/// Lifecycle phase of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Created,
    Connecting,
    Connected,
    Authenticating,
    Ready,
    Obsolete,
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetState::Created => "created",
            TargetState::Connecting => "connecting",
            TargetState::Connected => "connected",
            TargetState::Authenticating => "authenticating",
            TargetState::Ready => "ready",
            TargetState::Obsolete => "obsolete",
        };
        f.write_str(s)
    }
}

/// Counters collected over one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub directories_listed: usize,
    pub listing_failures: usize,
    pub files_emitted: usize,
    pub index_failures: usize,
    pub depth_skipped: usize,
}

/// Login pair resolved from the target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self {
            username: "anonymous".to_string(),
            password: "anonymous".to_string(),
        }
    }
}
