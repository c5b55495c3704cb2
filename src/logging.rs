//! Log collaborator.
//!
//! Failures that the crawler absorbs (connect, login, listing, indexing) are
//! only visible through this sink, so it is injected into every target rather
//! than reached through a global.

use std::sync::Mutex;

pub trait CrawlLog: Send + Sync {
    fn info(&self, target: &str, message: &str);
    fn error(&self, target: &str, message: &str);
}

/// `log` target every [`StdLog`] line is written under.
pub const LOG_TARGET: &str = "ftp_crawler";

/// Forwards to the `log` facade under [`LOG_TARGET`], prefixing each message
/// with the target host.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdLog;

impl StdLog {
    fn line(host: &str, message: &str) -> String {
        format!("[{}] {}", host, message)
    }
}

impl CrawlLog for StdLog {
    fn info(&self, target: &str, message: &str) {
        log::info!(target: LOG_TARGET, "{}", Self::line(target, message));
    }

    fn error(&self, target: &str, message: &str) {
        log::error!(target: LOG_TARGET, "{}", Self::line(target, message));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Keeps every line in memory. Used by tests and by callers that want to
/// report failures after a crawl.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<LogLine>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.filtered(Level::Error)
    }

    pub fn infos(&self) -> Vec<String> {
        self.filtered(Level::Info)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().unwrap_or_else(|p| p.into_inner()).is_empty()
    }

    fn filtered(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.level == level)
            .map(|l| l.message)
            .collect()
    }

    fn push(&self, level: Level, target: &str, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(LogLine {
                level,
                target: target.to_string(),
                message: message.to_string(),
            });
    }
}

impl CrawlLog for MemoryLog {
    fn info(&self, target: &str, message: &str) {
        self.push(Level::Info, target, message);
    }

    fn error(&self, target: &str, message: &str) {
        self.push(Level::Error, target, message);
    }
}
