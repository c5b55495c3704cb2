//! Control connection: the protocol seam and the lock that guards it.

use crate::error::{CrawlError, CrawlResult};
use crate::parser::parse_listing;
use crate::retry::CancelToken;
use crate::types::ListEntry;
use ftp::FtpStream;
use std::sync::{Mutex, MutexGuard};

/// The FTP commands the crawler issues on a control connection.
pub trait ControlConnection: Send {
    /// `USER` / `PASS`.
    fn login(&mut self, username: &str, password: &str) -> CrawlResult<()>;

    /// `NOOP`.
    fn noop(&mut self) -> CrawlResult<()>;

    /// `PWD`.
    fn pwd(&mut self) -> CrawlResult<String>;

    /// `LIST <dir>`, parsed.
    fn list(&mut self, dir: &str) -> CrawlResult<Vec<ListEntry>>;
}

/// Opens control connections to `host:port` addresses.
pub trait Connector: Send + Sync {
    fn connect(&self, addr: &str) -> CrawlResult<Box<dyn ControlConnection>>;
}

// ─── ftp crate backend ───────────────────────────────────────────────

/// Connector backed by the blocking `ftp` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FtpConnector;

impl Connector for FtpConnector {
    fn connect(&self, addr: &str) -> CrawlResult<Box<dyn ControlConnection>> {
        let stream = FtpStream::connect(addr)?;
        log::debug!("control connection to {} established", addr);
        Ok(Box::new(FtpConnection { stream }))
    }
}

pub struct FtpConnection {
    stream: FtpStream,
}

impl ControlConnection for FtpConnection {
    fn login(&mut self, username: &str, password: &str) -> CrawlResult<()> {
        Ok(self.stream.login(username, password)?)
    }

    fn noop(&mut self) -> CrawlResult<()> {
        Ok(self.stream.noop()?)
    }

    fn pwd(&mut self) -> CrawlResult<String> {
        Ok(self.stream.pwd()?)
    }

    fn list(&mut self, dir: &str) -> CrawlResult<Vec<ListEntry>> {
        let lines = self.stream.list(Some(dir))?;
        Ok(parse_listing(&lines))
    }
}

// ─── Shared handle ───────────────────────────────────────────────────

/// A target's single control connection behind its lock.
///
/// The handle is only reachable inside [`SharedConnection::with`], which holds
/// the lock for exactly one protocol call. Once the target's token is
/// cancelled no further call is started.
pub struct SharedConnection {
    slot: Mutex<Option<Box<dyn ControlConnection>>>,
    cancel: CancelToken,
}

impl SharedConnection {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            slot: Mutex::new(None),
            cancel,
        }
    }

    /// Run one protocol call with the lock held.
    pub fn with<R, F>(&self, call: F) -> CrawlResult<R>
    where
        F: FnOnce(&mut dyn ControlConnection) -> CrawlResult<R>,
    {
        let mut slot = self.lock();
        if self.cancel.is_cancelled() {
            return Err(CrawlError::Obsolete);
        }
        let conn = slot.as_mut().ok_or(CrawlError::NotConnected)?;
        call(&mut **conn)
    }

    pub fn is_connected(&self) -> bool {
        self.lock().is_some()
    }

    /// Replace the held connection, dropping any previous one.
    pub(crate) fn install(&self, conn: Box<dyn ControlConnection>) {
        *self.lock() = Some(conn);
    }

    /// Drop the held connection without issuing any command on it.
    pub(crate) fn release(&self) {
        self.lock().take();
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn ControlConnection>>> {
        // A panic mid-call leaves nothing half-updated in the slot itself.
        self.slot.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        noops: usize,
    }

    impl ControlConnection for Counting {
        fn login(&mut self, _: &str, _: &str) -> CrawlResult<()> {
            Ok(())
        }
        fn noop(&mut self) -> CrawlResult<()> {
            self.noops += 1;
            Ok(())
        }
        fn pwd(&mut self) -> CrawlResult<String> {
            Ok("/".to_string())
        }
        fn list(&mut self, _: &str) -> CrawlResult<Vec<ListEntry>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_with_before_install_is_not_connected() {
        let shared = SharedConnection::new(CancelToken::new());
        assert!(!shared.is_connected());
        let err = shared.with(|c| c.noop()).unwrap_err();
        assert!(matches!(err, CrawlError::NotConnected));
    }

    #[test]
    fn test_with_refuses_calls_after_cancel() {
        let cancel = CancelToken::new();
        let shared = SharedConnection::new(cancel.clone());
        shared.install(Box::new(Counting { noops: 0 }));
        shared.with(|c| c.noop()).unwrap();

        cancel.cancel();
        let err = shared.with(|c| c.noop()).unwrap_err();
        assert!(matches!(err, CrawlError::Obsolete));
    }

    #[test]
    fn test_release_drops_handle() {
        let shared = SharedConnection::new(CancelToken::new());
        shared.install(Box::new(Counting { noops: 0 }));
        assert!(shared.is_connected());
        shared.release();
        assert!(!shared.is_connected());
    }
}
