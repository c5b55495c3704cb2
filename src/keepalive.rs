//! Keep-alive monitor.
//!
//! Servers drop idle control connections, so a background thread sends a
//! `NOOP` every `keepalive_interval` for as long as the target lives. Each
//! `NOOP` takes the connection lock for that one call only, which lets it slot
//! in between the walker's listings.

use crate::error::{CrawlError, CrawlResult};
use crate::target::Target;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Handle to a running keep-alive thread.
pub struct KeepAlive {
    handle: JoinHandle<()>,
}

impl KeepAlive {
    /// Wait for the thread to exit. It only does so once the target is
    /// obsolete. Returns `false` if the thread panicked.
    pub fn join(self) -> bool {
        self.handle.join().is_ok()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Target {
    pub fn start_keepalive(self: &Arc<Self>) -> CrawlResult<KeepAlive> {
        let target = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(format!("keepalive-{}", self.address()))
            .spawn(move || target.keepalive_loop())?;
        Ok(KeepAlive { handle })
    }

    fn keepalive_loop(&self) {
        let interval = self.settings.keepalive_interval;
        log::debug!("keep-alive for {} every {:?}", self.address(), interval);

        while !self.cancel.is_cancelled() {
            self.collab.sleeper.sleep(interval, &self.cancel);
            if self.cancel.is_cancelled() {
                break;
            }

            match self.connection.with(|c| c.noop()) {
                Ok(()) => log::debug!("NOOP sent to {}", self.address()),
                Err(CrawlError::Obsolete) => break,
                Err(e) => self.error(&format!("keep-alive NOOP failed: {}", e)),
            }
        }

        log::debug!("keep-alive for {} stopped", self.address());
    }
}
