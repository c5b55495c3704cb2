//! A single FTP host being crawled, and its connection manager.
//!
//! The connect and login loops never fail: high-load servers may need
//! hundreds of attempts, so the only way out besides success is marking the
//! target obsolete.

use crate::config::CrawlSettings;
use crate::connection::{Connector, SharedConnection};
use crate::error::{CrawlError, CrawlResult};
use crate::index::Indexer;
use crate::logging::CrawlLog;
use crate::retry::{retry_until, Backoff, CancelToken, Sleeper, ThreadSleeper};
use crate::types::{CrawlStats, Credentials, TargetState};
use percent_encoding::percent_decode_str;
use std::sync::{Arc, Mutex};
use url::Url;

const DEFAULT_FTP_PORT: u16 = 21;

/// Capabilities a target works through.
#[derive(Clone)]
pub struct Collaborators {
    pub connector: Arc<dyn Connector>,
    pub index: Arc<dyn Indexer>,
    pub log: Arc<dyn CrawlLog>,
    pub sleeper: Arc<dyn Sleeper>,
}

impl Collaborators {
    pub fn new(
        connector: Arc<dyn Connector>,
        index: Arc<dyn Indexer>,
        log: Arc<dyn CrawlLog>,
    ) -> Self {
        Self {
            connector,
            index,
            log,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}

pub struct Target {
    url: Url,
    addr: String,
    phase: Mutex<TargetState>,
    pub(crate) settings: CrawlSettings,
    pub(crate) cancel: CancelToken,
    pub(crate) connection: SharedConnection,
    pub(crate) collab: Collaborators,
}

impl Target {
    /// Parse `raw` and build a target for it. Nothing is logged on failure.
    pub fn new(raw: &str, settings: CrawlSettings, collab: Collaborators) -> CrawlResult<Arc<Self>> {
        let url = Url::parse(raw)?;
        if url.scheme() != "ftp" {
            return Err(CrawlError::UnsupportedScheme(url.scheme().to_string()));
        }
        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h,
            _ => return Err(CrawlError::InvalidUrl(url::ParseError::EmptyHost)),
        };
        let addr = format!("{}:{}", host, url.port().unwrap_or(DEFAULT_FTP_PORT));

        let cancel = CancelToken::new();
        let target = Arc::new(Self {
            connection: SharedConnection::new(cancel.clone()),
            cancel,
            addr,
            phase: Mutex::new(TargetState::Created),
            settings,
            collab,
            url,
        });

        target.info(&format!("Added {}", target.url));
        Ok(target)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `host:port` the control connection is opened to.
    pub fn address(&self) -> &str {
        &self.addr
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_obsolete(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Retire the target. Every loop stops at its next check; a call already
    /// on the wire is allowed to finish.
    pub fn mark_obsolete(&self) {
        if !self.cancel.is_cancelled() {
            self.cancel.cancel();
            self.info("marked obsolete");
        }
    }

    pub fn state(&self) -> TargetState {
        if self.cancel.is_cancelled() {
            TargetState::Obsolete
        } else {
            *self.phase.lock().unwrap_or_else(|p| p.into_inner())
        }
    }

    /// Userinfo from the URL, falling back to `anonymous:anonymous`.
    pub fn credentials(&self) -> Credentials {
        let mut creds = Credentials::anonymous();
        let username = self.url.username();
        let password = self.url.password();
        if username.is_empty() && password.is_none() {
            return creds;
        }
        creds.username = decode(username);
        if let Some(p) = password {
            creds.password = decode(p);
        }
        creds
    }

    /// Connect, retrying every `connect_retry_delay` until it works.
    ///
    /// Returns `false` only when the target became obsolete first.
    pub fn connect_loop(&self) -> bool {
        self.set_phase(TargetState::Connecting);
        let conn = retry_until(
            &self.cancel,
            self.collab.sleeper.as_ref(),
            Backoff::Fixed(self.settings.connect_retry_delay),
            |_| self.collab.connector.connect(&self.addr),
            |n, e| self.error(&format!("connect attempt {} to {} failed: {}", n, self.addr, e)),
        );

        match conn {
            Some(conn) => {
                self.connection.install(conn);
                self.set_phase(TargetState::Connected);
                log::debug!("connected to {}", self.addr);
                true
            }
            None => false,
        }
    }

    /// Log in, waiting `n * login_backoff_unit` after the n-th failure.
    ///
    /// Returns `false` when the target became obsolete first or when there is
    /// no connection to log in on.
    pub fn login_loop(&self) -> bool {
        if !self.connection.is_connected() {
            self.error("cannot log in without a control connection");
            return false;
        }
        self.set_phase(TargetState::Authenticating);

        let creds = self.credentials();
        let logged_in = retry_until(
            &self.cancel,
            self.collab.sleeper.as_ref(),
            Backoff::Linear(self.settings.login_backoff_unit),
            |_| {
                self.connection
                    .with(|c| c.login(&creds.username, &creds.password))
            },
            |n, e| {
                self.error(&format!(
                    "login attempt {} as {} failed: {}",
                    n, creds.username, e
                ))
            },
        )
        .is_some();

        if logged_in {
            self.set_phase(TargetState::Ready);
            self.info(&format!("logged in as {}", creds.username));
        }
        logged_in
    }

    /// Connect, log in, keep the session alive and walk the whole tree.
    ///
    /// When this returns the target is obsolete, its connection is dropped
    /// and the keep-alive thread has exited.
    pub fn run(self: &Arc<Self>) -> CrawlResult<CrawlStats> {
        if !self.connect_loop() || !self.login_loop() {
            return Err(CrawlError::Obsolete);
        }

        let keepalive = match self.start_keepalive() {
            Ok(k) => k,
            Err(e) => {
                self.retire();
                return Err(e);
            }
        };

        let result = self.start_crawling();
        match &result {
            Ok(stats) => self.info(&format!(
                "crawl finished: {} files in {} directories ({} listing failures, {} index failures)",
                stats.files_emitted,
                stats.directories_listed,
                stats.listing_failures,
                stats.index_failures
            )),
            Err(e) => self.error(&format!("crawl aborted: {}", e)),
        }

        self.retire();
        keepalive.join();
        result
    }

    fn retire(&self) {
        self.mark_obsolete();
        self.connection.release();
    }

    fn set_phase(&self, phase: TargetState) {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner()) = phase;
    }

    pub(crate) fn info(&self, message: &str) {
        self.collab.log.info(&self.addr, message);
    }

    pub(crate) fn error(&self, message: &str) {
        self.collab.log.error(&self.addr, message);
    }
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
