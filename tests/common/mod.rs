//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use ftp_crawler::{
    CancelToken, ChannelIndex, Collaborators, Connector, ControlConnection, CrawlError,
    CrawlLog, CrawlResult, CrawlSettings, FileEntry, Indexer, ListEntry, MemoryLog, Sleeper,
    Target,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

type ListHook = Box<dyn Fn(&str) + Send + Sync>;

/// Scripted in-memory FTP server.
///
/// Calls made while another call is still running are rejected and counted
/// in `overlaps`, like a real non-reentrant control connection would break.
#[derive(Default)]
pub struct FakeServer {
    tree: HashMap<String, Result<Vec<ListEntry>, String>>,
    pwd: Option<Result<String, String>>,
    connect_failures: AtomicUsize,
    login_failures: AtomicUsize,
    noop_failures: AtomicUsize,
    call_delay: Duration,
    in_use: AtomicBool,
    on_list: Mutex<Option<ListHook>>,

    pub connects: AtomicUsize,
    pub noops: AtomicUsize,
    pub overlaps: AtomicUsize,
    pub logins: Mutex<Vec<(String, String)>>,
    pub listed: Mutex<Vec<String>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, path: &str, entries: Vec<ListEntry>) -> Self {
        self.tree.insert(path.to_string(), Ok(entries));
        self
    }

    pub fn failing_dir(mut self, path: &str, reply: &str) -> Self {
        self.tree.insert(path.to_string(), Err(reply.to_string()));
        self
    }

    pub fn pwd(mut self, reply: Result<&str, &str>) -> Self {
        self.pwd = Some(reply.map(str::to_string).map_err(str::to_string));
        self
    }

    pub fn fail_connects(self, n: usize) -> Self {
        self.connect_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn fail_logins(self, n: usize) -> Self {
        self.login_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn fail_noops(self, n: usize) -> Self {
        self.noop_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Run `hook` with the directory name each time a listing is served.
    pub fn on_list(&self, hook: impl Fn(&str) + Send + Sync + 'static) {
        *self.on_list.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn listed(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }

    pub fn noop_count(&self) -> usize {
        self.noops.load(Ordering::SeqCst)
    }

    pub fn overlap_count(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn enter(&self) -> CrawlResult<Busy<'_>> {
        if self.in_use.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
            return Err(CrawlError::protocol("connection already in use"));
        }
        if !self.call_delay.is_zero() {
            thread::sleep(self.call_delay);
        }
        Ok(Busy(&self.in_use))
    }
}

struct Busy<'a>(&'a AtomicBool);

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct FakeConnection {
    server: Arc<FakeServer>,
}

impl ControlConnection for FakeConnection {
    fn login(&mut self, username: &str, password: &str) -> CrawlResult<()> {
        let _busy = self.server.enter()?;
        self.server
            .logins
            .lock()
            .unwrap()
            .push((username.to_string(), password.to_string()));
        if FakeServer::take_failure(&self.server.login_failures) {
            return Err(CrawlError::protocol("530 Login incorrect"));
        }
        Ok(())
    }

    fn noop(&mut self) -> CrawlResult<()> {
        let _busy = self.server.enter()?;
        self.server.noops.fetch_add(1, Ordering::SeqCst);
        if FakeServer::take_failure(&self.server.noop_failures) {
            return Err(CrawlError::protocol("421 Timeout"));
        }
        Ok(())
    }

    fn pwd(&mut self) -> CrawlResult<String> {
        let _busy = self.server.enter()?;
        match &self.server.pwd {
            None => Ok("/".to_string()),
            Some(Ok(dir)) => Ok(dir.clone()),
            Some(Err(reply)) => Err(CrawlError::protocol(reply.clone())),
        }
    }

    fn list(&mut self, dir: &str) -> CrawlResult<Vec<ListEntry>> {
        let _busy = self.server.enter()?;
        self.server.listed.lock().unwrap().push(dir.to_string());
        if let Some(hook) = self.server.on_list.lock().unwrap().as_ref() {
            hook(dir);
        }
        match self.server.tree.get(dir) {
            Some(Ok(entries)) => Ok(entries.clone()),
            Some(Err(reply)) => Err(CrawlError::protocol(reply.clone())),
            None => Err(CrawlError::protocol(format!("550 {}: No such directory", dir))),
        }
    }
}

/// Serves every address from the same server.
pub struct FakeConnector {
    pub server: Arc<FakeServer>,
}

impl Connector for FakeConnector {
    fn connect(&self, _addr: &str) -> CrawlResult<Box<dyn ControlConnection>> {
        self.server.connects.fetch_add(1, Ordering::SeqCst);
        if FakeServer::take_failure(&self.server.connect_failures) {
            return Err(CrawlError::protocol("421 Too many connections"));
        }
        Ok(Box::new(FakeConnection {
            server: Arc::clone(&self.server),
        }))
    }
}

/// Routes `host:port` addresses to different servers.
#[derive(Default)]
pub struct RoutingConnector {
    pub servers: HashMap<String, Arc<FakeServer>>,
}

impl Connector for RoutingConnector {
    fn connect(&self, addr: &str) -> CrawlResult<Box<dyn ControlConnection>> {
        let server = self
            .servers
            .get(addr)
            .ok_or_else(|| CrawlError::protocol(format!("no route to {}", addr)))?;
        FakeConnector {
            server: Arc::clone(server),
        }
        .connect(addr)
    }
}

/// Records requested sleeps without waiting. Optionally cancels the target
/// once a number of sleeps has been requested.
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: Mutex<Vec<Duration>>,
    cancel_after: Option<usize>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(n: usize) -> Self {
        Self {
            sleeps: Mutex::new(Vec::new()),
            cancel_after: Some(n),
        }
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total(&self) -> Duration {
        self.recorded().into_iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration, cancel: &CancelToken) {
        let mut sleeps = self.sleeps.lock().unwrap();
        sleeps.push(duration);
        if self.cancel_after.map_or(false, |n| sleeps.len() >= n) {
            cancel.cancel();
        }
    }
}

/// Rejects records whose filename is in `reject`, forwards the rest.
pub struct FailingIndex {
    pub inner: ChannelIndex,
    pub reject: HashSet<String>,
}

impl Indexer for FailingIndex {
    fn add_file_entry(&self, entry: FileEntry) -> CrawlResult<String> {
        if self.reject.contains(entry.filename()) {
            return Err(CrawlError::index("503 index unavailable"));
        }
        self.inner.add_file_entry(entry)
    }
}

/// Settings with delays short enough for tests that use real sleeping.
pub fn fast_settings() -> CrawlSettings {
    CrawlSettings {
        connect_retry_delay: Duration::from_millis(5),
        login_backoff_unit: Duration::from_millis(1),
        keepalive_interval: Duration::from_millis(1),
        max_depth: None,
    }
}

pub fn collaborators(
    server: &Arc<FakeServer>,
    index: Arc<dyn Indexer>,
    log: Arc<dyn CrawlLog>,
    sleeper: Arc<dyn Sleeper>,
) -> Collaborators {
    Collaborators::new(
        Arc::new(FakeConnector {
            server: Arc::clone(server),
        }),
        index,
        log,
    )
    .with_sleeper(sleeper)
}

/// A target that has already connected and logged in.
pub fn ready_target(
    url: &str,
    settings: CrawlSettings,
    collab: Collaborators,
) -> Arc<Target> {
    let target = Target::new(url, settings, collab).unwrap();
    assert!(target.connect_loop());
    assert!(target.login_loop());
    target
}

/// `/` → `{a/file1(10), b/}`, `/b` → `{file2(20)}`.
pub fn sample_server() -> FakeServer {
    FakeServer::new()
        .dir("/", vec![ListEntry::directory("a"), ListEntry::directory("b")])
        .dir("/a", vec![ListEntry::file("file1", 10)])
        .dir("/b", vec![ListEntry::file("file2", 20)])
}

pub fn memory_log() -> Arc<MemoryLog> {
    Arc::new(MemoryLog::new())
}

/// Poll `cond` until it holds or `timeout` passes.
pub fn wait_for(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

/// Drain a channel index receiver, sorted by path.
pub fn drain_sorted(rx: &crossbeam::channel::Receiver<FileEntry>) -> Vec<FileEntry> {
    let mut records: Vec<FileEntry> = rx.try_iter().collect();
    records.sort_by(|a, b| a.primary().path().cmp(b.primary().path()));
    records
}
