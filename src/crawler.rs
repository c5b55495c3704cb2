//! Registry of targets.
//!
//! Each target runs on its own thread with its own connection and lock;
//! nothing is shared between targets except the collaborators.

use crate::config::CrawlSettings;
use crate::error::{CrawlError, CrawlResult};
use crate::target::{Collaborators, Target};
use crate::types::CrawlStats;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

/// How one target's crawl ended.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub url: String,
    pub result: CrawlResult<CrawlStats>,
}

pub struct Crawler {
    settings: CrawlSettings,
    collab: Collaborators,
    targets: Mutex<Vec<Arc<Target>>>,
}

impl Crawler {
    pub fn new(settings: CrawlSettings, collab: Collaborators) -> Self {
        Self {
            settings,
            collab,
            targets: Mutex::new(Vec::new()),
        }
    }

    /// Register a target for `url`. Malformed URLs are rejected and never
    /// registered.
    pub fn add_target(&self, url: &str) -> CrawlResult<Arc<Target>> {
        let target = Target::new(url, self.settings.clone(), self.collab.clone())?;
        self.lock().push(Arc::clone(&target));
        Ok(target)
    }

    pub fn targets(&self) -> Vec<Arc<Target>> {
        self.lock().clone()
    }

    /// Mark every registered target obsolete.
    pub fn shutdown(&self) {
        for target in self.lock().iter() {
            target.mark_obsolete();
        }
    }

    /// Run every registered target in parallel and wait for all of them.
    pub fn crawl_all(&self) -> Vec<CrawlOutcome> {
        let mut running = Vec::new();
        let mut outcomes = Vec::new();

        for target in self.targets() {
            let url = target.url().to_string();
            let worker = Arc::clone(&target);
            let spawned = thread::Builder::new()
                .name(format!("crawl-{}", target.address()))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => running.push((url, target, handle)),
                Err(e) => outcomes.push(CrawlOutcome {
                    url,
                    result: Err(CrawlError::Io(e)),
                }),
            }
        }

        for (url, target, handle) in running {
            let result = handle
                .join()
                .unwrap_or_else(|_| Err(CrawlError::WorkerPanicked(target.address().to_string())));
            outcomes.push(CrawlOutcome { url, result });
        }
        outcomes
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Target>>> {
        self.targets.lock().unwrap_or_else(|p| p.into_inner())
    }
}
