//! Directory walker.
//!
//! Depth-first over an explicit stack of pending directories. Every listing
//! takes the connection lock for that one call; the lock is never held while
//! records are emitted or while the next directory is picked.

use crate::error::{CrawlError, CrawlResult};
use crate::paths;
use crate::target::Target;
use crate::types::{CrawlStats, EntryKind, FileEntry, FileLocation};

impl Target {
    /// Walk the tree rooted at the server's working directory.
    ///
    /// Failing to resolve that directory is the only error returned; anything
    /// that goes wrong further down is logged and skipped.
    pub fn start_crawling(&self) -> CrawlResult<CrawlStats> {
        let root = self.connection.with(|c| c.pwd())?;
        self.info(&format!("crawling from {}", root));
        Ok(self.walk(&root))
    }

    /// Walk the tree below `root`.
    ///
    /// Visited paths are not tracked, so a server reporting a directory cycle
    /// keeps this going until `max_depth` (if set) or cancellation stops it.
    pub fn walk(&self, root: &str) -> CrawlStats {
        let mut stats = CrawlStats::default();
        let mut pending: Vec<(String, usize)> = vec![(paths::clean(root), 0)];

        while let Some((dir, depth)) = pending.pop() {
            if self.cancel.is_cancelled() {
                log::debug!("walk of {} cancelled before {}", self.address(), dir);
                break;
            }

            let entries = match self.connection.with(|c| c.list(&dir)) {
                Ok(entries) => {
                    stats.directories_listed += 1;
                    entries
                }
                Err(CrawlError::Obsolete) => break,
                Err(e) => {
                    stats.listing_failures += 1;
                    self.error(&format!("listing {} failed: {}", dir, e));
                    continue;
                }
            };

            for entry in entries {
                let full = paths::join(&dir, &entry.name);
                match entry.kind {
                    EntryKind::Directory => {
                        if self.settings.max_depth.map_or(false, |max| depth >= max) {
                            stats.depth_skipped += 1;
                            log::debug!("{} is below the depth limit, skipped", full);
                        } else {
                            pending.push((full, depth + 1));
                        }
                    }
                    EntryKind::File => {
                        let record = FileEntry::new(
                            paths::base_name(&full),
                            entry.size,
                            FileLocation::new(self.url().as_str(), full.as_str()),
                        );
                        if self.emit(record) {
                            stats.files_emitted += 1;
                        } else {
                            stats.index_failures += 1;
                        }
                    }
                    EntryKind::Symlink | EntryKind::Unknown => {
                        log::debug!("skipping {} ({:?})", full, entry.kind);
                    }
                }
            }
        }

        stats
    }
}
