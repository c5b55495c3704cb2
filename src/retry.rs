//! Cancellable retry policy.
//!
//! Connect and login never give up on their own; the only way out besides
//! success is the target's cancel token, which is checked before every attempt
//! and again before every sleep.

use crate::error::{CrawlError, CrawlResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Granularity at which a sleeping thread notices cancellation.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// One-way cancellation flag shared by everything working on a target.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. There is no way to clear it again.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Blocks the calling thread between attempts.
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration`, returning early once `cancel` is set.
    fn sleep(&self, duration: Duration, cancel: &CancelToken);
}

/// Real sleeper: waits in short slices so cancellation is seen promptly.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration, cancel: &CancelToken) {
        let deadline = Instant::now() + duration;
        loop {
            if cancel.is_cancelled() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

/// Delay shape between failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failure.
    Fixed(Duration),
    /// `unit * n` after the n-th failure, without a cap.
    Linear(Duration),
}

impl Backoff {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(d) => d,
            Backoff::Linear(unit) => unit.saturating_mul(attempt),
        }
    }
}

/// Run `attempt` until it succeeds or `cancel` is set.
///
/// `on_error` sees every failure along with its attempt number. Returns `None`
/// only when cancelled.
pub fn retry_until<T, F, E>(
    cancel: &CancelToken,
    sleeper: &dyn Sleeper,
    backoff: Backoff,
    mut attempt: F,
    mut on_error: E,
) -> Option<T>
where
    F: FnMut(u32) -> CrawlResult<T>,
    E: FnMut(u32, &CrawlError),
{
    let mut n: u32 = 1;
    loop {
        if cancel.is_cancelled() {
            return None;
        }
        match attempt(n) {
            Ok(value) => return Some(value),
            Err(e) => {
                on_error(n, &e);
                if cancel.is_cancelled() {
                    return None;
                }
                sleeper.sleep(backoff.delay(n), cancel);
                n = n.saturating_add(1);
            }
        }
    }
}
