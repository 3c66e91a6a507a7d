// Shared cache of link validation results with a rolling expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::ResolvedLink;

/// Default quiet period after which cached results are dropped.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10);

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A cached validation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    Resolved(ResolvedLink),
    NotFound,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    clear_at: Option<Instant>,
}

/// Validation results keyed by raw matched link text.
///
/// Shared between detectors (wrap it in an `Arc`). [`schedule_clear`] arms a
/// single pending clear; arming again replaces the previous deadline, so the
/// cache empties only after a full quiet period with no detection passes.
///
/// [`schedule_clear`]: LinkValidationCache::schedule_clear
pub struct LinkValidationCache {
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl Default for LinkValidationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkValidationCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn get(&self, link: &str) -> Option<CacheEntry> {
        self.state().entries.get(link).cloned()
    }

    pub fn put_positive(&self, link: &str, resolved: ResolvedLink) {
        self.state()
            .entries
            .insert(link.to_string(), CacheEntry::Resolved(resolved));
    }

    pub fn put_negative(&self, link: &str) {
        self.state()
            .entries
            .insert(link.to_string(), CacheEntry::NotFound);
    }

    pub fn clear(&self) {
        let mut state = self.state();
        state.entries.clear();
        state.clear_at = None;
    }

    /// Arm the pending clear to fire `after` from now, replacing any
    /// previously armed one.
    pub fn schedule_clear(&self, after: Duration) {
        let deadline = self.clock.now() + after;
        self.state().clear_at = Some(deadline);
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Locks the state, first applying a pending clear whose deadline passed.
    fn state(&self) -> MutexGuard<'_, CacheState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(deadline) = state.clear_at {
            if self.clock.now() >= deadline {
                log::debug!("Clearing {} cached link results", state.entries.len());
                state.entries.clear();
                state.clear_at = None;
            }
        }
        state
    }
}

/// A clock advanced by hand.
#[cfg(test)]
pub(crate) struct ManualClock {
    base: Instant,
    elapsed: Mutex<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            base: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        })
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.elapsed.lock().unwrap() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.elapsed.lock().unwrap()
    }
}
