//! Change debouncing for live reload.
//!
//! Editors often emit several filesystem events per save (truncate, write,
//! rename). Every reload is a full page refresh, so the event kind does not
//! matter: a path is reported once it has been quiet for the debounce window.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Thread-safe per-path change debouncer.
pub(crate) struct ChangeDebouncer {
    pending: Mutex<HashMap<PathBuf, Instant>>,
    quiet_period: Duration,
}

impl ChangeDebouncer {
    /// Create a debouncer that waits `quiet_period` after the last change.
    pub(crate) fn new(quiet_period: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            quiet_period,
        }
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<PathBuf, Instant>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a change, pushing the path's deadline back.
    ///
    /// Called from the watcher task.
    pub(crate) fn record(&self, path: PathBuf) {
        let deadline = Instant::now() + self.quiet_period;
        self.pending().insert(path, deadline);
    }

    /// Take paths whose deadline has passed, sorted.
    pub(crate) fn drain_ready(&self) -> Vec<PathBuf> {
        let now = Instant::now();
        let mut ready = Vec::new();

        self.pending().retain(|path, deadline| {
            if *deadline <= now {
                ready.push(path.clone());
                false
            } else {
                true
            }
        });

        ready.sort();
        ready
    }

    /// Earliest pending deadline.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.pending().values().min().copied()
    }
}
