//! The row window shared between the UI and the commit worker.
//!
//! Every fetch takes a fresh version from the same counter, so a snapshot
//! can be compared against whatever the grid already shows and dropped when
//! it was requested earlier.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SnapshotWindow {
    limit: Arc<AtomicUsize>,
    version: Arc<AtomicU64>,
}

impl SnapshotWindow {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: Arc::new(AtomicUsize::new(limit.max(1))),
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit.load(Ordering::SeqCst)
    }

    /// Widens the window by `rows` and returns the new limit.
    pub fn grow(&self, rows: usize) -> usize {
        self.limit.fetch_add(rows, Ordering::SeqCst) + rows
    }

    /// Stamps a fetch about to start with the next version and the current limit.
    pub fn begin_fetch(&self) -> (u64, usize) {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        (version, self.limit())
    }
}
