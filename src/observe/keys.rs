//! Key-level change detection for request options
//!
//! Options objects are compared key by key rather than by identity: a new
//! object carrying the same values is not a change, and one differing key
//! is enough to invalidate.

use crate::types::RequestOptions;
use std::collections::BTreeSet;

/// Tracks the last seen options object and reports which keys changed
#[derive(Debug, Clone, Default)]
pub struct KeyWatcher {
    snapshot: RequestOptions,
}

impl KeyWatcher {
    /// Create a watcher seeded with the initial options
    pub fn new(initial: RequestOptions) -> Self {
        Self { snapshot: initial }
    }

    /// The options the watcher currently holds
    pub fn snapshot(&self) -> &RequestOptions {
        &self.snapshot
    }

    /// Keys whose value differs between the snapshot and `next`, sorted.
    ///
    /// A key present on only one side counts as changed.
    pub fn peek_changes(&self, next: &RequestOptions) -> Vec<String> {
        let keys: BTreeSet<&String> = self.snapshot.keys().chain(next.keys()).collect();

        keys.into_iter()
            .filter(|key| self.snapshot.get(key.as_str()) != next.get(key.as_str()))
            .cloned()
            .collect()
    }

    /// Report changed keys and adopt `next` as the new snapshot.
    ///
    /// Returns `None` when nothing changed; the snapshot is left as is.
    pub fn detect(&mut self, next: &RequestOptions) -> Option<Vec<String>> {
        let changed = self.peek_changes(next);
        if changed.is_empty() {
            return None;
        }
        self.snapshot = next.clone();
        Some(changed)
    }
}
