//! Caller-owned frontend page cursor
//!
//! The frontend page belongs to the caller, not to the buffer. `PageCursor`
//! is a cheap shared handle over a `watch` channel so both sides can read
//! and write it, and observers can subscribe to changes.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Callback run when the buffer asks the caller to reset its page
pub type ResetFn = Arc<dyn Fn(&PageCursor) + Send + Sync>;

/// Shared, observable frontend page cell (1-based)
#[derive(Clone)]
pub struct PageCursor {
    tx: Arc<watch::Sender<u32>>,
    on_reset: Option<ResetFn>,
}

impl PageCursor {
    /// Create a cursor positioned at `page` (clamped to 1)
    pub fn new(page: u32) -> Self {
        let (tx, _rx) = watch::channel(page.max(1));
        Self {
            tx: Arc::new(tx),
            on_reset: None,
        }
    }

    /// Replace the reset behavior. The default moves the cursor to page 1.
    #[must_use]
    pub fn with_reset<F>(mut self, reset: F) -> Self
    where
        F: Fn(&PageCursor) + Send + Sync + 'static,
    {
        self.on_reset = Some(Arc::new(reset));
        self
    }

    /// Current page
    pub fn get(&self) -> u32 {
        *self.tx.borrow()
    }

    /// Move to `page` (clamped to 1). Subscribers are only notified when the
    /// value actually changes. Returns the previous page.
    pub fn set(&self, page: u32) -> u32 {
        let page = page.max(1);
        let mut previous = page;
        self.tx.send_if_modified(|current| {
            previous = *current;
            if *current == page {
                false
            } else {
                *current = page;
                true
            }
        });
        previous
    }

    /// Advance one page
    pub fn advance(&self) -> u32 {
        let page = self.get().saturating_add(1);
        self.set(page);
        page
    }

    /// Go back one page (never below 1)
    pub fn retreat(&self) -> u32 {
        let page = self.get().saturating_sub(1).max(1);
        self.set(page);
        page
    }

    /// Run the reset callback
    pub fn reset(&self) {
        match &self.on_reset {
            Some(reset) => reset(self),
            None => {
                self.set(1);
            }
        }
    }

    /// Subscribe to page changes
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.tx.subscribe()
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(1)
    }
}

impl fmt::Debug for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageCursor")
            .field("page", &self.get())
            .field("custom_reset", &self.on_reset.is_some())
            .finish()
    }
}
