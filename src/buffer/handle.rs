//! Pagination buffer implementation
//!
//! Reconciles frontend windows with backend pages. Triggers are explicit
//! async methods; `spawn_driver` wires them to change subscriptions.

use super::state::BufferState;
use crate::config::BufferConfig;
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::observe::PageCursor;
use crate::types::{FetchOutcome, PageLimits, PageView, RequestOptions};
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};
use tracing::{debug, info, warn};

/// Whether the first fetch of a trigger is conditional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FetchMode {
    /// Construction and invalidation always fetch backend page 1
    Unconditional,
    /// Page moves fetch only while the read-ahead condition holds
    ReadAhead,
}

pub(super) struct Inner<F: PageFetcher> {
    pub config: BufferConfig,
    pub fetcher: F,
    pub cursor: PageCursor,
    pub state: RwLock<BufferState<F::Element>>,
    /// Signalled whenever a fetch finishes, successfully or not
    pub settled: Notify,
}

/// Prefetching buffer over a paged data source
///
/// Cloning is cheap: clones share the same state, so one clone can be read
/// by a presenter while another awaits a trigger.
pub struct PaginationBuffer<F: PageFetcher> {
    pub(super) inner: Arc<Inner<F>>,
}

impl<F: PageFetcher> Clone for PaginationBuffer<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: PageFetcher> std::fmt::Debug for PaginationBuffer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationBuffer")
            .field("config", &self.inner.config)
            .field("cursor", &self.inner.cursor)
            .finish_non_exhaustive()
    }
}

impl<F: PageFetcher> PaginationBuffer<F> {
    /// Create a buffer without fetching anything yet. Call `prime` to load
    /// the first backend page, or use `open`.
    pub fn new(
        config: BufferConfig,
        fetcher: F,
        cursor: PageCursor,
        options: RequestOptions,
    ) -> Result<Self> {
        config.validate()?;
        let state = BufferState::new(options, cursor.get());

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                fetcher,
                cursor,
                state: RwLock::new(state),
                settled: Notify::new(),
            }),
        })
    }

    /// Create a buffer and load the first backend page
    pub async fn open(
        config: BufferConfig,
        fetcher: F,
        cursor: PageCursor,
        options: RequestOptions,
    ) -> Result<Self> {
        let buffer = Self::new(config, fetcher, cursor, options)?;
        buffer.prime().await?;
        Ok(buffer)
    }

    /// Load the first backend page
    pub async fn prime(&self) -> Result<FetchOutcome> {
        self.request_next_page(FetchMode::Unconditional).await
    }

    /// Buffer configuration
    pub fn config(&self) -> &BufferConfig {
        &self.inner.config
    }

    /// The caller-owned frontend page cursor
    pub fn cursor(&self) -> &PageCursor {
        &self.inner.cursor
    }

    // ========================================================================
    // Triggers
    // ========================================================================

    /// Move the cursor to `page` and react to it
    pub async fn set_frontend_page(&self, page: u32) -> Result<FetchOutcome> {
        self.inner.cursor.set(page);
        self.on_frontend_page_change().await
    }

    /// React to the cursor having moved. Moving backwards never fetches.
    pub async fn on_frontend_page_change(&self) -> Result<FetchOutcome> {
        let page = self.inner.cursor.get();

        let should_fetch = {
            let mut state = self.inner.state.write().await;
            let previous = std::mem::replace(&mut state.observed_page, page);
            page >= previous && state.needs_prefetch(page, &self.inner.config)
        };

        if !should_fetch {
            return Ok(FetchOutcome::Skipped);
        }

        debug!(page, "Read-ahead threshold crossed");
        self.request_next_page(FetchMode::ReadAhead).await
    }

    /// Replace the request options. If any key's value changed, everything
    /// buffered is dropped, the cursor is reset and backend page 1 is fetched.
    pub async fn set_request_options(&self, options: RequestOptions) -> Result<FetchOutcome> {
        {
            let mut state = self.inner.state.write().await;
            let Some(changed) = state.options.detect(&options) else {
                return Ok(FetchOutcome::Unchanged);
            };
            state.invalidate();
            info!(
                ?changed,
                epoch = state.epoch,
                "Request options changed, invalidating buffer"
            );
        }

        self.inner.cursor.reset();
        {
            let mut state = self.inner.state.write().await;
            state.observed_page = self.inner.cursor.get();
        }

        self.request_next_page(FetchMode::Unconditional).await
    }

    /// Fetch backend pages until the read-ahead condition stops holding for
    /// the current cursor position.
    ///
    /// In `FetchMode::ReadAhead` the condition is checked under the same lock
    /// that starts the fetch, so a duplicate trigger for a page that has
    /// since been served never fetches again. Follow-up fetches are always
    /// checked this way. A failure after something was appended is logged and
    /// rolled back; only a failure of the first fetch is returned.
    pub(super) async fn request_next_page(&self, mode: FetchMode) -> Result<FetchOutcome> {
        let config = &self.inner.config;
        let mut gated = mode == FetchMode::ReadAhead;
        let mut appended = 0;

        let last = loop {
            let ticket = {
                let mut state = self.inner.state.write().await;
                if gated
                    && !state.loading()
                    && !state.needs_prefetch(self.inner.cursor.get(), config)
                {
                    break FetchOutcome::Skipped;
                }
                match state.begin_fetch(config) {
                    Some(ticket) => ticket,
                    None => {
                        debug!("Fetch already in flight, trigger suppressed");
                        break FetchOutcome::Suppressed;
                    }
                }
            };
            gated = true;

            debug!(
                backend_page = ticket.page,
                epoch = ticket.epoch,
                "Fetching backend page"
            );
            let result = self.inner.fetcher.fetch(&ticket.params).await;

            let outcome = {
                let mut state = self.inner.state.write().await;
                match result {
                    Ok(page) => state.complete_fetch(&ticket, page),
                    Err(e) => {
                        if !state.fail_fetch(&ticket) {
                            FetchOutcome::Stale
                        } else if appended > 0 {
                            warn!(
                                backend_page = ticket.page,
                                error = %e,
                                "Read-ahead fetch failed, page rolled back"
                            );
                            break FetchOutcome::Skipped;
                        } else {
                            warn!(
                                backend_page = ticket.page,
                                error = %e,
                                "Backend fetch failed, page rolled back"
                            );
                            drop(state);
                            self.inner.settled.notify_waiters();
                            return Err(e);
                        }
                    }
                }
            };

            match outcome {
                FetchOutcome::Appended(count) => {
                    appended += count;
                    debug!(backend_page = ticket.page, count, "Backend page merged");
                }
                FetchOutcome::Empty => {
                    debug!(backend_page = ticket.page, "Empty backend page, rolled back");
                }
                FetchOutcome::Stale => {
                    warn!(
                        backend_page = ticket.page,
                        epoch = ticket.epoch,
                        "Discarding response from an invalidated epoch"
                    );
                }
                _ => {}
            }

            if !outcome.appended() {
                break outcome;
            }
        };

        self.inner.settled.notify_waiters();

        if appended > 0 {
            Ok(FetchOutcome::Appended(appended))
        } else {
            Ok(last)
        }
    }

    // ========================================================================
    // Read surface
    // ========================================================================

    /// Snapshot of the current frontend page
    pub async fn view(&self) -> PageView<F::Element>
    where
        F::Element: Clone,
    {
        let page = self.inner.cursor.get();
        self.inner.state.read().await.view(page, &self.inner.config)
    }

    /// Elements of the current frontend page
    pub async fn page_elements(&self) -> Vec<F::Element>
    where
        F::Element: Clone,
    {
        let page = self.inner.cursor.get();
        self.inner
            .state
            .read()
            .await
            .page_elements(page, &self.inner.config)
    }

    /// Last known total
    pub async fn total(&self) -> u64 {
        self.inner.state.read().await.total
    }

    /// Whether a fetch of the current epoch is in flight
    pub async fn loading(&self) -> bool {
        self.inner.state.read().await.loading()
    }

    pub fn previous_page_available(&self) -> bool {
        self.inner.cursor.get() > 1
    }

    pub async fn next_page_available(&self) -> bool {
        let page = self.inner.cursor.get();
        self.inner
            .state
            .read()
            .await
            .next_page_available(page, &self.inner.config)
    }

    pub async fn page_limits(&self) -> PageLimits {
        let page = self.inner.cursor.get();
        self.inner
            .state
            .read()
            .await
            .page_limits(page, &self.inner.config)
    }

    /// Number of elements buffered in the current epoch
    pub async fn buffered_len(&self) -> usize {
        self.inner.state.read().await.elements.len()
    }

    /// Last backend page requested in the current epoch
    pub async fn backend_page(&self) -> u32 {
        self.inner.state.read().await.backend_page
    }

    /// Current epoch (number of invalidations so far)
    pub async fn epoch(&self) -> u64 {
        self.inner.state.read().await.epoch
    }

    /// Current request options
    pub async fn request_options(&self) -> RequestOptions {
        self.inner.state.read().await.options.snapshot().clone()
    }

    /// Whether everything the source reported has been buffered
    pub async fn exhausted(&self) -> bool {
        let state = self.inner.state.read().await;
        state.total > 0 && state.elements.len() as u64 >= state.total
    }

    /// Wait until no fetch is in flight
    pub async fn settled(&self) {
        loop {
            let notified = self.inner.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if !self.inner.state.read().await.loading() {
                return;
            }
            notified.await;
        }
    }
}
