//! Buffer state and derived quantities
//!
//! Everything here is synchronous and lock-free; `PaginationBuffer` wraps a
//! `BufferState` in a lock and drives it from async triggers.

use crate::config::{BufferConfig, NavigationPolicy};
use crate::observe::KeyWatcher;
use crate::types::{FetchOutcome, FetchResult, PageLimits, PageView, RequestOptions};

/// A fetch that has been started but not yet merged
#[derive(Debug, Clone)]
pub(crate) struct FetchTicket {
    /// Epoch the fetch was issued in
    pub epoch: u64,
    /// Backend page requested
    pub page: u32,
    /// Parameters handed to the fetcher
    pub params: RequestOptions,
}

/// Mutable state of one buffer instance
#[derive(Debug)]
pub(crate) struct BufferState<T> {
    /// Concatenation of every non-empty backend page of this epoch
    pub elements: Vec<T>,
    /// Last known total, 0 until the first fetch of the epoch completes
    pub total: u64,
    /// Last backend page requested
    pub backend_page: u32,
    /// Bumped on every invalidation
    pub epoch: u64,
    /// Epoch of the fetch currently in flight
    pub in_flight: Option<u64>,
    /// Last frontend page the buffer reacted to
    pub observed_page: u32,
    /// Current request options
    pub options: KeyWatcher,
}

impl<T> BufferState<T> {
    pub fn new(options: RequestOptions, page: u32) -> Self {
        Self {
            elements: Vec::new(),
            total: 0,
            backend_page: 0,
            epoch: 0,
            in_flight: None,
            observed_page: page,
            options: KeyWatcher::new(options),
        }
    }

    pub fn loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a fetch for the next backend page. Returns `None` when a fetch
    /// of the current epoch is already running.
    pub fn begin_fetch(&mut self, config: &BufferConfig) -> Option<FetchTicket> {
        if self.in_flight.is_some() {
            return None;
        }

        self.in_flight = Some(self.epoch);
        self.backend_page += 1;

        Some(FetchTicket {
            epoch: self.epoch,
            page: self.backend_page,
            params: self.build_params(self.backend_page, config),
        })
    }

    /// Merge a fetch result
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, result: FetchResult<T>) -> FetchOutcome {
        if ticket.epoch != self.epoch {
            return FetchOutcome::Stale;
        }

        self.in_flight = None;
        self.total = result.total;

        if result.elements.is_empty() {
            self.backend_page = self.backend_page.saturating_sub(1);
            FetchOutcome::Empty
        } else {
            let count = result.elements.len();
            self.elements.extend(result.elements);
            FetchOutcome::Appended(count)
        }
    }

    /// Undo a failed fetch. Returns false if the ticket is stale.
    pub fn fail_fetch(&mut self, ticket: &FetchTicket) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }

        self.in_flight = None;
        self.backend_page = self.backend_page.saturating_sub(1);
        true
    }

    /// Drop everything buffered and start a new epoch
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.elements.clear();
        self.total = 0;
        self.backend_page = 0;
        self.in_flight = None;
    }

    /// `{ page_key: page, size_key?: size, ...options }`. Caller options are
    /// applied last.
    pub fn build_params(&self, page: u32, config: &BufferConfig) -> RequestOptions {
        let keys = &config.backend.request_keys;
        let mut params = RequestOptions::new();

        params.insert(keys.page.clone(), page.into());
        if let (Some(key), Some(size)) = (&keys.page_size, config.backend.page_size) {
            params.insert(key.clone(), size.into());
        }
        for (key, value) in self.options.snapshot() {
            params.insert(key.clone(), value.clone());
        }

        params
    }

    /// Whether advancing to `page` calls for another backend page: elements
    /// are buffered, fewer than `read_ahead` frontend pages of them remain
    /// past the window, and the source is not exhausted.
    pub fn needs_prefetch(&self, page: u32, config: &BufferConfig) -> bool {
        let buffered = self.elements.len() as u64;
        let (_, next) = window(page, config.frontend.page_size);

        buffered > 0
            && buffered < next.saturating_add(config.read_ahead_threshold())
            && buffered < self.total
    }

    pub fn next_page_available(&self, page: u32, config: &BufferConfig) -> bool {
        let (_, next) = window(page, config.frontend.page_size);
        if next >= self.total {
            return false;
        }

        match config.navigation {
            NavigationPolicy::Buffered => !self.loading() || next < self.elements.len() as u64,
            NavigationPolicy::Strict => !self.loading(),
        }
    }

    pub fn page_limits(&self, page: u32, config: &BufferConfig) -> PageLimits {
        let size = u64::from(config.frontend.page_size);
        let (first, _) = window(page, config.frontend.page_size);

        PageLimits {
            first_element: first as usize,
            last_element: self
                .total
                .checked_sub(1)
                .map(|last| (first + size - 1).min(last) as usize),
        }
    }
}

impl<T: Clone> BufferState<T> {
    /// Elements of the window for `page`, clipped to what is buffered
    pub fn page_elements(&self, page: u32, config: &BufferConfig) -> Vec<T> {
        let (first, next) = window(page, config.frontend.page_size);
        let len = self.elements.len();
        let first = (first as usize).min(len);
        let next = (next as usize).min(len);

        self.elements[first..next].to_vec()
    }

    pub fn view(&self, page: u32, config: &BufferConfig) -> PageView<T> {
        PageView {
            page,
            total: self.total,
            page_elements: self.page_elements(page, config),
            loading: self.loading(),
            previous_page_available: page > 1,
            next_page_available: self.next_page_available(page, config),
            page_limits: self.page_limits(page, config),
        }
    }
}

/// `(first_element, next_element)` for a 1-based frontend page
pub(crate) fn window(page: u32, page_size: u32) -> (u64, u64) {
    let size = u64::from(page_size);
    let page = u64::from(page.max(1));
    (size * (page - 1), size * page)
}
