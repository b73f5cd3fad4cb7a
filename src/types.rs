//! Common types used throughout the pagination buffer
//!
//! This module contains shared type definitions, type aliases,
//! and the value types returned by the buffer's read surface.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Request options passed to a fetcher: page keys merged with caller filters
pub type RequestOptions = serde_json::Map<String, JsonValue>;

// ============================================================================
// Fetch Types
// ============================================================================

/// One backend page as returned by a fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult<T> {
    /// Total number of elements available under the current filters
    pub total: u64,
    /// Elements of the requested backend page, in stable order
    pub elements: Vec<T>,
}

impl<T> FetchResult<T> {
    /// Create a fetch result
    pub fn new(total: u64, elements: Vec<T>) -> Self {
        Self { total, elements }
    }

    /// A page with no elements
    pub fn empty(total: u64) -> Self {
        Self {
            total,
            elements: Vec::new(),
        }
    }
}

/// What a fetch trigger ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Elements were appended to the buffer
    Appended(usize),
    /// The backend returned no elements; the backend page was rolled back
    Empty,
    /// The response belonged to an epoch that has since been invalidated
    Stale,
    /// A fetch for the current epoch was already in flight
    Suppressed,
    /// The trigger condition did not hold, nothing was requested
    Skipped,
    /// The new request options were identical to the current ones
    Unchanged,
}

impl FetchOutcome {
    /// Check if this outcome grew the buffer
    pub fn appended(&self) -> bool {
        matches!(self, Self::Appended(_))
    }

    /// Check if a fetch was actually issued by the trigger
    pub fn issued_fetch(&self) -> bool {
        matches!(self, Self::Appended(_) | Self::Empty | Self::Stale)
    }
}

// ============================================================================
// View Types
// ============================================================================

/// Absolute 0-based index bounds of the current frontend window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageLimits {
    /// Index of the first element of the window
    pub first_element: usize,
    /// Index of the last element of the window, clipped to `total - 1`.
    /// `None` while the total is zero.
    pub last_element: Option<usize>,
}

/// Snapshot of the buffer's read surface for the current frontend page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<T> {
    /// Frontend page the snapshot was taken for
    pub page: u32,
    /// Last known total element count
    pub total: u64,
    /// Elements of the current window (may be short or empty)
    pub page_elements: Vec<T>,
    /// Whether a fetch of the current epoch is in flight
    pub loading: bool,
    /// Whether the caller may go back one page
    pub previous_page_available: bool,
    /// Whether the caller may advance one page
    pub next_page_available: bool,
    /// Bounds of the current window
    pub page_limits: PageLimits,
}
