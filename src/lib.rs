// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Pagination Buffer
//!
//! A prefetching buffer that reconciles two page granularities: the
//! *frontend* page a consumer looks at, and the *backend* page a data source
//! serves. Backend pages accumulate into one ordered collection; the buffer
//! hands out frontend-sized windows over it and fetches more in the
//! background as the consumer approaches the edge.
//!
//! ## Features
//!
//! - **Independent page sizes**: show 10 at a time, fetch 50 at a time
//! - **Read-ahead**: prefetch once fewer than one or two frontend pages remain
//! - **Invalidation**: any change to a filter option restarts from page 1
//! - **Race-free**: one fetch in flight per epoch, stale responses dropped
//! - **Pluggable sources**: closures, HTTP/JSON endpoints, or your own trait impl
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagination_buffer::{fetcher_fn, BufferConfig, FetchResult, PageCursor, PaginationBuffer};
//!
//! #[tokio::main]
//! async fn main() -> pagination_buffer::Result<()> {
//!     let config = BufferConfig::new(10).with_backend_page_size(50);
//!     let fetcher = fetcher_fn(|params| async move {
//!         let page = params["page"].as_u64().unwrap_or(1);
//!         Ok(FetchResult::new(120, load_rows(page).await))
//!     });
//!
//!     let cursor = PageCursor::default();
//!     let buffer = PaginationBuffer::open(config, fetcher, cursor.clone(), Default::default()).await?;
//!
//!     buffer.set_frontend_page(2).await?;
//!     let view = buffer.view().await;
//!     println!("{:?} of {}", view.page_elements, view.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     PaginationBuffer                      │
//! │  view() → PageView   set_frontend_page()   set_options()  │
//! └───────────────────────────────────────────────────────────┘
//!          │                     │                    │
//! ┌────────┴───────┬─────────────┴───────┬────────────┴──────┐
//! │  BufferState   │      Observe        │      Fetch        │
//! ├────────────────┼─────────────────────┼───────────────────┤
//! │ elements/total │ PageCursor (watch)  │ PageFetcher trait │
//! │ backend page   │ KeyWatcher          │ fetcher_fn        │
//! │ epoch/in-flight│ driver task         │ HttpFetcher       │
//! └────────────────┴─────────────────────┴───────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Buffer configuration
pub mod config;

/// Page cursor and options change detection
pub mod observe;

/// Fetch contract and data sources
pub mod fetch;

/// The pagination buffer
pub mod buffer;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use buffer::PaginationBuffer;
pub use config::{BufferConfig, NavigationPolicy, RequestKeys};
pub use fetch::{fetcher_fn, HttpFetcher, PageFetcher};
pub use observe::{KeyWatcher, PageCursor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
