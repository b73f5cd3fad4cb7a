//! Pagination buffer module
//!
//! Accumulates backend pages into one ordered collection and serves
//! frontend-sized windows over it, fetching more as the caller advances.
//!
//! # Overview
//!
//! Three triggers drive the buffer:
//!
//! 1. `prime` (or `open`) loads backend page 1.
//! 2. `set_request_options` invalidates everything when any option key
//!    changes value, resets the caller's cursor and starts over.
//! 3. `on_frontend_page_change` prefetches the next backend page once fewer
//!    than `read_ahead` frontend pages of unshown elements remain.
//!
//! At most one fetch per epoch is in flight. A trigger arriving during a
//! fetch is suppressed, and the running fetch re-checks the read-ahead
//! condition when it lands. Page triggers check the condition under the
//! same lock that starts the fetch, so a page move reported twice fetches
//! once. Responses from an invalidated epoch are dropped.

mod driver;
mod handle;
mod state;

pub use handle::PaginationBuffer;
