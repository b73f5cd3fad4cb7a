//! Fetch module
//!
//! Defines the contract between the buffer and a paged data source, plus
//! ready-made sources.
//!
//! # Overview
//!
//! - `PageFetcher` - the trait every data source implements
//! - `fetcher_fn` - wrap an async closure
//! - `HttpFetcher` - GET a JSON endpoint with the params as query string

mod http;
mod types;

pub use http::HttpFetcher;
pub use types::{fetcher_fn, FnFetcher, PageFetcher};
