//! Fetch contract
//!
//! The buffer never performs I/O itself. Everything it knows about the data
//! source goes through `PageFetcher`.

use crate::error::Result;
use crate::types::{FetchResult, RequestOptions};
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// A paged data source
///
/// `params` always holds the configured page key (1-based backend page),
/// the page size key when configured, and every caller option verbatim.
/// Implementations must return a stable element order for identical params.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Element type produced by this source
    type Element: Send + Sync + 'static;

    /// Fetch one backend page
    async fn fetch(&self, params: &RequestOptions) -> Result<FetchResult<Self::Element>>;
}

#[async_trait]
impl<P> PageFetcher for Arc<P>
where
    P: PageFetcher + ?Sized,
{
    type Element = P::Element;

    async fn fetch(&self, params: &RequestOptions) -> Result<FetchResult<Self::Element>> {
        (**self).fetch(params).await
    }
}

/// Adapter turning an async closure into a `PageFetcher`
pub struct FnFetcher<F, T> {
    f: F,
    _element: PhantomData<fn() -> T>,
}

impl<F, T> std::fmt::Debug for FnFetcher<F, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}

/// Wrap a closure `Fn(RequestOptions) -> impl Future<Output = Result<FetchResult<T>>>`
///
/// The closure receives its own copy of the parameters.
pub fn fetcher_fn<F, Fut, T>(f: F) -> FnFetcher<F, T>
where
    F: Fn(RequestOptions) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchResult<T>>> + Send + 'static,
    T: Send + Sync + 'static,
{
    FnFetcher {
        f,
        _element: PhantomData,
    }
}

#[async_trait]
impl<F, Fut, T> PageFetcher for FnFetcher<F, T>
where
    F: Fn(RequestOptions) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchResult<T>>> + Send + 'static,
    T: Send + Sync + 'static,
{
    type Element = T;

    async fn fetch(&self, params: &RequestOptions) -> Result<FetchResult<T>> {
        (self.f)(params.clone()).await
    }
}
