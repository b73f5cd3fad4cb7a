//! HTTP/JSON fetch adapter
//!
//! Turns a REST endpoint returning `{ "total": n, "elements": [...] }` (or any
//! shape reachable by dotted paths) into a `PageFetcher`. Request params are
//! sent as query parameters.

use super::types::PageFetcher;
use crate::error::{Error, Result};
use crate::types::{FetchResult, JsonValue, RequestOptions};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fetcher backed by an HTTP GET endpoint
pub struct HttpFetcher<T> {
    client: Client,
    url: Url,
    total_path: String,
    elements_path: String,
    headers: HashMap<String, String>,
    _element: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for HttpFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("url", &self.url.as_str())
            .field("total_path", &self.total_path)
            .field("elements_path", &self.elements_path)
            .finish_non_exhaustive()
    }
}

impl<T> HttpFetcher<T> {
    /// Create a fetcher for `url` with a default client
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("pagination-buffer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, url)
    }

    /// Create a fetcher sharing an existing client
    pub fn with_client(client: Client, url: &str) -> Result<Self> {
        Ok(Self {
            client,
            url: Url::parse(url)?,
            total_path: "total".to_string(),
            elements_path: "elements".to_string(),
            headers: HashMap::new(),
            _element: PhantomData,
        })
    }

    /// Dotted path to the total count in the response body
    #[must_use]
    pub fn total_path(mut self, path: impl Into<String>) -> Self {
        self.total_path = path.into();
        self
    }

    /// Dotted path to the elements array in the response body
    #[must_use]
    pub fn elements_path(mut self, path: impl Into<String>) -> Self {
        self.elements_path = path.into();
        self
    }

    /// Add a header sent with every request
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Endpoint URL
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl<T> PageFetcher for HttpFetcher<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    type Element = T;

    async fn fetch(&self, params: &RequestOptions) -> Result<FetchResult<T>> {
        let query = query_pairs(params);
        debug!(url = %self.url, ?query, "Requesting backend page");

        let mut req = self.client.get(self.url.clone()).query(&query);
        for (key, value) in &self.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        let body: JsonValue = response.json().await?;
        decode_page(&body, &self.total_path, &self.elements_path)
    }
}

/// Flatten request params into query pairs.
///
/// Nulls are dropped; arrays and objects are sent as compact JSON.
pub(crate) fn query_pairs(params: &RequestOptions) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                JsonValue::Null => return None,
                JsonValue::String(s) => s.clone(),
                JsonValue::Number(n) => n.to_string(),
                JsonValue::Bool(b) => b.to_string(),
                other => other.to_string(),
            };
            Some((key.clone(), value))
        })
        .collect()
}

/// Extract a `FetchResult` from a JSON body
pub(crate) fn decode_page<T: DeserializeOwned>(
    body: &JsonValue,
    total_path: &str,
    elements_path: &str,
) -> Result<FetchResult<T>> {
    let total = match extract_path(body, total_path) {
        Some(JsonValue::Number(n)) => n
            .as_u64()
            .ok_or_else(|| Error::decode(format!("Total '{n}' is not a non-negative integer")))?,
        Some(JsonValue::String(s)) => s
            .parse::<u64>()
            .map_err(|e| Error::decode(format!("Total '{s}' is not an integer: {e}")))?,
        Some(other) => {
            return Err(Error::decode(format!(
                "Total at '{total_path}' has unexpected type: {other}"
            )))
        }
        None => return Err(Error::missing_field(total_path)),
    };

    let elements = match extract_path(body, elements_path) {
        Some(JsonValue::Array(items)) => items
            .iter()
            .cloned()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?,
        Some(JsonValue::Null) => Vec::new(),
        Some(_) => {
            return Err(Error::decode(format!(
                "Elements at '{elements_path}' is not an array"
            )))
        }
        None => return Err(Error::missing_field(elements_path)),
    };

    Ok(FetchResult::new(total, elements))
}

/// Walk a dotted path (`$.data.items` or `data.items`). `$` or an empty path
/// is the root.
fn extract_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        current = match current {
            JsonValue::Object(map) => map.get(part)?,
            JsonValue::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
