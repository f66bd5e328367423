// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use crate::{CacheKey, FetchError};

/// Retrieves the payload for a resource.
///
/// The cache calls a fetcher only from within a single flight, so at most one call per key is
/// outstanding at any time. A fetcher performs no retries and no caching of its own.
///
/// # Examples
///
/// ```
/// use finboard_cache::{CacheKey, FetchError, Fetcher};
///
/// struct Echo;
///
/// impl Fetcher for Echo {
///     type Output = String;
///
///     async fn fetch(&self, key: &CacheKey) -> Result<String, FetchError> {
///         Ok(key.url().to_string())
///     }
/// }
/// ```
pub trait Fetcher: Send + Sync + 'static {
    /// The payload type.
    type Output: Clone + Send + Sync + 'static;

    /// Fetches the current payload for `key`.
    fn fetch(&self, key: &CacheKey) -> impl Future<Output = Result<Self::Output, FetchError>> + Send;
}

impl<F: Fetcher> Fetcher for Arc<F> {
    type Output = F::Output;

    fn fetch(&self, key: &CacheKey) -> impl Future<Output = Result<Self::Output, FetchError>> + Send {
        (**self).fetch(key)
    }
}
