// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{sync::Arc, time::Duration};

use crate::CacheKey;

/// The result for fallible cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error returned when the cache cannot produce data for a request.
///
/// Errors are cheap to clone: one failed fetch is handed to every caller that joined it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use finboard_cache::{CacheKey, Error, ErrorKind};
///
/// let error = Error::from(ErrorKind::Expired {
///     url: CacheKey::new("https://example.com"),
///     age: Duration::from_secs(7200),
/// });
///
/// assert!(error.is_expired());
/// assert!(!error.is_fetch_failure());
/// ```
#[derive(Debug, Clone, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] ErrorKind);

/// The reason a request failed.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The fetcher reported a failure.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        /// The resource that was requested.
        url: CacheKey,
        /// What the fetcher reported.
        #[source]
        source: FetchError,
    },

    /// The fetch did not settle within the client-side timeout.
    #[error("fetching {url} timed out after {after:?}")]
    Timeout {
        /// The resource that was requested.
        url: CacheKey,
        /// The timeout that elapsed.
        after: Duration,
    },

    /// Cached data exists but is older than the request's max age, and no refresh produced newer data.
    #[error("cached data for {url} expired ({age:?} old)")]
    Expired {
        /// The resource that was requested.
        url: CacheKey,
        /// Age of the cached data.
        age: Duration,
    },

    /// The fetch panicked before producing a result.
    #[error("the fetch for {url} panicked")]
    LeaderPanicked {
        /// The resource that was requested.
        url: CacheKey,
    },
}

impl Error {
    /// The reason for the failure.
    #[must_use]
    pub const fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Returns `true` for the "cached data expired" failure.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self.0, ErrorKind::Expired { .. })
    }

    /// Returns `true` when a network attempt failed, timed out or panicked.
    #[must_use]
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(
            self.0,
            ErrorKind::Fetch { .. } | ErrorKind::Timeout { .. } | ErrorKind::LeaderPanicked { .. }
        )
    }

    /// The resource the failed request was for.
    #[must_use]
    pub const fn url(&self) -> &CacheKey {
        match &self.0 {
            ErrorKind::Fetch { url, .. }
            | ErrorKind::Timeout { url, .. }
            | ErrorKind::Expired { url, .. }
            | ErrorKind::LeaderPanicked { url } => url,
        }
    }

    pub(crate) const fn fetch(url: CacheKey, source: FetchError) -> Self {
        Self(ErrorKind::Fetch { url, source })
    }

    pub(crate) const fn timeout(url: CacheKey, after: Duration) -> Self {
        Self(ErrorKind::Timeout { url, after })
    }

    pub(crate) const fn expired(url: CacheKey, age: Duration) -> Self {
        Self(ErrorKind::Expired { url, age })
    }

    pub(crate) const fn leader_panicked(url: CacheKey) -> Self {
        Self(ErrorKind::LeaderPanicked { url })
    }
}

/// A failure reported by a [`Fetcher`](crate::Fetcher).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("server responded with status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, possibly truncated.
        body: Arc<str>,
    },

    /// The request could not be sent or the response could not be received.
    #[error("transport error: {0}")]
    Transport(Arc<str>),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(Arc<str>),
}

impl FetchError {
    /// Creates a [`FetchError::Transport`] from any message.
    pub fn transport(message: impl Into<Arc<str>>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a [`FetchError::Decode`] from any message.
    pub fn decode(message: impl Into<Arc<str>>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates a [`FetchError::Status`].
    pub fn status(status: u16, body: impl Into<Arc<str>>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}
