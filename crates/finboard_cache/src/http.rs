// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{borrow::Cow, time::Duration};

use serde_json::Value;

use crate::{CacheKey, FetchError, Fetcher};

/// Default client-side request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = "FinBoard/1.0";

/// Longest error-response body kept in [`FetchError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Settings for [`HttpFetcher`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpFetcherConfig {
    timeout: Duration,
    user_agent: Cow<'static, str>,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HTTP_TIMEOUT,
            user_agent: Cow::Borrowed(DEFAULT_USER_AGENT),
        }
    }
}

impl HttpFetcherConfig {
    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header sent with every request.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<Cow<'static, str>>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Issues `GET` requests to arbitrary URLs.
///
/// Bodies that parse as JSON are returned as parsed values. Anything else (XML, CSV, plain
/// text) is returned verbatim as a JSON string, for the schema engine to interpret.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the default timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(&HttpFetcherConfig::default())
    }

    /// Creates a fetcher from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the TLS backend cannot be initialized.
    pub fn with_config(config: &HttpFetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_ref())
            .build()
            .map_err(|e| FetchError::transport(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    type Output = Value;

    async fn fetch(&self, key: &CacheKey) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(key.url())
            .header(reqwest::header::ACCEPT, "application/json, application/xml;q=0.9, */*;q=0.8")
            .send()
            .await
            .map_err(|e| FetchError::transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::decode(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::status(status.as_u16(), truncate(&body, MAX_ERROR_BODY_CHARS)));
        }

        Ok(decode_body(body))
    }
}

/// Parses `body` as JSON, falling back to the verbatim text as a string value.
///
/// # Examples
///
/// ```
/// use finboard_cache::decode_body;
/// use serde_json::json;
///
/// assert_eq!(decode_body(r#"{"c": 1.5}"#.to_string()), json!({"c": 1.5}));
/// assert_eq!(decode_body("<quote/>".to_string()), json!("<quote/>"));
/// ```
#[must_use]
pub fn decode_body(body: String) -> Value {
    match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => Value::String(body),
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    text.char_indices().nth(max_chars).map_or(text, |(end, _)| &text[..end])
}
