use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;

use crate::{FailoverError, GatewayOverrides, Result};

/// Describes one logical request independently of any single attempt.
///
/// The failover driver rebuilds a fresh transport request from this
/// descriptor on every attempt, so nothing from a failed attempt (connection
/// handles, consumed bodies) leaks into the next one. The optional
/// [`GatewayOverrides`] field is the per-request configuration channel; it is
/// ignored by the transport itself.
#[derive(Clone, Debug)]
pub struct RequestConfig {
    /// HTTP method.
    pub method: Method,
    /// Target URL; either absolute or relative to `base_url`.
    pub url: String,
    /// Prefix prepended to `url` when `url` is not absolute.
    pub base_url: Option<String>,
    /// Per-attempt timeout in milliseconds. `None` uses the transport default.
    pub timeout_ms: Option<u64>,
    /// Headers sent with every attempt.
    pub headers: HeaderMap,
    /// Request body, re-sent verbatim on every attempt.
    pub body: Option<Vec<u8>>,
    /// Per-request failover overrides.
    pub gateway: Option<GatewayOverrides>,
}

impl RequestConfig {
    /// Creates a request descriptor for an arbitrary method.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            base_url: None,
            timeout_ms: None,
            headers: HeaderMap::new(),
            body: None,
            gateway: None,
        }
    }

    /// Creates a GET request descriptor.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a POST request descriptor.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Creates a PUT request descriptor.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Creates a DELETE request descriptor.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Creates a HEAD request descriptor.
    pub fn head(url: impl Into<String>) -> Self {
        Self::new(Method::HEAD, url)
    }

    /// Sets the base URL used when `url` is relative.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the per-attempt timeout in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Adds a header sent on every attempt.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets a raw request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the JSON request body and sets the content type.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self> {
        let body = serde_json::to_vec(value)
            .map_err(|err| FailoverError::InvalidRequest(format!("json body: {err}")))?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body);
        Ok(self)
    }

    /// Attaches per-request failover overrides.
    pub fn with_gateway(mut self, overrides: GatewayOverrides) -> Self {
        self.gateway = Some(overrides);
        self
    }

    /// Full target of the next attempt: an absolute `url` is used as-is,
    /// anything else is appended to `base_url`.
    pub(crate) fn full_path(&self) -> String {
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            return self.url.clone();
        }
        match &self.base_url {
            Some(base_url) => format!("{base_url}{}", self.url),
            None => self.url.clone(),
        }
    }
}
