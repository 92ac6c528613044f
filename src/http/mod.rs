//! HTTP plumbing for talking to the XSC service.
//!
//! - [`ResilientHttpClient`] - auth headers, User-Agent and fixed-delay retries
//! - [`Transport`] - sends a single attempt; [`ReqwestTransport`] in production
//! - [`Sleeper`] - waits between attempts; [`TokioSleeper`] in production
//! - [`auth`] - Authorization header selection

pub mod auth;
mod client;
mod transport;

pub use auth::{authorization_header, AuthScheme};
pub use client::{ResilientHttpClient, RetryPolicy};
pub use transport::ReqwestTransport;

use crate::error::TransportError;
use async_trait::async_trait;
use std::time::Duration;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const USER_AGENT_HEADER: &str = "User-Agent";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request attempt.
///
/// Headers are an ordered list and can only be added through the builder
/// methods, before the spec is handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequestSpec {
    pub url: String,
    pub method: Method,
    pub body: Option<String>,
    headers: Vec<(String, String)>,
}

impl HttpRequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    /// GET with `key=value` pairs joined by `&`.
    ///
    /// Values are appended as given, without percent-encoding; callers must
    /// pass URL-safe values.
    pub fn get(url: impl Into<String>, query: &[(&str, &str)]) -> Self {
        let mut url = url.into();
        if !query.is_empty() {
            let joined = query
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&joined);
        }
        Self::new(Method::Get, url)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value with this name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a single request attempt. Retrying is the caller's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &HttpRequestSpec) -> Result<HttpResponse, TransportError>;
}

/// Waits between retry attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_without_query() {
        let spec = HttpRequestSpec::get("https://acme.io/xsc/api/v1/system/version", &[]);
        assert_eq!(spec.url, "https://acme.io/xsc/api/v1/system/version");
        assert_eq!(spec.method, Method::Get);
        assert!(spec.body.is_none());
    }

    #[test]
    fn test_get_joins_query_in_order_without_encoding() {
        let query = [("b", "2"), ("a", "x y"), ("c", "3")];
        let spec = HttpRequestSpec::get("https://acme.io/api", &query);
        assert_eq!(spec.url, "https://acme.io/api?b=2&a=x y&c=3");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let spec = HttpRequestSpec::new(Method::Put, "https://acme.io")
            .with_header("User-Agent", "plugin/1.0")
            .with_body("{}");
        assert_eq!(spec.header("user-agent"), Some("plugin/1.0"));
        assert_eq!(spec.header("Authorization"), None);
        assert_eq!(spec.headers().len(), 1);
    }

    #[test]
    fn test_response_success_range() {
        let ok = HttpResponse { status: 201, body: String::new() };
        let not_found = HttpResponse { status: 404, body: String::new() };
        assert!(ok.is_success());
        assert!(!not_found.is_success());
    }
}
