use super::{
    authorization_header, HttpRequestSpec, Method, ReqwestTransport, Sleeper, TokioSleeper,
    Transport, AUTHORIZATION_HEADER, CONTENT_TYPE_HEADER, USER_AGENT_HEADER,
};
use crate::config::{Config, HttpSettings, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS};
use crate::error::TransportError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed-delay retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRIES,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl From<&HttpSettings> for RetryPolicy {
    fn from(settings: &HttpSettings) -> Self {
        Self {
            attempts: settings.retries,
            delay: settings.retry_delay(),
        }
    }
}

/// HTTP client that authenticates every request and retries transport
/// failures with a fixed delay.
///
/// Only transport failures are retried. A response with a non-2xx status is
/// returned to the caller like any other.
///
/// # Example
///
/// ```no_run
/// use xscan::config::{Config, ServerConfig};
/// use xscan::http::ResilientHttpClient;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut config = Config::default();
///     config.server = ServerConfig::new("https://acme.jfrog.io").with_access_token("tok");
///
///     let client = ResilientHttpClient::from_config(&config)?;
///     let body = client
///         .get("https://acme.jfrog.io/xsc/api/v1/system/version", &[])
///         .await?;
///     println!("{}", body);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ResilientHttpClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    authorization: Option<String>,
    user_agent: String,
    retry: RetryPolicy,
}

impl ResilientHttpClient {
    /// Builds a client with a reqwest transport configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.http.connect_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Builds a client on top of an existing transport.
    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            authorization: authorization_header(&config.server),
            user_agent: config.plugin.user_agent(),
            retry: RetryPolicy::from(&config.http),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// GET `url` with unencoded `key=value` query pairs.
    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String, TransportError> {
        self.send(HttpRequestSpec::get(url, query)).await
    }

    pub async fn post(&self, url: &str, body: impl Into<String>) -> Result<String, TransportError> {
        self.send(HttpRequestSpec::new(Method::Post, url).with_body(body))
            .await
    }

    pub async fn put(&self, url: &str, body: impl Into<String>) -> Result<String, TransportError> {
        self.send(HttpRequestSpec::new(Method::Put, url).with_body(body))
            .await
    }

    /// Sends `spec` with auth and User-Agent headers attached, retrying
    /// transport failures, and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns the last [`TransportError`] once all attempts are used, or
    /// the first non-retryable one.
    pub async fn send(&self, spec: HttpRequestSpec) -> Result<String, TransportError> {
        let request = self.decorate(spec);
        let attempts = self.retry.attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.transport.execute(&request).await {
                Ok(response) => {
                    if !response.is_success() {
                        warn!(
                            method = %request.method,
                            url = %request.url,
                            status = response.status,
                            "Service returned non-success status"
                        );
                    } else {
                        debug!(
                            method = %request.method,
                            url = %request.url,
                            status = response.status,
                            attempt,
                            "Request completed"
                        );
                    }
                    return Ok(response.body);
                }
                Err(e) if !e.is_retryable() || attempt >= attempts => return Err(e),
                Err(e) => {
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        attempt,
                        max = attempts,
                        delay_ms = self.retry.delay.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    self.sleeper.sleep(self.retry.delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn decorate(&self, mut spec: HttpRequestSpec) -> HttpRequestSpec {
        if let Some(auth) = &self.authorization {
            spec = spec.with_header(AUTHORIZATION_HEADER, auth.clone());
        }
        spec = spec.with_header(USER_AGENT_HEADER, self.user_agent.clone());
        if spec.body.is_some() {
            spec = spec.with_header(CONTENT_TYPE_HEADER, "application/json");
        }
        spec
    }
}
