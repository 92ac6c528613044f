//! Scan session protocol client.
//!
//! A session runs in three steps against the XSC service:
//!
//! 1. **Capability check** - on construction, `GET /xsc/api/v1/system/version`.
//!    A failed probe leaves the version empty and the client unsupported.
//! 2. **Start** - [`ScanSessionClient::start_scan`] POSTs a `started` event
//!    to `/xsc/api/v1/event` if the server is at least [`XSC_MIN_VERSION`],
//!    and returns the server-issued multi-scan id.
//! 3. **End** - [`ScanSessionClient::end_scan`] PUTs a `completed` or
//!    `failed` event with finding counts and elapsed time. Failures here are
//!    logged and never reach the caller.
//!
//! # Example
//!
//! ```no_run
//! use xscan::config::{Config, ServerConfig};
//! use xscan::session::ScanSessionClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::default();
//!     config.server = ServerConfig::new("https://acme.jfrog.io").with_access_token("tok");
//!
//!     let mut client = ScanSessionClient::connect(config).await?;
//!     let scan_id = client.start_scan().await?;
//!     // ... run the scan ...
//!     client.end_scan(true, 12, 3, scan_id.as_deref()).await;
//!     Ok(())
//! }
//! ```

use crate::config::Config;
use crate::error::{SessionError, TransportError};
use crate::extract::{FieldExtractor, TextFieldExtractor};
use crate::http::{AuthScheme, ResilientHttpClient};
use crate::model::{EventContext, ScanEvent, ScanEventStatus, ScanSummary};
use crate::platform;
use crate::version::is_greater_or_equal;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Oldest service version that accepts scan events.
pub const XSC_MIN_VERSION: &str = "1.7.1";

const API_PREFIX: &str = "/xsc/api/v1";
const VERSION_PATH: &str = "/system/version";
const EVENT_PATH: &str = "/event";

const VERSION_FIELD: &str = "xsc_version";
const MULTI_SCAN_ID_FIELD: &str = "multi_scan_id";

/// Where a client is in its session lifecycle.
///
/// Transitions only move forward, except that `start_scan` may be called
/// again after `Ended` to open a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    CapabilityChecked,
    Started,
    Ended,
}

/// In-memory state of the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSession {
    pub start_time: DateTime<Utc>,
    /// Empty when the capability probe failed.
    pub service_version: String,
    pub multi_scan_id: Option<String>,
}

impl ScanSession {
    fn new(service_version: String) -> Self {
        Self {
            start_time: Utc::now(),
            service_version,
            multi_scan_id: None,
        }
    }

    /// Milliseconds since `start_time`, never negative.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        (now - self.start_time).num_milliseconds().max(0) as u64
    }
}

/// Client for one scan session at a time.
///
/// Lifecycle methods take `&mut self`; one scan is in flight per instance.
pub struct ScanSessionClient {
    http: ResilientHttpClient,
    extractor: Arc<dyn FieldExtractor>,
    context: EventContext,
    api_url: String,
    session: ScanSession,
    state: SessionState,
}

impl ScanSessionClient {
    /// Builds a reqwest-backed client and probes the server version.
    ///
    /// # Errors
    ///
    /// Only fails if the HTTP client itself cannot be built. An unreachable
    /// server is not an error; the client just reports itself unsupported.
    pub async fn connect(config: Config) -> Result<Self, TransportError> {
        let http = ResilientHttpClient::from_config(&config)?;
        Ok(Self::with_http(config, http).await)
    }

    /// Probes the server version over an existing HTTP client.
    pub async fn with_http(config: Config, http: ResilientHttpClient) -> Self {
        Self::with_parts(config, http, Arc::new(TextFieldExtractor)).await
    }

    /// Like [`with_http`](Self::with_http) with a custom response extractor.
    pub async fn with_parts(
        config: Config,
        http: ResilientHttpClient,
        extractor: Arc<dyn FieldExtractor>,
    ) -> Self {
        let context = event_context(&config);
        let mut client = Self {
            http,
            extractor,
            context,
            api_url: format!("{}{}", config.server.url.trim_end_matches('/'), API_PREFIX),
            session: ScanSession::new(String::new()),
            state: SessionState::Uninitialized,
        };

        debug!(
            api_url = %client.api_url,
            auth = %AuthScheme::of(&config.server),
            "Checking XSC capability"
        );
        client.session.service_version = client.probe_version().await;
        client.state = SessionState::CapabilityChecked;
        client
    }

    async fn probe_version(&self) -> String {
        let url = format!("{}{}", self.api_url, VERSION_PATH);
        match self.http.get(&url, &[]).await {
            Ok(body) => match self.extractor.extract(&body, VERSION_FIELD) {
                Some(version) => {
                    info!(version = %version, "XSC service version");
                    version
                }
                None => {
                    warn!(url = %url, "Version response has no xsc_version field");
                    String::new()
                }
            },
            Err(e) => {
                error!(url = %url, error = %e, "Failed to get XSC service version");
                String::new()
            }
        }
    }

    /// Service version from the capability probe; empty if unknown.
    pub fn service_version(&self) -> &str {
        &self.session.service_version
    }

    /// Whether the server accepts scan events.
    ///
    /// An unknown version is unsupported.
    ///
    /// # Errors
    ///
    /// Returns an error if the server reported a malformed version.
    pub fn is_supported(&self) -> Result<bool, SessionError> {
        if self.session.service_version.is_empty() {
            return Ok(false);
        }
        Ok(is_greater_or_equal(
            &self.session.service_version,
            XSC_MIN_VERSION,
        )?)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn context(&self) -> &EventContext {
        &self.context
    }

    /// Opens a scan session.
    ///
    /// Returns `Ok(None)` without touching the network when the server is
    /// older than [`XSC_MIN_VERSION`] or its version is unknown. Otherwise
    /// returns the `multi_scan_id` from the response, which is also `None`
    /// if the response lacks it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cached server version is malformed or the
    /// start event cannot be delivered.
    pub async fn start_scan(&mut self) -> Result<Option<String>, SessionError> {
        if !self.is_supported()? {
            info!(
                version = %self.session.service_version,
                min_version = XSC_MIN_VERSION,
                "XSC version unsupported, scan session not started"
            );
            return Ok(None);
        }

        let event = ScanEvent::started(&self.context);
        let body = event.to_json()?;
        let url = self.event_url();

        let response = self.http.post(&url, body).await?;

        self.session.start_time = Utc::now();
        self.session.multi_scan_id = self.extractor.extract(&response, MULTI_SCAN_ID_FIELD);
        self.state = SessionState::Started;

        match &self.session.multi_scan_id {
            Some(id) => info!(multi_scan_id = %id, "Scan session started"),
            None => warn!("Scan session started but response has no multi_scan_id"),
        }

        Ok(self.session.multi_scan_id.clone())
    }

    /// Reports the end of the current scan session.
    ///
    /// `multi_scan_id` falls back to the id returned by
    /// [`start_scan`](Self::start_scan) when `None`. Delivery failures are
    /// logged, never returned. Returns the event that was sent, or `None`
    /// if no session is open.
    pub async fn end_scan(
        &mut self,
        is_successful: bool,
        total_findings: u32,
        total_ignored_findings: u32,
        multi_scan_id: Option<&str>,
    ) -> Option<ScanEvent> {
        if self.state != SessionState::Started {
            warn!(state = ?self.state, "end_scan called without a started scan session");
            return None;
        }

        let summary = ScanSummary {
            total_findings,
            total_ignored_findings,
            total_scan_time_ms: self.session.elapsed_ms(Utc::now()),
            multi_scan_id: multi_scan_id
                .map(str::to_string)
                .or_else(|| self.session.multi_scan_id.clone()),
        };
        let status = ScanEventStatus::from_outcome(is_successful);
        let event = ScanEvent::terminal(&self.context, status, summary);
        self.state = SessionState::Ended;

        let body = match event.to_json() {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "Failed to serialize scan end event");
                return Some(event);
            }
        };

        match self.http.put(&self.event_url(), body).await {
            Ok(_) => info!(
                status = %status,
                total_findings,
                total_ignored_findings,
                duration_ms = event.summary.as_ref().map(|s| s.total_scan_time_ms),
                "Scan session ended"
            ),
            Err(e) => error!(error = %e, "Failed to report scan end event"),
        }

        Some(event)
    }

    fn event_url(&self) -> String {
        format!("{}{}", self.api_url, EVENT_PATH)
    }
}

/// Static event fields from configuration and the local platform.
pub fn event_context(config: &Config) -> EventContext {
    EventContext {
        plugin_name: config.plugin.name.clone(),
        plugin_version: config.plugin.version.clone(),
        product_version: config.plugin.product_version.clone(),
        username: config.server.username_or_empty().to_string(),
        os_name: platform::os_name().to_string(),
        os_arch: platform::os_arch().to_string(),
        machine_id: platform::machine_id(),
        analyzer_manager_version: config.plugin.analyzer_manager_version.clone(),
        is_ci_run: config.is_ci_run,
    }
}
