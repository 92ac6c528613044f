mod cli;
mod json;

pub use cli::{print_probe_table, print_session_table};
pub use json::print_json;

use crate::http::AuthScheme;
use crate::model::ScanEvent;
use crate::session::{ScanSessionClient, XSC_MIN_VERSION};
use anyhow::Result;
use serde::Serialize;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

/// What the capability probe found out about the server.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub server_url: String,
    /// Empty when the server could not be reached.
    pub service_version: String,
    pub min_version: String,
    pub supported: bool,
    pub auth_scheme: String,
    pub machine_id: String,
    /// Why support could not be decided, e.g. a malformed server version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeReport {
    /// A version that cannot be compared is reported as unsupported.
    pub fn new(server_url: &str, auth: AuthScheme, client: &ScanSessionClient) -> Self {
        let (supported, error) = match client.is_supported() {
            Ok(supported) => (supported, None),
            Err(e) => (false, Some(e.to_string())),
        };
        Self {
            server_url: server_url.to_string(),
            service_version: client.service_version().to_string(),
            min_version: XSC_MIN_VERSION.to_string(),
            supported,
            auth_scheme: auth.to_string(),
            machine_id: client.context().machine_id.clone(),
            error,
        }
    }
}

/// Outcome of a wrapped command run.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_scan_id: Option<String>,
    pub exit_code: i32,
    /// The terminal event sent to the server, if a session was open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<ScanEvent>,
    /// Set when the command could not be started at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawn_error: Option<String>,
}

pub fn print_probe(report: &ProbeReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_probe_table(report),
        OutputFormat::Json => print_json(report),
    }
}

pub fn print_session(report: &SessionReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_session_table(report),
        OutputFormat::Json => print_json(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ServerConfig};
    use crate::error::TransportError;
    use crate::http::{HttpRequestSpec, HttpResponse, ResilientHttpClient, Transport};
    use async_trait::async_trait;
    use std::str::FromStr;
    use std::sync::Arc;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("table"), Ok(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("JSON"), Ok(OutputFormat::Json));
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    /// Serves `body` for every request.
    struct FixedTransport(String);

    #[async_trait]
    impl Transport for FixedTransport {
        async fn execute(
            &self,
            _request: &HttpRequestSpec,
        ) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                body: self.0.clone(),
            })
        }
    }

    async fn report_for(version_body: &str) -> ProbeReport {
        let config = Config {
            server: ServerConfig::new("https://acme.jfrog.io"),
            ..Config::default()
        };
        let transport = Arc::new(FixedTransport(version_body.to_string()));
        let http = ResilientHttpClient::with_transport(&config, transport);
        let client = ScanSessionClient::with_http(config, http).await;
        ProbeReport::new("https://acme.jfrog.io", AuthScheme::Anonymous, &client)
    }

    #[tokio::test]
    async fn test_malformed_version_reported_unsupported() {
        let report = report_for(r#"{"xsc_version":"1.9.0-SNAPSHOT"}"#).await;

        assert_eq!(report.service_version, "1.9.0-SNAPSHOT");
        assert!(!report.supported);
        assert!(report.error.as_deref().unwrap().contains("1.9.0-SNAPSHOT"));

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["supported"], false);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_supported_version_has_no_error() {
        let report = report_for(r#"{"xsc_version":"1.8.0"}"#).await;

        assert!(report.supported);
        assert!(report.error.is_none());
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert!(json.get("error").is_none());
    }
}
