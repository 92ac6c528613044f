use serde::ser::{Serialize, Serializer};

/// Kind of scan being reported. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanEventType {
    SourceCode,
}

impl ScanEventType {
    pub fn code(&self) -> u8 {
        match self {
            ScanEventType::SourceCode => 1,
        }
    }
}

impl Serialize for ScanEventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Lifecycle status of a scan event.
///
/// `Cancelled` is part of the wire vocabulary but nothing in this crate
/// produces it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanEventStatus {
    Started,
    Completed,
    Cancelled,
    Failed,
}

impl ScanEventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanEventStatus::Started => "started",
            ScanEventStatus::Completed => "completed",
            ScanEventStatus::Cancelled => "cancelled",
            ScanEventStatus::Failed => "failed",
        }
    }

    /// Terminal status for a finished scan.
    pub fn from_outcome(is_successful: bool) -> Self {
        if is_successful {
            ScanEventStatus::Completed
        } else {
            ScanEventStatus::Failed
        }
    }
}

impl std::fmt::Display for ScanEventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScanEventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "started" => Ok(ScanEventStatus::Started),
            "completed" => Ok(ScanEventStatus::Completed),
            "cancelled" => Ok(ScanEventStatus::Cancelled),
            "failed" => Ok(ScanEventStatus::Failed),
            _ => Err(format!("Unknown scan event status: {}", s)),
        }
    }
}

impl Serialize for ScanEventStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Static part of every event: who is scanning, from where.
///
/// Built once per session client from configuration and the local
/// platform.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventContext {
    pub plugin_name: String,
    pub plugin_version: String,
    pub product_version: String,
    pub username: String,
    pub os_name: String,
    pub os_arch: String,
    pub machine_id: String,
    pub analyzer_manager_version: String,
    pub is_ci_run: bool,
}

/// Aggregated results carried by a terminal event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ScanSummary {
    pub total_findings: u32,
    pub total_ignored_findings: u32,
    /// Milliseconds between the session start and the end event.
    #[serde(rename = "total_scan_duration")]
    pub total_scan_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_scan_id: Option<String>,
}

/// Wire body of the start and end event requests.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ScanEvent {
    pub event_type: ScanEventType,
    pub event_status: ScanEventStatus,
    pub plugin_name: String,
    pub plugin_version: String,
    pub product_version: String,
    pub jfrog_user: String,
    pub os_platform: String,
    pub os_architecture: String,
    pub machine_id: String,
    pub analyzer_manager_version: String,
    pub is_ci_run: bool,
    #[serde(flatten)]
    pub summary: Option<ScanSummary>,
}

impl ScanEvent {
    /// The event sent when a session opens.
    pub fn started(context: &EventContext) -> Self {
        Self::build(context, ScanEventStatus::Started, None)
    }

    /// The event sent when a session closes.
    pub fn terminal(context: &EventContext, status: ScanEventStatus, summary: ScanSummary) -> Self {
        Self::build(context, status, Some(summary))
    }

    fn build(
        context: &EventContext,
        status: ScanEventStatus,
        summary: Option<ScanSummary>,
    ) -> Self {
        Self {
            event_type: ScanEventType::SourceCode,
            event_status: status,
            plugin_name: context.plugin_name.clone(),
            plugin_version: context.plugin_version.clone(),
            product_version: context.product_version.clone(),
            jfrog_user: context.username.clone(),
            os_platform: context.os_name.clone(),
            os_architecture: context.os_arch.clone(),
            machine_id: context.machine_id.clone(),
            analyzer_manager_version: context.analyzer_manager_version.clone(),
            is_ci_run: context.is_ci_run,
            summary,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn context() -> EventContext {
        EventContext {
            plugin_name: "jfrog-idea-plugin".to_string(),
            plugin_version: "2.4.0".to_string(),
            product_version: "3.6.4".to_string(),
            username: "admin".to_string(),
            os_name: "linux".to_string(),
            os_arch: "x86_64".to_string(),
            machine_id: "AA:BB:CC:DD:EE:FF".to_string(),
            analyzer_manager_version: "1.8.1".to_string(),
            is_ci_run: false,
        }
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(ScanEventStatus::Started.as_str(), "started");
        assert_eq!(ScanEventStatus::Completed.as_str(), "completed");
        assert_eq!(ScanEventStatus::Cancelled.as_str(), "cancelled");
        assert_eq!(ScanEventStatus::Failed.as_str(), "failed");
        assert_eq!("FAILED".parse::<ScanEventStatus>(), Ok(ScanEventStatus::Failed));
        assert!("done".parse::<ScanEventStatus>().is_err());
    }

    #[test]
    fn test_from_outcome() {
        assert_eq!(ScanEventStatus::from_outcome(true), ScanEventStatus::Completed);
        assert_eq!(ScanEventStatus::from_outcome(false), ScanEventStatus::Failed);
    }

    #[test]
    fn test_started_event_json() {
        let json = ScanEvent::started(&context()).to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value,
            json!({
                "event_type": 1,
                "event_status": "started",
                "plugin_name": "jfrog-idea-plugin",
                "plugin_version": "2.4.0",
                "product_version": "3.6.4",
                "jfrog_user": "admin",
                "os_platform": "linux",
                "os_architecture": "x86_64",
                "machine_id": "AA:BB:CC:DD:EE:FF",
                "analyzer_manager_version": "1.8.1",
                "is_ci_run": false
            })
        );
    }

    #[test]
    fn test_terminal_event_json() {
        let summary = ScanSummary {
            total_findings: 12,
            total_ignored_findings: 3,
            total_scan_time_ms: 4500,
            multi_scan_id: Some("msi-1".to_string()),
        };
        let event = ScanEvent::terminal(&context(), ScanEventStatus::Completed, summary);
        let value: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();

        assert_eq!(value["event_status"], "completed");
        assert_eq!(value["total_findings"], 12);
        assert_eq!(value["total_ignored_findings"], 3);
        assert_eq!(value["total_scan_duration"], 4500);
        assert_eq!(value["multi_scan_id"], "msi-1");
        assert_eq!(value["event_type"], 1);
    }

    #[test]
    fn test_terminal_event_without_scan_id() {
        let summary = ScanSummary {
            total_findings: 0,
            total_ignored_findings: 0,
            total_scan_time_ms: 0,
            multi_scan_id: None,
        };
        let event = ScanEvent::terminal(&context(), ScanEventStatus::Failed, summary);
        let value: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();

        assert_eq!(value["event_status"], "failed");
        assert!(value.get("multi_scan_id").is_none());
    }
}
