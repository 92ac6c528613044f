use super::{ProbeReport, SessionReport};
use crate::model::ScanEventStatus;
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl FieldRow {
    fn new(field: &str, value: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

pub fn print_probe_table(report: &ProbeReport) -> Result<()> {
    let rows = probe_rows(report);
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!();
    println!("{}", table);
    println!();

    if report.service_version.is_empty() {
        println!("Could not reach the XSC service. Scan events will not be sent.");
    } else if report.error.is_some() {
        println!("Cannot compare the XSC version. Scan events will not be sent.");
    } else if !report.supported {
        println!(
            "XSC {} is older than {}. Scan events will not be sent.",
            report.service_version, report.min_version
        );
    }
    Ok(())
}

pub fn print_session_table(report: &SessionReport) -> Result<()> {
    let rows = session_rows(report);
    let table = Table::new(rows).with(Style::rounded()).to_string();
    eprintln!();
    eprintln!("{}", table);
    Ok(())
}

fn probe_rows(report: &ProbeReport) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow::new("Server", report.server_url.as_str()),
        FieldRow::new("XSC version", format_version(&report.service_version)),
        FieldRow::new("Minimum version", report.min_version.as_str()),
        FieldRow::new("Supported", format_supported(report.supported)),
        FieldRow::new("Auth", report.auth_scheme.as_str()),
        FieldRow::new("Machine ID", or_dash(&report.machine_id)),
    ];
    if let Some(error) = &report.error {
        rows.push(FieldRow::new("Error", error.as_str()));
    }
    rows
}

fn session_rows(report: &SessionReport) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow::new(
            "Multi-scan ID",
            report.multi_scan_id.clone().unwrap_or_else(|| "-".to_string()),
        ),
        FieldRow::new("Exit code", report.exit_code.to_string()),
    ];
    if let Some(error) = &report.spawn_error {
        rows.push(FieldRow::new("Command error", error.as_str()));
    }

    match &report.event {
        Some(event) => {
            rows.push(FieldRow::new("Status", format_status(event.event_status)));
            if let Some(summary) = &event.summary {
                rows.push(FieldRow::new("Findings", summary.total_findings.to_string()));
                rows.push(FieldRow::new(
                    "Ignored",
                    summary.total_ignored_findings.to_string(),
                ));
                rows.push(FieldRow::new(
                    "Duration",
                    format_duration(summary.total_scan_time_ms),
                ));
            }
        }
        None => rows.push(FieldRow::new("Status", "not reported")),
    }
    rows
}

fn format_status(status: ScanEventStatus) -> String {
    match status {
        ScanEventStatus::Completed => "\x1b[32mcompleted\x1b[0m".to_string(),
        ScanEventStatus::Failed => "\x1b[31mfailed\x1b[0m".to_string(),
        other => other.to_string(),
    }
}

fn format_supported(supported: bool) -> String {
    if supported {
        "\x1b[32myes\x1b[0m".to_string()
    } else {
        "\x1b[33mno\x1b[0m".to_string()
    }
}

fn format_version(version: &str) -> String {
    if version.is_empty() {
        "unknown".to_string()
    } else {
        version.to_string()
    }
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{} ms", ms)
    } else {
        format!("{:.1} s", ms as f64 / 1000.0)
    }
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0 ms");
        assert_eq!(format_duration(999), "999 ms");
        assert_eq!(format_duration(4500), "4.5 s");
    }

    #[test]
    fn test_probe_rows_unknown_version() {
        let report = ProbeReport {
            server_url: "https://acme.jfrog.io".to_string(),
            service_version: String::new(),
            min_version: "1.7.1".to_string(),
            supported: false,
            auth_scheme: "anonymous".to_string(),
            machine_id: String::new(),
            error: None,
        };
        let rows = probe_rows(&report);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1].value, "unknown");
        assert_eq!(rows[5].value, "-");
    }

    #[test]
    fn test_version_error_row() {
        let report = ProbeReport {
            server_url: "https://acme.jfrog.io".to_string(),
            service_version: "1.9.0-SNAPSHOT".to_string(),
            min_version: "1.7.1".to_string(),
            supported: false,
            auth_scheme: "bearer".to_string(),
            machine_id: "02:42:AC:11:00:02".to_string(),
            error: Some("Malformed version '1.9.0-SNAPSHOT'".to_string()),
        };
        let rows = probe_rows(&report);
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[6].field, "Error");
        assert!(rows[6].value.contains("1.9.0-SNAPSHOT"));
    }

    #[test]
    fn test_session_rows_without_event() {
        let report = SessionReport {
            multi_scan_id: None,
            exit_code: 0,
            event: None,
            spawn_error: None,
        };
        let rows = session_rows(&report);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].value, "not reported");
    }

    #[test]
    fn test_session_rows_with_spawn_error() {
        let report = SessionReport {
            multi_scan_id: None,
            exit_code: 1,
            event: None,
            spawn_error: Some("No such file or directory (os error 2)".to_string()),
        };
        let rows = session_rows(&report);
        assert_eq!(rows[2].field, "Command error");
        assert_eq!(rows[3].value, "not reported");
    }
}
