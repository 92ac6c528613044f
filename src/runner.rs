//! Runs a command inside a scan session.
//!
//! The command always runs. Session reporting on either side of it is
//! best effort: a failed start is logged and the command runs without a
//! multi-scan id.

use crate::output::SessionReport;
use crate::session::ScanSessionClient;
use tracing::{debug, error};

/// Exit code reported when the command was killed by a signal or could not
/// be spawned.
pub const FAILED_EXIT_CODE: i32 = 1;

/// Starts a session, runs `program` with `args`, and ends the session with
/// the command's outcome.
pub async fn run_in_session(
    client: &mut ScanSessionClient,
    program: &str,
    args: &[String],
    total_findings: u32,
    total_ignored_findings: u32,
) -> SessionReport {
    let multi_scan_id = match client.start_scan().await {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "Failed to start scan session, running without one");
            None
        }
    };

    debug!(program, ?args, "Running command");
    let status = tokio::process::Command::new(program)
        .args(args)
        .status()
        .await;

    let (exit_code, is_successful, spawn_error) = match status {
        Ok(status) => (
            status.code().unwrap_or(FAILED_EXIT_CODE),
            status.success(),
            None,
        ),
        Err(e) => {
            error!(program, error = %e, "Failed to run command");
            (FAILED_EXIT_CODE, false, Some(e.to_string()))
        }
    };

    let event = client
        .end_scan(
            is_successful,
            total_findings,
            total_ignored_findings,
            multi_scan_id.as_deref(),
        )
        .await;

    SessionReport {
        multi_scan_id,
        exit_code,
        event,
        spawn_error,
    }
}
