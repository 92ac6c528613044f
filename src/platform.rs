//! Local platform facts reported with every scan event.
//!
//! The machine identifier is a coarse installation fingerprint for usage
//! analytics: the first real hardware address found on the host, formatted
//! as `AA:BB:CC:DD:EE:FF`. It is not a security identifier.
//!
//! All lookups degrade to an empty string rather than failing.

use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        return Platform::MacOS;
        #[cfg(target_os = "windows")]
        return Platform::Windows;
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        return Platform::Linux;
    }
}

/// Operating system name as reported by the Rust target (`linux`, `macos`, ...).
pub fn os_name() -> &'static str {
    std::env::consts::OS
}

/// CPU architecture as reported by the Rust target (`x86_64`, `aarch64`, ...).
pub fn os_arch() -> &'static str {
    std::env::consts::ARCH
}

/// Returns the first non-loopback hardware address of this host.
///
/// Platform-specific sources:
/// - Linux: `/sys/class/net/<iface>/address`, interfaces in name order
/// - macOS: `ether` lines of `ifconfig`
/// - Windows: `getmac /fo csv /nh`
///
/// Returns an empty string if nothing usable is found.
pub fn machine_id() -> String {
    let candidates = match Platform::current() {
        Platform::Linux => linux_hardware_addresses(),
        Platform::MacOS => command_output("ifconfig", &[])
            .map(|out| ifconfig_hardware_addresses(&out))
            .unwrap_or_default(),
        Platform::Windows => command_output("getmac", &["/fo", "csv", "/nh"])
            .map(|out| getmac_hardware_addresses(&out))
            .unwrap_or_default(),
    };

    first_hardware_address(candidates.iter().map(String::as_str)).unwrap_or_default()
}

/// Picks the first candidate that parses to a non-zero address and formats it.
pub fn first_hardware_address<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    candidates
        .into_iter()
        .filter_map(parse_hardware_address)
        .find(|bytes| bytes.iter().any(|b| *b != 0))
        .map(|bytes| format_hardware_address(&bytes))
}

/// Formats raw bytes as colon-separated uppercase hex pairs.
pub fn format_hardware_address(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Parses `aa:bb:cc:dd:ee:ff` or `AA-BB-CC-DD-EE-FF`.
fn parse_hardware_address(text: &str) -> Option<Vec<u8>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.split([':', '-'])
        .map(|pair| {
            if pair.len() == 2 {
                u8::from_str_radix(pair, 16).ok()
            } else {
                None
            }
        })
        .collect()
}

fn linux_hardware_addresses() -> Vec<String> {
    let entries = match std::fs::read_dir("/sys/class/net") {
        Ok(entries) => entries,
        Err(e) => {
            debug!(error = %e, "Cannot enumerate network interfaces");
            return Vec::new();
        }
    };

    let mut interfaces: Vec<_> = entries
        .flatten()
        .filter(|entry| entry.file_name() != "lo")
        .map(|entry| entry.path())
        .collect();
    interfaces.sort();

    interfaces
        .iter()
        .filter_map(|path| std::fs::read_to_string(path.join("address")).ok())
        .collect()
}

fn ifconfig_hardware_addresses(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("ether "))
        .filter_map(|rest| rest.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

fn getmac_hardware_addresses(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split(',').next())
        .map(|field| field.trim().trim_matches('"').to_string())
        .collect()
}

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => {
            debug!(program, status = %output.status, "Interface listing command failed");
            None
        }
        Err(e) => {
            debug!(program, error = %e, "Cannot run interface listing command");
            None
        }
    }
}
