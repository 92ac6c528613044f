//! Dotted-numeric version comparison used for server feature gating.
//!
//! Versions are compared component by component as integers. Missing
//! trailing components count as zero, so `"1.7"` equals `"1.7.0"`.
//! Anything that is not a plain number (`"1.7.1-rc1"`, `""`) is a
//! [`VersionError`] rather than a silent `false`.

use crate::error::VersionError;

/// Returns true if `version` is at least `min_version`.
///
/// # Errors
///
/// Returns [`VersionError::Malformed`] if either string contains a
/// non-numeric or empty component. Callers holding an "unknown" (empty)
/// version must treat it as unsupported before calling this.
///
/// # Example
///
/// ```
/// use xscan::version::is_greater_or_equal;
///
/// assert!(is_greater_or_equal("1.7.1", "1.7.1").unwrap());
/// assert!(!is_greater_or_equal("1.7", "1.7.1").unwrap());
/// assert!(is_greater_or_equal("2.0", "1.9.9").unwrap());
/// ```
pub fn is_greater_or_equal(version: &str, min_version: &str) -> Result<bool, VersionError> {
    let current = parse_components(version)?;
    let minimum = parse_components(min_version)?;

    let len = current.len().max(minimum.len());
    for i in 0..len {
        let v = current.get(i).copied().unwrap_or(0);
        let m = minimum.get(i).copied().unwrap_or(0);
        if v > m {
            return Ok(true);
        }
        if v < m {
            return Ok(false);
        }
    }

    Ok(true)
}

fn parse_components(version: &str) -> Result<Vec<u64>, VersionError> {
    version
        .split('.')
        .map(|part| {
            part.parse::<u64>().map_err(|_| VersionError::Malformed {
                version: version.to_string(),
                component: part.to_string(),
            })
        })
        .collect()
}
