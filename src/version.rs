//! Snapshot version arithmetic
//!
//! Versions are handled as plain strings: a dot-separated sequence whose last
//! segment (before an optional `-SNAPSHOT` marker) must be a non-negative
//! integer. Everything before that segment is carried through untouched.

use crate::error::{ReleaseError, Result};

/// Marker identifying an in-development version
pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";

/// Marker as it appears appended to a version
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Returns true when the version carries the snapshot marker.
pub fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT_MARKER)
}

/// Removes the snapshot marker (and its separating dash) if present.
pub fn strip_snapshot(version: &str) -> &str {
    version
        .strip_suffix(SNAPSHOT_SUFFIX)
        .or_else(|| version.strip_suffix(SNAPSHOT_MARKER))
        .unwrap_or(version)
}

/// Appends the snapshot marker unless the version already carries it.
pub fn append_snapshot(version: &str) -> String {
    if is_snapshot(version) {
        version.to_string()
    } else {
        format!("{}{}", version, SNAPSHOT_SUFFIX)
    }
}

/// A version split around its trailing numeric segment.
///
/// `"2.3.1-SNAPSHOT"` becomes head `"2.3."`, number `1`, snapshot `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionSegments<'a> {
    pub head: &'a str,
    pub number: u64,
    pub snapshot: bool,
}

impl<'a> VersionSegments<'a> {
    /// Split a version string around its trailing numeric segment
    ///
    /// # Returns
    /// * `Ok(VersionSegments)` - head, parsed segment and marker presence
    /// * `Err` - If the trailing segment is not a non-negative integer
    pub fn parse(version: &'a str) -> Result<Self> {
        let snapshot = is_snapshot(version);
        let base = strip_snapshot(version);
        let split = base.rfind('.').map(|idx| idx + 1).unwrap_or(0);
        let (head, segment) = base.split_at(split);

        let number = segment.parse::<u64>().map_err(|_| {
            ReleaseError::version(format!(
                "Invalid numeric segment '{}' in version '{}'",
                segment, version
            ))
        })?;

        Ok(VersionSegments {
            head,
            number,
            snapshot,
        })
    }

    fn render(&self, number: u64, snapshot: bool) -> String {
        let mut out = format!("{}{}", self.head, number);
        if snapshot {
            out.push_str(SNAPSHOT_SUFFIX);
        }
        out
    }
}

/// Increment the trailing numeric segment, keeping the marker as it was.
///
/// ```
/// # use pom_release::version::bump_snapshot;
/// assert_eq!(bump_snapshot("1.2.3-SNAPSHOT").unwrap(), "1.2.4-SNAPSHOT");
/// assert_eq!(bump_snapshot("7").unwrap(), "8");
/// ```
pub fn bump_snapshot(version: &str) -> Result<String> {
    let segments = VersionSegments::parse(version)?;
    let next = segments.number.checked_add(1).ok_or_else(|| {
        ReleaseError::version(format!("Numeric segment overflow in '{}'", version))
    })?;
    Ok(segments.render(next, segments.snapshot))
}

/// Strip the marker, decrement the trailing segment and re-append the marker.
///
/// Used by the next-development rewrite of module and parent versions.
pub fn decrement_snapshot(version: &str) -> Result<String> {
    let segments = VersionSegments::parse(version)?;
    let previous = segments.number.checked_sub(1).ok_or_else(|| {
        ReleaseError::version(format!(
            "Cannot decrement the numeric segment of '{}' below zero",
            version
        ))
    })?;
    Ok(segments.render(previous, true))
}

/// Next-development value of a snapshot property.
///
/// The numeric segment is validated but kept as is, and the marker is
/// re-applied.
pub fn next_development_value(value: &str) -> Result<String> {
    let segments = VersionSegments::parse(value)?;
    Ok(segments.render(segments.number, true))
}

/// Release value of a snapshot property: the value without its marker.
pub fn release_value(value: &str) -> String {
    strip_snapshot(value).to_string()
}
