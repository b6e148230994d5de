use std::path::{Path, PathBuf};

use thiserror::Error;

/// Unified error type for pom-release operations
///
/// Every variant is fatal for the current run. Conditions that only skip a
/// single version reference are reported as [`crate::warnings::RewriteWarning`].
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Version for '{0}' was not mapped")]
    UnmappedVersion(String),

    #[error("Version for parent '{0}' was not mapped")]
    UnmappedParent(String),

    #[error("Version conflict: {0}")]
    Conflict(String),

    #[error("Error reading descriptor {}: {message}", path.display())]
    Descriptor { path: PathBuf, message: String },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("SCM error: {0}")]
    Scm(String),

    #[error("A release label is required for committing")]
    MissingReleaseLabel,

    #[error("Invocation error: {0}")]
    Invocation(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in pom-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a conflict error with context
    pub fn conflict(msg: impl Into<String>) -> Self {
        ReleaseError::Conflict(msg.into())
    }

    /// Create an XML error with context
    pub fn xml(msg: impl Into<String>) -> Self {
        ReleaseError::Xml(msg.into())
    }

    /// Create an SCM error with context
    pub fn scm(msg: impl Into<String>) -> Self {
        ReleaseError::Scm(msg.into())
    }

    /// Create an invocation error with context
    pub fn invocation(msg: impl Into<String>) -> Self {
        ReleaseError::Invocation(msg.into())
    }

    /// Attach a descriptor path to an error raised while reading or parsing it
    pub fn descriptor(path: &Path, err: impl std::fmt::Display) -> Self {
        ReleaseError::Descriptor {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReleaseError::config("missing reactor");
        assert_eq!(err.to_string(), "Configuration error: missing reactor");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReleaseError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_unmapped_messages() {
        let err = ReleaseError::UnmappedVersion("Core Module".to_string());
        assert_eq!(err.to_string(), "Version for 'Core Module' was not mapped");

        let err = ReleaseError::UnmappedParent("Parent".to_string());
        assert_eq!(err.to_string(), "Version for parent 'Parent' was not mapped");
    }

    #[test]
    fn test_descriptor_error_carries_path() {
        let err = ReleaseError::descriptor(Path::new("core/pom.xml"), "unexpected end of file");
        let msg = err.to_string();
        assert!(msg.contains("core/pom.xml"));
        assert!(msg.contains("unexpected end of file"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ReleaseError::config("x"), "Configuration error"),
            (ReleaseError::version("x"), "Version parsing error"),
            (ReleaseError::conflict("x"), "Version conflict"),
            (ReleaseError::xml("x"), "XML error"),
            (ReleaseError::scm("x"), "SCM error"),
            (ReleaseError::invocation("x"), "Invocation error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
