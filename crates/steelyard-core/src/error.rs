//! Error types for archive inspection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort an inspection.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Root path does not exist on disk.
    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compressed bundle could not be unpacked.
    #[error("Failed to extract {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The runtime driving external tools could not start.
    #[error("Failed to start tool runtime: {source}")]
    ToolRuntime {
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::PathNotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an extraction error.
    pub fn extraction(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Extraction {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Kind of inspection warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// An external introspection tool failed; the node was left childless.
    IntrospectionFailed,
    /// Error reading file content.
    ReadError,
    /// Error reading metadata.
    MetadataError,
    /// A directory listing could not be read.
    UnreadableDirectory,
}

/// Non-fatal problem encountered while building the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl InspectWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create an introspection failure warning.
    pub fn introspection_failed(path: impl Into<PathBuf>, error: &dyn std::error::Error) -> Self {
        Self::new(
            path,
            format!("Introspection failed: {error}"),
            WarningKind::IntrospectionFailed,
        )
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("Read error: {error}"), WarningKind::ReadError)
    }

    /// Create an unreadable directory warning.
    pub fn unreadable_directory(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(
            path,
            format!("Cannot list directory: {error}"),
            WarningKind::UnreadableDirectory,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_error_io_not_found() {
        let err = ArchiveError::io(
            "/missing/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ArchiveError::PathNotFound { .. }));
        assert!(err.to_string().contains("/missing/path"));
    }

    #[test]
    fn test_archive_error_io_other() {
        let err = ArchiveError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ArchiveError::Io { .. }));
    }

    #[test]
    fn test_warning_creation() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let warning = InspectWarning::read_error("/test/file", &io);
        assert_eq!(warning.kind, WarningKind::ReadError);
        assert!(warning.message.contains("denied"));
    }
}
