//! Errors raised by external introspection tools.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// An external tool could not report on a file.
///
/// Never fatal to a build: the affected node is kept as a plain leaf.
#[derive(Debug, Error)]
pub enum IntrospectionError {
    /// The tool is not installed or not on `PATH`.
    #[error("Tool not found: {program}")]
    ToolMissing { program: PathBuf },

    /// The tool could not be launched.
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but reported failure.
    #[error("{program} failed: {status}")]
    NonZeroExit { program: PathBuf, status: ExitStatus },

    /// The tool did not finish in time and was killed.
    #[error("{program} did not finish within {timeout:?}")]
    TimedOut { program: PathBuf, timeout: Duration },

    /// Waiting on the tool or reading its output failed.
    #[error("I/O error while running {program}: {source}")]
    Io {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool's output was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl IntrospectionError {
    /// Create a launch error, recognizing a missing program.
    pub fn spawn(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let program = program.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::ToolMissing { program },
            _ => Self::Spawn { program, source },
        }
    }
}

/// Malformed tool output.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Output is not valid UTF-8.
    #[error("Tool output is not valid UTF-8")]
    InvalidUtf8,

    /// Output does not have the expected shape.
    #[error("Unexpected tool output: {message}")]
    UnexpectedFormat { message: String },

    /// The proportionality total is missing or zero.
    #[error("Tool output has no usable total")]
    MissingTotal,

    /// Output is not the expected JSON.
    #[error("Invalid JSON from tool: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseError {
    pub(crate) fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedFormat {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_not_found_is_tool_missing() {
        let err = IntrospectionError::spawn(
            "xcrun",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(matches!(err, IntrospectionError::ToolMissing { .. }));
        assert_eq!(err.to_string(), "Tool not found: xcrun");
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err = IntrospectionError::from(ParseError::MissingTotal);
        assert_eq!(err.to_string(), "Tool output has no usable total");
    }
}
