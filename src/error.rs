//! Centralized error types for cafemsg.

use std::path::PathBuf;
use thiserror::Error;

use crate::parser::container::HEADER_SIZE;

/// All errors produced by the cafemsg library.
#[derive(Error, Debug)]
pub enum MsgError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is shorter than the fixed container header.
    #[error("Truncated container: {len} byte(s), header needs {}", HEADER_SIZE)]
    TruncatedContainer { len: usize },

    /// Name resolution produced an empty name. The source-file fallback
    /// makes this unreachable for any file with a non-empty stem.
    #[error("Could not resolve an entry name for '{0}'")]
    EmptyResolvedName(PathBuf),

    /// The host filesystem rejected the output file.
    #[error("Cannot write output file '{path}': {source}")]
    InvalidOutputPath {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The input directory or file does not exist.
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),
}

/// Convenience alias for `Result<T, MsgError>`.
pub type Result<T> = std::result::Result<T, MsgError>;

impl MsgError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an `InvalidOutputPath` variant from a path and an `io::Error`.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InvalidOutputPath {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable tag used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::TruncatedContainer { .. } => "truncated_container",
            Self::EmptyResolvedName(_) => "empty_resolved_name",
            Self::InvalidOutputPath { .. } => "invalid_output_path",
            Self::InputNotFound(_) => "input_not_found",
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (rare, prefer `MsgError::io`).
impl From<std::io::Error> for MsgError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
