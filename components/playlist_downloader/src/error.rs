// components/playlist_downloader/src/error.rs
//! Error types for batch downloads
//!
//! Errors come in two flavours:
//! - fatal errors (`SourceError`, `RangeError`) abort a run before any item is touched
//! - item errors (`ItemError`) are recorded against one item and the run continues

use std::path::PathBuf;
use thiserror::Error;

/// The persisted work list could not be turned into a non-empty `WorkList`
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("item list not found: {path}")]
    NotFound { path: PathBuf },

    #[error("item list {path} contains no recognized item references")]
    Empty { path: PathBuf },

    #[error("playlist {url} contains no items")]
    EmptyPlaylist { url: String },

    #[error("failed to resolve playlist {url}")]
    Resolve {
        url: String,
        #[source]
        source: ToolError,
    },

    #[error("failed to access item list {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The requested index window cannot be applied to the work list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("start index must not be negative (got {0})")]
    NegativeStart(i64),

    #[error("end index {end} is before start index {start}")]
    Inverted { start: i64, end: i64 },
}

/// Failure of an external tool (yt-dlp, ffmpeg) or of its output
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("required dependency not found: {0}")]
    DependencyNotFound(&'static str),

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: &'static str, stderr: String },

    #[error("unexpected response from {command}: {source}")]
    InvalidResponse {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single item; never aborts the batch
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("invalid reference")]
    InvalidReference,

    #[error("metadata error: {0}")]
    Metadata(#[source] ToolError),

    #[error("stream error: {0}")]
    Stream(#[source] ToolError),

    #[error("encode error: {0}")]
    Encode(#[source] ToolError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that prevent a batch report from being produced at all
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("failed to prepare output directory {path}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }
}
