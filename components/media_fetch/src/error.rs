// components/media_fetch/src/error.rs
//! Error types for engines, the orchestrator and transcoding.
//!
//! `EngineError` describes one failed engine call and decides whether the
//! orchestrator may hand the request to the fallback engine.
//! `DownloadError` is what a whole fetch ends with.

use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{program} is not installed or not on PATH")]
    NotInstalled { program: String },

    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("could not parse metadata: {0}")]
    Metadata(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("engine finished without producing a media file")]
    NoOutput,

    #[error("io error during {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

lazy_static! {
    static ref HTTP_STATUS_RE: Regex = Regex::new(r"HTTP Error (\d{3})").unwrap();
}

const NETWORK_MARKERS: [&str; 6] = [
    "timed out",
    "Connection reset",
    "Connection refused",
    "Temporary failure in name resolution",
    "getaddrinfo failed",
    "Network is unreachable",
];

const METADATA_MARKERS: [&str; 4] = [
    "JSONDecodeError",
    "Failed to parse JSON",
    "Unable to extract",
    "unable to extract",
];

const UNAVAILABLE_MARKERS: [&str; 5] = [
    "Video unavailable",
    "Private video",
    "This video has been removed",
    "This video is not available",
    "account associated with this video has been terminated",
];

impl EngineError {
    /// Classify the stderr of an engine that exited unsuccessfully.
    pub fn from_stderr(stderr: &str) -> Self {
        let message = last_error_line(stderr);

        if let Some(status) = HTTP_STATUS_RE
            .captures(stderr)
            .and_then(|c| c[1].parse::<u16>().ok())
        {
            return Self::Http { status, message };
        }
        if UNAVAILABLE_MARKERS.iter().any(|m| stderr.contains(m)) {
            return Self::ContentUnavailable(message);
        }
        if NETWORK_MARKERS.iter().any(|m| stderr.contains(m)) {
            return Self::Network(message);
        }
        if METADATA_MARKERS.iter().any(|m| stderr.contains(m)) {
            return Self::Metadata(message);
        }
        Self::Extraction(message)
    }

    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Whether a failure of the primary engine hands the request to the fallback.
    ///
    /// Content that is gone or private stays gone for every engine, and local
    /// I/O problems are not the engine's fault.
    pub fn triggers_fallback(&self) -> bool {
        match self {
            Self::NotInstalled { .. }
            | Self::Spawn { .. }
            | Self::Http { .. }
            | Self::Network(_)
            | Self::Metadata(_)
            | Self::Extraction(_)
            | Self::NoOutput => true,
            Self::ContentUnavailable(_) | Self::Io { .. } => false,
        }
    }
}

fn last_error_line(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| "engine exited without a message".to_string())
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("{engine} failed: {source}")]
    Engine {
        engine: String,
        #[source]
        source: EngineError,
    },

    #[error("{primary} failed ({source}) and no fallback engine is available: {reason}")]
    FallbackUnavailable {
        primary: String,
        reason: String,
        #[source]
        source: EngineError,
    },

    #[error("{primary} failed ({primary_error}); fallback {fallback} also failed ({fallback_error})")]
    BothFailed {
        primary: String,
        primary_error: EngineError,
        fallback: String,
        fallback_error: EngineError,
    },

    #[error("no entries found in playlist {0}")]
    EmptyPlaylist(String),

    #[error("all {0} playlist items failed")]
    PlaylistFailed(usize),

    #[error("could not prepare output directory {path}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl DownloadError {
    pub fn output_directory(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputDirectory {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("{program} not found on PATH; MP3 conversion is disabled")]
    Unavailable { program: String },

    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("conversion of {path} failed: {stderr}")]
    Failed { path: PathBuf, stderr: String },

    #[error("could not create {path}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum QualityError {
    #[error("unrecognized quality '{0}' (expected e.g. highest, 1080p, 128kbps)")]
    Unrecognized(String),
}
