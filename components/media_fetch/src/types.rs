// components/media_fetch/src/types.rs
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quality::Quality;

/// What a single item is fetched as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Video,
    Audio,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// User-selected retrieval kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Video,
    Audio,
    /// Every entry of a playlist, each fetched as the given kind
    Playlist(ItemKind),
}

impl Mode {
    /// Kind of each downloaded item
    pub fn item_kind(&self) -> ItemKind {
        match self {
            Self::Video => ItemKind::Video,
            Self::Audio => ItemKind::Audio,
            Self::Playlist(kind) => *kind,
        }
    }

    pub fn is_playlist(&self) -> bool {
        matches!(self, Self::Playlist(_))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Playlist(kind) => write!(f, "playlist of {kind}"),
        }
    }
}

/// One user action. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    source_url: String,
    mode: Mode,
    desired_quality: Option<Quality>,
    output_directory: PathBuf,
    convert_audio: bool,
}

impl Request {
    /// Create a request. Single-item URLs are normalized here; a playlist
    /// URL is kept as given so its list parameter survives.
    pub fn new(source_url: &str, mode: Mode, output_directory: impl Into<PathBuf>) -> Self {
        let source_url = if mode.is_playlist() {
            source_url.trim().to_string()
        } else {
            media_url::normalize(source_url.trim())
        };

        Self {
            source_url,
            mode,
            desired_quality: None,
            output_directory: output_directory.into(),
            convert_audio: false,
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.desired_quality = Some(quality);
        self
    }

    /// Transcode audio items to MP3 after download
    pub fn with_convert_audio(mut self, convert: bool) -> Self {
        self.convert_audio = convert;
        self
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn desired_quality(&self) -> Option<Quality> {
        self.desired_quality
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn convert_audio(&self) -> bool {
        self.convert_audio
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Failed,
}

/// A playlist entry that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub index: usize,
    pub url: String,
    pub reason: String,
}

/// Result of one request. `output_paths` is non-empty exactly when the
/// status is `Ok`; the constructors keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    status: Status,
    output_paths: Vec<PathBuf>,
    skipped: Vec<SkippedItem>,
    error_message: Option<String>,
    warnings: Vec<String>,
    /// Engine that produced the files of a single-item request
    engine: Option<String>,
}

impl DownloadOutcome {
    /// Outcome for a request that produced the given files. No files means failure.
    pub fn completed(output_paths: Vec<PathBuf>, skipped: Vec<SkippedItem>) -> Self {
        if output_paths.is_empty() {
            return Self::failed("no files were produced").with_skipped(skipped);
        }

        Self {
            status: Status::Ok,
            output_paths,
            skipped,
            error_message: None,
            warnings: Vec::new(),
            engine: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            output_paths: Vec::new(),
            skipped: Vec::new(),
            error_message: Some(message.into()),
            warnings: Vec::new(),
            engine: None,
        }
    }

    pub fn with_skipped(mut self, skipped: Vec<SkippedItem>) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn output_paths(&self) -> &[PathBuf] {
        &self.output_paths
    }

    pub fn skipped(&self) -> &[SkippedItem] {
        &self.skipped
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn engine(&self) -> Option<&str> {
        self.engine.as_deref()
    }
}

/// Metadata reported by an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    pub title: String,
    pub uploader: Option<String>,
    pub duration_seconds: Option<f64>,
    pub webpage_url: Option<String>,
    /// Number of entries when the URL is a playlist
    pub entry_count: Option<usize>,
}

/// A value together with the engine that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub engine: String,
    pub used_fallback: bool,
}

/// Metadata remembered by a session.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedInfo {
    pub info: MediaInfo,
    pub engine: String,
    pub fetched_at: DateTime<Utc>,
}
