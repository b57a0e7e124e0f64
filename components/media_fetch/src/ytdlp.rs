// components/media_fetch/src/ytdlp.rs
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use url::Url;

use crate::engine::Engine;
use crate::error::EngineError;
use crate::types::MediaInfo;

/// Engine backed by a yt-dlp compatible command line program.
///
/// `yt-dlp` and `youtube-dl` accept the same flags for everything used here,
/// so one implementation drives both.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn yt_dlp() -> Self {
        Self::new("yt-dlp")
    }

    pub fn youtube_dl() -> Self {
        Self::new("youtube-dl")
    }

    fn resolve(&self) -> Result<PathBuf, EngineError> {
        which::which(&self.program).map_err(|_| EngineError::NotInstalled {
            program: self.program.clone(),
        })
    }

    /// Run the program and return its stdout, classifying failures from stderr.
    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>, EngineError> {
        let program = self.resolve()?;
        tracing::debug!("Running {} {}", program.display(), args.join(" "));

        let output = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!("{} exited with {}: {}", self.program, output.status, stderr.trim());
            return Err(EngineError::from_stderr(&stderr));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl Engine for CommandEngine {
    fn name(&self) -> &str {
        &self.program
    }

    async fn check_available(&self) -> Result<(), EngineError> {
        self.resolve().map(|_| ())
    }

    async fn fetch_info(&self, url: &Url) -> Result<MediaInfo, EngineError> {
        let stdout = self.run(info_args(url)).await?;
        parse_info(&stdout)
    }

    async fn fetch_playlist_info(&self, url: &Url) -> Result<MediaInfo, EngineError> {
        let stdout = self.run(playlist_args(url)).await?;
        parse_info(&stdout)
    }

    async fn playlist_entries(&self, url: &Url) -> Result<Vec<String>, EngineError> {
        let stdout = self.run(playlist_args(url)).await?;
        parse_entries(&stdout)
    }

    async fn download(&self, url: &Url, format: &str, work_dir: &Path) -> Result<(), EngineError> {
        self.run(download_args(url, format, work_dir)).await.map(|_| ())
    }
}

fn info_args(url: &Url) -> Vec<String> {
    vec![
        "--dump-single-json".to_string(),
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        url.to_string(),
    ]
}

fn playlist_args(url: &Url) -> Vec<String> {
    vec![
        "--dump-single-json".to_string(),
        "--flat-playlist".to_string(),
        "--yes-playlist".to_string(),
        "--no-warnings".to_string(),
        url.to_string(),
    ]
}

fn download_args(url: &Url, format: &str, work_dir: &Path) -> Vec<String> {
    let template = work_dir.join("%(title)s.%(ext)s");
    vec![
        "--no-playlist".to_string(),
        "--no-progress".to_string(),
        "--no-warnings".to_string(),
        "--format".to_string(),
        format.to_string(),
        "--output".to_string(),
        template.to_string_lossy().into_owned(),
        url.to_string(),
    ]
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    id: Option<String>,
    title: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    webpage_url: Option<String>,
    #[serde(default)]
    entries: Option<Vec<Option<RawEntry>>>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
}

impl RawEntry {
    /// Flat entries carry either a full URL or only the video id.
    fn into_url(self) -> Option<String> {
        let is_http = |s: &String| s.starts_with("http://") || s.starts_with("https://");

        self.webpage_url
            .filter(is_http)
            .or_else(|| self.url.clone().filter(is_http))
            .or_else(|| self.id.or(self.url).map(|id| media_url::canonical(&id)))
            .map(|url| media_url::normalize(&url))
    }
}

fn parse_raw(stdout: &[u8]) -> Result<RawInfo, EngineError> {
    serde_json::from_slice(stdout).map_err(|e| EngineError::Metadata(e.to_string()))
}

fn parse_info(stdout: &[u8]) -> Result<MediaInfo, EngineError> {
    let raw = parse_raw(stdout)?;
    let id = raw
        .id
        .ok_or_else(|| EngineError::Metadata("missing id".to_string()))?;

    Ok(MediaInfo {
        title: raw.title.unwrap_or_else(|| id.clone()),
        id,
        uploader: raw.uploader,
        duration_seconds: raw.duration,
        webpage_url: raw.webpage_url,
        entry_count: raw.entries.map(|entries| entries.len()),
    })
}

fn parse_entries(stdout: &[u8]) -> Result<Vec<String>, EngineError> {
    let raw = parse_raw(stdout)?;
    let entries = raw
        .entries
        .ok_or_else(|| EngineError::Metadata("response has no playlist entries".to_string()))?;

    Ok(entries
        .into_iter()
        .flatten()
        .filter_map(RawEntry::into_url)
        .collect())
}
