// components/media_fetch/src/engine.rs
use std::path::Path;

use async_trait::async_trait;
use url::Url;

use crate::error::EngineError;
use crate::types::MediaInfo;

/// An external extraction/download engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Name used in logs and outcomes
    fn name(&self) -> &str;

    /// Check that the engine can run in this environment
    async fn check_available(&self) -> Result<(), EngineError>;

    /// Fetch metadata about a single item without downloading it
    async fn fetch_info(&self, url: &Url) -> Result<MediaInfo, EngineError>;

    /// Fetch metadata about a whole playlist, including its entry count
    async fn fetch_playlist_info(&self, url: &Url) -> Result<MediaInfo, EngineError>;

    /// List the entry URLs of a playlist, in playlist order
    async fn playlist_entries(&self, url: &Url) -> Result<Vec<String>, EngineError>;

    /// Download one item into `work_dir` using the given format selector
    async fn download(&self, url: &Url, format: &str, work_dir: &Path) -> Result<(), EngineError>;
}
