// components/media_fetch/src/session.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::error::DownloadError;
use crate::orchestrator::Orchestrator;
use crate::types::{CachedInfo, DownloadOutcome, Fetched, MediaInfo, Request};

/// Metadata for the same URL differs when it is looked up as a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    url: String,
    playlist: bool,
}

impl CacheKey {
    fn item(url: &str) -> Self {
        Self {
            url: media_url::normalize(url.trim()),
            playlist: false,
        }
    }

    fn playlist(url: &str) -> Self {
        Self {
            url: url.trim().to_string(),
            playlist: true,
        }
    }
}

/// State that lives for one user session: metadata already looked up and the
/// outcomes of the downloads run so far.
pub struct Session {
    orchestrator: Arc<Orchestrator>,
    info_cache: Mutex<HashMap<CacheKey, CachedInfo>>,
    history: Mutex<Vec<DownloadOutcome>>,
}

impl Session {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            info_cache: Mutex::new(HashMap::new()),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    /// Metadata for `url`, looked up once per session.
    pub async fn info(&self, url: &str) -> Result<CachedInfo, DownloadError> {
        let key = CacheKey::item(url);
        if let Some(cached) = self.cached(&key) {
            return Ok(cached);
        }
        let fetched = self.orchestrator.fetch_info(&key.url).await?;
        Ok(self.remember(key, fetched))
    }

    /// Metadata for the playlist at `url`, looked up once per session.
    pub async fn playlist_info(&self, url: &str) -> Result<CachedInfo, DownloadError> {
        let key = CacheKey::playlist(url);
        if let Some(cached) = self.cached(&key) {
            return Ok(cached);
        }
        let fetched = self.orchestrator.fetch_playlist_info(&key.url).await?;
        Ok(self.remember(key, fetched))
    }

    fn cached(&self, key: &CacheKey) -> Option<CachedInfo> {
        let cached = self.info_cache.lock().get(key).cloned();
        if cached.is_some() {
            tracing::debug!("Using cached metadata for {}", key.url);
        }
        cached
    }

    fn remember(&self, key: CacheKey, fetched: Fetched<MediaInfo>) -> CachedInfo {
        let cached = CachedInfo {
            info: fetched.value,
            engine: fetched.engine,
            fetched_at: Utc::now(),
        };
        self.info_cache.lock().insert(key, cached.clone());
        cached
    }

    /// Drop the cached metadata for `url`, item and playlist alike.
    /// Returns whether there was any.
    pub fn forget(&self, url: &str) -> bool {
        let mut cache = self.info_cache.lock();
        let item = cache.remove(&CacheKey::item(url)).is_some();
        let playlist = cache.remove(&CacheKey::playlist(url)).is_some();
        item || playlist
    }

    pub fn cached_count(&self) -> usize {
        self.info_cache.lock().len()
    }

    /// Run a request inline and remember its outcome.
    pub async fn download(&self, request: &Request) -> DownloadOutcome {
        let outcome = self.orchestrator.execute(request).await;
        self.record(outcome.clone());
        outcome
    }

    /// Remember an outcome produced elsewhere, e.g. by a background ticket.
    pub fn record(&self, outcome: DownloadOutcome) {
        self.history.lock().push(outcome);
    }

    pub fn last_outcome(&self) -> Option<DownloadOutcome> {
        self.history.lock().last().cloned()
    }

    pub fn history(&self) -> Vec<DownloadOutcome> {
        self.history.lock().clone()
    }
}
