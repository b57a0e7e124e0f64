// components/media_fetch/src/orchestrator.rs
//! Primary → fallback download orchestration.
//!
//! Every engine operation runs against the primary engine first. A failure
//! for which [`EngineError::triggers_fallback`] holds hands the same operation
//! to the fallback engine exactly once; anything else is reported as is.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use url::Url;

use crate::engine::Engine;
use crate::error::{DownloadError, EngineError};
use crate::quality::format_selector;
use crate::transcode::Transcoder;
use crate::types::{DownloadOutcome, Fetched, ItemKind, MediaInfo, Mode, Request, SkippedItem};
use crate::utils::{move_media_file, prepare_output_dir};
use crate::ytdlp::CommandEngine;

/// Prefix of the per-attempt work directories created inside the output directory
const WORK_DIR_PREFIX: &str = ".tubegrab-";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Playlist entries fetched at the same time (at least 1)
    pub playlist_concurrency: usize,
    pub transcoder: Transcoder,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            playlist_concurrency: 1,
            transcoder: Transcoder::default(),
        }
    }
}

pub struct Orchestrator {
    primary: Arc<dyn Engine>,
    fallback: Option<Arc<dyn Engine>>,
    config: FetchConfig,
}

impl Orchestrator {
    pub fn new(
        primary: Arc<dyn Engine>,
        fallback: Option<Arc<dyn Engine>>,
        config: FetchConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            config,
        }
    }

    /// yt-dlp first, youtube-dl as the fallback
    pub fn with_defaults(config: FetchConfig) -> Self {
        Self::new(
            Arc::new(CommandEngine::yt_dlp()),
            Some(Arc::new(CommandEngine::youtube_dl())),
            config,
        )
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Run a request to completion. Failures are folded into the outcome.
    pub async fn execute(&self, request: &Request) -> DownloadOutcome {
        tracing::info!(
            "Starting {} download of {} into {}",
            request.mode(),
            request.source_url(),
            request.output_directory().display()
        );

        match self.run(request).await {
            Ok(outcome) => {
                tracing::info!(
                    "Finished {}: {} file(s), {} skipped",
                    request.source_url(),
                    outcome.output_paths().len(),
                    outcome.skipped_count()
                );
                outcome
            }
            Err(error) => {
                tracing::warn!("Download of {} failed: {}", request.source_url(), error);
                DownloadOutcome::failed(error.to_string())
            }
        }
    }

    /// Fetch metadata for a single item through the fallback chain.
    pub async fn fetch_info(&self, url: &str) -> Result<Fetched<MediaInfo>, DownloadError> {
        let url = parse_url(&media_url::normalize(url.trim()))?;
        self.with_fallback("metadata fetch", |engine| {
            let url = &url;
            async move { engine.fetch_info(url).await }
        })
        .await
    }

    /// Fetch metadata for a whole playlist. The URL is used as given so a
    /// `list` parameter next to `v` is kept.
    pub async fn fetch_playlist_info(
        &self,
        url: &str,
    ) -> Result<Fetched<MediaInfo>, DownloadError> {
        let url = parse_url(url.trim())?;
        self.with_fallback("playlist metadata fetch", |engine| {
            let url = &url;
            async move { engine.fetch_playlist_info(url).await }
        })
        .await
    }

    async fn run(&self, request: &Request) -> Result<DownloadOutcome, DownloadError> {
        let url = parse_url(request.source_url())?;
        let output_dir = prepare_output_dir(request.output_directory()).await?;
        let kind = request.mode().item_kind();
        let format = format_selector(kind, request.desired_quality().unwrap_or_default());

        let mut warnings = Vec::new();
        let transcoder = self.transcoder_for(request, &mut warnings);

        if let Mode::Playlist(_) = request.mode() {
            return self
                .run_playlist(&url, &format, &output_dir, transcoder, warnings)
                .await;
        }

        let fetched = self.fetch_item(&url, &format, &output_dir).await?;
        let (path, warning) = finish_item(fetched.value, transcoder).await;
        warnings.extend(warning);

        Ok(DownloadOutcome::completed(vec![path], Vec::new())
            .with_warnings(warnings)
            .with_engine(fetched.engine))
    }

    async fn run_playlist(
        &self,
        url: &Url,
        format: &str,
        output_dir: &Path,
        transcoder: Option<&Transcoder>,
        mut warnings: Vec<String>,
    ) -> Result<DownloadOutcome, DownloadError> {
        let entries = self
            .with_fallback("playlist listing", |engine| async move {
                engine.playlist_entries(url).await
            })
            .await?
            .value;

        if entries.is_empty() {
            return Err(DownloadError::EmptyPlaylist(url.to_string()));
        }
        let total = entries.len();
        tracing::info!("Playlist {} has {} entries", url, total);

        let results: Vec<(usize, String, Result<PathBuf, DownloadError>)> =
            stream::iter(entries.into_iter().enumerate())
                .map(|(index, entry)| async move {
                    let result = self.fetch_entry(&entry, format, output_dir).await;
                    (index, entry, result)
                })
                .buffered(self.config.playlist_concurrency.max(1))
                .collect()
                .await;

        let mut paths = Vec::new();
        let mut skipped = Vec::new();
        for (index, entry, result) in results {
            match result {
                Ok(path) => {
                    let (path, warning) = finish_item(path, transcoder).await;
                    warnings.extend(warning);
                    paths.push(path);
                }
                Err(error) => {
                    tracing::warn!(
                        "Skipping playlist item {}/{} ({}): {}",
                        index + 1,
                        total,
                        entry,
                        error
                    );
                    skipped.push(SkippedItem {
                        index,
                        url: entry,
                        reason: error.to_string(),
                    });
                }
            }
        }

        if paths.is_empty() {
            return Ok(DownloadOutcome::failed(DownloadError::PlaylistFailed(total).to_string())
                .with_skipped(skipped)
                .with_warnings(warnings));
        }
        Ok(DownloadOutcome::completed(paths, skipped).with_warnings(warnings))
    }

    async fn fetch_entry(
        &self,
        entry: &str,
        format: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let url = parse_url(entry)?;
        self.fetch_item(&url, format, output_dir)
            .await
            .map(|fetched| fetched.value)
    }

    async fn fetch_item(
        &self,
        url: &Url,
        format: &str,
        output_dir: &Path,
    ) -> Result<Fetched<PathBuf>, DownloadError> {
        self.with_fallback("download", |engine| {
            download_into(engine, url, format, output_dir)
        })
        .await
    }

    /// The transcoder to use for this request, if conversion was asked for and can run.
    fn transcoder_for(&self, request: &Request, warnings: &mut Vec<String>) -> Option<&Transcoder> {
        if !request.convert_audio() {
            return None;
        }
        if request.mode().item_kind() != ItemKind::Audio {
            warnings.push("MP3 conversion only applies to audio downloads".to_string());
            return None;
        }

        match self.config.transcoder.check_available() {
            Ok(_) => Some(&self.config.transcoder),
            Err(unavailable) => {
                tracing::warn!("{}", unavailable);
                warnings.push(unavailable.to_string());
                None
            }
        }
    }

    async fn with_fallback<T, F, Fut>(
        &self,
        operation: &str,
        op: F,
    ) -> Result<Fetched<T>, DownloadError>
    where
        F: Fn(Arc<dyn Engine>) -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let primary = Arc::clone(&self.primary);
        let primary_name = primary.name().to_string();

        let primary_error = match primary.check_available().await {
            Ok(()) => {
                tracing::debug!("{} with {}", operation, primary_name);
                match op(primary).await {
                    Ok(value) => {
                        return Ok(Fetched {
                            value,
                            engine: primary_name,
                            used_fallback: false,
                        })
                    }
                    Err(error) if error.triggers_fallback() => error,
                    Err(error) => {
                        return Err(DownloadError::Engine {
                            engine: primary_name,
                            source: error,
                        })
                    }
                }
            }
            Err(unavailable) => unavailable,
        };
        tracing::warn!("{} with {} failed: {}", operation, primary_name, primary_error);

        let Some(fallback) = self.fallback.clone() else {
            return Err(DownloadError::FallbackUnavailable {
                primary: primary_name,
                reason: "no fallback engine configured".to_string(),
                source: primary_error,
            });
        };
        let fallback_name = fallback.name().to_string();

        if let Err(unavailable) = fallback.check_available().await {
            return Err(DownloadError::FallbackUnavailable {
                primary: primary_name,
                reason: unavailable.to_string(),
                source: primary_error,
            });
        }

        tracing::info!("Retrying {} with fallback {}", operation, fallback_name);
        match op(fallback).await {
            Ok(value) => Ok(Fetched {
                value,
                engine: fallback_name,
                used_fallback: true,
            }),
            Err(fallback_error) => Err(DownloadError::BothFailed {
                primary: primary_name,
                primary_error,
                fallback: fallback_name,
                fallback_error,
            }),
        }
    }
}

/// Download into a fresh work directory, then move the media file out.
/// The work directory is removed when this returns, whatever the result.
async fn download_into(
    engine: Arc<dyn Engine>,
    url: &Url,
    format: &str,
    output_dir: &Path,
) -> Result<PathBuf, EngineError> {
    let work_dir = tempfile::Builder::new()
        .prefix(WORK_DIR_PREFIX)
        .tempdir_in(output_dir)
        .map_err(|e| EngineError::io("creating work directory", e))?;

    engine.download(url, format, work_dir.path()).await?;
    move_media_file(work_dir.path(), output_dir).await
}

async fn finish_item(path: PathBuf, transcoder: Option<&Transcoder>) -> (PathBuf, Option<String>) {
    let Some(transcoder) = transcoder else {
        return (path, None);
    };

    match transcoder.to_mp3(&path).await {
        Ok(converted) => (converted, None),
        Err(error) => {
            tracing::warn!("Keeping {} unconverted: {}", path.display(), error);
            let warning = format!("{}: {}", path.display(), error);
            (path, Some(warning))
        }
    }
}

fn parse_url(url: &str) -> Result<Url, DownloadError> {
    Url::parse(url).map_err(|e| DownloadError::InvalidUrl(format!("{url}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stub::EngineStub;
    use crate::quality::Quality;
    use crate::types::Status;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    const VIDEO: &str = "https://www.youtube.com/watch?v=abc123";
    const PLAYLIST: &str = "https://www.youtube.com/playlist?list=PL42";

    fn forbidden() -> EngineError {
        EngineError::Http {
            status: 403,
            message: "HTTP Error 403: Forbidden".to_string(),
        }
    }

    fn private_video() -> EngineError {
        EngineError::ContentUnavailable("Private video".to_string())
    }

    fn orchestrator(primary: &Arc<EngineStub>, fallback: Option<&Arc<EngineStub>>) -> Orchestrator {
        let config = FetchConfig {
            transcoder: Transcoder::new("tubegrab-ffmpeg-that-does-not-exist", "192k"),
            ..FetchConfig::default()
        };
        Orchestrator::new(
            primary.clone(),
            fallback.map(|f| f.clone() as Arc<dyn Engine>),
            config,
        )
    }

    fn file_names(outcome: &DownloadOutcome) -> Vec<String> {
        outcome
            .output_paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn leftover_work_dirs(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with(WORK_DIR_PREFIX)
            })
            .count()
    }

    #[test]
    fn defaults_use_yt_dlp_then_youtube_dl() {
        let orchestrator = Orchestrator::with_defaults(FetchConfig::default());
        assert_eq!(orchestrator.primary.name(), "yt-dlp");
        assert_eq!(orchestrator.fallback.as_ref().map(|f| f.name()), Some("youtube-dl"));
        assert_eq!(orchestrator.config().playlist_concurrency, 1);
    }

    #[tokio::test]
    async fn primary_success_never_touches_fallback() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary"));
        let fallback = Arc::new(EngineStub::new("fallback"));

        let outcome = orchestrator(&primary, Some(&fallback))
            .execute(&Request::new("https://youtu.be/abc123?si=xyz", Mode::Video, out.path()))
            .await;

        assert_eq!(outcome.status(), Status::Ok);
        assert_eq!(file_names(&outcome), vec!["abc123.mp4"]);
        assert_eq!(outcome.engine(), Some("primary"));
        assert_eq!(primary.downloads(), 1);
        assert_eq!(fallback.downloads(), 0);
        assert_eq!(
            std::fs::read_to_string(&outcome.output_paths()[0]).unwrap(),
            format!("primary:{VIDEO}")
        );
        assert_eq!(leftover_work_dirs(out.path()), 0);
    }

    #[tokio::test]
    async fn transient_failure_falls_back_exactly_once() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary").failing_with(forbidden));
        let fallback = Arc::new(EngineStub::new("fallback"));

        let outcome = orchestrator(&primary, Some(&fallback))
            .execute(&Request::new(VIDEO, Mode::Video, out.path()))
            .await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.engine(), Some("fallback"));
        assert_eq!(primary.downloads(), 1);
        assert_eq!(fallback.downloads(), 1);
        assert_eq!(leftover_work_dirs(out.path()), 0);
    }

    #[tokio::test]
    async fn both_failing_is_a_failed_outcome_without_paths() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary").failing_with(forbidden));
        let fallback = Arc::new(
            EngineStub::new("fallback").failing_with(|| EngineError::Network("timed out".into())),
        );

        let outcome = orchestrator(&primary, Some(&fallback))
            .execute(&Request::new(VIDEO, Mode::Video, out.path()))
            .await;

        assert_eq!(outcome.status(), Status::Failed);
        assert!(outcome.output_paths().is_empty());
        let message = outcome.error_message().unwrap();
        assert!(message.contains("primary") && message.contains("fallback"), "{message}");
        assert_eq!(primary.downloads(), 1);
        assert_eq!(fallback.downloads(), 1);
    }

    #[tokio::test]
    async fn permanent_failure_skips_fallback() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary").failing_with(private_video));
        let fallback = Arc::new(EngineStub::new("fallback"));

        let outcome = orchestrator(&primary, Some(&fallback))
            .execute(&Request::new(VIDEO, Mode::Video, out.path()))
            .await;

        assert_eq!(outcome.status(), Status::Failed);
        assert_eq!(fallback.downloads(), 0);
        assert!(outcome.error_message().unwrap().contains("Private video"));
    }

    #[tokio::test]
    async fn missing_fallback_surfaces_primary_error() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary").failing_with(forbidden));
        let fallback = Arc::new(EngineStub::new("fallback").unavailable());

        let orchestrator = orchestrator(&primary, Some(&fallback));
        let request = Request::new(VIDEO, Mode::Video, out.path());
        let outcome = orchestrator.execute(&request).await;

        assert_eq!(outcome.status(), Status::Failed);
        assert!(outcome.error_message().unwrap().contains("403"));
        assert_eq!(fallback.downloads(), 0);

        let url = Url::parse(VIDEO).unwrap();
        let error = orchestrator
            .fetch_item(&url, "best", out.path())
            .await
            .unwrap_err();
        assert_matches!(
            error,
            DownloadError::FallbackUnavailable { source: EngineError::Http { status: 403, .. }, .. }
        );
    }

    #[tokio::test]
    async fn no_fallback_configured_surfaces_primary_error() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary").failing_with(forbidden));
        let url = Url::parse(VIDEO).unwrap();

        let error = orchestrator(&primary, None)
            .fetch_item(&url, "best", out.path())
            .await
            .unwrap_err();
        assert_matches!(error, DownloadError::FallbackUnavailable { ref reason, .. } if reason.contains("no fallback"));
    }

    #[tokio::test]
    async fn unavailable_primary_goes_straight_to_fallback() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary").unavailable());
        let fallback = Arc::new(EngineStub::new("fallback"));

        let outcome = orchestrator(&primary, Some(&fallback))
            .execute(&Request::new(VIDEO, Mode::Audio, out.path()))
            .await;

        assert!(outcome.is_ok());
        assert_eq!(file_names(&outcome), vec!["abc123.m4a"]);
        assert_eq!(primary.downloads(), 0);
        assert_eq!(fallback.downloads(), 1);
    }

    #[tokio::test]
    async fn playlist_skips_failed_items_and_keeps_order() {
        let out = TempDir::new().unwrap();
        let entries = [
            "https://www.youtube.com/watch?v=item1",
            "https://www.youtube.com/watch?v=item2",
            "https://www.youtube.com/watch?v=item3",
            "https://www.youtube.com/watch?v=item4",
            "https://www.youtube.com/watch?v=item5",
        ];
        let primary = Arc::new(
            EngineStub::new("primary")
                .with_entries(&entries)
                .failing_for(entries[1], forbidden)
                .failing_for(entries[3], private_video),
        );
        let fallback = Arc::new(EngineStub::new("fallback").failing_for(entries[1], forbidden));

        let config = FetchConfig {
            playlist_concurrency: 3,
            ..FetchConfig::default()
        };
        let orchestrator = Orchestrator::new(
            primary.clone(),
            Some(fallback.clone() as Arc<dyn Engine>),
            config,
        );

        let outcome = orchestrator
            .execute(&Request::new(PLAYLIST, Mode::Playlist(ItemKind::Video), out.path()))
            .await;

        assert!(outcome.is_ok());
        assert_eq!(file_names(&outcome), vec!["item1.mp4", "item3.mp4", "item5.mp4"]);
        assert_eq!(outcome.skipped_count(), 2);
        let skipped: Vec<usize> = outcome.skipped().iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![1, 3]);
        assert_eq!(outcome.skipped()[0].url, entries[1]);
        // only the 403 item was handed to the fallback
        assert_eq!(fallback.downloads(), 1);
        assert_eq!(leftover_work_dirs(out.path()), 0);
    }

    #[tokio::test]
    async fn playlist_where_every_item_fails_is_failed() {
        let out = TempDir::new().unwrap();
        let entries = [
            "https://www.youtube.com/watch?v=item1",
            "https://www.youtube.com/watch?v=item2",
        ];
        let primary = Arc::new(
            EngineStub::new("primary")
                .with_entries(&entries)
                .failing_for(entries[0], private_video)
                .failing_for(entries[1], private_video),
        );

        let outcome = orchestrator(&primary, None)
            .execute(&Request::new(PLAYLIST, Mode::Playlist(ItemKind::Audio), out.path()))
            .await;

        assert_eq!(outcome.status(), Status::Failed);
        assert!(outcome.output_paths().is_empty());
        assert_eq!(outcome.skipped_count(), 2);
        assert_eq!(outcome.error_message(), Some("all 2 playlist items failed"));
    }

    #[tokio::test]
    async fn empty_playlist_is_failed() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary"));

        let outcome = orchestrator(&primary, None)
            .execute(&Request::new(PLAYLIST, Mode::Playlist(ItemKind::Video), out.path()))
            .await;

        assert_eq!(outcome.status(), Status::Failed);
        assert!(outcome.error_message().unwrap().contains("no entries"));
    }

    #[tokio::test]
    async fn playlist_listing_falls_back() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary").failing_for(PLAYLIST, forbidden));
        let fallback = Arc::new(
            EngineStub::new("fallback").with_entries(&["https://www.youtube.com/watch?v=only1"]),
        );

        let outcome = orchestrator(&primary, Some(&fallback))
            .execute(&Request::new(PLAYLIST, Mode::Playlist(ItemKind::Video), out.path()))
            .await;

        assert!(outcome.is_ok());
        assert_eq!(file_names(&outcome), vec!["only1.mp4"]);
        // the entry itself succeeded on the primary
        assert_eq!(primary.downloads(), 1);
        assert_eq!(fallback.downloads(), 0);
    }

    #[tokio::test]
    async fn missing_transcoder_is_a_warning_not_a_failure() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary"));

        let request = Request::new(VIDEO, Mode::Audio, out.path())
            .with_quality(Quality::MaxAudioBitrate(128))
            .with_convert_audio(true);
        let outcome = orchestrator(&primary, None).execute(&request).await;

        assert!(outcome.is_ok());
        assert_eq!(file_names(&outcome), vec!["abc123.m4a"]);
        assert_eq!(outcome.warnings().len(), 1);
        assert!(outcome.warnings()[0].contains("tubegrab-ffmpeg-that-does-not-exist"));
    }

    #[tokio::test]
    async fn conversion_request_for_video_is_a_warning() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary"));

        let request = Request::new(VIDEO, Mode::Video, out.path()).with_convert_audio(true);
        let outcome = orchestrator(&primary, None).execute(&request).await;

        assert!(outcome.is_ok());
        assert_eq!(file_names(&outcome), vec!["abc123.mp4"]);
        assert_eq!(outcome.warnings(), ["MP3 conversion only applies to audio downloads"]);
    }

    #[tokio::test]
    async fn output_directory_is_created() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("new").join("downloads");
        let primary = Arc::new(EngineStub::new("primary"));

        let outcome = orchestrator(&primary, None)
            .execute(&Request::new(VIDEO, Mode::Video, &target))
            .await;

        assert!(outcome.is_ok());
        assert!(target.join("abc123.mp4").is_file());
    }

    #[tokio::test]
    async fn invalid_url_fails_without_calling_engines() {
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary"));

        let outcome = orchestrator(&primary, None)
            .execute(&Request::new("not a url", Mode::Video, out.path()))
            .await;

        assert_eq!(outcome.status(), Status::Failed);
        assert!(outcome.error_message().unwrap().starts_with("invalid URL"));
        assert_eq!(primary.downloads(), 0);
    }

    #[tokio::test]
    async fn metadata_falls_back_too() {
        let primary = Arc::new(EngineStub::new("primary").failing_with(|| {
            EngineError::Metadata("Unable to extract initial player response".into())
        }));
        let fallback = Arc::new(EngineStub::new("fallback"));

        let fetched = orchestrator(&primary, Some(&fallback))
            .fetch_info("https://youtube.com/shorts/abc123")
            .await
            .unwrap();

        assert!(fetched.used_fallback);
        assert_eq!(fetched.engine, "fallback");
        assert_eq!(fetched.value.id, "abc123");
        assert_eq!(primary.info_calls(), 1);
        assert_eq!(fallback.info_calls(), 1);
    }

    #[tokio::test]
    async fn playlist_entries_with_the_same_title_keep_their_own_files() {
        let out = TempDir::new().unwrap();
        std::fs::write(out.path().join("Intro.mp4"), b"from an earlier run").unwrap();
        let entries = [
            "https://www.youtube.com/watch?v=aaa111",
            "https://www.youtube.com/watch?v=bbb222",
        ];
        let primary = Arc::new(
            EngineStub::new("primary")
                .with_entries(&entries)
                .with_title("Intro"),
        );

        let outcome = orchestrator(&primary, None)
            .execute(&Request::new(PLAYLIST, Mode::Playlist(ItemKind::Video), out.path()))
            .await;

        assert!(outcome.is_ok());
        assert_eq!(file_names(&outcome), vec!["Intro (1).mp4", "Intro (2).mp4"]);
        let contents: Vec<String> = outcome
            .output_paths()
            .iter()
            .map(|p| std::fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(
            contents,
            vec![format!("primary:{}", entries[0]), format!("primary:{}", entries[1])]
        );
        assert_eq!(
            std::fs::read(out.path().join("Intro.mp4")).unwrap(),
            b"from an earlier run"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn converted_audio_replaces_the_download() {
        use crate::transcode::script;

        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary"));
        let config = FetchConfig {
            transcoder: script::transcoder(bin.path(), script::SUCCEEDS),
            ..FetchConfig::default()
        };
        let orchestrator = Orchestrator::new(primary.clone(), None, config);

        let request = Request::new(VIDEO, Mode::Audio, out.path()).with_convert_audio(true);
        let outcome = orchestrator.execute(&request).await;

        assert!(outcome.is_ok());
        assert_eq!(file_names(&outcome), vec!["abc123.mp3"]);
        assert!(outcome.warnings().is_empty());
        assert_eq!(std::fs::read(&outcome.output_paths()[0]).unwrap(), b"mp3");
        assert!(!out.path().join("abc123.m4a").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_conversion_keeps_the_download_with_a_warning() {
        use crate::transcode::script;

        let bin = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let primary = Arc::new(EngineStub::new("primary"));
        let config = FetchConfig {
            transcoder: script::transcoder(bin.path(), script::FAILS),
            ..FetchConfig::default()
        };
        let orchestrator = Orchestrator::new(primary.clone(), None, config);

        let request = Request::new(VIDEO, Mode::Audio, out.path()).with_convert_audio(true);
        let outcome = orchestrator.execute(&request).await;

        assert!(outcome.is_ok());
        assert_eq!(file_names(&outcome), vec!["abc123.m4a"]);
        assert_eq!(outcome.warnings().len(), 1);
        assert!(outcome.warnings()[0].contains("Invalid data"), "{:?}", outcome.warnings());
        assert!(outcome.output_paths()[0].is_file());
        assert!(!out.path().join("abc123.mp3").exists());
    }

    #[tokio::test]
    async fn playlist_metadata_keeps_the_list_parameter() {
        let primary = Arc::new(EngineStub::new("primary").with_entries(&[
            "https://www.youtube.com/watch?v=aaa111",
            "https://www.youtube.com/watch?v=bbb222",
        ]));

        let fetched = orchestrator(&primary, None)
            .fetch_playlist_info("https://www.youtube.com/watch?v=aaa111&list=PL42")
            .await
            .unwrap();

        assert_eq!(fetched.value.id, "PL42");
        assert_eq!(fetched.value.entry_count, Some(2));
        assert_eq!(
            fetched.value.webpage_url.as_deref(),
            Some("https://www.youtube.com/watch?v=aaa111&list=PL42")
        );
    }
}
