// bases/download_cli/src/config.rs
use std::sync::Arc;

use media_fetch::{CommandEngine, Engine, FetchConfig, Mode, Orchestrator, Request, Transcoder};

use crate::args::{CliArgs, ModeArg};

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub request: Request,
    pub fetch: FetchConfig,
    pub primary: String,
    /// `None` when fallback is disabled
    pub fallback: Option<String>,
    pub background: bool,
    pub info_only: bool,
    pub json: bool,
    pub verbose: bool,
}

impl Config {
    /// Create configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Self {
        let mode = match args.mode {
            ModeArg::Video => Mode::Video,
            ModeArg::Audio => Mode::Audio,
            ModeArg::Playlist => Mode::Playlist(args.items.into()),
        };

        let mut request =
            Request::new(&args.url, mode, args.output_dir).with_convert_audio(args.mp3);
        if let Some(quality) = args.quality {
            request = request.with_quality(quality);
        }

        let fetch = FetchConfig {
            playlist_concurrency: usize::from(args.jobs),
            transcoder: Transcoder::new(args.ffmpeg, args.bitrate),
        };

        let fallback = if args.no_fallback || args.fallback.trim().is_empty() {
            None
        } else {
            Some(args.fallback)
        };

        Self {
            request,
            fetch,
            primary: args.primary,
            fallback,
            background: args.background,
            info_only: args.info,
            json: args.json,
            verbose: args.verbose,
        }
    }

    /// Build the orchestrator for the configured engines
    pub fn orchestrator(&self) -> Orchestrator {
        let primary: Arc<dyn Engine> = Arc::new(CommandEngine::new(self.primary.as_str()));
        let fallback = self
            .fallback
            .as_deref()
            .map(|program| Arc::new(CommandEngine::new(program)) as Arc<dyn Engine>);
        Orchestrator::new(primary, fallback, self.fetch.clone())
    }

    /// Default log filter, overridden by RUST_LOG
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "tubegrab=debug,media_fetch=debug"
        } else {
            "tubegrab=info,media_fetch=info"
        }
    }
}
