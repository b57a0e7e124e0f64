// components/media_fetch/src/lib.rs
//! Download video, audio or whole playlists through a primary extraction
//! engine with a single fallback engine behind it.

mod engine;
mod error;
mod orchestrator;
mod quality;
mod session;
mod transcode;
mod types;
mod utils;
mod worker;
mod ytdlp;

pub use engine::Engine;
pub use error::{DownloadError, EngineError, QualityError, TranscodeError};
pub use orchestrator::{FetchConfig, Orchestrator};
pub use quality::{format_selector, Quality};
pub use session::Session;
pub use transcode::Transcoder;
pub use types::{
    CachedInfo, DownloadOutcome, Fetched, ItemKind, MediaInfo, Mode, Request, SkippedItem, Status,
};
pub use worker::{DownloadTicket, Worker};
pub use ytdlp::CommandEngine;
