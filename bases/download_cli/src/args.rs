// bases/download_cli/src/args.rs
use clap::{Parser, ValueEnum};
use media_fetch::{ItemKind, Quality};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Video,
    Audio,
    Playlist,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemArg {
    Video,
    Audio,
}

impl From<ItemArg> for ItemKind {
    fn from(arg: ItemArg) -> Self {
        match arg {
            ItemArg::Video => ItemKind::Video,
            ItemArg::Audio => ItemKind::Audio,
        }
    }
}

/// Download video, audio or whole playlists
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// URL to download from
    pub url: String,

    /// Directory to store downloaded files
    #[arg(short, long, default_value = "downloads")]
    pub output_dir: PathBuf,

    /// What to download
    #[arg(short, long, value_enum, default_value_t = ModeArg::Video)]
    pub mode: ModeArg,

    /// How each playlist entry is fetched (playlist mode only)
    #[arg(long, value_enum, default_value_t = ItemArg::Video)]
    pub items: ItemArg,

    /// Quality ceiling: highest, 1080p, 720, 128kbps, 160k
    #[arg(short, long)]
    pub quality: Option<Quality>,

    /// Convert downloaded audio to MP3 (needs ffmpeg)
    #[arg(long)]
    pub mp3: bool,

    /// MP3 bitrate passed to ffmpeg
    #[arg(long, default_value = "192k")]
    pub bitrate: String,

    /// ffmpeg program used for MP3 conversion
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: String,

    /// Run the download as a background task and report progress while waiting
    #[arg(long)]
    pub background: bool,

    /// Only show metadata, do not download
    #[arg(long, conflicts_with_all = ["background", "mp3"])]
    pub info: bool,

    /// Primary extraction program
    #[arg(long, default_value = "yt-dlp")]
    pub primary: String,

    /// Fallback extraction program
    #[arg(long, default_value = "youtube-dl")]
    pub fallback: String,

    /// Never hand a failed download to the fallback program
    #[arg(long)]
    pub no_fallback: bool,

    /// Playlist entries downloaded at the same time
    #[arg(short = 'j', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub jobs: u8,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
