// components/media_fetch/src/quality.rs
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QualityError;
use crate::types::ItemKind;

/// Requested quality ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    #[default]
    Highest,
    /// Video height in pixels, e.g. 720 for "720p"
    MaxHeight(u32),
    /// Audio bitrate in kbps
    MaxAudioBitrate(u32),
}

impl FromStr for Quality {
    type Err = QualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        let unrecognized = || QualityError::Unrecognized(s.to_string());

        if matches!(value.as_str(), "highest" | "best" | "max") {
            return Ok(Self::Highest);
        }
        if let Some(kbps) = value
            .strip_suffix("kbps")
            .or_else(|| value.strip_suffix('k'))
        {
            return parse_positive(kbps)
                .map(Self::MaxAudioBitrate)
                .ok_or_else(unrecognized);
        }
        let height = value.strip_suffix('p').unwrap_or(value.as_str());
        parse_positive(height)
            .map(Self::MaxHeight)
            .ok_or_else(unrecognized)
    }
}

fn parse_positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Highest => write!(f, "highest"),
            Self::MaxHeight(h) => write!(f, "{h}p"),
            Self::MaxAudioBitrate(k) => write!(f, "{k}kbps"),
        }
    }
}

/// Build the engine format selector for an item kind and quality.
///
/// A ceiling that does not apply to the kind is ignored in favour of the best
/// available stream.
pub fn format_selector(kind: ItemKind, quality: Quality) -> String {
    match (kind, quality) {
        (ItemKind::Video, Quality::MaxHeight(h)) => {
            format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]/best")
        }
        (ItemKind::Audio, Quality::MaxAudioBitrate(k)) => {
            format!("bestaudio[abr<={k}]/bestaudio/best")
        }
        (ItemKind::Video, Quality::Highest) => "bestvideo+bestaudio/best".to_string(),
        (ItemKind::Audio, Quality::Highest) => "bestaudio/best".to_string(),
        (kind, mismatched) => {
            tracing::warn!(
                "Quality {} does not apply to {} downloads, using highest",
                mismatched,
                kind
            );
            format_selector(kind, Quality::Highest)
        }
    }
}
