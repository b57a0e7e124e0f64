// components/media_fetch/src/transcode.rs
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::error::TranscodeError;
use crate::utils::reserve_path;

/// Converts downloaded audio to MP3 with an external ffmpeg binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoder {
    program: String,
    bitrate: String,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new("ffmpeg", "192k")
    }
}

impl Transcoder {
    pub fn new(program: impl Into<String>, bitrate: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            bitrate: bitrate.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn bitrate(&self) -> &str {
        &self.bitrate
    }

    /// Locate the transcoder binary on PATH.
    pub fn check_available(&self) -> Result<PathBuf, TranscodeError> {
        which::which(&self.program).map_err(|_| TranscodeError::Unavailable {
            program: self.program.clone(),
        })
    }

    /// Convert `input` to `<stem>.mp3` beside it and remove the source.
    /// An existing `<stem>.mp3` is kept and the output gets a numbered name.
    /// An `.mp3` input is returned as is.
    pub async fn to_mp3(&self, input: &Path) -> Result<PathBuf, TranscodeError> {
        if is_mp3(input) {
            return Ok(input.to_path_buf());
        }

        let program = self.check_available()?;
        let output = mp3_target(input).await?;
        tracing::info!("Converting {} to MP3 at {}", input.display(), self.bitrate);

        let result = match Command::new(program)
            .args(self.args(input, &output))
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(result) => result,
            Err(source) => {
                let _ = tokio::fs::remove_file(&output).await;
                return Err(TranscodeError::Spawn {
                    program: self.program.clone(),
                    source,
                });
            }
        };

        if !result.status.success() {
            let _ = tokio::fs::remove_file(&output).await;
            return Err(TranscodeError::Failed {
                path: input.to_path_buf(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        if let Err(e) = tokio::fs::remove_file(input).await {
            tracing::warn!("Could not remove {} after conversion: {}", input.display(), e);
        }
        Ok(output)
    }

    fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(input.as_os_str().to_owned());
        for arg in ["-vn", "-codec:a", "libmp3lame", "-b:a", self.bitrate.as_str()] {
            args.push(OsString::from(arg));
        }
        args.push(output.as_os_str().to_owned());
        args
    }
}

/// Claim `<stem>.mp3` (or a numbered variant) next to `input`.
async fn mp3_target(input: &Path) -> Result<PathBuf, TranscodeError> {
    let wanted = input.with_extension("mp3");
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    let name = wanted
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.mp3".to_string());

    reserve_path(dir, &name)
        .await
        .map_err(|source| TranscodeError::Output {
            path: wanted,
            source,
        })
}

fn is_mp3(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}
