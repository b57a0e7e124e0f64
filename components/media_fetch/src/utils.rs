// components/media_fetch/src/utils.rs
use std::path::{Path, PathBuf};

use crate::error::{DownloadError, EngineError};

/// Suffixes of files an engine leaves behind mid-download.
const PARTIAL_SUFFIXES: [&str; 3] = [".part", ".ytdl", ".temp"];

const MAX_NAME_ATTEMPTS: usize = 1000;

/// Make a file name safe for every filesystem we write to.
pub fn safe_file_name(name: &str) -> String {
    let sanitized = sanitize_filename::sanitize(name.trim());
    let trimmed = sanitized.trim();
    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Create the output directory if needed and return its absolute path.
pub async fn prepare_output_dir(path: &Path) -> Result<PathBuf, DownloadError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| DownloadError::output_directory(path, e))?;
    dunce::canonicalize(path).map_err(|e| DownloadError::output_directory(path, e))
}

/// Move the media file an engine produced in `work_dir` into `dest_dir`.
///
/// The largest complete file is taken as the media file.
pub async fn move_media_file(work_dir: &Path, dest_dir: &Path) -> Result<PathBuf, EngineError> {
    let mut entries = tokio::fs::read_dir(work_dir)
        .await
        .map_err(|e| EngineError::io("reading work directory", e))?;

    let mut largest: Option<(u64, PathBuf)> = None;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| EngineError::io("reading work directory", e))?
    {
        let metadata = entry
            .metadata()
            .await
            .map_err(|e| EngineError::io("inspecting downloaded file", e))?;
        let path = entry.path();
        if !metadata.is_file() || is_partial(&path) {
            continue;
        }
        if largest.as_ref().map_or(true, |(size, _)| metadata.len() > *size) {
            largest = Some((metadata.len(), path));
        }
    }

    let (_, source) = largest.ok_or(EngineError::NoOutput)?;
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let destination = reserve_path(dest_dir, &safe_file_name(&file_name))
        .await
        .map_err(|e| EngineError::io("reserving output file name", e))?;

    if let Err(e) = tokio::fs::rename(&source, &destination).await {
        let _ = tokio::fs::remove_file(&destination).await;
        return Err(EngineError::io("moving downloaded file", e));
    }
    Ok(destination)
}

/// Claim a file name in `dir` that nothing else uses yet.
///
/// `name` is tried first, then `stem (1).ext`, `stem (2).ext` and so on. The
/// chosen path is created empty so concurrent callers never pick the same one;
/// the caller replaces it with the real file.
pub async fn reserve_path(dir: &Path, name: &str) -> std::io::Result<PathBuf> {
    let candidate = Path::new(name);
    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let extension = candidate
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = if attempt == 0 {
            dir.join(name)
        } else {
            dir.join(format!("{stem} ({attempt}){extension}"))
        };

        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free file name for {name} in {}", dir.display()),
    ))
}

fn is_partial(path: &Path) -> bool {
    let name = path.to_string_lossy();
    PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}
