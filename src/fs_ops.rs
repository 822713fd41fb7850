//! Thin wrappers over the file system: stat for newly selected paths, a
//! guarded rename that never overwrites, and whole-file reads.

use std::path::{Path, PathBuf};

use crate::error::FileOpError;
use crate::presets::VIDEO_EXTENSIONS;
use crate::store::RawFileEntry;

/// Stat every path. A path that cannot be stat'ed is still returned, with
/// size 0 and no timestamp, so the caller decides what to do with it.
pub async fn stat_paths<I, P>(paths: I) -> Vec<RawFileEntry>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut entries = Vec::new();
    for path in paths {
        let path = path.into();
        let entry = match tokio::fs::metadata(&path).await {
            Ok(meta) => RawFileEntry {
                size: meta.len(),
                last_modified: meta.modified().ok(),
                is_file: meta.is_file(),
                is_directory: meta.is_dir(),
                path,
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to stat file");
                RawFileEntry::new(path, 0)
            }
        };
        entries.push(entry);
    }
    entries
}

/// Rename `old_path` to `new_path`. Refuses to overwrite an existing file
/// and reports a missing source or destination directory distinctly.
pub async fn rename_file(old_path: &Path, new_path: &Path) -> Result<(), FileOpError> {
    if !exists(old_path).await? {
        return Err(FileOpError::SourceNotFound(old_path.to_path_buf()));
    }

    if let Some(dir) = new_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !exists(dir).await? {
            return Err(FileOpError::TargetDirMissing(dir.to_path_buf()));
        }
    }

    if exists(new_path).await? {
        return Err(FileOpError::AlreadyExists(new_path.to_path_buf()));
    }

    tokio::fs::rename(old_path, new_path)
        .await
        .map_err(|e| FileOpError::io(old_path, e))?;

    tracing::info!(from = %old_path.display(), to = %new_path.display(), "file renamed");
    Ok(())
}

pub async fn read_file(path: &Path) -> Result<Vec<u8>, FileOpError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| FileOpError::io(path, e))
}

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

async fn exists(path: &Path) -> Result<bool, FileOpError> {
    tokio::fs::try_exists(path).await.map_err(|source| FileOpError::Io {
        path: path.to_path_buf(),
        source,
    })
}
