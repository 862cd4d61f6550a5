//! File system helpers for the output tree.
//!
//! All removals are idempotent: a path that is already gone is success.

use std::io;
use std::path::Path;

use tokio::fs;

use crate::error::{ReleaseError, Result};

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ReleaseError::ExecutionFailed {
            command: "remove directory".to_string(),
            reason: format!("Failed to remove {}: {e}", path.display()),
        }),
    }
}

/// Removes a single file if it exists.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ReleaseError::ExecutionFailed {
            command: "remove file".to_string(),
            reason: format!("Failed to remove {}: {e}", path.display()),
        }),
    }
}

/// Deletes everything inside `path`, keeping the directory itself.
pub async fn clear_dir_contents(path: &Path) -> Result<()> {
    let mut entries = match fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let entry_path = entry.path();
        if entry.file_type().await?.is_dir() {
            remove_dir_all(&entry_path).await?;
        } else {
            remove_file(&entry_path).await?;
        }
    }
    Ok(())
}

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }
    Ok(fs::create_dir_all(path).await?)
}

/// Writes `contents` to `path`, creating parent directories as needed.
pub async fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    Ok(fs::write(path, contents).await?)
}

/// Whether `path` exists and is a regular file.
pub async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}
