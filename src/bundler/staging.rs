//! Per-platform companion archive staging.
//!
//! Each runtime identifier owns its own slot under the staging root
//! (`<staging>/<runtime-id>/companion.zip`), so no two platforms ever read or
//! write the same archive. The agent publish step is pointed at its platform's
//! slot explicitly.

use std::fs::File;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use super::fs;
use super::platform::{HostOs, PlatformSpec};
use crate::cli::Reporter;
use crate::error::{ReleaseError, Result};
use crate::process::{CommandRunner, Invocation};
use crate::tools::DITTO;

/// File name of the companion archive inside every slot.
pub const COMPANION_ARCHIVE: &str = "companion.zip";

/// Arena of staging slots indexed by runtime identifier.
#[derive(Clone, Debug)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Slot directory owned by `platform`.
    pub fn slot(&self, platform: &PlatformSpec) -> PathBuf {
        self.root.join(platform.runtime_id)
    }

    /// Companion archive path inside `platform`'s slot.
    pub fn archive_path(&self, platform: &PlatformSpec) -> PathBuf {
        self.slot(platform).join(COMPANION_ARCHIVE)
    }

    /// Drops any stale archive left in `platform`'s slot.
    pub async fn clear(&self, platform: &PlatformSpec) -> Result<()> {
        fs::remove_file(&self.archive_path(platform)).await
    }

    /// Empties every slot.
    pub async fn clear_all(&self) -> Result<()> {
        fs::clear_dir_contents(&self.root).await
    }

    /// Archives the freshly published companion bundle into `platform`'s slot.
    ///
    /// macOS targets built on a macOS host go through `ditto` so resource
    /// forks and extended attributes survive; everything else is a plain zip.
    pub async fn archive<R: CommandRunner>(
        &self,
        platform: &PlatformSpec,
        bundle_dir: &Path,
        host: HostOs,
        runner: &R,
        reporter: &dyn Reporter,
    ) -> Result<PathBuf> {
        let dest = self.archive_path(platform);
        fs::create_dir_all(&self.slot(platform), false).await?;

        if host.is_macos() && platform.is_macos() {
            let invocation = Invocation::new(DITTO)
                .args(["-c", "-k", "--sequesterRsrc", "--keepParent"])
                .arg(bundle_dir.display().to_string())
                .arg(dest.display().to_string());
            let outcome = runner.run(&invocation, reporter).await?;
            if !outcome.success() {
                return Err(ReleaseError::ExecutionFailed {
                    command: invocation.to_string(),
                    reason: format!(
                        "Failed to archive companion bundle for {}",
                        platform.runtime_id
                    ),
                });
            }
        } else {
            let src = bundle_dir.to_path_buf();
            let target = dest.clone();
            tokio::task::spawn_blocking(move || zip_directory(&src, &target))
                .await
                .map_err(|e| ReleaseError::ExecutionFailed {
                    command: "zip companion bundle".to_string(),
                    reason: format!("Archive task panicked: {e}"),
                })??;
        }

        reporter.verbose(&format!("Archived companion bundle to {}", dest.display()));
        Ok(dest)
    }
}

/// Writes every file under `src` into a deflated zip at `dest`.
///
/// Entry names are relative to `src` with `/` separators; walk order is
/// sorted so the archive layout is deterministic.
fn zip_directory(src: &Path, dest: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(ReleaseError::ExecutionFailed {
            command: "zip companion bundle".to_string(),
            reason: format!("{} is not a directory", src.display()),
        });
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = zip::ZipWriter::new(File::create(dest)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| ReleaseError::ExecutionFailed {
                command: "zip companion bundle".to_string(),
                reason: e.to_string(),
            })?;
        if rel.as_os_str().is_empty() {
            continue;
        }

        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            writer.start_file(name, options.unix_permissions(file_mode(&entry)?))?;
            let mut file = File::open(entry.path())?;
            std::io::copy(&mut file, &mut writer)?;
        }
    }

    writer.finish()?;
    Ok(())
}

#[cfg(unix)]
fn file_mode(entry: &walkdir::DirEntry) -> Result<u32> {
    use std::os::unix::fs::PermissionsExt;
    Ok(entry.metadata()?.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn file_mode(_entry: &walkdir::DirEntry) -> Result<u32> {
    Ok(0o644)
}
