//! Artifact packaging across the platform matrix.
//!
//! For each platform, strictly in order: clear its staging slot, publish the
//! companion bundle, archive it into the slot, publish the agent, then verify
//! the agent executable landed at its deterministic path. The first failure
//! aborts the whole matrix; outputs already produced are left in place.

use std::path::PathBuf;

use super::checksum::calculate_sha256;
use super::fs;
use super::platform::PlatformSpec;
use super::publish::{agent_invocation, companion_invocation};
use super::settings::PackagerSettings;
use super::staging::StagingArea;
use crate::cli::Reporter;
use crate::error::{ReleaseError, Result};
use crate::process::CommandRunner;
use crate::version::ReleaseVersion;

/// Verified outputs for one platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildArtifact {
    /// Platform the artifact was built for
    pub platform: PlatformSpec,
    /// Verified agent executable
    pub executable: PathBuf,
    /// Companion archive that was embedded into the agent build
    pub companion_archive: PathBuf,
    /// Executable size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256 of the executable
    pub sha256: String,
}

/// Result of a successful packaging run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageReport {
    /// Version stamped into every artifact
    pub version: String,
    /// One entry per platform, in matrix order
    pub artifacts: Vec<BuildArtifact>,
    /// Version marker file written after all platforms succeeded
    pub version_marker: PathBuf,
}

/// Runs the per-platform publish steps and verifies their outputs.
pub struct ArtifactPackager<'a, R: CommandRunner> {
    settings: &'a PackagerSettings,
    staging: StagingArea,
    runner: &'a R,
    reporter: &'a dyn Reporter,
}

impl<'a, R: CommandRunner> ArtifactPackager<'a, R> {
    pub fn new(settings: &'a PackagerSettings, runner: &'a R, reporter: &'a dyn Reporter) -> Self {
        Self {
            settings,
            staging: StagingArea::new(settings.staging_root()),
            runner,
            reporter,
        }
    }

    /// Removes the output root, every staging slot, and previous publish
    /// output so nothing from an earlier version can leak into this build.
    pub async fn clean(&self) -> Result<()> {
        self.reporter.progress("Cleaning previous build output...");

        fs::remove_dir_all(self.settings.output_root()).await?;
        self.staging.clear_all().await?;
        fs::remove_dir_all(self.settings.companion_output_root()).await?;
        for dir in self.settings.extra_clean_dirs() {
            self.reporter
                .verbose(&format!("Removing {}", dir.display()));
            fs::remove_dir_all(dir).await?;
        }

        self.reporter.success("Clean complete");
        Ok(())
    }

    /// Packages every platform in `platforms`, then writes the version marker.
    pub async fn package(
        &self,
        platforms: &[PlatformSpec],
        version: &ReleaseVersion,
    ) -> Result<PackageReport> {
        if self.settings.clean() {
            self.clean().await?;
        }

        let mut artifacts = Vec::with_capacity(platforms.len());
        for platform in platforms {
            artifacts.push(self.package_platform(platform, version).await?);
        }

        let version_marker = self.settings.version_marker_path();
        fs::write_file(&version_marker, version.as_str()).await?;
        self.reporter.verbose(&format!(
            "Wrote version marker {} ({version})",
            version_marker.display()
        ));

        Ok(PackageReport {
            version: version.to_string(),
            artifacts,
            version_marker,
        })
    }

    async fn package_platform(
        &self,
        platform: &PlatformSpec,
        version: &ReleaseVersion,
    ) -> Result<BuildArtifact> {
        self.reporter.section(&format!("Building {platform}"));

        // Verification below must only ever see files this run produced.
        self.staging.clear(platform).await?;
        fs::remove_dir_all(&self.settings.companion_bundle_dir(platform)).await?;
        fs::remove_file(&self.settings.agent_binary_path(platform)).await?;

        self.reporter
            .progress(&format!("Publishing companion bundle for {}...", platform.runtime_id));
        let invocation = companion_invocation(self.settings, platform, version);
        let outcome = self.runner.run(&invocation, self.reporter).await?;
        if !outcome.success() {
            return Err(ReleaseError::CompanionBuildFailed {
                platform: platform.runtime_id.to_string(),
                code: outcome.code,
            });
        }

        let bundle_dir = self.settings.companion_bundle_dir(platform);
        let companion_archive = self
            .staging
            .archive(
                platform,
                &bundle_dir,
                self.settings.host(),
                self.runner,
                self.reporter,
            )
            .await?;

        self.reporter
            .progress(&format!("Publishing agent for {}...", platform.runtime_id));
        let invocation = agent_invocation(self.settings, platform, version, &companion_archive);
        let outcome = self.runner.run(&invocation, self.reporter).await?;
        if !outcome.success() {
            return Err(ReleaseError::AgentBuildFailed {
                platform: platform.runtime_id.to_string(),
                code: outcome.code,
            });
        }

        // A zero exit is not proof the single-file bundle was written.
        let executable = self.settings.agent_binary_path(platform);
        if !fs::is_file(&executable).await {
            return Err(ReleaseError::ArtifactNotFound {
                platform: platform.runtime_id.to_string(),
                path: executable,
            });
        }

        let size = tokio::fs::metadata(&executable).await?.len();
        let sha256 = calculate_sha256(&executable).await?;

        self.reporter
            .success(&format!("{} ({size} bytes)", executable.display()));
        self.reporter.verbose(&format!("SHA256: {sha256}"));

        Ok(BuildArtifact {
            platform: *platform,
            executable,
            companion_archive,
            size,
            sha256,
        })
    }
}
