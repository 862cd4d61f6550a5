//! Resolved packaging settings.
//!
//! Built from the `[project]` configuration section with every path made
//! absolute against the project directory, since child processes are not
//! guaranteed to share our working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use path_absolutize::Absolutize;

use super::platform::{HostOs, PlatformSpec};
use crate::config::ProjectConfig;
use crate::error::{ReleaseError, Result};

/// Name of the plain-text version marker written to the output root.
pub const VERSION_MARKER: &str = "version.txt";

/// Timeout for a single `dotnet publish` (30 minutes).
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(1800);

/// Main settings for packaging operations.
#[derive(Clone, Debug)]
pub struct PackagerSettings {
    agent_project: PathBuf,
    companion_project: PathBuf,
    agent_name: String,
    configuration: String,
    output_root: PathBuf,
    staging_root: PathBuf,
    companion_output_root: PathBuf,
    extra_clean_dirs: Vec<PathBuf>,
    host: HostOs,
    clean: bool,
    publish_timeout: Duration,
}

/// Resolves `path` against `base` without touching the filesystem.
pub(crate) fn absolute(path: &Path, base: &Path) -> Result<PathBuf> {
    path.absolutize_from(base)
        .map(|p| p.into_owned())
        .map_err(|e| ReleaseError::Config {
            reason: format!("Cannot resolve {}: {e}", path.display()),
        })
}

impl PackagerSettings {
    /// Resolves `config` against `base_dir` for the current host.
    pub fn from_config(config: &ProjectConfig, base_dir: &Path) -> Result<Self> {
        Ok(Self {
            agent_project: absolute(&config.agent_project, base_dir)?,
            companion_project: absolute(&config.companion_project, base_dir)?,
            agent_name: config.agent_name.clone(),
            configuration: config.configuration.clone(),
            output_root: absolute(&config.output_dir, base_dir)?,
            staging_root: absolute(&config.staging_dir, base_dir)?,
            companion_output_root: absolute(&config.companion_output_dir, base_dir)?,
            extra_clean_dirs: config
                .extra_clean_dirs
                .iter()
                .map(|d| absolute(d, base_dir))
                .collect::<Result<_>>()?,
            host: HostOs::current(),
            clean: false,
            publish_timeout: PUBLISH_TIMEOUT,
        })
    }

    /// Overrides the detected host OS.
    pub fn with_host(mut self, host: HostOs) -> Self {
        self.host = host;
        self
    }

    /// Enables the clean pre-step.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn agent_project(&self) -> &Path {
        &self.agent_project
    }

    pub fn companion_project(&self) -> &Path {
        &self.companion_project
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    pub fn companion_output_root(&self) -> &Path {
        &self.companion_output_root
    }

    pub fn extra_clean_dirs(&self) -> &[PathBuf] {
        &self.extra_clean_dirs
    }

    pub fn host(&self) -> HostOs {
        self.host
    }

    pub fn clean(&self) -> bool {
        self.clean
    }

    pub fn publish_timeout(&self) -> Duration {
        self.publish_timeout
    }

    /// Directory the agent publish writes into: `output_root/<runtime-id>`.
    pub fn agent_output_dir(&self, platform: &PlatformSpec) -> PathBuf {
        self.output_root.join(platform.runtime_id)
    }

    /// Deterministic executable path: `output_root/<runtime-id>/<agent><ext>`.
    pub fn agent_binary_path(&self, platform: &PlatformSpec) -> PathBuf {
        self.agent_output_dir(platform)
            .join(platform.binary_name(&self.agent_name))
    }

    /// Per-runtime companion publish directory.
    pub fn companion_bundle_dir(&self, platform: &PlatformSpec) -> PathBuf {
        self.companion_output_root.join(platform.runtime_id)
    }

    pub fn version_marker_path(&self) -> PathBuf {
        self.output_root.join(VERSION_MARKER)
    }
}
