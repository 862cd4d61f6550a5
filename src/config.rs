//! `release.toml` configuration.
//!
//! The file is optional; every field has a default so a bare checkout with
//! the conventional project layout works without one. CLI flags override
//! whatever is loaded here.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ReleaseError, Result};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "release.toml";

/// Complete release configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Packaging inputs and output layout
    pub project: ProjectConfig,
    /// Container image settings
    pub image: ImageConfig,
}

/// `[project]` section.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project file of the main agent
    pub agent_project: PathBuf,
    /// Project file of the companion desktop bundle
    pub companion_project: PathBuf,
    /// Executable name of the agent, without extension
    pub agent_name: String,
    /// Build configuration passed to `dotnet publish -c`
    pub configuration: String,
    /// Versioned output root
    pub output_dir: PathBuf,
    /// Root of the per-platform companion archive staging slots
    pub staging_dir: PathBuf,
    /// Where companion bundles are published, one directory per runtime id
    pub companion_output_dir: PathBuf,
    /// Previous publish output directories removed by `--clean`
    pub extra_clean_dirs: Vec<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            agent_project: PathBuf::from("src/Agent/Agent.csproj"),
            companion_project: PathBuf::from("src/Desktop/Desktop.csproj"),
            agent_name: "agent".to_string(),
            configuration: "Release".to_string(),
            output_dir: PathBuf::from("dist"),
            staging_dir: PathBuf::from("build/staging"),
            companion_output_dir: PathBuf::from("build/companion"),
            extra_clean_dirs: Vec::new(),
        }
    }
}

/// `[image]` section.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    /// Registry prefix, e.g. `ghcr.io/acme`
    pub registry: String,
    /// Image repository name under the registry
    pub name: String,
    /// Dockerfile path
    pub dockerfile: PathBuf,
    /// Build context directory
    pub context: PathBuf,
    /// Target platform(s); a comma-separated list builds with `docker buildx`
    pub platform: String,
    /// Value of the `BUILD_CONFIGURATION` build argument
    pub build_configuration: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            registry: "docker.io/library".to_string(),
            name: "remote-agent".to_string(),
            dockerfile: PathBuf::from("Dockerfile"),
            context: PathBuf::from("."),
            platform: "linux/amd64".to_string(),
            build_configuration: "Release".to_string(),
        }
    }
}

impl ReleaseConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, which must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ReleaseError::Config {
            reason: format!("Failed to read {}: {e}", path.display()),
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml(&text)
    }

    /// Loads an explicit path, or `release.toml` under `dir` when present,
    /// falling back to defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            log::debug!("No {CONFIG_FILE_NAME} in {}, using defaults", dir.display());
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.project.agent_name.trim().is_empty() {
            return Err(ReleaseError::Config {
                reason: "project.agent_name cannot be empty".to_string(),
            });
        }
        if self.image.name.trim().is_empty() {
            return Err(ReleaseError::Config {
                reason: "image.name cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
