//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap. Each subcommand
//! selects which pipeline stages run; flags override `release.toml`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build-and-release orchestrator for the remote agent
#[derive(Parser, Debug)]
#[command(
    name = "agent_release",
    version,
    about = "Build-and-release orchestrator for the remote agent",
    long_about = "Publishes self-contained agent executables for each platform and builds, tags and pushes the container image.

Usage:
  agent_release package --version 1.2.3 --platform all --clean
  agent_release image --version 1.2.3 --tag v1.2.3 --registry ghcr.io/acme
  agent_release release --version 1.2.3 --image-platform linux/amd64,linux/arm64 --yes

Exit code 0 = success or operator-cancelled; 1 = validation, build or push failure."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to release.toml (defaults to ./release.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print verbose progress
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Pipeline stages to run.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Publish and package agent executables for the platform matrix
    Package {
        #[command(flatten)]
        version: VersionArgs,
        #[command(flatten)]
        package: PackageArgs,
    },
    /// Build, tag and push the container image
    Image {
        #[command(flatten)]
        version: VersionArgs,
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Package every platform, then build and push the image
    Release {
        #[command(flatten)]
        version: VersionArgs,
        #[command(flatten)]
        package: PackageArgs,
        #[command(flatten)]
        image: ImageArgs,
    },
}

/// Release version shared by every subcommand.
#[derive(clap::Args, Debug)]
pub struct VersionArgs {
    /// Release version: MAJOR.MINOR.PATCH[-PRERELEASE]
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pub version: String,
}

/// Packaging flags.
#[derive(clap::Args, Debug)]
pub struct PackageArgs {
    /// Platform to build: linux-x64, win-x64, win-x86, osx-x64, osx-arm64, all
    #[arg(short, long, value_name = "PLATFORM", default_value = "all")]
    pub platform: String,

    /// Remove previous output and staging before building
    #[arg(long)]
    pub clean: bool,
}

/// Image flags.
#[derive(clap::Args, Debug)]
pub struct ImageArgs {
    /// Image tag (defaults to the version)
    #[arg(short, long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Registry prefix, e.g. ghcr.io/acme
    #[arg(short, long, value_name = "URL", env = "AGENT_RELEASE_REGISTRY")]
    pub registry: Option<String>,

    /// Image repository name
    #[arg(long = "image", value_name = "NAME")]
    pub image_name: Option<String>,

    /// Image target platform(s), e.g. linux/amd64,linux/arm64
    #[arg(long, value_name = "PLATFORMS")]
    pub image_platform: Option<String>,

    /// Build without the layer cache
    #[arg(long)]
    pub no_cache: bool,

    /// Build and tag only; do not push
    #[arg(long)]
    pub no_push: bool,

    /// Push without checking stored registry credentials
    #[arg(long = "skip-login")]
    pub skip_login_check: bool,

    /// Build without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The version string, whichever subcommand carries it.
    pub fn version(&self) -> &str {
        match &self.command {
            Command::Package { version, .. }
            | Command::Image { version, .. }
            | Command::Release { version, .. } => &version.version,
        }
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        let image = match &self.command {
            Command::Image { image, .. } | Command::Release { image, .. } => Some(image),
            Command::Package { .. } => None,
        };

        if let Some(image) = image {
            if image.tag.as_deref().is_some_and(|t| t.trim().is_empty()) {
                return Err("Tag cannot be empty".to_string());
            }
            if image.no_push && image.skip_login_check {
                log::debug!("--skip-login has no effect with --no-push");
            }
        }

        Ok(())
    }
}
