//! Build-and-release orchestrator for the remote agent.
//!
//! This library provides the release pipeline:
//! - Version validation against `MAJOR.MINOR.PATCH[-PRERELEASE]`
//! - Self-contained agent executables per platform, each embedding a
//!   freshly published companion bundle
//! - Container image build, `latest` aliasing and registry push
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod config;
pub mod docker;
pub mod error;
pub mod orchestrator;
pub mod process;
pub mod prompt;
pub mod tools;
pub mod version;

// Re-export commonly used types
pub use config::ReleaseConfig;
pub use error::{ReleaseError, Result};
pub use orchestrator::{ImagePlan, ImageStage, PackagePlan, ReleasePipeline, ReleasePlan, RunOutcome};
pub use version::ReleaseVersion;
