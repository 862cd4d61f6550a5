//! Per-platform artifact packaging.
//!
//! # Overview
//!
//! The packager:
//! 1. Resolves the platform matrix ([`resolve_platforms`])
//! 2. Publishes the companion bundle and archives it into the platform's
//!    staging slot ([`StagingArea`])
//! 3. Publishes the self-contained agent executable
//! 4. Verifies the executable exists at its deterministic path
//! 5. Writes the version marker once every platform succeeded
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA-256 of verified executables
//! - [`fs`] - Idempotent file system helpers
//! - [`packager`] - Main [`ArtifactPackager`]
//! - [`platform`] - Platform matrix resolution
//! - [`publish`] - `dotnet publish` invocations
//! - [`settings`] - Resolved [`PackagerSettings`]
//! - [`staging`] - Per-platform companion archive slots

pub mod checksum;
pub mod fs;
pub mod packager;
pub mod platform;
pub mod publish;
pub mod settings;
pub mod staging;

pub use packager::{ArtifactPackager, BuildArtifact, PackageReport};
pub use platform::{HostOs, PlatformSpec, resolve_platforms, validate_selector};
pub use settings::PackagerSettings;
pub use staging::StagingArea;
