//! External tool detection.
//!
//! Resolved once per tool before a stage starts so a missing toolchain is
//! reported with an install hint instead of a spawn error mid-run.

use std::path::PathBuf;

use crate::error::{ReleaseError, Result};

/// .NET SDK driver used for both publish steps.
pub const DOTNET: &str = "dotnet";

/// Container toolchain used for build, tag, login and push.
pub const DOCKER: &str = "docker";

/// macOS archiver that preserves resource forks.
pub const DITTO: &str = "ditto";

fn install_hint(tool: &str) -> &'static str {
    match tool {
        DOTNET => "Install the .NET SDK from https://dotnet.microsoft.com/download",
        DOCKER => "Install from https://docs.docker.com/get-docker/",
        DITTO => "ditto ships with macOS; ensure /usr/bin is on PATH",
        _ => "Install it and ensure it is on PATH",
    }
}

/// Locates `tool` on PATH.
pub fn require(tool: &str) -> Result<PathBuf> {
    match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {tool} at: {}", path.display());
            Ok(path)
        }
        Err(e) => {
            log::debug!("{tool} not found in PATH: {e}");
            Err(ReleaseError::ToolNotFound {
                tool: tool.to_string(),
                hint: install_hint(tool).to_string(),
            })
        }
    }
}
