//! Platform matrix resolution.
//!
//! Maps a platform selector to the ordered list of runtime identifiers to
//! publish. macOS targets cannot be cross-compiled, so `all` drops them on
//! other hosts with a warning instead of failing.

use std::fmt;

use crate::cli::Reporter;
use crate::error::{ReleaseError, Result};

/// Selector that expands to every buildable platform.
pub const ALL_PLATFORMS: &str = "all";

/// Operating system of the machine running the build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostOs {
    Linux,
    MacOs,
    Windows,
}

impl HostOs {
    /// The OS this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    pub fn is_macos(self) -> bool {
        self == Self::MacOs
    }
}

/// One publish target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlatformSpec {
    /// Runtime identifier passed to `dotnet publish -r`
    pub runtime_id: &'static str,
    /// Human-readable name for progress output
    pub display_name: &'static str,
    /// Executable suffix of the agent binary
    pub binary_extension: &'static str,
}

impl PlatformSpec {
    pub const LINUX_X64: Self = Self {
        runtime_id: "linux-x64",
        display_name: "Linux x64",
        binary_extension: "",
    };
    pub const WIN_X64: Self = Self {
        runtime_id: "win-x64",
        display_name: "Windows x64",
        binary_extension: ".exe",
    };
    pub const WIN_X86: Self = Self {
        runtime_id: "win-x86",
        display_name: "Windows x86",
        binary_extension: ".exe",
    };
    pub const OSX_X64: Self = Self {
        runtime_id: "osx-x64",
        display_name: "macOS x64",
        binary_extension: "",
    };
    pub const OSX_ARM64: Self = Self {
        runtime_id: "osx-arm64",
        display_name: "macOS ARM64",
        binary_extension: "",
    };

    /// Every known platform, in build order.
    pub const KNOWN: [Self; 5] = [
        Self::LINUX_X64,
        Self::WIN_X64,
        Self::WIN_X86,
        Self::OSX_X64,
        Self::OSX_ARM64,
    ];

    pub fn is_macos(&self) -> bool {
        self.runtime_id.starts_with("osx-")
    }

    /// File name of the agent executable for this platform.
    pub fn binary_name(&self, agent_name: &str) -> String {
        format!("{agent_name}{}", self.binary_extension)
    }

    fn lookup(runtime_id: &str) -> Option<Self> {
        Self::KNOWN.into_iter().find(|p| p.runtime_id == runtime_id)
    }
}

impl fmt::Display for PlatformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.runtime_id)
    }
}

fn valid_selectors() -> String {
    PlatformSpec::KNOWN
        .iter()
        .map(|p| p.runtime_id)
        .chain(std::iter::once(ALL_PLATFORMS))
        .collect::<Vec<_>>()
        .join(", ")
}

fn unknown_platform(selector: &str) -> ReleaseError {
    ReleaseError::UnknownPlatform {
        selector: selector.to_string(),
        valid: valid_selectors(),
    }
}

/// Rejects unknown selectors without resolving the matrix.
pub fn validate_selector(selector: &str) -> Result<()> {
    if selector == ALL_PLATFORMS || PlatformSpec::lookup(selector).is_some() {
        Ok(())
    } else {
        Err(unknown_platform(selector))
    }
}

/// Resolves `selector` into the ordered build matrix for `host`.
///
/// # Errors
///
/// [`ReleaseError::UnknownPlatform`] for any selector other than a known
/// runtime identifier or `all`.
pub fn resolve_platforms(
    selector: &str,
    host: HostOs,
    reporter: &dyn Reporter,
) -> Result<Vec<PlatformSpec>> {
    if selector == ALL_PLATFORMS {
        let (buildable, skipped): (Vec<_>, Vec<_>) = PlatformSpec::KNOWN
            .into_iter()
            .partition(|p| !p.is_macos() || host.is_macos());

        if !skipped.is_empty() {
            let names = skipped.iter().map(|p| p.runtime_id).collect::<Vec<_>>();
            reporter.warn(&format!(
                "Skipping {} - macOS targets can only be built on a macOS host",
                names.join(", ")
            ));
        }
        return Ok(buildable);
    }

    let platform = PlatformSpec::lookup(selector).ok_or_else(|| unknown_platform(selector))?;

    if platform.is_macos() && !host.is_macos() {
        reporter.warn(&format!(
            "{platform} requested on a non-macOS host; the publish step is expected to fail"
        ));
    }
    Ok(vec![platform])
}
