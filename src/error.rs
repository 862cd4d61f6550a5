//! Error taxonomy for release operations.
//!
//! Every variant is fatal to the current run. Variants that have an obvious
//! manual next step expose it through [`ReleaseError::follow_up`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Grammar accepted by the version validator, shown to the operator on rejection.
pub const VERSION_GRAMMAR: &str = "MAJOR.MINOR.PATCH[-PRERELEASE] (e.g. 1.2.3 or 1.2.3-beta.1)";

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Version string does not match the release grammar
    #[error("Invalid version format: '{input}'. Expected {}", VERSION_GRAMMAR)]
    InvalidVersionFormat {
        /// Rejected input
        input: String,
    },

    /// Platform selector is not one of the known runtime identifiers
    #[error("Unknown platform: '{selector}'. Valid platforms: {valid}")]
    UnknownPlatform {
        /// Rejected selector
        selector: String,
        /// Comma-separated list of accepted selectors
        valid: String,
    },

    /// Companion desktop bundle publish exited non-zero
    #[error("Companion bundle build failed for {platform} (exit code: {})", display_code(.code))]
    CompanionBuildFailed {
        /// Runtime identifier
        platform: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
    },

    /// Agent publish exited non-zero
    #[error("Agent build failed for {platform} (exit code: {})", display_code(.code))]
    AgentBuildFailed {
        /// Runtime identifier
        platform: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
    },

    /// Agent publish reported success but the executable is missing
    #[error("Expected artifact for {platform} not found at {}", .path.display())]
    ArtifactNotFound {
        /// Runtime identifier
        platform: String,
        /// Deterministic executable path that was checked
        path: PathBuf,
    },

    /// Container image build failed
    #[error("Docker image build failed for {image} (exit code: {})", display_code(.code))]
    ImageBuildFailed {
        /// Image reference that was being built
        image: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
    },

    /// Interactive registry login was attempted and failed
    #[error("Login to {registry} failed. Image {image} was built but not pushed")]
    LoginFailed {
        /// Registry host
        registry: String,
        /// Locally available image reference
        image: String,
    },

    /// No credentials for the registry and no terminal to ask for them
    #[error(
        "Not authenticated to {registry} and no interactive terminal is available. \
         Image {image} remains available locally"
    )]
    AuthenticationRequiredNonInteractive {
        /// Registry host
        registry: String,
        /// Locally available image reference
        image: String,
    },

    /// A push failed; `published` lists references that did make it
    #[error("Failed to push {reference}{}", published_note(.published))]
    PushFailed {
        /// Reference whose push failed
        reference: String,
        /// References already published before the failure
        published: Vec<String>,
    },

    /// Required external tool is missing from PATH
    #[error("Required tool '{tool}' not found in PATH. {hint}")]
    ToolNotFound {
        /// Tool binary name
        tool: String,
        /// Installation hint
        hint: String,
    },

    /// Configuration is inconsistent or incomplete
    #[error("Configuration error: {reason}")]
    Config {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed before producing an exit status
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Docker credential file parse errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// release.toml parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Archive creation errors
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal errors
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "terminated by signal".to_string(), |c| c.to_string())
}

fn published_note(published: &[String]) -> String {
    if published.is_empty() {
        String::new()
    } else {
        format!(" (already published: {})", published.join(", "))
    }
}

impl ReleaseError {
    /// Exact command the operator can run manually to recover, if any.
    pub fn follow_up(&self) -> Option<String> {
        match self {
            Self::InvalidVersionFormat { .. } => {
                Some("agent_release release --version 1.2.3".to_string())
            }
            Self::LoginFailed { registry, image }
            | Self::AuthenticationRequiredNonInteractive { registry, image } => {
                Some(format!("docker login {registry} && docker push {image}"))
            }
            Self::PushFailed { reference, .. } => Some(format!("docker push {reference}")),
            Self::ArtifactNotFound { platform, .. } => Some(format!(
                "agent_release package --clean --platform {platform} --version <VERSION>"
            )),
            _ => None,
        }
    }

    /// Platform or tag the failure is attached to, when applicable.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::CompanionBuildFailed { platform, .. }
            | Self::AgentBuildFailed { platform, .. }
            | Self::ArtifactNotFound { platform, .. } => Some(platform),
            Self::ImageBuildFailed { image, .. }
            | Self::LoginFailed { image, .. }
            | Self::AuthenticationRequiredNonInteractive { image, .. } => Some(image),
            Self::PushFailed { reference, .. } => Some(reference),
            _ => None,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
