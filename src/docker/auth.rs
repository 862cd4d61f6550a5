//! Registry authentication state.
//!
//! Credentials belong to the docker CLI; this module only reads its config
//! file (`$DOCKER_CONFIG/config.json`, else `~/.docker/config.json`) to see
//! whether the target registry has an entry in `auths` or `credHelpers`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Authentication state for the target registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryAuthState {
    /// Stored credentials exist for the registry
    Authenticated,
    /// No credentials, but an operator can be asked to log in
    PromptAvailable,
    /// No credentials and nobody to ask
    NonInteractive,
}

impl RegistryAuthState {
    pub fn resolve(has_credentials: bool, interactive: bool) -> Self {
        match (has_credentials, interactive) {
            (true, _) => Self::Authenticated,
            (false, true) => Self::PromptAvailable,
            (false, false) => Self::NonInteractive,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DockerConfig {
    auths: HashMap<String, serde_json::Value>,
    cred_helpers: HashMap<String, String>,
}

/// Location of the docker CLI config file.
pub fn docker_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("DOCKER_CONFIG") {
        return Some(PathBuf::from(dir).join("config.json"));
    }
    dirs::home_dir().map(|home| home.join(".docker").join("config.json"))
}

/// Reduces a credential key (`https://index.docker.io/v1/`, `ghcr.io`, ...)
/// to a comparable host name.
fn normalize_host(key: &str) -> &str {
    let key = key
        .strip_prefix("https://")
        .or_else(|| key.strip_prefix("http://"))
        .unwrap_or(key);
    let host = key.split('/').next().unwrap_or(key);
    match host {
        "index.docker.io" | "registry-1.docker.io" | "registry.hub.docker.com" => "docker.io",
        other => other,
    }
}

/// Whether the docker config at `config_path` holds credentials for `host`.
///
/// A missing file means no credentials; a malformed one is an error.
pub fn has_credentials(config_path: &Path, host: &str) -> Result<bool> {
    let text = match std::fs::read_to_string(config_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No docker config at {}", config_path.display());
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    let config: DockerConfig = serde_json::from_str(&text)?;
    let wanted = normalize_host(host);

    let found = config
        .auths
        .keys()
        .chain(config.cred_helpers.keys())
        .any(|key| normalize_host(key) == wanted);

    log::debug!(
        "Credentials for {wanted} in {}: {found}",
        config_path.display()
    );
    Ok(found)
}
