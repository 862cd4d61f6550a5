//! Docker invocation constants.

use std::time::Duration;

/// Alias tag applied to production releases.
pub const LATEST_TAG: &str = "latest";

/// Timeout for Docker info check (5 seconds)
/// Quick daemon availability check shouldn't take long
pub const DOCKER_INFO_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for Docker image build operations (30 minutes)
/// Image builds can take a long time due to base image downloads, restores, etc.
pub const DOCKER_BUILD_TIMEOUT: Duration = Duration::from_secs(1800);

/// Timeout for re-tagging an existing image
pub const DOCKER_TAG_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a single image push (20 minutes)
pub const DOCKER_PUSH_TIMEOUT: Duration = Duration::from_secs(1200);

/// Timeout for an interactive `docker login`
pub const DOCKER_LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Build argument carrying the build configuration
pub const BUILD_CONFIGURATION_ARG: &str = "BUILD_CONFIGURATION";

/// Build argument carrying the release version
pub const CURRENT_VERSION_ARG: &str = "CURRENT_VERSION";

/// Platform-specific Docker startup instructions
#[cfg(target_os = "macos")]
pub const DOCKER_START_HELP: &str = "Start Docker Desktop from Applications or Spotlight";

#[cfg(target_os = "linux")]
pub const DOCKER_START_HELP: &str = "Start Docker daemon: sudo systemctl start docker";

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub const DOCKER_START_HELP: &str = "Start Docker Desktop";
