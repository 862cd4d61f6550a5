//! Docker daemon availability checking.

use crate::cli::Reporter;
use crate::error::{ReleaseError, Result};
use crate::process::{CommandRunner, Invocation};
use crate::tools::DOCKER;

use super::config::{DOCKER_INFO_TIMEOUT, DOCKER_START_HELP};

/// Checks that the Docker daemon is running.
///
/// # Returns
///
/// * `Ok(())` - Docker is available
/// * `Err` - Daemon is not responding or the check timed out
pub async fn check_docker_available<R: CommandRunner>(
    runner: &R,
    reporter: &dyn Reporter,
) -> Result<()> {
    let invocation = Invocation::new(DOCKER)
        .args(["info", "--format", "{{.ServerVersion}}"])
        .timeout(DOCKER_INFO_TIMEOUT);

    let outcome = runner.run(&invocation, reporter).await.map_err(|e| {
        ReleaseError::ExecutionFailed {
            command: "docker info".to_string(),
            reason: format!(
                "Docker daemon check failed: {e}\n\
                 \n\
                 This usually means Docker is not responding.\n\
                 {DOCKER_START_HELP}"
            ),
        }
    })?;

    if outcome.success() {
        return Ok(());
    }

    Err(ReleaseError::ExecutionFailed {
        command: "docker info".to_string(),
        reason: format!(
            "Docker daemon is not responding (exit code: {}).\n\
             \n\
             {DOCKER_START_HELP}\n\
             \n\
             If Docker is installed, ensure the daemon is running.\n\
             If not installed, visit: https://docs.docker.com/get-docker/",
            outcome.code.unwrap_or(-1)
        ),
    })
}
