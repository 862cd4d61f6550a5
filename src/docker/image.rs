//! Docker image building and tagging.

use std::path::PathBuf;

use crate::cli::Reporter;
use crate::error::{ReleaseError, Result};
use crate::process::{CommandRunner, Invocation};
use crate::tools::DOCKER;
use crate::version::ReleaseVersion;

use super::config::{
    BUILD_CONFIGURATION_ARG, CURRENT_VERSION_ARG, DOCKER_BUILD_TIMEOUT, DOCKER_TAG_TIMEOUT,
};
use super::tag::ImageReference;

/// Everything needed to build one image.
#[derive(Clone, Debug)]
pub struct ImageBuildRequest {
    /// Primary reference the image is built under
    pub image: ImageReference,
    /// Dockerfile path
    pub dockerfile: PathBuf,
    /// Build context directory
    pub context: PathBuf,
    /// `--platform` value, possibly a comma-separated list
    pub platform: String,
    /// `BUILD_CONFIGURATION` build argument
    pub build_configuration: String,
    /// `CURRENT_VERSION` build argument
    pub version: ReleaseVersion,
    /// Disable the build cache
    pub no_cache: bool,
}

impl ImageBuildRequest {
    /// Whether `platform` names more than one target.
    pub fn is_multi_platform(&self) -> bool {
        self.platform.contains(',')
    }

    fn invocation(&self) -> Invocation {
        // The classic builder rejects platform lists; buildx handles them.
        let invocation = if self.is_multi_platform() {
            Invocation::new(DOCKER).args(["buildx", "build"])
        } else {
            Invocation::new(DOCKER).arg("build")
        };

        let mut invocation = invocation
            .args(["--platform", self.platform.as_str()])
            .arg("-f")
            .arg(self.dockerfile.display().to_string())
            .arg("--build-arg")
            .arg(format!("{BUILD_CONFIGURATION_ARG}={}", self.build_configuration))
            .arg("--build-arg")
            .arg(format!("{CURRENT_VERSION_ARG}={}", self.version))
            .arg("-t")
            .arg(self.image.to_string());

        if self.no_cache {
            invocation = invocation.arg("--no-cache");
        }

        invocation
            .arg(self.context.display().to_string())
            .timeout(DOCKER_BUILD_TIMEOUT)
    }
}

/// A locally available image and the alias tag applied to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltImage {
    pub primary: ImageReference,
    pub alias: Option<ImageReference>,
}

impl BuiltImage {
    /// Primary reference first, then the alias if present.
    pub fn references(&self) -> impl Iterator<Item = &ImageReference> {
        std::iter::once(&self.primary).chain(self.alias.as_ref())
    }
}

/// Builds the image and applies the `latest` alias for production tags.
pub struct ImageBuilder<'a, R: CommandRunner> {
    runner: &'a R,
    reporter: &'a dyn Reporter,
}

impl<'a, R: CommandRunner> ImageBuilder<'a, R> {
    pub fn new(runner: &'a R, reporter: &'a dyn Reporter) -> Self {
        Self { runner, reporter }
    }

    /// Builds `request.image`; on failure no tag is created.
    pub async fn build(&self, request: &ImageBuildRequest) -> Result<BuiltImage> {
        self.reporter
            .progress(&format!("Building Docker image: {}", request.image));

        let outcome = self.runner.run(&request.invocation(), self.reporter).await?;
        if !outcome.success() {
            return Err(ReleaseError::ImageBuildFailed {
                image: request.image.to_string(),
                code: outcome.code,
            });
        }
        self.reporter
            .success(&format!("Built {}", request.image));

        let alias = match request.image.latest_alias() {
            Some(alias) => {
                self.tag(&request.image, &alias).await?;
                Some(alias)
            }
            None => None,
        };

        Ok(BuiltImage {
            primary: request.image.clone(),
            alias,
        })
    }

    /// Re-tags an already built image; nothing is rebuilt.
    async fn tag(&self, source: &ImageReference, target: &ImageReference) -> Result<()> {
        let invocation = Invocation::new(DOCKER)
            .arg("tag")
            .arg(source.to_string())
            .arg(target.to_string())
            .timeout(DOCKER_TAG_TIMEOUT);

        let outcome = self.runner.run(&invocation, self.reporter).await?;
        if !outcome.success() {
            return Err(ReleaseError::ExecutionFailed {
                command: invocation.to_string(),
                reason: format!(
                    "Failed to tag {source} as {target} (exit code: {})",
                    outcome.code.unwrap_or(-1)
                ),
            });
        }

        self.reporter.success(&format!("Tagged {target}"));
        Ok(())
    }
}
