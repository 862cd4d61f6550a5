//! Release pipeline sequencing.
//!
//! validate version → resolve platform matrix → package → build image →
//! publish. Each stage returns a `Result`; the first error ends the run.
//! Nothing already produced (artifacts, local images, pushed tags) is
//! rolled back.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::bundler::{ArtifactPackager, PackageReport, PackagerSettings, resolve_platforms};
use crate::cli::Reporter;
use crate::docker::{
    BuiltImage, ImageBuildRequest, ImageBuilder, ImageReference, PublishOptions, PublishOutcome,
    RegistryPublisher, check_docker_available,
};
use crate::error::Result;
use crate::process::CommandRunner;
use crate::prompt::Prompter;
use crate::version::ReleaseVersion;

/// Packaging stage inputs.
#[derive(Clone, Debug)]
pub struct PackagePlan {
    /// Platform selector (`linux-x64`, ..., `all`)
    pub platform: String,
    /// Resolved packaging settings
    pub settings: PackagerSettings,
}

/// Image stage inputs.
#[derive(Clone, Debug)]
pub struct ImagePlan {
    /// Registry prefix
    pub registry: String,
    /// Image repository name
    pub name: String,
    /// Tag; the release version when `None`
    pub tag: Option<String>,
    /// Dockerfile path
    pub dockerfile: PathBuf,
    /// Build context directory
    pub context: PathBuf,
    /// `--platform` value for the image build
    pub platform: String,
    /// `BUILD_CONFIGURATION` build argument
    pub build_configuration: String,
    /// Disable the build cache
    pub no_cache: bool,
    /// Push and authentication flags
    pub publish: PublishOptions,
    /// Skip the build confirmation prompt
    pub assume_yes: bool,
}

/// What to run.
#[derive(Clone, Debug)]
pub struct ReleasePlan {
    /// Raw version string, validated before any stage runs
    pub version: String,
    pub package: Option<PackagePlan>,
    pub image: Option<ImagePlan>,
}

/// How the image stage ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageStage {
    NotRequested,
    /// Operator declined the build confirmation
    Cancelled,
    Built {
        image: BuiltImage,
        publish: PublishOutcome,
    },
}

/// Outcome of a run that did not fail.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub version: ReleaseVersion,
    pub started: DateTime<Utc>,
    pub package: Option<PackageReport>,
    pub image: ImageStage,
}

/// Sequences the release stages over injected process, prompt and output
/// capabilities.
pub struct ReleasePipeline<'a, R: CommandRunner> {
    runner: &'a R,
    prompter: &'a dyn Prompter,
    reporter: &'a dyn Reporter,
    docker_config: Option<Option<PathBuf>>,
}

impl<'a, R: CommandRunner> ReleasePipeline<'a, R> {
    pub fn new(runner: &'a R, prompter: &'a dyn Prompter, reporter: &'a dyn Reporter) -> Self {
        Self {
            runner,
            prompter,
            reporter,
            docker_config: None,
        }
    }

    /// Reads registry credentials from `path` instead of the docker default.
    pub fn with_docker_config(mut self, path: Option<PathBuf>) -> Self {
        self.docker_config = Some(path);
        self
    }

    pub async fn run(&self, plan: &ReleasePlan) -> Result<RunOutcome> {
        let started = Utc::now();
        let version = ReleaseVersion::parse(&plan.version)?;
        self.reporter.verbose(&format!(
            "Version {version} (file version {})",
            version.file_version()
        ));

        let package = match &plan.package {
            Some(package_plan) => Some(self.run_package(package_plan, &version).await?),
            None => None,
        };

        let image = match &plan.image {
            Some(image_plan) => self.run_image(image_plan, &version).await?,
            None => ImageStage::NotRequested,
        };

        Ok(RunOutcome {
            version,
            started,
            package,
            image,
        })
    }

    async fn run_package(&self, plan: &PackagePlan, version: &ReleaseVersion) -> Result<PackageReport> {
        let settings = &plan.settings;
        let platforms = resolve_platforms(&plan.platform, settings.host(), self.reporter)?;

        self.reporter.section("Packaging");
        self.reporter.indent(&format!("Version:   {version}"));
        self.reporter
            .indent(&format!("Platforms: {}", platforms.iter().map(|p| p.runtime_id).collect::<Vec<_>>().join(", ")));
        self.reporter
            .indent(&format!("Output:    {}", settings.output_root().display()));

        ArtifactPackager::new(settings, self.runner, self.reporter)
            .package(&platforms, version)
            .await
    }

    async fn run_image(&self, plan: &ImagePlan, version: &ReleaseVersion) -> Result<ImageStage> {
        let tag = plan.tag.clone().unwrap_or_else(|| version.to_string());
        let reference = ImageReference::new(&plan.registry, &plan.name, tag);

        self.reporter.section("Docker image");
        self.reporter.indent(&format!("Registry:  {}", plan.registry));
        self.reporter.indent(&format!("Image:     {}", plan.name));
        self.reporter.indent(&format!("Tag:       {}", reference.tag));
        self.reporter.indent(&format!("Version:   {version}"));
        self.reporter.indent(&format!("Platform:  {}", plan.platform));
        self.reporter.indent(&format!(
            "Cache:     {}",
            if plan.no_cache { "disabled" } else { "enabled" }
        ));
        self.reporter.indent(&format!(
            "Push:      {}",
            if plan.publish.no_push { "disabled" } else { "enabled" }
        ));
        if let Some(alias) = reference.latest_alias() {
            self.reporter.indent(&format!("Alias:     {alias}"));
        }

        if !plan.assume_yes && !self.prompter.confirm("Continue with build?") {
            if !self.prompter.is_interactive() {
                self.reporter
                    .warn("No terminal available to confirm the build; pass --yes to build non-interactively");
            }
            self.reporter.warn("Build cancelled");
            return Ok(ImageStage::Cancelled);
        }

        check_docker_available(self.runner, self.reporter).await?;

        let request = ImageBuildRequest {
            image: reference,
            dockerfile: plan.dockerfile.clone(),
            context: plan.context.clone(),
            platform: plan.platform.clone(),
            build_configuration: plan.build_configuration.clone(),
            version: version.clone(),
            no_cache: plan.no_cache,
        };
        let image = ImageBuilder::new(self.runner, self.reporter)
            .build(&request)
            .await?;

        self.reporter.section("Publishing");
        let mut publisher = RegistryPublisher::new(self.runner, self.prompter, self.reporter);
        if let Some(path) = &self.docker_config {
            publisher = publisher.with_docker_config(path.clone());
        }
        let publish = publisher.publish(&image, plan.publish).await?;

        Ok(ImageStage::Built { image, publish })
    }
}
