//! Command line interface for the release orchestrator.
//!
//! Parses arguments, merges them over `release.toml`, checks the external
//! toolchain, then hands a [`ReleasePlan`] to the pipeline.

mod args;
pub mod output;
mod summary;

pub use args::{Args, Command, ImageArgs, PackageArgs, VersionArgs};
pub use output::{OutputManager, Reporter};
pub use summary::{format_size, humanize_duration, report_error, report_outcome};

use std::path::Path;

use crate::bundler::settings::absolute;
use crate::bundler::{PackagerSettings, validate_selector};
use crate::config::ReleaseConfig;
use crate::docker::PublishOptions;
use crate::error::{ReleaseError, Result};
use crate::orchestrator::{ImagePlan, PackagePlan, ReleasePipeline, ReleasePlan, RunOutcome};
use crate::process::TokioCommandRunner;
use crate::prompt::TerminalPrompter;
use crate::tools;
use crate::version::ReleaseVersion;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let output = OutputManager::new(args.verbose, args.quiet);

    if let Err(reason) = args.validate() {
        output.error(&reason);
        return Ok(1);
    }

    match execute(&args, &output).await {
        Ok(outcome) => {
            report_outcome(&outcome, &output);
            Ok(0)
        }
        Err(e) => {
            log::debug!("Release failed: {e:?}");
            report_error(&e, &output);
            Ok(e.exit_code())
        }
    }
}

async fn execute(args: &Args, output: &OutputManager) -> Result<RunOutcome> {
    // Input errors are reported before any tool lookup.
    ReleaseVersion::parse(args.version())?;

    let base_dir = std::env::current_dir()?;
    let config = ReleaseConfig::discover(args.config.as_deref(), &base_dir)?;
    let plan = build_plan(args, &config, &base_dir)?;

    if let Some(package) = &plan.package {
        validate_selector(&package.platform)?;
        tools::require(tools::DOTNET)?;
        if package.settings.host().is_macos() {
            tools::require(tools::DITTO)?;
        }
    }
    if plan.image.is_some() {
        tools::require(tools::DOCKER)?;
    }

    let runner = TokioCommandRunner;
    let prompter = TerminalPrompter::detect();
    ReleasePipeline::new(&runner, prompter.as_ref(), output)
        .run(&plan)
        .await
}

/// Merges parsed arguments over the loaded configuration.
pub fn build_plan(args: &Args, config: &ReleaseConfig, base_dir: &Path) -> Result<ReleasePlan> {
    let (package, image) = match &args.command {
        Command::Package { package, .. } => (Some(package), None),
        Command::Image { image, .. } => (None, Some(image)),
        Command::Release { package, image, .. } => (Some(package), Some(image)),
    };

    Ok(ReleasePlan {
        version: args.version().to_string(),
        package: package
            .map(|p| package_plan(p, config, base_dir))
            .transpose()?,
        image: image.map(|i| image_plan(i, config, base_dir)).transpose()?,
    })
}

fn package_plan(args: &PackageArgs, config: &ReleaseConfig, base_dir: &Path) -> Result<PackagePlan> {
    let settings = PackagerSettings::from_config(&config.project, base_dir)?.with_clean(args.clean);

    Ok(PackagePlan {
        platform: args.platform.clone(),
        settings,
    })
}

fn image_plan(args: &ImageArgs, config: &ReleaseConfig, base_dir: &Path) -> Result<ImagePlan> {
    let image = &config.image;
    let registry = args
        .registry
        .clone()
        .unwrap_or_else(|| image.registry.clone());
    if registry.trim().is_empty() {
        return Err(ReleaseError::Config {
            reason: "Registry cannot be empty".to_string(),
        });
    }

    Ok(ImagePlan {
        registry,
        name: args
            .image_name
            .clone()
            .unwrap_or_else(|| image.name.clone()),
        tag: args.tag.clone(),
        dockerfile: absolute(&image.dockerfile, base_dir)?,
        context: absolute(&image.context, base_dir)?,
        platform: args
            .image_platform
            .clone()
            .unwrap_or_else(|| image.platform.clone()),
        build_configuration: image.build_configuration.clone(),
        no_cache: args.no_cache,
        publish: PublishOptions {
            no_push: args.no_push,
            skip_login_check: args.skip_login_check,
        },
        assume_yes: args.yes,
    })
}
