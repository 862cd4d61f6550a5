//! `dotnet publish` invocations for the two per-platform build steps.
//!
//! The application projects are opaque build targets; these functions only
//! describe how they are invoked. Both steps stamp `Version` and
//! `FileVersion` into the produced binaries.

use std::path::Path;

use super::platform::PlatformSpec;
use super::settings::PackagerSettings;
use crate::process::Invocation;
use crate::tools::DOTNET;
use crate::version::ReleaseVersion;

fn publish_base(
    settings: &PackagerSettings,
    project: &Path,
    platform: &PlatformSpec,
    version: &ReleaseVersion,
    output_dir: &Path,
) -> Invocation {
    Invocation::new(DOTNET)
        .arg("publish")
        .arg(project.display().to_string())
        .args(["-c", settings.configuration()])
        .args(["-r", platform.runtime_id])
        .args(["--self-contained", "true"])
        .arg("-o")
        .arg(output_dir.display().to_string())
        .arg(format!("-p:Version={version}"))
        .arg(format!("-p:FileVersion={}", version.file_version()))
        .timeout(settings.publish_timeout())
}

/// Companion desktop bundle publish into its per-runtime directory.
pub fn companion_invocation(
    settings: &PackagerSettings,
    platform: &PlatformSpec,
    version: &ReleaseVersion,
) -> Invocation {
    publish_base(
        settings,
        settings.companion_project(),
        platform,
        version,
        &settings.companion_bundle_dir(platform),
    )
}

/// Agent publish as a compressed single-file, self-contained executable
/// with app settings embedded and the platform's companion archive attached.
pub fn agent_invocation(
    settings: &PackagerSettings,
    platform: &PlatformSpec,
    version: &ReleaseVersion,
    companion_archive: &Path,
) -> Invocation {
    publish_base(
        settings,
        settings.agent_project(),
        platform,
        version,
        &settings.agent_output_dir(platform),
    )
    .args([
        "-p:PublishSingleFile=true",
        "-p:UseAppHost=true",
        "-p:IncludeAllContentForSelfExtract=true",
        "-p:IncludeAppSettingsInSingleFile=true",
        "-p:EnableCompressionInSingleFile=true",
    ])
    .arg(format!("-p:CompanionArchivePath={}", companion_archive.display()))
}
