//! End-of-run summary.

use chrono::Utc;

use super::output::Reporter;
use crate::docker::PublishOutcome;
use crate::error::ReleaseError;
use crate::orchestrator::{ImageStage, RunOutcome};

/// Convert seconds to human-readable duration
///
/// # Examples
/// - `humanize_duration(1)` → "1 second"
/// - `humanize_duration(90)` → "1 minute"
pub fn humanize_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);

    let (value, unit) = if seconds < 60 {
        (seconds, if seconds == 1 { "second" } else { "seconds" })
    } else if seconds < 3600 {
        let mins = seconds / 60;
        (mins, if mins == 1 { "minute" } else { "minutes" })
    } else {
        let hours = seconds / 3600;
        (hours, if hours == 1 { "hour" } else { "hours" })
    };

    format!("{value} {unit}")
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// Prints artifacts, image references and elapsed time for a finished run.
pub fn report_outcome(outcome: &RunOutcome, reporter: &dyn Reporter) {
    reporter.section("Summary");
    reporter.indent(&format!("Version: {}", outcome.version));

    if let Some(package) = &outcome.package {
        reporter.indent(&format!("Artifacts ({}):", package.artifacts.len()));
        for artifact in &package.artifacts {
            reporter.indent(&format!(
                "  {:<10} {} ({})",
                artifact.platform.runtime_id,
                artifact.executable.display(),
                format_size(artifact.size)
            ));
            reporter.verbose(&format!("  sha256 {}", artifact.sha256));
        }
        reporter.indent(&format!(
            "Version marker: {}",
            package.version_marker.display()
        ));
    }

    match &outcome.image {
        ImageStage::NotRequested => {}
        ImageStage::Cancelled => reporter.warn("Image build cancelled by operator"),
        ImageStage::Built { image, publish } => {
            reporter.indent(&format!("Image: {}", image.primary));
            if let Some(alias) = &image.alias {
                reporter.indent(&format!("Alias: {alias}"));
            }
            match publish {
                PublishOutcome::Skipped => reporter.indent("Push: skipped (--no-push)"),
                PublishOutcome::LoginDeclined => {
                    reporter.warn("Push: not performed, registry login declined")
                }
                PublishOutcome::Pushed(references) => {
                    reporter.indent(&format!("Pushed: {}", references.join(", ")))
                }
            }
        }
    }

    let elapsed = (Utc::now() - outcome.started).num_seconds();
    reporter.success(&format!("Done in {}", humanize_duration(elapsed)));
}

/// Prints a failure with its subject and the manual recovery command.
///
/// Every line goes through [`Reporter::error`] so `--quiet` keeps them.
pub fn report_error(error: &ReleaseError, reporter: &dyn Reporter) {
    reporter.error(&error.to_string());
    if let Some(subject) = error.subject() {
        reporter.error(&format!("Affected: {subject}"));
    }
    if let Some(command) = error.follow_up() {
        reporter.error(&format!("Run manually: {command}"));
    }
}
