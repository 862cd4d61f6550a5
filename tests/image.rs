//! Image stage: confirmation, build, `latest` aliasing, authentication and
//! push ordering.

mod common;

use std::path::PathBuf;

use agent_release::docker::{PublishOptions, PublishOutcome};
use agent_release::error::ReleaseError;
use agent_release::orchestrator::{ImagePlan, ImageStage, ReleasePipeline, ReleasePlan};
use agent_release::process::{CommandOutcome, Invocation};
use common::{RecordingReporter, ScriptedPrompter, ScriptedRunner, docker_config};

fn image_plan(tag: Option<&str>, publish: PublishOptions) -> ImagePlan {
    ImagePlan {
        registry: "ghcr.io/acme".to_string(),
        name: "remote-agent".to_string(),
        tag: tag.map(str::to_string),
        dockerfile: PathBuf::from("/work/repo/Dockerfile"),
        context: PathBuf::from("/work/repo"),
        platform: "linux/amd64".to_string(),
        build_configuration: "Release".to_string(),
        no_cache: false,
        publish,
        assume_yes: true,
    }
}

fn release(version: &str, image: ImagePlan) -> ReleasePlan {
    ReleasePlan {
        version: version.to_string(),
        package: None,
        image: Some(image),
    }
}

fn is_push(invocation: &Invocation) -> bool {
    invocation.program() == "docker" && invocation.arguments().first().map(String::as_str) == Some("push")
}

fn pushed(runner: &ScriptedRunner) -> Vec<String> {
    runner
        .calls()
        .iter()
        .filter(|c| is_push(c))
        .map(|c| c.arguments()[1].clone())
        .collect()
}

#[tokio::test]
async fn production_tag_builds_aliases_and_pushes_both() {
    let creds = tempfile::tempdir().unwrap();
    let config = docker_config(creds.path(), &["ghcr.io"]);
    let runner = ScriptedRunner::toolchain();
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let plan = release("1.2.3", image_plan(Some("v1.2.3"), PublishOptions::default()));
    let outcome = ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(Some(config))
        .run(&plan)
        .await
        .unwrap();

    let commands = runner.commands();
    assert_eq!(commands.len(), 5, "{commands:#?}");
    assert!(commands[0].starts_with("docker info"));
    assert_eq!(
        commands[1],
        "docker build --platform linux/amd64 -f /work/repo/Dockerfile \
         --build-arg BUILD_CONFIGURATION=Release --build-arg CURRENT_VERSION=1.2.3 \
         -t ghcr.io/acme/remote-agent:v1.2.3 /work/repo"
    );
    assert_eq!(
        commands[2],
        "docker tag ghcr.io/acme/remote-agent:v1.2.3 ghcr.io/acme/remote-agent:latest"
    );
    assert_eq!(
        pushed(&runner),
        [
            "ghcr.io/acme/remote-agent:v1.2.3",
            "ghcr.io/acme/remote-agent:latest"
        ]
    );

    match outcome.image {
        ImageStage::Built { image, publish } => {
            assert_eq!(image.primary.to_string(), "ghcr.io/acme/remote-agent:v1.2.3");
            assert!(image.alias.is_some());
            assert_eq!(
                publish,
                PublishOutcome::Pushed(vec![
                    "ghcr.io/acme/remote-agent:v1.2.3".to_string(),
                    "ghcr.io/acme/remote-agent:latest".to_string(),
                ])
            );
        }
        other => panic!("unexpected stage: {other:?}"),
    }
    assert!(prompter.asked().is_empty());
}

#[tokio::test]
async fn prerelease_defaults_tag_to_version_without_alias() {
    let creds = tempfile::tempdir().unwrap();
    let config = docker_config(creds.path(), &["ghcr.io"]);
    let runner = ScriptedRunner::toolchain();
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let plan = release("1.2.3-beta.1", image_plan(None, PublishOptions::default()));
    ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(Some(config))
        .run(&plan)
        .await
        .unwrap();

    assert_eq!(runner.count("docker", "tag"), 0);
    assert_eq!(pushed(&runner), ["ghcr.io/acme/remote-agent:1.2.3-beta.1"]);
}

#[tokio::test]
async fn failed_alias_push_reports_published_primary() {
    let creds = tempfile::tempdir().unwrap();
    let config = docker_config(creds.path(), &["ghcr.io"]);
    let runner = ScriptedRunner::new(|invocation| {
        if is_push(invocation) && invocation.arguments()[1].ends_with(":latest") {
            CommandOutcome::failure(1)
        } else {
            CommandOutcome::SUCCESS
        }
    });
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let plan = release("2.0.0", image_plan(None, PublishOptions::default()));
    let err = ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(Some(config))
        .run(&plan)
        .await
        .unwrap_err();

    match &err {
        ReleaseError::PushFailed { reference, published } => {
            assert_eq!(reference, "ghcr.io/acme/remote-agent:latest");
            assert_eq!(published, &["ghcr.io/acme/remote-agent:2.0.0".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.follow_up().as_deref(),
        Some("docker push ghcr.io/acme/remote-agent:latest")
    );
}

#[tokio::test]
async fn failed_primary_push_skips_alias() {
    let creds = tempfile::tempdir().unwrap();
    let config = docker_config(creds.path(), &["ghcr.io"]);
    let runner = ScriptedRunner::new(|invocation| {
        if is_push(invocation) {
            CommandOutcome::failure(1)
        } else {
            CommandOutcome::SUCCESS
        }
    });
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let plan = release("2.0.0", image_plan(None, PublishOptions::default()));
    let err = ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(Some(config))
        .run(&plan)
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::PushFailed { ref published, .. } if published.is_empty()));
    assert_eq!(runner.count("docker", "push"), 1);
}

#[tokio::test]
async fn unauthenticated_non_interactive_fails_without_pushing() {
    let creds = tempfile::tempdir().unwrap();
    let config = docker_config(creds.path(), &["docker.io"]);
    let runner = ScriptedRunner::toolchain();
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let plan = release("1.0.0", image_plan(None, PublishOptions::default()));
    let err = ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(Some(config))
        .run(&plan)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReleaseError::AuthenticationRequiredNonInteractive { ref registry, .. } if registry == "ghcr.io"
    ));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(runner.count("docker", "build"), 1);
    assert_eq!(runner.count("docker", "push"), 0);
    assert!(runner.interactive_calls().is_empty());
}

#[tokio::test]
async fn declined_login_keeps_image_local() {
    let creds = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::toolchain();
    let prompter = ScriptedPrompter::interactive(&[false]);
    let reporter = RecordingReporter::default();

    let plan = release("1.0.0", image_plan(None, PublishOptions::default()));
    let outcome = ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(Some(creds.path().join("config.json")))
        .run(&plan)
        .await
        .unwrap();

    assert!(matches!(
        outcome.image,
        ImageStage::Built { publish: PublishOutcome::LoginDeclined, .. }
    ));
    assert_eq!(prompter.asked().len(), 1);
    assert_eq!(runner.count("docker", "push"), 0);
    assert!(runner.interactive_calls().is_empty());
    assert!(reporter.contains("docker push ghcr.io/acme/remote-agent:1.0.0"));
}

#[tokio::test]
async fn accepted_login_runs_docker_login_then_pushes() {
    let creds = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::toolchain();
    let prompter = ScriptedPrompter::interactive(&[true]);
    let reporter = RecordingReporter::default();

    let plan = release("1.0.0", image_plan(None, PublishOptions::default()));
    ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(Some(creds.path().join("config.json")))
        .run(&plan)
        .await
        .unwrap();

    let logins = runner.interactive_calls();
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0].to_string(), "docker login ghcr.io");
    assert_eq!(runner.count("docker", "push"), 2);
}

#[tokio::test]
async fn failed_login_is_an_error() {
    let creds = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new(|invocation| {
        if invocation.arguments().first().map(String::as_str) == Some("login") {
            CommandOutcome::failure(1)
        } else {
            CommandOutcome::SUCCESS
        }
    });
    let prompter = ScriptedPrompter::interactive(&[true]);
    let reporter = RecordingReporter::default();

    let plan = release("1.0.0", image_plan(None, PublishOptions::default()));
    let err = ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(Some(creds.path().join("config.json")))
        .run(&plan)
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::LoginFailed { .. }));
    assert_eq!(
        err.follow_up().as_deref(),
        Some("docker login ghcr.io && docker push ghcr.io/acme/remote-agent:1.0.0")
    );
    assert_eq!(runner.count("docker", "push"), 0);
}

#[tokio::test]
async fn skip_login_check_pushes_without_credentials() {
    let creds = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::toolchain();
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let options = PublishOptions {
        no_push: false,
        skip_login_check: true,
    };
    let plan = release("1.0.0", image_plan(None, options));
    ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(Some(creds.path().join("config.json")))
        .run(&plan)
        .await
        .unwrap();

    assert_eq!(runner.count("docker", "push"), 2);
}

#[tokio::test]
async fn no_push_builds_and_tags_only() {
    let runner = ScriptedRunner::toolchain();
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let options = PublishOptions {
        no_push: true,
        skip_login_check: false,
    };
    let plan = release("3.1.4", image_plan(None, options));
    let outcome = ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(None)
        .run(&plan)
        .await
        .unwrap();

    assert!(matches!(
        outcome.image,
        ImageStage::Built { publish: PublishOutcome::Skipped, .. }
    ));
    assert_eq!(runner.count("docker", "tag"), 1);
    assert_eq!(runner.count("docker", "push"), 0);
}

#[tokio::test]
async fn declined_build_confirmation_cancels_before_docker() {
    let runner = ScriptedRunner::toolchain();
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let mut image = image_plan(None, PublishOptions::default());
    image.assume_yes = false;
    let outcome = ReleasePipeline::new(&runner, &prompter, &reporter)
        .run(&release("1.0.0", image))
        .await
        .unwrap();

    assert_eq!(outcome.image, ImageStage::Cancelled);
    assert!(runner.calls().is_empty());
    assert!(reporter.warnings().iter().any(|w| w.contains("--yes")));
}

#[tokio::test]
async fn confirmed_build_proceeds() {
    let runner = ScriptedRunner::toolchain();
    let prompter = ScriptedPrompter::interactive(&[true]);
    let reporter = RecordingReporter::default();

    let mut image = image_plan(None, PublishOptions { no_push: true, skip_login_check: false });
    image.assume_yes = false;
    image.no_cache = true;
    ReleasePipeline::new(&runner, &prompter, &reporter)
        .run(&release("1.0.0", image))
        .await
        .unwrap();

    assert_eq!(prompter.asked(), ["Continue with build?"]);
    let build = runner
        .calls()
        .into_iter()
        .find(|c| c.arguments().first().map(String::as_str) == Some("build"))
        .unwrap();
    assert!(build.arguments().contains(&"--no-cache".to_string()));
}

#[tokio::test]
async fn failed_build_creates_no_tags() {
    let runner = ScriptedRunner::new(|invocation| {
        if invocation.arguments().first().map(String::as_str) == Some("build") {
            CommandOutcome::failure(2)
        } else {
            CommandOutcome::SUCCESS
        }
    });
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let err = ReleasePipeline::new(&runner, &prompter, &reporter)
        .run(&release("1.0.0", image_plan(None, PublishOptions::default())))
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::ImageBuildFailed { code: Some(2), .. }));
    assert_eq!(runner.count("docker", "tag"), 0);
    assert_eq!(runner.count("docker", "push"), 0);
}

#[tokio::test]
async fn unavailable_daemon_stops_before_build() {
    let runner = ScriptedRunner::new(|invocation| {
        if invocation.arguments().first().map(String::as_str) == Some("info") {
            CommandOutcome::failure(1)
        } else {
            CommandOutcome::SUCCESS
        }
    });
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let err = ReleasePipeline::new(&runner, &prompter, &reporter)
        .run(&release("1.0.0", image_plan(None, PublishOptions::default())))
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::ExecutionFailed { .. }));
    assert_eq!(runner.count("docker", "build"), 0);
}

#[tokio::test]
async fn platform_list_builds_with_buildx_then_tags_and_pushes() {
    let creds = tempfile::tempdir().unwrap();
    let config = docker_config(creds.path(), &["ghcr.io"]);
    let runner = ScriptedRunner::toolchain();
    let prompter = ScriptedPrompter::non_interactive();
    let reporter = RecordingReporter::default();

    let mut image = image_plan(Some("2.0.0"), PublishOptions::default());
    image.platform = "linux/amd64,linux/arm64".to_string();
    ReleasePipeline::new(&runner, &prompter, &reporter)
        .with_docker_config(Some(config))
        .run(&release("2.0.0", image))
        .await
        .unwrap();

    let commands = runner.commands();
    assert!(
        commands[1].starts_with("docker buildx build --platform linux/amd64,linux/arm64 "),
        "{commands:#?}"
    );
    assert_eq!(runner.count("docker", "build"), 0);
    assert_eq!(runner.count("docker", "buildx"), 1);
    assert_eq!(runner.count("docker", "tag"), 1);
    assert_eq!(
        pushed(&runner),
        ["ghcr.io/acme/remote-agent:2.0.0", "ghcr.io/acme/remote-agent:latest"]
    );
}
