//! Registry publishing.
//!
//! Decides whether to push at all, resolves authentication, then pushes the
//! primary tag followed by the `latest` alias. A failed primary push stops
//! before the alias; a failed alias push after a successful primary push is
//! still a failure, and the already-published reference is reported.

use std::path::PathBuf;

use crate::cli::Reporter;
use crate::error::{ReleaseError, Result};
use crate::process::{CommandRunner, Invocation};
use crate::prompt::Prompter;
use crate::tools::DOCKER;

use super::auth::{RegistryAuthState, docker_config_path, has_credentials};
use super::config::{DOCKER_LOGIN_TIMEOUT, DOCKER_PUSH_TIMEOUT};
use super::image::BuiltImage;

/// Flags controlling the publish stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Skip pushing entirely
    pub no_push: bool,
    /// Push without inspecting stored credentials
    pub skip_login_check: bool,
}

/// How the publish stage ended without error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// `--no-push`; the image stays local
    Skipped,
    /// Operator declined to log in; the image stays local
    LoginDeclined,
    /// Every listed reference was pushed
    Pushed(Vec<String>),
}

/// Pushes built images to their registry.
pub struct RegistryPublisher<'a, R: CommandRunner> {
    runner: &'a R,
    prompter: &'a dyn Prompter,
    reporter: &'a dyn Reporter,
    docker_config: Option<PathBuf>,
}

impl<'a, R: CommandRunner> RegistryPublisher<'a, R> {
    pub fn new(runner: &'a R, prompter: &'a dyn Prompter, reporter: &'a dyn Reporter) -> Self {
        Self {
            runner,
            prompter,
            reporter,
            docker_config: docker_config_path(),
        }
    }

    /// Reads credentials from `path` instead of the docker CLI default.
    pub fn with_docker_config(mut self, path: Option<PathBuf>) -> Self {
        self.docker_config = path;
        self
    }

    /// Inspects stored credentials for the image's registry.
    pub fn auth_state(&self, image: &BuiltImage) -> Result<RegistryAuthState> {
        let host = image.primary.registry_host();
        let has_credentials = match &self.docker_config {
            Some(path) => has_credentials(path, host)?,
            None => false,
        };
        Ok(RegistryAuthState::resolve(
            has_credentials,
            self.prompter.is_interactive(),
        ))
    }

    pub async fn publish(&self, image: &BuiltImage, options: PublishOptions) -> Result<PublishOutcome> {
        if options.no_push {
            self.reporter.success(&format!(
                "Push disabled; image available locally as {}",
                image.primary
            ));
            return Ok(PublishOutcome::Skipped);
        }

        if options.skip_login_check {
            self.reporter.verbose("Skipping registry login check");
        } else {
            let host = image.primary.registry_host().to_string();
            match self.auth_state(image)? {
                RegistryAuthState::Authenticated => {
                    self.reporter.verbose(&format!("Credentials found for {host}"));
                }
                RegistryAuthState::PromptAvailable => {
                    if !self
                        .prompter
                        .confirm(&format!("Not logged in to {host}. Log in now?"))
                    {
                        self.reporter.warn(&format!(
                            "Login declined. Image {} is available locally; push it later with:",
                            image.primary
                        ));
                        for reference in image.references() {
                            self.reporter.indent(&format!("docker push {reference}"));
                        }
                        return Ok(PublishOutcome::LoginDeclined);
                    }
                    self.login(&host, image).await?;
                }
                RegistryAuthState::NonInteractive => {
                    return Err(ReleaseError::AuthenticationRequiredNonInteractive {
                        registry: host,
                        image: image.primary.to_string(),
                    });
                }
            }
        }

        self.push(image).await
    }

    async fn login(&self, host: &str, image: &BuiltImage) -> Result<()> {
        let invocation = Invocation::new(DOCKER)
            .args(["login", host])
            .timeout(DOCKER_LOGIN_TIMEOUT);

        let succeeded = match self.runner.run_interactive(&invocation).await {
            Ok(outcome) => outcome.success(),
            Err(e) => {
                log::warn!("docker login could not run: {e}");
                false
            }
        };

        if !succeeded {
            return Err(ReleaseError::LoginFailed {
                registry: host.to_string(),
                image: image.primary.to_string(),
            });
        }

        self.reporter.success(&format!("Logged in to {host}"));
        Ok(())
    }

    async fn push(&self, image: &BuiltImage) -> Result<PublishOutcome> {
        let mut published = Vec::new();

        for reference in image.references() {
            let reference = reference.to_string();
            self.reporter.progress(&format!("Pushing {reference}..."));

            let invocation = Invocation::new(DOCKER)
                .args(["push", reference.as_str()])
                .timeout(DOCKER_PUSH_TIMEOUT);

            let pushed = match self.runner.run(&invocation, self.reporter).await {
                Ok(outcome) => outcome.success(),
                Err(e) => {
                    self.reporter.warn(&e.to_string());
                    false
                }
            };

            if !pushed {
                return Err(ReleaseError::PushFailed {
                    reference,
                    published,
                });
            }

            self.reporter.success(&format!("Pushed {reference}"));
            published.push(reference);
        }

        Ok(PublishOutcome::Pushed(published))
    }
}
