//! Operator confirmation prompts.
//!
//! Prompts fail closed: without a terminal every question is answered "no",
//! and the caller decides what "no" means for its stage.

use std::io::IsTerminal;

/// Yes/no questions put to the operator.
pub trait Prompter {
    /// Whether a human can answer prompts right now.
    fn is_interactive(&self) -> bool;

    /// Ask `prompt`; non-interactive implementations return `false`.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Prompts on the controlling terminal via `dialoguer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    /// Returns a terminal prompter when stdin is a TTY, otherwise the
    /// fail-closed [`NonInteractive`] prompter.
    pub fn detect() -> Box<dyn Prompter> {
        if std::io::stdin().is_terminal() {
            Box::new(Self)
        } else {
            Box::new(NonInteractive)
        }
    }
}

impl Prompter for TerminalPrompter {
    fn is_interactive(&self) -> bool {
        true
    }

    fn confirm(&self, prompt: &str) -> bool {
        match dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("Prompt failed, treating as declined: {e}");
                false
            }
        }
    }
}

/// Answers every prompt with "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn is_interactive(&self) -> bool {
        false
    }

    fn confirm(&self, prompt: &str) -> bool {
        log::debug!("Non-interactive session, declining: {prompt}");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_fails_closed() {
        let prompter = NonInteractive;
        assert!(!prompter.is_interactive());
        assert!(!prompter.confirm("Continue with build?"));
    }
}
