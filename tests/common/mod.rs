//! Shared doubles for pipeline tests: a scripted process runner, a
//! recording reporter, and a prompter with canned answers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use agent_release::cli::Reporter;
use agent_release::error::Result;
use agent_release::process::{CommandOutcome, CommandRunner, Invocation};
use agent_release::prompt::Prompter;

type Script = Box<dyn Fn(&Invocation) -> CommandOutcome>;

/// Records every invocation and answers with a scripted outcome.
pub struct ScriptedRunner {
    calls: Mutex<Vec<Invocation>>,
    interactive_calls: Mutex<Vec<Invocation>>,
    script: Script,
}

impl ScriptedRunner {
    pub fn new(script: impl Fn(&Invocation) -> CommandOutcome + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            interactive_calls: Mutex::new(Vec::new()),
            script: Box::new(script),
        }
    }

    /// A runner on which every command succeeds and `dotnet publish`
    /// writes plausible output.
    pub fn toolchain() -> Self {
        Self::new(fake_toolchain)
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn interactive_calls(&self) -> Vec<Invocation> {
        self.interactive_calls.lock().unwrap().clone()
    }

    /// Rendered command lines, in call order.
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    pub fn count(&self, program: &str, subcommand: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.program() == program && c.arguments().first().map(String::as_str) == Some(subcommand))
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation, _reporter: &dyn Reporter) -> Result<CommandOutcome> {
        self.calls.lock().unwrap().push(invocation.clone());
        Ok((self.script)(invocation))
    }

    async fn run_interactive(&self, invocation: &Invocation) -> Result<CommandOutcome> {
        self.interactive_calls.lock().unwrap().push(invocation.clone());
        Ok((self.script)(invocation))
    }
}

pub fn is_agent_publish(invocation: &Invocation) -> bool {
    invocation.program() == "dotnet"
        && invocation
            .arguments()
            .iter()
            .any(|a| a.starts_with("-p:CompanionArchivePath="))
}

pub fn is_companion_publish(invocation: &Invocation) -> bool {
    invocation.program() == "dotnet" && !is_agent_publish(invocation)
}

/// Writes what a successful publish would leave in its `-o` directory.
pub fn write_publish_output(invocation: &Invocation) {
    let (Some(out), Some(rid)) = (invocation.flag_value("-o"), invocation.flag_value("-r")) else {
        return;
    };
    let out = Path::new(out);
    std::fs::create_dir_all(out).unwrap();

    if is_agent_publish(invocation) {
        let name = if rid.starts_with("win") { "agent.exe" } else { "agent" };
        std::fs::write(out.join(name), format!("agent binary for {rid}")).unwrap();
    } else {
        std::fs::write(out.join("Desktop.dll"), "companion").unwrap();
        std::fs::create_dir_all(out.join("wwwroot")).unwrap();
        std::fs::write(out.join("wwwroot").join("index.html"), "<html/>").unwrap();
    }
}

pub fn fake_toolchain(invocation: &Invocation) -> CommandOutcome {
    if invocation.program() == "dotnet" {
        write_publish_output(invocation);
    }
    CommandOutcome::SUCCESS
}

/// Captures everything the pipeline reports.
#[derive(Default)]
pub struct RecordingReporter {
    lines: RefCell<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    fn push(&self, kind: &'static str, message: &str) {
        self.lines.borrow_mut().push((kind, message.to_string()));
    }

    pub fn of_kind(&self, kind: &str) -> Vec<String> {
        self.lines
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.of_kind("warn")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|(_, m)| m.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn section(&self, title: &str) {
        self.push("section", title);
    }
    fn progress(&self, message: &str) {
        self.push("progress", message);
    }
    fn success(&self, message: &str) {
        self.push("success", message);
    }
    fn warn(&self, message: &str) {
        self.push("warn", message);
    }
    fn error(&self, message: &str) {
        self.push("error", message);
    }
    fn indent(&self, message: &str) {
        self.push("indent", message);
    }
    fn verbose(&self, message: &str) {
        self.push("verbose", message);
    }
}

/// Answers prompts from a queue; an exhausted queue answers "no".
pub struct ScriptedPrompter {
    interactive: bool,
    answers: RefCell<VecDeque<bool>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn interactive(answers: &[bool]) -> Self {
        Self {
            interactive: true,
            answers: RefCell::new(answers.iter().copied().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            answers: RefCell::new(VecDeque::new()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.asked.borrow_mut().push(prompt.to_string());
        self.interactive && self.answers.borrow_mut().pop_front().unwrap_or(false)
    }
}

/// Writes a docker config holding credentials for `hosts`.
pub fn docker_config(dir: &Path, hosts: &[&str]) -> PathBuf {
    let auths = hosts
        .iter()
        .map(|h| format!("\"{h}\": {{}}"))
        .collect::<Vec<_>>()
        .join(", ");
    let path = dir.join("config.json");
    std::fs::write(&path, format!("{{\"auths\": {{{auths}}}}}")).unwrap();
    path
}
