//! Operator-facing terminal output.
//!
//! Pipeline stages report through the [`Reporter`] trait rather than printing
//! directly, so tests can capture what an operator would have seen.

use std::io::IsTerminal;

use owo_colors::{OwoColorize as _, Style};

/// Sink for operator-facing progress messages.
pub trait Reporter {
    /// Print a section header
    fn section(&self, title: &str);
    /// Print a progress message
    fn progress(&self, message: &str);
    /// Print a success message
    fn success(&self, message: &str);
    /// Print a warning message
    fn warn(&self, message: &str);
    /// Print an error message; never suppressed
    fn error(&self, message: &str);
    /// Print indented text (streamed child output, key/value details)
    fn indent(&self, message: &str);
    /// Print a message only in verbose mode
    fn verbose(&self, message: &str);
}

#[derive(Clone, Debug, Default)]
struct Styles {
    success: Style,
    warning: Style,
    error: Style,
    info: Style,
    dim: Style,
    header: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().blue();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
    }
}

/// Colored terminal reporter.
#[derive(Clone, Debug)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    styles: Styles,
}

impl OutputManager {
    /// Creates an output manager; colors are enabled only on a TTY without `NO_COLOR`.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        let use_colors = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            verbose,
            quiet,
            styles,
        }
    }
}

impl Reporter for OutputManager {
    fn section(&self, title: &str) {
        if !self.quiet {
            println!();
            println!("{}", title.style(self.styles.header));
        }
    }

    fn progress(&self, message: &str) {
        if !self.quiet {
            println!("{} {message}", "→".style(self.styles.info));
        }
    }

    fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {message}", "✓".style(self.styles.success));
        }
    }

    fn warn(&self, message: &str) {
        if !self.quiet {
            println!("{} {message}", "⚠".style(self.styles.warning));
        }
    }

    fn error(&self, message: &str) {
        eprintln!("{} {message}", "✗".style(self.styles.error));
    }

    fn indent(&self, message: &str) {
        if !self.quiet {
            println!("    {message}");
        }
    }

    fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{}", message.style(self.styles.dim));
        }
    }
}
