//! Status output for directive-scan
//!
//! Reports go to stdout; everything printed through [`Output`] goes to stderr
//! so piping a report never mixes in status lines.

use console::style;

/// Output handler for consistent CLI formatting
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    /// Create a new output handler
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("✔").green().for_stderr(), message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("⚠").yellow().for_stderr(), message);
        }
    }

    /// Print a verbose message (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            eprintln!("{} {}", style("ℹ").dim().for_stderr(), style(message).dim().for_stderr());
        }
    }
}
