//! Command-line interface for directive-scan
//!
//! clap parses the arguments; each subcommand lives in its own module under
//! `commands`.

pub mod commands;
pub mod output;

pub use commands::Cli;
pub use output::Output;
