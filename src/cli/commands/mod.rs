use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};

use super::Output;

pub mod config;
pub mod scan;
pub mod version;

#[derive(Parser)]
#[command(
    name = "directive-scan",
    version = env!("CARGO_PKG_VERSION"),
    about = "Find TLS certificate directives in web-server configuration fragments",
    long_about = "Find TLS certificate directives in web-server configuration fragments.\n\n\
                  directive-scan lists the configuration files of one directory (nginx's \
                  conf.d by default) and prints every line containing one of the \
                  configured directives, grouped by file."
)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "work-dir", value_name = "DIR", global = true)]
    pub work_dir: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory for directive lines
    Scan(scan::ScanArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Show version information
    Version(version::VersionArgs),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        if let Some(dir) = &self.work_dir {
            std::env::set_current_dir(dir)
                .with_context(|| format!("Failed to change directory to {dir}"))?;
        }

        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        match self.command {
            Some(Commands::Scan(args)) => scan::execute(args, &output, self.config.as_deref()),
            Some(Commands::Config(args)) => config::execute(args, &output, self.config.as_deref()),
            Some(Commands::Version(args)) => version::execute(args),
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,ignore=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_scan_flags() {
        let cli = Cli::parse_from([
            "directive-scan",
            "-vv",
            "scan",
            "/srv/nginx",
            "-d",
            "ssl_certificate,ssl_dhparam",
            "--keep-going",
            "--format",
            "json",
        ]);
        assert_eq!(cli.verbose, 2);
        let Some(Commands::Scan(args)) = cli.command else {
            panic!("expected scan command");
        };
        assert_eq!(args.dir.as_deref(), Some(std::path::Path::new("/srv/nginx")));
        assert_eq!(args.directives, vec!["ssl_certificate", "ssl_dhparam"]);
        assert!(args.keep_going);
        assert_eq!(args.format, scan::OutputFormat::Json);
    }
}
