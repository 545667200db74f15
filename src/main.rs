use anyhow::Result;
use clap::Parser;

use directive_scan::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
