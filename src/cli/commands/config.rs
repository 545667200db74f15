use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use std::path::Path;

use crate::cli::Output;
use crate::config::{self, AppConfig, DEFAULT_CONFIG};

const INIT_FILE: &str = "directive-scan.toml";

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Create a default directive-scan.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Display current merged configuration
    Show {
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
    /// Validate the merged configuration
    Validate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}

pub fn execute(args: ConfigArgs, output: &Output, custom_config: Option<&str>) -> Result<()> {
    match args.command {
        ConfigCommand::Init { force } => init(Path::new(INIT_FILE), force, output),
        ConfigCommand::Show { format } => {
            let config = config::load(custom_config, None::<()>)?;
            println!("{}", render(&config, format)?);
            Ok(())
        }
        ConfigCommand::Validate => {
            let config = config::load(custom_config, None::<()>)?;
            config.validate()?;
            output.success("Configuration is valid");
            Ok(())
        }
    }
}

fn init(path: &Path, force: bool, output: &Output) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    output.success(&format!("Created {} with default settings", path.display()));
    Ok(())
}

/// Serialize the effective configuration
pub fn render(config: &AppConfig, format: ConfigFormat) -> Result<String> {
    Ok(match format {
        ConfigFormat::Toml => toml::to_string_pretty(config).context("Failed to serialize configuration")?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn defaults() -> AppConfig {
        toml::from_str(DEFAULT_CONFIG).unwrap()
    }

    #[test]
    fn test_render_round_trips_through_toml() {
        let config = defaults();
        let rendered = render(&config, ConfigFormat::Toml).unwrap();
        assert!(rendered.contains("error_policy = \"fail-fast\""));
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_render_json() {
        let rendered = render(&defaults(), ConfigFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["directory"], "/etc/nginx/conf.d");
        assert_eq!(value["report"]["heading"], "SSL settings");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(INIT_FILE);
        let output = Output::new(false, true);

        init(&path, false, &output).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        std::fs::write(&path, "extension = \".x\"").unwrap();
        assert!(init(&path, false, &output).is_err());
        init(&path, true, &output).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
