//! Configuration management for directive-scan
//!
//! Settings are layered with figment: embedded defaults, user and repository
//! files, environment variables and finally command-line flags. See
//! [`core::load`] for the exact order.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scanner::{DirectiveSet, ErrorPolicy, ScanMode, ScanTarget, Scanner, ScannerConfig};

pub mod core;

pub use self::core::{ConfigOverrides, DEFAULT_CONFIG, load};

/// Main configuration structure for directive-scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory to scan (top level only)
    pub directory: PathBuf,

    /// Literal suffix a file name must end with
    pub extension: String,

    /// Directive substrings, in report order
    pub directives: Vec<String>,

    #[serde(default)]
    pub error_policy: ErrorPolicy,

    #[serde(default)]
    pub mode: ScanMode,

    #[serde(default = "default_min_files_for_parallel")]
    pub min_files_for_parallel: usize,

    #[serde(default)]
    pub dedupe: bool,

    /// Text report layout
    #[serde(default)]
    pub report: ReportConfig,
}

/// Text report layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Label printed before "found in <file>:"
    pub heading: String,

    /// Line printed after each file block
    pub separator: String,
}

fn default_min_files_for_parallel() -> usize {
    5
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            heading: "SSL settings".to_string(),
            separator: "-".repeat(20),
        }
    }
}

impl AppConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.directives.is_empty() {
            bail!("At least one directive must be configured");
        }
        if let Some(index) = self.directives.iter().position(|d| d.trim().is_empty()) {
            bail!("Directive #{} is blank", index + 1);
        }
        if self.report.separator.is_empty() {
            bail!("Report separator cannot be empty");
        }
        if self.mode == ScanMode::Auto && self.min_files_for_parallel == 0 {
            bail!("min_files_for_parallel must be at least 1 in auto mode");
        }
        Ok(())
    }

    pub fn target(&self) -> ScanTarget {
        ScanTarget::new(&self.directory, &self.extension)
    }

    pub fn directive_set(&self) -> Result<DirectiveSet> {
        Ok(DirectiveSet::new(self.directives.iter().cloned())?)
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            error_policy: self.error_policy,
            mode: self.mode,
            min_files_for_parallel: self.min_files_for_parallel,
            dedupe: self.dedupe,
        }
    }

    /// Validate and build a scanner from this configuration
    pub fn build_scanner(&self) -> Result<Scanner> {
        self.validate()?;
        Ok(Scanner::new(
            self.target(),
            self.directive_set()?,
            self.scanner_config(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> AppConfig {
        toml::from_str(DEFAULT_CONFIG).expect("embedded defaults parse")
    }

    #[test]
    fn test_embedded_defaults() {
        let config = defaults();
        assert_eq!(config.directory, PathBuf::from("/etc/nginx/conf.d"));
        assert_eq!(config.extension, ".conf");
        assert_eq!(config.directives, vec!["ssl_certificate", "ssl_certificate_key"]);
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
        assert_eq!(config.mode, ScanMode::Sequential);
        assert_eq!(config.report, ReportConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_directives() {
        let config = AppConfig {
            directives: vec![],
            ..defaults()
        };
        assert!(config.validate().is_err());
        assert!(config.build_scanner().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_directive() {
        let config = AppConfig {
            directives: vec!["ssl_certificate".into(), "".into()],
            ..defaults()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn test_scanner_config_mapping() {
        let config = AppConfig {
            error_policy: ErrorPolicy::Skip,
            mode: ScanMode::Auto,
            min_files_for_parallel: 9,
            dedupe: true,
            ..defaults()
        };
        let scanner = config.build_scanner().unwrap();
        assert_eq!(scanner.config().error_policy, ErrorPolicy::Skip);
        assert_eq!(scanner.config().mode, ScanMode::Auto);
        assert_eq!(scanner.config().min_files_for_parallel, 9);
        assert!(scanner.config().dedupe);
        assert_eq!(scanner.target().extension(), ".conf");
    }
}
