use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Directory to scan plus the literal file-name suffix that qualifies a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    dir: PathBuf,
    extension: String,
}

impl ScanTarget {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// A file qualifies when its name ends with the extension suffix
    pub fn qualifies(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.extension)
    }
}

/// Ordered, non-empty list of directive substrings
///
/// Order drives report order. Duplicates are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveSet {
    directives: Vec<String>,
}

impl DirectiveSet {
    pub fn new<I, S>(directives: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let directives: Vec<String> = directives.into_iter().map(Into::into).collect();
        if directives.is_empty() {
            return Err(ScanError::EmptyDirectiveSet);
        }
        if let Some(index) = directives.iter().position(|d| d.trim().is_empty()) {
            return Err(ScanError::BlankDirective { index });
        }
        Ok(Self { directives })
    }

    /// The TLS certificate directives nginx uses
    pub fn tls_certificates() -> Self {
        Self {
            directives: vec![
                "ssl_certificate".to_string(),
                "ssl_certificate_key".to_string(),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.directives.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// First directive contained in `line`, if any
    pub fn first_match(&self, line: &str) -> Option<&str> {
        self.iter().find(|directive| line.contains(directive))
    }
}

/// A single emitted match inside a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveMatch {
    /// Directive substring that selected this line
    pub directive: String,
    /// 1-based line number
    pub line_number: usize,
    pub line: String,
}

/// All matches for one file, in report order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub file_name: String,
    pub path: PathBuf,
    pub matches: Vec<DirectiveMatch>,
}

impl MatchReport {
    /// Matched line texts, duplicates included
    pub fn lines(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.line.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// What to do when a single file cannot be read or decoded
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Abort on the first error
    #[default]
    FailFast,
    /// Record the file as skipped and keep scanning
    Skip,
}

/// Scanning mode for determining parallelization strategy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Always use sequential processing
    #[default]
    Sequential,
    /// Always use parallel processing
    Parallel,
    /// Go parallel once enough files qualify
    Auto,
}

/// Runtime options for the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    pub error_policy: ErrorPolicy,
    pub mode: ScanMode,
    pub min_files_for_parallel: usize,
    /// Emit each line once, tagged with its first matching directive
    pub dedupe: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::FailFast,
            mode: ScanMode::Sequential,
            min_files_for_parallel: 5,
            dedupe: false,
        }
    }
}

/// Statistics from a scanning operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub files_listed: usize,
    pub files_qualified: usize,
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub files_matched: usize,
    pub total_matches: usize,
    pub bytes_read: u64,
    pub scan_duration_ms: u64,
}

/// A file dropped under [`ErrorPolicy::Skip`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a scanning operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOutcome {
    pub reports: Vec<MatchReport>,
    pub skipped: Vec<SkippedFile>,
    pub stats: ScanStats,
}
