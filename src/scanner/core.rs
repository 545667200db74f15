use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use super::directory::list_qualifying_files;
use super::file::{FileScan, scan_file};
use super::types::{
    DirectiveSet, ErrorPolicy, MatchReport, ScanMode, ScanOutcome, ScanStats, ScanTarget,
    ScannerConfig, SkippedFile,
};
use crate::error::{Result, ScanError};

/// Directive scanner - finds directive lines across the files of one directory
///
/// The scanner is stateless between runs; every call re-lists the directory.
#[derive(Debug, Clone)]
pub struct Scanner {
    target: ScanTarget,
    directives: DirectiveSet,
    config: ScannerConfig,
}

impl Scanner {
    pub fn new(target: ScanTarget, directives: DirectiveSet, config: ScannerConfig) -> Self {
        Self {
            target,
            directives,
            config,
        }
    }

    pub fn target(&self) -> &ScanTarget {
        &self.target
    }

    pub fn directives(&self) -> &DirectiveSet {
        &self.directives
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Scan and collect every report
    pub fn scan(&self) -> Result<ScanOutcome> {
        let mut reports = Vec::new();
        let mut skipped = Vec::new();
        let stats = self.scan_each(|event| match event {
            ScanEvent::Report(report) => reports.push(report),
            ScanEvent::Skipped(file) => skipped.push(file),
        })?;
        Ok(ScanOutcome {
            reports,
            skipped,
            stats,
        })
    }

    /// Scan and hand each event to `sink` in file-name order
    ///
    /// Events are delivered as soon as they are known, so a caller printing
    /// them keeps the output produced before a fail-fast error.
    pub fn scan_each<F>(&self, mut sink: F) -> Result<ScanStats>
    where
        F: FnMut(ScanEvent),
    {
        let start_time = Instant::now();
        let mut stats = ScanStats::default();

        let listing = list_qualifying_files(&self.target)?;
        stats.files_listed = listing.listed;
        stats.files_qualified = listing.files.len();

        for err in listing.errors {
            self.handle_error(err, &mut stats, &mut sink)?;
        }

        if self.use_parallel(listing.files.len()) {
            tracing::debug!("Scanning {} files in parallel", listing.files.len());
            let results: Vec<(PathBuf, Result<FileScan>)> = listing
                .files
                .into_par_iter()
                .map(|path| {
                    let result = scan_file(&path, &self.directives, self.config.dedupe);
                    (path, result)
                })
                .collect();
            for (_, result) in results {
                self.deliver(result, &mut stats, &mut sink)?;
            }
        } else {
            for path in &listing.files {
                let result = scan_file(path, &self.directives, self.config.dedupe);
                self.deliver(result, &mut stats, &mut sink)?;
            }
        }

        stats.scan_duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!(
            "Scanned {} files in {}: {} matches in {} files",
            stats.files_scanned,
            self.target.dir().display(),
            stats.total_matches,
            stats.files_matched
        );
        Ok(stats)
    }

    fn use_parallel(&self, file_count: usize) -> bool {
        match self.config.mode {
            ScanMode::Sequential => false,
            ScanMode::Parallel => true,
            ScanMode::Auto => file_count >= self.config.min_files_for_parallel,
        }
    }

    fn deliver<F>(&self, result: Result<FileScan>, stats: &mut ScanStats, sink: &mut F) -> Result<()>
    where
        F: FnMut(ScanEvent),
    {
        match result {
            Ok(FileScan { report, bytes_read }) => {
                stats.files_scanned += 1;
                stats.bytes_read += bytes_read;
                if let Some(report) = report {
                    stats.files_matched += 1;
                    stats.total_matches += report.len();
                    sink(ScanEvent::Report(report));
                }
                Ok(())
            }
            Err(err) => self.handle_error(err, stats, sink),
        }
    }

    fn handle_error<F>(&self, err: ScanError, stats: &mut ScanStats, sink: &mut F) -> Result<()>
    where
        F: FnMut(ScanEvent),
    {
        if self.config.error_policy == ErrorPolicy::FailFast {
            return Err(err);
        }

        tracing::warn!("Skipping: {}", err);
        stats.files_skipped += 1;
        sink(ScanEvent::Skipped(SkippedFile {
            path: err
                .path()
                .map_or_else(|| self.target.dir().to_path_buf(), |p| p.to_path_buf()),
            reason: error_chain(&err),
        }));
        Ok(())
    }
}

/// Item delivered by [`Scanner::scan_each`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Report(MatchReport),
    Skipped(SkippedFile),
}

fn error_chain(err: &ScanError) -> String {
    match std::error::Error::source(err) {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}

/// Scan `dir` for files ending in `extension` and return per-file reports
///
/// Uses the default fail-fast, sequential configuration.
pub fn scan(
    dir: impl Into<PathBuf>,
    extension: impl Into<String>,
    directives: &DirectiveSet,
) -> Result<Vec<MatchReport>> {
    let scanner = Scanner::new(
        ScanTarget::new(dir, extension),
        directives.clone(),
        ScannerConfig::default(),
    );
    Ok(scanner.scan()?.reports)
}
