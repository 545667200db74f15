//! Directory listing and extension filtering

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use super::types::ScanTarget;
use crate::error::{Result, ScanError};

/// Files in the target directory that qualify for scanning
#[derive(Debug, Default)]
pub struct Listing {
    /// Qualifying files, sorted by file name
    pub files: Vec<PathBuf>,
    /// Regular files seen at the top level, qualifying or not
    pub listed: usize,
    /// Entries that could not be inspected
    pub errors: Vec<ScanError>,
}

/// List the top level of `target.dir()` without descending into subdirectories
///
/// Symlinks are followed so a link to a regular file counts as a file. Hidden
/// and gitignored entries are included. Errors about the directory itself are
/// returned immediately; per-entry errors are collected in [`Listing::errors`].
pub fn list_qualifying_files(target: &ScanTarget) -> Result<Listing> {
    let dir = target.dir();
    let metadata = fs::metadata(dir).map_err(|e| ScanError::from_io(dir, e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    // Surface an unreadable directory as a hard error, not a per-entry one
    fs::read_dir(dir).map_err(|e| ScanError::from_io(dir, e))?;

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(true)
        .max_depth(Some(1))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut listing = Listing::default();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.depth() == 0 {
                    continue;
                }
                if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                    tracing::trace!("Skipping non-file entry {}", entry.path().display());
                    continue;
                }
                listing.listed += 1;

                let name = entry.file_name().to_string_lossy();
                if target.qualifies(&name) {
                    listing.files.push(entry.into_path());
                }
            }
            Err(err) => {
                let path = error_path(&err).unwrap_or(dir).to_path_buf();
                // A dangling link that would not qualify anyway is not worth failing over
                let relevant = path == dir
                    || path
                        .file_name()
                        .is_some_and(|name| target.qualifies(&name.to_string_lossy()));
                if relevant {
                    tracing::debug!("Error listing {}: {}", path.display(), err);
                    listing.errors.push(walk_error(&path, &err));
                } else {
                    tracing::trace!("Ignoring unreadable entry {}: {}", path.display(), err);
                }
            }
        }
    }

    listing.files.sort();
    tracing::debug!(
        "Found {} qualifying files out of {} in {}",
        listing.files.len(),
        listing.listed,
        dir.display()
    );
    Ok(listing)
}

fn walk_error(path: &Path, err: &ignore::Error) -> ScanError {
    let kind = err.io_error().map_or(io::ErrorKind::Other, io::Error::kind);
    ScanError::from_io(path, io::Error::new(kind, err.to_string()))
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        _ => None,
    }
}
