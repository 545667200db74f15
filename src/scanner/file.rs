//! Per-file matching

use std::fs;
use std::path::Path;

use super::types::{DirectiveMatch, DirectiveSet, MatchReport};
use crate::error::{Result, ScanError};

/// Collect matches in `content`, grouped by directive then by line
///
/// Matching is plain substring containment. A line containing two directives
/// is emitted once per directive unless `dedupe` is set, in which case it is
/// emitted once under the first directive it contains.
pub fn scan_content(content: &str, directives: &DirectiveSet, dedupe: bool) -> Vec<DirectiveMatch> {
    let lines = split_lines(content);

    if dedupe {
        return lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                directives.first_match(line).map(|directive| DirectiveMatch {
                    directive: directive.to_string(),
                    line_number: idx + 1,
                    line: (*line).to_string(),
                })
            })
            .collect();
    }

    let mut matches = Vec::new();
    for directive in directives.iter() {
        for (idx, line) in lines.iter().enumerate() {
            if line.contains(directive) {
                matches.push(DirectiveMatch {
                    directive: directive.to_string(),
                    line_number: idx + 1,
                    line: (*line).to_string(),
                });
            }
        }
    }
    matches
}

/// Split on `\n`, `\r\n` and a lone `\r`, without a trailing empty line
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = content;
    while let Some(pos) = rest.find(['\r', '\n']) {
        lines.push(&rest[..pos]);
        let terminator = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + terminator..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }
    lines
}

/// Outcome of reading and matching one file
#[derive(Debug)]
pub struct FileScan {
    pub report: Option<MatchReport>,
    pub bytes_read: u64,
}

/// Read `path` fully and match it; `None` report when nothing matched
pub fn scan_file(path: &Path, directives: &DirectiveSet, dedupe: bool) -> Result<FileScan> {
    let bytes = fs::read(path).map_err(|e| ScanError::from_io(path, e))?;
    let bytes_read = bytes.len() as u64;
    let content = String::from_utf8(bytes).map_err(|source| ScanError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let matches = scan_content(&content, directives, dedupe);
    tracing::debug!("{}: {} matching lines", path.display(), matches.len());

    let report = (!matches.is_empty()).then(|| MatchReport {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        path: path.to_path_buf(),
        matches,
    });

    Ok(FileScan { report, bytes_read })
}
