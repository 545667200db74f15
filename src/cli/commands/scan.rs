//! `scan` command: run the directive scanner and print per-file reports

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::cli::Output;
use crate::config::{self, ConfigOverrides, ReportConfig};
use crate::scanner::{ErrorPolicy, MatchReport, ScanEvent, ScanMode, ScanStats, SkippedFile};

#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Directory to scan (defaults to the configured directory)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// File-name suffix a file must end with
    #[arg(short, long, value_name = "SUFFIX")]
    pub extension: Option<String>,

    /// Directive to search for (repeat or comma-separate)
    #[arg(short = 'd', long = "directive", value_name = "NAME", value_delimiter = ',')]
    pub directives: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Skip unreadable files instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Processing mode
    #[arg(long, value_enum)]
    pub mode: Option<ScanMode>,

    /// List a line once even when several directives match it
    #[arg(long)]
    pub dedupe: bool,

    /// Show statistics after scanning
    #[arg(long)]
    pub stats: bool,

    /// Only print the number of matches
    #[arg(long)]
    pub count_only: bool,
}

impl ScanArgs {
    /// Flags the user actually set, for the top configuration layer
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            directory: self.dir.clone(),
            extension: self.extension.clone(),
            directives: (!self.directives.is_empty()).then(|| self.directives.clone()),
            error_policy: self.keep_going.then_some(ErrorPolicy::Skip),
            mode: self.mode,
            dedupe: self.dedupe.then_some(true),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize)]
pub enum OutputFormat {
    /// File heading, one matched line per row, separator
    #[default]
    Text,
    /// File heading, matched lines as one bracketed list, separator
    List,
    /// JSON document for machine processing
    Json,
    /// Only the names of files with matches
    Files,
}

pub fn execute(args: ScanArgs, output: &Output, config_path: Option<&str>) -> Result<()> {
    let config = config::load(config_path, Some(args.overrides()))?;
    let scanner = config.build_scanner()?;

    output.verbose(&format!(
        "Scanning {} for *{} files containing: {}",
        config.directory.display(),
        config.extension,
        config.directives.join(", ")
    ));

    let streaming = !args.count_only && args.format != OutputFormat::Json;
    let mut stdout = io::stdout().lock();
    let mut write_status: io::Result<()> = Ok(());
    let mut reports = Vec::new();
    let mut skipped = Vec::new();

    let result = scanner.scan_each(|event| match event {
        ScanEvent::Report(report) => {
            if streaming && write_status.is_ok() {
                write_status = write_report(&mut stdout, &report, args.format, &config.report);
            }
            if args.format == OutputFormat::Json {
                reports.push(report);
            }
        }
        ScanEvent::Skipped(file) => skipped.push(file),
    });

    write_status.context("Failed to write report")?;
    let stats = result.with_context(|| format!("Scan of {} failed", config.directory.display()))?;

    if !skipped.is_empty() {
        output.warning(&format!("Skipped {} unreadable file(s)", skipped.len()));
    }

    if args.count_only {
        writeln!(stdout, "{}", stats.total_matches)?;
        return Ok(());
    }

    if args.format == OutputFormat::Json {
        write_json(&mut stdout, &reports, &skipped, &stats)?;
        return Ok(());
    }

    if args.stats {
        write_stats(&mut stdout, &stats)?;
    }

    if stats.files_matched == 0 {
        output.verbose("No matching directives found");
    }
    Ok(())
}

/// Write one file's block in a streaming format
pub fn write_report<W: Write>(
    w: &mut W,
    report: &MatchReport,
    format: OutputFormat,
    layout: &ReportConfig,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            write_heading(w, report, layout)?;
            for line in report.lines() {
                writeln!(w, "{line}")?;
            }
            writeln!(w, "{}", layout.separator)
        }
        OutputFormat::List => {
            write_heading(w, report, layout)?;
            writeln!(w, "{}", bracketed_list(&report.lines()))?;
            writeln!(w, "{}", layout.separator)
        }
        OutputFormat::Files => writeln!(w, "{}", report.file_name),
        // Json is written once the scan completes
        OutputFormat::Json => Ok(()),
    }
}

fn write_heading<W: Write>(w: &mut W, report: &MatchReport, layout: &ReportConfig) -> io::Result<()> {
    writeln!(
        w,
        "{} found in {}:",
        layout.heading,
        style(&report.file_name).cyan().bold()
    )
}

/// Render lines as a bracketed list of quoted strings: `['a;', 'b;']`
pub fn bracketed_list(lines: &[&str]) -> String {
    let items: Vec<String> = lines.iter().map(|line| quote(line)).collect();
    format!("[{}]", items.join(", "))
}

/// Quote like a Python string literal: single quotes unless the text holds a
/// single quote and no double quote, control characters escaped
fn quote(line: &str) -> String {
    let delimiter = if line.contains('\'') && !line.contains('"') { '"' } else { '\'' };
    let mut quoted = String::with_capacity(line.len() + 2);
    quoted.push(delimiter);
    for c in line.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\t' => quoted.push_str("\\t"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            c if c == delimiter => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_control() => quoted.push_str(&format!("\\x{:02x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push(delimiter);
    quoted
}

fn write_json<W: Write>(
    w: &mut W,
    reports: &[MatchReport],
    skipped: &[SkippedFile],
    stats: &ScanStats,
) -> Result<()> {
    let document = serde_json::json!({
        "reports": reports.iter().map(|r| serde_json::json!({
            "file": r.file_name,
            "path": r.path,
            "matches": r.matches,
        })).collect::<Vec<_>>(),
        "skipped": skipped,
        "statistics": stats,
    });
    writeln!(w, "{}", serde_json::to_string_pretty(&document)?)?;
    Ok(())
}

fn write_stats<W: Write>(w: &mut W, stats: &ScanStats) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{}", style("Scan Statistics").green().bold())?;
    writeln!(w, "  Files listed: {}", style(stats.files_listed).cyan())?;
    writeln!(w, "  Files qualifying: {}", style(stats.files_qualified).cyan())?;
    writeln!(w, "  Files scanned: {}", style(stats.files_scanned).cyan())?;
    if stats.files_skipped > 0 {
        writeln!(w, "  Files skipped: {}", style(stats.files_skipped).yellow())?;
    }
    writeln!(w, "  Files with matches: {}", style(stats.files_matched).cyan())?;
    writeln!(w, "  Matches: {}", style(stats.total_matches).cyan())?;
    writeln!(w, "  Scan time: {}ms", style(stats.scan_duration_ms).cyan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DirectiveMatch;

    fn report(lines: &[&str]) -> MatchReport {
        MatchReport {
            file_name: "a.conf".to_string(),
            path: PathBuf::from("/etc/nginx/conf.d/a.conf"),
            matches: lines
                .iter()
                .enumerate()
                .map(|(i, line)| DirectiveMatch {
                    directive: "ssl_certificate".to_string(),
                    line_number: i + 1,
                    line: line.to_string(),
                })
                .collect(),
        }
    }

    fn render(report: &MatchReport, format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, report, format, &ReportConfig::default()).unwrap();
        console::strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned()
    }

    #[test]
    fn test_text_block_layout() {
        let out = render(&report(&["ssl_certificate /x.pem;", "ssl_certificate_key /k.pem;"]), OutputFormat::Text);
        assert_eq!(
            out,
            "SSL settings found in a.conf:\n\
             ssl_certificate /x.pem;\n\
             ssl_certificate_key /k.pem;\n\
             --------------------\n"
        );
    }

    #[test]
    fn test_list_block_layout() {
        let out = render(&report(&["ssl_certificate /x.pem;"]), OutputFormat::List);
        assert_eq!(
            out,
            "SSL settings found in a.conf:\n['ssl_certificate /x.pem;']\n--------------------\n"
        );
    }

    #[test]
    fn test_files_format_prints_name_only() {
        assert_eq!(render(&report(&["x"]), OutputFormat::Files), "a.conf\n");
        assert_eq!(render(&report(&["x"]), OutputFormat::Json), "");
    }

    #[test]
    fn test_bracketed_list_quoting() {
        assert_eq!(bracketed_list(&[]), "[]");
        assert_eq!(bracketed_list(&["a;", "b;"]), "['a;', 'b;']");
        assert_eq!(bracketed_list(&["it's"]), "[\"it's\"]");
        assert_eq!(bracketed_list(&[r#"'a' "b""#]), r#"['\'a\' "b"']"#);
        assert_eq!(bracketed_list(&[r"C:\certs"]), r"['C:\\certs']");
    }

    #[test]
    fn test_bracketed_list_escapes_control_characters() {
        assert_eq!(
            bracketed_list(&["\tssl_certificate /x.pem;"]),
            r"['\tssl_certificate /x.pem;']"
        );
        assert_eq!(bracketed_list(&["a\rb\nc"]), r"['a\rb\nc']");
        assert_eq!(bracketed_list(&["bell\u{7}", "del\u{7f}"]), r"['bell\x07', 'del\x7f']");
        assert_eq!(bracketed_list(&["caf\u{e9}"]), "['caf\u{e9}']");
    }

    #[test]
    fn test_overrides_only_carry_set_flags() {
        let args = ScanArgs::default();
        let overrides = serde_json::to_value(args.overrides()).unwrap();
        assert_eq!(overrides, serde_json::json!({}));

        let args = ScanArgs {
            directives: vec!["ssl_dhparam".into()],
            keep_going: true,
            ..ScanArgs::default()
        };
        let overrides = serde_json::to_value(args.overrides()).unwrap();
        assert_eq!(
            overrides,
            serde_json::json!({ "directives": ["ssl_dhparam"], "error_policy": "skip" })
        );
    }

    #[test]
    fn test_json_document_shape() {
        let mut buf = Vec::new();
        let stats = ScanStats {
            files_matched: 1,
            total_matches: 1,
            ..ScanStats::default()
        };
        write_json(&mut buf, &[report(&["ssl_certificate /x.pem;"])], &[], &stats).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["reports"][0]["file"], "a.conf");
        assert_eq!(value["reports"][0]["matches"][0]["line_number"], 1);
        assert_eq!(value["reports"][0]["matches"][0]["directive"], "ssl_certificate");
        assert_eq!(value["statistics"]["total_matches"], 1);
        assert!(value["skipped"].as_array().unwrap().is_empty());
    }
}
