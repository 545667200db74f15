//! # directive-scan - find TLS certificate directives in server configs
//!
//! Lists the configuration fragments of one directory (nginx's `conf.d` by
//! default), keeps the files ending in a given suffix and reports every line
//! that contains one of a set of directive substrings, grouped by file.
//!
//! ## Quick Start
//!
//! ```bash
//! # Scan /etc/nginx/conf.d for ssl_certificate / ssl_certificate_key
//! directive-scan scan
//!
//! # Another directory, another directive, machine-readable
//! directive-scan scan /etc/nginx/sites-enabled -e '' -d ssl_trusted_certificate --format json
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use directive_scan::scanner::{DirectiveSet, scan};
//!
//! let reports = scan("/etc/nginx/conf.d", ".conf", &DirectiveSet::tls_certificates())?;
//! for report in &reports {
//!     println!("{}: {:?}", report.file_name, report.lines());
//! }
//! # Ok::<(), directive_scan::error::ScanError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod scanner;

pub use cli::{Cli, Output};
pub use config::AppConfig;
pub use error::ScanError;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
