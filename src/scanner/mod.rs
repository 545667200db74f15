pub mod core;
pub mod directory;
pub mod file;
pub mod types;

// Re-export main types for easier access
pub use self::core::{ScanEvent, Scanner, scan};
pub use directory::{Listing, list_qualifying_files};
pub use file::scan_content;
pub use types::{
    DirectiveMatch, DirectiveSet, ErrorPolicy, MatchReport, ScanMode, ScanOutcome, ScanStats,
    ScanTarget, ScannerConfig, SkippedFile,
};
