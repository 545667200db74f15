//! Error types for directive scanning

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while scanning a directory for directives
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Path not found: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Permission denied: {}", path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File is not valid UTF-8 text: {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Directive set must contain at least one directive")]
    EmptyDirectiveSet,

    #[error("Directive at position {index} is blank")]
    BlankDirective { index: usize },
}

impl ScanError {
    /// Classify an I/O failure on `path` by its error kind
    pub fn from_io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path, source },
            io::ErrorKind::PermissionDenied => Self::Permission { path, source },
            _ => Self::Io { path, source },
        }
    }

    /// Path the error refers to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path, .. }
            | Self::NotADirectory { path }
            | Self::Permission { path, .. }
            | Self::Decode { path, .. }
            | Self::Io { path, .. } => Some(path),
            Self::EmptyDirectiveSet | Self::BlankDirective { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classifies_kinds() {
        let not_found = ScanError::from_io("/nope", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(not_found, ScanError::NotFound { .. }));

        let denied = ScanError::from_io("/root/x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, ScanError::Permission { .. }));

        let other = ScanError::from_io("/x", io::Error::from(io::ErrorKind::Interrupted));
        assert!(matches!(other, ScanError::Io { .. }));
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let err = ScanError::NotADirectory {
            path: PathBuf::from("/etc/nginx/nginx.conf"),
        };
        assert_eq!(err.to_string(), "Not a directory: /etc/nginx/nginx.conf");
        assert_eq!(err.path(), Some(Path::new("/etc/nginx/nginx.conf")));
        assert!(ScanError::EmptyDirectiveSet.path().is_none());
    }
}
