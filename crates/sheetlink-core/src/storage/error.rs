//! Document store errors
//!
//! I/O failures are classified by what the user can do about them. Each
//! class carries the path of the document or directory involved, and
//! [`StoreError::recovery_suggestion`] is shown next to the failure in the
//! run report.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading, writing or cleaning the output tree
#[derive(Error, Debug)]
pub enum StoreError {
    /// A category directory could not be created
    #[error("Cannot create category directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied for '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No space left for '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read document '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write document '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Appending to a document that was never written
    #[error("Document '{path}' does not exist")]
    NotFound { path: PathBuf },

    /// The rendered temp file could not replace the document
    #[error("Cannot move '{from}' into place as '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output root exists but is a file
    #[error("Output root '{path}' is not a directory")]
    NotADirectory { path: PathBuf },
}

impl StoreError {
    /// Classify an I/O error raised while writing `path`
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StoreError::NotFound { path },
            _ if is_out_of_space(&error) => StoreError::DiskFull {
                path,
                source: error,
            },
            _ => StoreError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Classify an I/O error raised while reading `path`
    pub fn from_read(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound => {
                Self::from_io(error, path)
            }
            _ => StoreError::ReadError {
                path,
                source: error,
            },
        }
    }

    /// What the user can change before re-running the build
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::DiskFull { .. } => Some("free space on the output volume and re-run"),
            StoreError::PermissionDenied { .. } | StoreError::CreateDirectory { .. } => {
                Some("make the output directory writable or pick another with --output")
            }
            StoreError::NotADirectory { .. } => {
                Some("point output_dir at a directory, not a file")
            }
            StoreError::AtomicWriteFailed { .. } => {
                Some("remove the leftover .tmp file next to the document and re-run")
            }
            _ => None,
        }
    }
}

/// ENOSPC / EDQUOT on unix, ERROR_DISK_FULL / ERROR_HANDLE_DISK_FULL on windows
fn is_out_of_space(error: &io::Error) -> bool {
    let codes: &[i32] = if cfg!(windows) { &[39, 112] } else { &[28, 122] };
    error
        .raw_os_error()
        .map(|code| codes.contains(&code))
        .unwrap_or(false)
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_by_kind() {
        let denied = StoreError::from_io(
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            PathBuf::from("vault/Rooms/Library.md"),
        );
        assert!(matches!(denied, StoreError::PermissionDenied { .. }));
        assert!(denied.recovery_suggestion().is_some());

        let missing = StoreError::from_read(
            io::Error::new(io::ErrorKind::NotFound, "gone"),
            PathBuf::from("vault/Books/Atlas.md"),
        );
        assert!(matches!(missing, StoreError::NotFound { .. }));
        assert!(missing.recovery_suggestion().is_none());

        let garbled = StoreError::from_read(
            io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
            PathBuf::from("vault/Rooms/Library.md"),
        );
        assert!(matches!(garbled, StoreError::ReadError { .. }));
        assert!(garbled.to_string().contains("Library.md"));
    }

    #[cfg(unix)]
    #[test]
    fn test_out_of_space_from_os_code() {
        let err = StoreError::from_io(io::Error::from_raw_os_error(28), PathBuf::from("vault"));
        assert!(matches!(err, StoreError::DiskFull { .. }));
        assert!(err.recovery_suggestion().unwrap().contains("free space"));
    }
}
