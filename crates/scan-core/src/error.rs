use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the transcript scanner.
///
/// Per-line parse failures are not represented here: they are recovered by
/// skipping the line and never reach the caller.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The transcript could not be opened, read, or decoded as UTF-8.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An analysis parameter is outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Pass-through for I/O errors that do not carry a path (report output).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the scanner crates.
pub type Result<T> = std::result::Result<T, ScanError>;
