//! Error types for the Verity library.
//!
//! All fallible operations return [`VerityError`]. The variants mirror the
//! failure modes of the prediction pipeline: input problems raised before any
//! model work happens, artifact problems raised by the repository, and a
//! generic internal bucket for everything else.
//!
//! # Examples
//!
//! ```
//! use verity::error::{Result, VerityError};
//!
//! fn load() -> Result<()> {
//!     Err(VerityError::artifact_corrupt("bad magic number"))
//! }
//!
//! match load() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for Verity operations.
#[derive(Error, Debug)]
pub enum VerityError {
    /// A null text was handed to the normalizer.
    #[error("Input error: {0}")]
    Input(String),

    /// The raw text was missing, empty or whitespace-only.
    #[error("Empty text provided")]
    EmptyInput,

    /// The text contained nothing left to classify after normalization.
    #[error("Text contains no valid words after preprocessing")]
    NoContent,

    /// No artifact exists at the configured location.
    #[error("Model file not found at {}", path.display())]
    ArtifactNotFound { path: PathBuf },

    /// The artifact exists but could not be decoded or validated.
    #[error("Corrupted model file: {0}")]
    ArtifactCorrupt(String),

    /// Analysis-related errors (invalid patterns, filters, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Offline training errors.
    #[error("Training error: {0}")]
    Training(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Anything else that went wrong during a prediction.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for operations that may fail with VerityError.
pub type Result<T> = std::result::Result<T, VerityError>;

impl VerityError {
    /// Create a new input error.
    pub fn input<S: Into<String>>(msg: S) -> Self {
        VerityError::Input(msg.into())
    }

    /// Create a new artifact-not-found error.
    pub fn artifact_not_found<P: Into<PathBuf>>(path: P) -> Self {
        VerityError::ArtifactNotFound { path: path.into() }
    }

    /// Create a new corrupt artifact error.
    pub fn artifact_corrupt<S: Into<String>>(msg: S) -> Self {
        VerityError::ArtifactCorrupt(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        VerityError::Analysis(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        VerityError::InvalidConfig(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        VerityError::Training(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        VerityError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = VerityError::input("Text cannot be None");
        assert_eq!(error.to_string(), "Input error: Text cannot be None");

        let error = VerityError::artifact_corrupt("bad checksum");
        assert_eq!(error.to_string(), "Corrupted model file: bad checksum");

        let error = VerityError::artifact_not_found("models/missing.bin");
        assert_eq!(
            error.to_string(),
            "Model file not found at models/missing.bin"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let verity_error = VerityError::from(io_error);

        match verity_error {
            VerityError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
