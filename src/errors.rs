//! Configuration-level error types
//!
//! These represent failures that are fatal at startup (bad paths, bad column
//! mappings). Per-row lookup failures never appear here; the row processor
//! absorbs them as ordinary unresolved outcomes.

use std::fmt;

#[derive(Debug)]
pub enum SubjectifyError {
    /// File could not be read or written
    Io(std::io::Error),
    /// CSV could not be parsed or serialized
    Csv(csv::Error),
    /// Invalid configuration with message (out-of-range column, unknown skip field)
    Validation(String),
    /// External service client error
    External(String),
}

impl fmt::Display for SubjectifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectifyError::Io(e) => write!(f, "I/O error: {}", e),
            SubjectifyError::Csv(e) => write!(f, "CSV error: {}", e),
            SubjectifyError::Validation(msg) => write!(f, "Validation error: {}", msg),
            SubjectifyError::External(msg) => write!(f, "External service error: {}", msg),
        }
    }
}

impl std::error::Error for SubjectifyError {}

impl From<std::io::Error> for SubjectifyError {
    fn from(e: std::io::Error) -> Self {
        SubjectifyError::Io(e)
    }
}

impl From<csv::Error> for SubjectifyError {
    fn from(e: csv::Error) -> Self {
        SubjectifyError::Csv(e)
    }
}
