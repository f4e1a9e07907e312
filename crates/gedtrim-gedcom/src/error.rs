//! GEDCOM I/O error types

use thiserror::Error;

/// Result type alias for GEDCOM I/O operations
pub type GedcomResult<T> = std::result::Result<T, GedcomError>;

/// GEDCOM-specific error types
#[derive(Error, Debug)]
pub enum GedcomError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unparsable GEDCOM line {line_no}: {content:?}")]
    Line { line_no: usize, content: String },

    #[error("malformed record: {0}")]
    Record(String),

    #[error(transparent)]
    Graph(#[from] gedtrim_core::Error),
}
