//! Error types for Gedtrim Core

use thiserror::Error;

/// Result type alias using Gedtrim's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Gedtrim core error types
#[derive(Error, Debug)]
pub enum Error {
    /// A family or individual references an ID that was never parsed.
    /// Indicates corrupt input; surfaced immediately, never recovered.
    #[error("malformed reference: {from} refers to missing record {to}")]
    MalformedReference { from: String, to: String },

    #[error("duplicate record ID: {0}")]
    DuplicateId(String),

    #[error("starting individual not found: {0}")]
    UnknownStart(String),
}
