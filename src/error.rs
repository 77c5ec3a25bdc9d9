//! Error types for gs1-decode.

use thiserror::Error;

/// Result type for gs1-decode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for gs1-decode operations.
///
/// Decoding itself never fails: [`crate::decode`] returns a well-formed
/// [`crate::DecodeResult`] for every input. These errors arise only from
/// fallible setup, such as building a dictionary from a caller-supplied
/// syntax table.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A syntax-table line could not be parsed.
    #[error("Malformed dictionary table line: {0}")]
    Table(String),

    /// Two table lines expand to the same AI code.
    #[error("Duplicate AI code in dictionary: {0}")]
    DuplicateAi(String),

    /// An AI code outside the 2-4 digit form was supplied.
    #[error("Invalid AI code: {0}")]
    InvalidAiCode(String),
}

impl Error {
    /// Create a table parse error.
    pub fn table(msg: impl Into<String>) -> Self {
        Error::Table(msg.into())
    }

    /// Create a duplicate-AI error.
    pub fn duplicate_ai(ai: impl Into<String>) -> Self {
        Error::DuplicateAi(ai.into())
    }

    /// Create an invalid-AI-code error.
    pub fn invalid_ai_code(ai: impl Into<String>) -> Self {
        Error::InvalidAiCode(ai.into())
    }
}
