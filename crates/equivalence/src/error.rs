//! Error types for the equivalence crate

use thiserror::Error;

/// Errors that can occur while building or decoding documents
#[derive(Debug, Error)]
pub enum Error {
    /// A decoded value has no counterpart in [`Value`](crate::Value)
    #[error("unsupported value kind: {kind}")]
    UnsupportedValueKind {
        /// Name of the offending kind as reported by the source format
        kind: &'static str,
    },

    /// Text could not be decoded as JSON
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for equivalence operations
pub type Result<T> = std::result::Result<T, Error>;
