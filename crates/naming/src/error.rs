//! Error types for the naming crate

use thiserror::Error;

/// Errors that can occur while allocating names
#[derive(Debug, Error)]
pub enum Error {
    /// The disambiguation loop ran out of attempts without finding a free name
    #[error("no free name for '{base}' after {attempts} attempts")]
    AllocationExhausted {
        /// Base name that was being disambiguated
        base: String,
        /// Number of suffixed candidates that were tried
        attempts: u32,
    },
}

/// Result type for naming operations
pub type Result<T> = std::result::Result<T, Error>;
