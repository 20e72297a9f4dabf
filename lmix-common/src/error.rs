//! Common error types for lmix

use thiserror::Error;

/// Common result type for lmix operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the lmix crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
