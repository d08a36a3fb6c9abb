//! Error types for model operations.
//!
//! Model errors are returned synchronously to whoever asked for the
//! mutation; they never leave the model half-updated.

use thiserror::Error;

/// Result type alias using [`ModelError`] as the error type.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while mutating or rendering the model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The requested mutation is contradictory.
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Why the input was rejected.
        reason: String,
    },

    /// The mutation targets a registry the model does not know about.
    #[error("Registry not found: {registry}")]
    NotFound {
        /// Registry location that was looked up.
        registry: String,
    },

    /// `registries.conf` could not be rendered.
    #[error("Failed to render registries.conf: {0}")]
    TomlError(#[from] toml::ser::Error),

    /// `policy.json` could not be rendered.
    #[error("Failed to render policy.json: {0}")]
    JsonError(#[from] serde_json::Error),
}
