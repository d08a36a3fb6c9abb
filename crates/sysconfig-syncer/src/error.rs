//! Error types for synchronizer operations.

use std::path::PathBuf;

use sysconfig_core::ModelError;
use thiserror::Error;

/// Result type alias using [`SyncError`] as the error type.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while mutating or persisting the configuration.
///
/// [`SyncError::InvalidArgument`] and [`SyncError::NotFound`] are returned to
/// mutation callers. [`SyncError::Io`] and [`SyncError::Render`] only happen
/// inside the writer and are reported through pass reports and logs.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The requested mutation is contradictory.
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Why the input was rejected.
        reason: String,
    },

    /// The mutation targets an unknown registry.
    #[error("Registry not found: {registry}")]
    NotFound {
        /// Registry location.
        registry: String,
    },

    /// Filesystem error while writing an artifact.
    #[error("File I/O error at {path}: {source}")]
    Io {
        /// Path being written or removed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be rendered.
    #[error("Failed to render artifact: {reason}")]
    Render {
        /// Rendering error message.
        reason: String,
    },

    /// The writer task is gone and can no longer accept requests.
    #[error("Persistence writer is not running")]
    WriterStopped,

    /// The process-wide synchronizer was requested outside a Tokio runtime.
    #[error("No Tokio runtime available to start the persistence writer")]
    NoRuntime,
}

impl SyncError {
    /// Creates an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ModelError> for SyncError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidArgument { reason } => Self::InvalidArgument { reason },
            ModelError::NotFound { registry } => Self::NotFound { registry },
            other @ (ModelError::TomlError(_) | ModelError::JsonError(_)) => Self::Render {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_errors_keep_their_kind() {
        let err: SyncError = ModelError::NotFound {
            registry: "quay.io".to_string(),
        }
        .into();
        assert!(matches!(err, SyncError::NotFound { registry } if registry == "quay.io"));

        let err: SyncError = ModelError::InvalidArgument {
            reason: "overlap".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Invalid argument: overlap");
    }

    #[test]
    fn test_error_display_io() {
        let err = SyncError::io(
            "/etc/containers/policy.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            err.to_string(),
            "File I/O error at /etc/containers/policy.json: denied"
        );
    }
}
