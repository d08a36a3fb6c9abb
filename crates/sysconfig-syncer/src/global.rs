//! Lazily created process-wide synchronizer.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tokio::runtime::Handle;

use crate::config::SyncerConfig;
use crate::error::{Result, SyncError};
use crate::syncer::ConfigSyncer;

static GLOBAL: OnceCell<Arc<ConfigSyncer>> = OnceCell::new();

/// Returns the process-wide synchronizer, creating it on first use.
///
/// The instance is configured with [`SyncerConfig::from_env`] and its writer
/// runs on the runtime of the first caller. Every caller gets the same
/// instance.
///
/// # Errors
///
/// Returns [`SyncError::NoRuntime`] if the first call happens outside a
/// Tokio runtime.
pub fn global() -> Result<Arc<ConfigSyncer>> {
    GLOBAL
        .get_or_try_init(|| {
            Handle::try_current().map_err(|_| SyncError::NoRuntime)?;
            Ok(ConfigSyncer::start(SyncerConfig::from_env()))
        })
        .cloned()
}
