//! Collaborator-facing mutation interface.

use async_trait::async_trait;
use sysconfig_core::CertTuple;

use crate::error::Result;

/// Operations event sources use to update the desired configuration.
///
/// Every operation returns once the change has been handed to the
/// persistence writer, not once it is on disk.
#[async_trait]
pub trait ConfigSink: Send + Sync {
    /// Replaces allow/block/insecure state for all registries.
    ///
    /// Fails with `InvalidArgument` if both `allowed` and `blocked` are
    /// non-empty.
    async fn set_registry_policy(
        &self,
        allowed: &[String],
        blocked: &[String],
        insecure: &[String],
    ) -> Result<()>;

    /// Replaces the mirrors of `registry`, creating it if needed.
    async fn set_mirrors(&self, registry: &str, mirrors: Vec<String>) -> Result<()>;

    /// Empties the mirrors of `registry`. Fails with `NotFound` if unknown.
    async fn clear_mirrors(&self, registry: &str) -> Result<()>;

    /// Empties the mirrors of every registry.
    async fn clear_all_mirrors(&self) -> Result<()>;

    /// Replaces the trusted certificate set wholesale.
    async fn replace_certificates(&self, certificates: Vec<CertTuple>) -> Result<()>;
}
