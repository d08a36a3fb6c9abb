//! The persistence pass.
//!
//! A pass renders the model into its three artifacts in a fixed order:
//! `registries.conf`, `policy.json`, then the certificate tree. Steps are
//! independent writes, not a transaction. A failure stops the pass and
//! leaves the artifacts of later steps as the previous pass wrote them.

use std::fmt;
use std::path::Path;

use sysconfig_core::ConfigModel;
use tracing::debug;

use crate::certs::CertMaterializer;
use crate::config::SyncerConfig;
use crate::error::{Result, SyncError};
use crate::report::{PassStage, PassSummary};

/// A pass that stopped early.
#[derive(Debug)]
pub struct PassFailure {
    /// Stage that failed.
    pub stage: PassStage,

    /// Underlying error.
    pub error: SyncError,
}

impl fmt::Display for PassFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for PassFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

trait StageExt<T> {
    fn at(self, stage: PassStage) -> std::result::Result<T, PassFailure>;
}

impl<T> StageExt<T> for Result<T> {
    fn at(self, stage: PassStage) -> std::result::Result<T, PassFailure> {
        self.map_err(|error| PassFailure { stage, error })
    }
}

/// Serializes a [`ConfigModel`] to disk.
#[derive(Debug, Clone)]
pub struct PersistenceWriter {
    config: SyncerConfig,
    certs: CertMaterializer,
}

impl PersistenceWriter {
    /// Creates a writer for the given artifact locations.
    #[must_use]
    pub fn new(config: SyncerConfig) -> Self {
        let certs = CertMaterializer::new(config.certs_dir.clone());
        Self { config, certs }
    }

    /// Artifact locations.
    #[must_use]
    pub const fn config(&self) -> &SyncerConfig {
        &self.config
    }

    /// Runs one full pass over `model`.
    ///
    /// # Errors
    ///
    /// Returns the stage that failed and why. Stages before it were written.
    pub async fn persist(
        &self,
        model: &ConfigModel,
    ) -> std::result::Result<PassSummary, PassFailure> {
        let registries = model
            .registries
            .to_toml()
            .map_err(SyncError::from)
            .at(PassStage::Registries)?;
        write_artifact(&self.config.registries_conf, &registries)
            .await
            .at(PassStage::Registries)?;

        let policy = model
            .policy
            .to_json()
            .map_err(SyncError::from)
            .at(PassStage::Policy)?;
        write_artifact(&self.config.policy_json, &policy)
            .await
            .at(PassStage::Policy)?;

        self.certs.clear().await.at(PassStage::CertCleanup)?;
        let certificates = self
            .certs
            .write_all(&model.certificates)
            .await
            .at(PassStage::CertWrite)?;

        Ok(PassSummary {
            registries: model.registries.len(),
            rejected: model.policy.rejected_registries().len(),
            certificates,
        })
    }
}

/// Writes `contents` to `path`, creating the parent directory if needed.
async fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SyncError::io(parent, e))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| SyncError::io(path, e))?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysconfig_core::CertTuple;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_default_model_artifacts() {
        let temp = TempDir::new().unwrap();
        let writer = PersistenceWriter::new(SyncerConfig::under(temp.path()));

        let summary = writer.persist(&ConfigModel::default()).await.unwrap();
        assert_eq!(summary, PassSummary::default());

        let registries: toml::Value = toml::from_str(
            &std::fs::read_to_string(&writer.config().registries_conf).unwrap(),
        )
        .unwrap();
        assert_eq!(
            registries["unqualified-search-registries"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect::<Vec<_>>(),
            vec!["registry.access.redhat.com", "docker.io"]
        );

        let policy: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&writer.config().policy_json).unwrap(),
        )
        .unwrap();
        assert_eq!(
            policy,
            serde_json::json!({
                "default": [{"type": "insecureAcceptAnything"}],
                "transports": {
                    "docker-daemon": {"": [{"type": "insecureAcceptAnything"}]},
                    "docker": {},
                    "atomic": {}
                }
            })
        );
    }

    #[tokio::test]
    async fn test_registries_failure_skips_later_stages() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let config = SyncerConfig::under(temp.path())
            .with_registries_conf(blocker.join("registries.conf"));
        let writer = PersistenceWriter::new(config);

        let failure = writer.persist(&ConfigModel::default()).await.unwrap_err();

        assert_eq!(failure.stage, PassStage::Registries);
        assert!(matches!(failure.error, SyncError::Io { .. }));
        assert!(!writer.config().policy_json.exists());
    }

    #[tokio::test]
    async fn test_cert_tree_is_rebuilt() {
        let temp = TempDir::new().unwrap();
        let writer = PersistenceWriter::new(SyncerConfig::under(temp.path()));
        let certs_dir = writer.config().certs_dir.clone();

        let mut model = ConfigModel::default();
        model.replace_certificates(vec![CertTuple::new("old.io", "OLD")]);
        writer.persist(&model).await.unwrap();
        assert!(certs_dir.join("old.io/ca.crt").exists());

        model.replace_certificates(vec![CertTuple::new("new.io..443", "NEW")]);
        let summary = writer.persist(&model).await.unwrap();

        assert_eq!(summary.certificates, 1);
        assert!(!certs_dir.join("old.io").exists());
        assert_eq!(
            std::fs::read_to_string(certs_dir.join("new.io:443/ca.crt")).unwrap(),
            "NEW"
        );
    }

    #[tokio::test]
    async fn test_cert_cleanup_failure_keeps_earlier_artifacts() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let config = SyncerConfig::under(temp.path()).with_certs_dir(blocker.join("certs.d"));
        let writer = PersistenceWriter::new(config);

        let mut model = ConfigModel::default();
        model.replace_certificates(vec![CertTuple::new("a.io", "A")]);
        let failure = writer.persist(&model).await.unwrap_err();

        assert_eq!(failure.stage, PassStage::CertCleanup);
        assert!(matches!(failure.error, SyncError::Io { .. }));
        assert!(writer.config().registries_conf.exists());
        assert!(writer.config().policy_json.exists());
    }
}
