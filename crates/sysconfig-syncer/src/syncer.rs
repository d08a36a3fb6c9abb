//! The configuration synchronizer.
//!
//! [`ConfigSyncer`] owns the desired [`ConfigModel`] behind one lock and a
//! single background writer task. Every mutation follows the same
//! discipline: lock, mutate, unlock, then post to the change signal. The
//! post happens after the guard is dropped: the writer takes the same lock
//! right after accepting a request, so a mutator that waited for
//! acceptance while holding the lock could starve the writer of it. The
//! writer locks only after acceptance, so its snapshot is always at least
//! as new as the mutation that triggered it.
//!
//! ```text
//!  set_mirrors ─┐
//!  set_registry_policy ─┼─▶ Mutex<ConfigModel> ─▶ change signal ─▶ writer task
//!  replace_certificates ┘                         (1 slot, ack)     │
//!                                                                    ▼
//!                                     registries.conf, policy.json, certs.d/
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sysconfig_core::{CertTuple, ConfigModel};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info};

use crate::config::SyncerConfig;
use crate::error::{Result, SyncError};
use crate::report::{PassOutcome, PassReport};
use crate::signal::{change_signal, SignalReceiver, SignalSender};
use crate::sink::ConfigSink;
use crate::writer::PersistenceWriter;

/// Process-wide model of desired registry configuration.
///
/// Construct one with [`ConfigSyncer::start`] and share the returned `Arc`
/// with every event source.
///
/// # Cancel safety
///
/// The mutation operations are not cancel safe. The model is updated before
/// the change is posted to the writer, so dropping the future while it waits
/// for acceptance keeps the change in memory without a pass for it. It
/// reaches disk with the next accepted mutation.
#[derive(Debug)]
pub struct ConfigSyncer {
    model: Arc<Mutex<ConfigModel>>,
    signal: SignalSender,
    reports: watch::Receiver<Option<PassReport>>,
    config: SyncerConfig,
}

impl ConfigSyncer {
    /// Creates a synchronizer with the default model and spawns its writer.
    ///
    /// Must be called from within a Tokio runtime. The writer stops once
    /// the synchronizer is dropped.
    #[must_use]
    pub fn start(config: SyncerConfig) -> Arc<Self> {
        let model = Arc::new(Mutex::new(ConfigModel::default()));
        let (signal, receiver) = change_signal();
        let (report_tx, reports) = watch::channel(None);

        let worker = Worker {
            model: Arc::clone(&model),
            writer: PersistenceWriter::new(config.clone()),
            reports: report_tx,
        };
        tokio::spawn(worker.run(receiver));

        info!(
            registries_conf = %config.registries_conf.display(),
            policy_json = %config.policy_json.display(),
            certs_dir = %config.certs_dir.display(),
            "started system config syncer"
        );

        Arc::new(Self {
            model,
            signal,
            reports,
            config,
        })
    }

    /// Artifact locations.
    #[must_use]
    pub const fn config(&self) -> &SyncerConfig {
        &self.config
    }

    /// Returns a copy of the current model.
    pub async fn snapshot(&self) -> ConfigModel {
        self.model.lock().await.clone()
    }

    /// Subscribes to pass reports. The value is `None` until the first pass
    /// finishes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<PassReport>> {
        self.reports.clone()
    }

    /// Report of the most recent pass, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<PassReport> {
        self.reports.borrow().clone()
    }

    /// Waits until the pass with the given sequence number (or a later one)
    /// has finished and returns its report.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::WriterStopped`] if the writer exits first.
    pub async fn wait_for_pass(&self, sequence: u64) -> Result<PassReport> {
        let mut reports = self.subscribe();
        let report = reports
            .wait_for(|report| report.as_ref().is_some_and(|r| r.sequence >= sequence))
            .await
            .map_err(|_| SyncError::WriterStopped)?
            .clone();
        report.ok_or(SyncError::WriterStopped)
    }

    /// Replaces allow/block/insecure state for every registry.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidArgument`] if both `allowed` and
    /// `blocked` are non-empty; nothing is changed or persisted.
    pub async fn set_registry_policy(
        &self,
        allowed: &[String],
        blocked: &[String],
        insecure: &[String],
    ) -> Result<()> {
        self.model
            .lock()
            .await
            .apply_registry_policy(allowed, blocked, insecure)?;
        debug!(
            allowed = allowed.len(),
            blocked = blocked.len(),
            insecure = insecure.len(),
            "stored image registry policy"
        );
        self.signal.post().await
    }

    /// Replaces the mirrors of `registry`, creating the entry if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::WriterStopped`] if the writer is gone.
    pub async fn set_mirrors(&self, registry: &str, mirrors: Vec<String>) -> Result<()> {
        debug!(registry, mirrors = mirrors.len(), "updating registry mirrors");
        self.model.lock().await.set_mirrors(registry, mirrors);
        self.signal.post().await
    }

    /// Empties the mirrors of a known registry.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if the registry is unknown; nothing
    /// is persisted in that case.
    pub async fn clear_mirrors(&self, registry: &str) -> Result<()> {
        self.model.lock().await.clear_mirrors(registry)?;
        debug!(registry, "cleared registry mirrors");
        self.signal.post().await
    }

    /// Empties the mirrors of every registry.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::WriterStopped`] if the writer is gone.
    pub async fn clear_all_mirrors(&self) -> Result<()> {
        self.model.lock().await.clear_all_mirrors();
        debug!("cleared all registry mirrors");
        self.signal.post().await
    }

    /// Replaces the trusted certificate set wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::WriterStopped`] if the writer is gone.
    pub async fn replace_certificates(&self, certificates: Vec<CertTuple>) -> Result<()> {
        debug!(count = certificates.len(), "storing registry certificates");
        self.model.lock().await.replace_certificates(certificates);
        self.signal.post().await
    }
}

#[async_trait]
impl ConfigSink for ConfigSyncer {
    async fn set_registry_policy(
        &self,
        allowed: &[String],
        blocked: &[String],
        insecure: &[String],
    ) -> Result<()> {
        Self::set_registry_policy(self, allowed, blocked, insecure).await
    }

    async fn set_mirrors(&self, registry: &str, mirrors: Vec<String>) -> Result<()> {
        Self::set_mirrors(self, registry, mirrors).await
    }

    async fn clear_mirrors(&self, registry: &str) -> Result<()> {
        Self::clear_mirrors(self, registry).await
    }

    async fn clear_all_mirrors(&self) -> Result<()> {
        Self::clear_all_mirrors(self).await
    }

    async fn replace_certificates(&self, certificates: Vec<CertTuple>) -> Result<()> {
        Self::replace_certificates(self, certificates).await
    }
}

/// The single consumer of the change signal.
struct Worker {
    model: Arc<Mutex<ConfigModel>>,
    writer: PersistenceWriter,
    reports: watch::Sender<Option<PassReport>>,
}

impl Worker {
    async fn run(self, mut signal: SignalReceiver) {
        let mut sequence = 0u64;
        while signal.accept().await {
            sequence += 1;
            let report = self.pass(sequence).await;
            self.reports.send_replace(Some(report));
        }
        info!(passes = sequence, "change signal closed, stopping persistence writer");
    }

    async fn pass(&self, sequence: u64) -> PassReport {
        let model = self.model.lock().await;
        let outcome = match self.writer.persist(&model).await {
            Ok(summary) => {
                info!(
                    sequence,
                    registries = summary.registries,
                    rejected = summary.rejected,
                    certificates = summary.certificates,
                    "synced system config"
                );
                PassOutcome::Completed(summary)
            }
            Err(failure) => {
                error!(
                    sequence,
                    stage = %failure.stage,
                    error = %failure.error,
                    "error syncing system config"
                );
                PassOutcome::Failed {
                    stage: failure.stage,
                    error: failure.error.to_string(),
                }
            }
        };
        drop(model);

        PassReport {
            sequence,
            completed_at: Utc::now(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::PassStage;
    use tempfile::TempDir;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_mutation_triggers_pass() {
        let temp = TempDir::new().unwrap();
        let syncer = ConfigSyncer::start(SyncerConfig::under(temp.path()));

        syncer
            .set_mirrors("quay.io", names(&["mirror.local/quay"]))
            .await
            .unwrap();
        let report = syncer.wait_for_pass(1).await.unwrap();

        assert!(report.is_success());
        let written = std::fs::read_to_string(&syncer.config().registries_conf).unwrap();
        assert!(written.contains("mirror.local/quay"));
    }

    #[tokio::test]
    async fn test_rejected_mutations_do_not_signal() {
        let temp = TempDir::new().unwrap();
        let syncer = ConfigSyncer::start(SyncerConfig::under(temp.path()));

        let result = syncer
            .set_registry_policy(&names(&["a.io"]), &names(&["b.io"]), &[])
            .await;
        assert!(matches!(result, Err(SyncError::InvalidArgument { .. })));

        let result = syncer.clear_mirrors("unknown.io").await;
        assert!(matches!(result, Err(SyncError::NotFound { .. })));

        assert_eq!(syncer.snapshot().await, ConfigModel::default());
        assert!(syncer.last_report().is_none());
        assert!(!syncer.config().registries_conf.exists());
    }

    #[tokio::test]
    async fn test_failed_pass_keeps_writer_alive() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let config = SyncerConfig::under(temp.path())
            .with_policy_json(blocker.join("policy.json"));
        let syncer = ConfigSyncer::start(config);

        syncer.set_mirrors("quay.io", names(&["m1"])).await.unwrap();
        let report = syncer.wait_for_pass(1).await.unwrap();
        assert!(matches!(
            report.outcome,
            PassOutcome::Failed { stage: PassStage::Policy, .. }
        ));
        // Registries were written before the policy step failed.
        assert!(syncer.config().registries_conf.exists());
        assert!(syncer.snapshot().await.registries.get("quay.io").is_some());

        std::fs::remove_file(&blocker).unwrap();
        syncer.clear_all_mirrors().await.unwrap();
        let report = syncer.wait_for_pass(2).await.unwrap();

        assert!(report.is_success());
        assert!(syncer.config().policy_json.exists());
    }
}
