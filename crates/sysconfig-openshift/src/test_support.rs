//! Recording sink for adapter tests.

use std::sync::Mutex;

use async_trait::async_trait;
use sysconfig_core::CertTuple;
use sysconfig_syncer::{ConfigSink, Result, SyncError};

/// A mutation the adapters asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RegistryPolicy(Vec<String>, Vec<String>, Vec<String>),
    SetMirrors(String, Vec<String>),
    ClearMirrors(String),
    ClearAllMirrors,
    ReplaceCertificates(Vec<CertTuple>),
}

/// Records every call; optionally fails `clear_mirrors` for one registry.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<Call>>,
    missing: Option<String>,
}

impl RecordingSink {
    pub fn failing_clear_for(registry: &str) -> Self {
        Self {
            calls: Mutex::default(),
            missing: Some(registry.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ConfigSink for RecordingSink {
    async fn set_registry_policy(
        &self,
        allowed: &[String],
        blocked: &[String],
        insecure: &[String],
    ) -> Result<()> {
        self.record(Call::RegistryPolicy(
            allowed.to_vec(),
            blocked.to_vec(),
            insecure.to_vec(),
        ));
        if !allowed.is_empty() && !blocked.is_empty() {
            return Err(SyncError::InvalidArgument {
                reason: "overlap".to_string(),
            });
        }
        Ok(())
    }

    async fn set_mirrors(&self, registry: &str, mirrors: Vec<String>) -> Result<()> {
        self.record(Call::SetMirrors(registry.to_string(), mirrors));
        Ok(())
    }

    async fn clear_mirrors(&self, registry: &str) -> Result<()> {
        self.record(Call::ClearMirrors(registry.to_string()));
        if self.missing.as_deref() == Some(registry) {
            return Err(SyncError::NotFound {
                registry: registry.to_string(),
            });
        }
        Ok(())
    }

    async fn clear_all_mirrors(&self) -> Result<()> {
        self.record(Call::ClearAllMirrors);
        Ok(())
    }

    async fn replace_certificates(&self, certificates: Vec<CertTuple>) -> Result<()> {
        self.record(Call::ReplaceCertificates(certificates));
        Ok(())
    }
}
