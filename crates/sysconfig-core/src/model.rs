//! The composite configuration record.
//!
//! [`ConfigModel`] is what the synchronizer guards with a single lock. Every
//! mutation here is all-or-nothing: validation happens before the first
//! field is touched.

use crate::certs::CertTuple;
use crate::error::{ModelError, Result};
use crate::policy::PolicyModel;
use crate::registries::RegistriesModel;

/// Desired registries, signature policy and trusted certificates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigModel {
    /// `registries.conf` content.
    pub registries: RegistriesModel,

    /// `policy.json` content.
    pub policy: PolicyModel,

    /// Certificates to materialize under the trust directory.
    pub certificates: Vec<CertTuple>,
}

impl ConfigModel {
    /// Replaces the allow/block/insecure state of every registry.
    ///
    /// Previous flags and reject rules are discarded, then the three lists
    /// are applied, creating entries as needed. Blocked registries also get
    /// a reject rule in the signature policy.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] if both `allowed` and
    /// `blocked` are non-empty. The model is left unchanged.
    pub fn apply_registry_policy(
        &mut self,
        allowed: &[String],
        blocked: &[String],
        insecure: &[String],
    ) -> Result<()> {
        if !allowed.is_empty() && !blocked.is_empty() {
            return Err(ModelError::InvalidArgument {
                reason: "only one of allowed and blocked registries can be set".to_string(),
            });
        }

        self.registries.reset_access();
        self.policy.reset_transports();

        for registry in allowed {
            self.registries.get_or_create(registry).allow();
        }
        for registry in blocked {
            self.registries.get_or_create(registry).block();
            self.policy.reject_registry(registry);
        }
        for registry in insecure {
            self.registries.get_or_create(registry).mark_insecure();
        }

        Ok(())
    }

    /// Replaces the mirrors of `registry`, creating the entry if needed.
    pub fn set_mirrors(&mut self, registry: &str, mirrors: Vec<String>) {
        self.registries.get_or_create(registry).set_mirrors(mirrors);
    }

    /// Empties the mirrors of a known registry.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if the registry has no entry.
    pub fn clear_mirrors(&mut self, registry: &str) -> Result<()> {
        let entry = self
            .registries
            .get_mut(registry)
            .ok_or_else(|| ModelError::NotFound {
                registry: registry.to_string(),
            })?;
        entry.clear_mirrors();
        Ok(())
    }

    /// Empties the mirrors of every registry.
    pub fn clear_all_mirrors(&mut self) {
        self.registries.clear_all_mirrors();
    }

    /// Replaces the certificate set wholesale.
    pub fn replace_certificates(&mut self, certificates: Vec<CertTuple>) {
        self.certificates = certificates;
    }
}
