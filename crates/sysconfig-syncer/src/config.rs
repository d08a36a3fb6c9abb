//! Artifact locations for the synchronizer.

use std::path::{Path, PathBuf};

/// Default location of the registries configuration.
pub const DEFAULT_REGISTRIES_CONF: &str = "/tmp/containers/registries.conf";

/// Default location of the signature policy.
pub const DEFAULT_POLICY_JSON: &str = "/tmp/containers/policy.json";

/// Default certificate trust directory.
pub const DEFAULT_CERTS_DIR: &str = "/tmp/docker/certs.d";

/// Environment variable overriding [`SyncerConfig::registries_conf`].
pub const REGISTRIES_CONF_ENV: &str = "SYSCONFIG_REGISTRIES_CONF";

/// Environment variable overriding [`SyncerConfig::policy_json`].
pub const POLICY_JSON_ENV: &str = "SYSCONFIG_POLICY_JSON";

/// Environment variable overriding [`SyncerConfig::certs_dir`].
pub const CERTS_DIR_ENV: &str = "SYSCONFIG_CERTS_DIR";

/// Where the persistence writer puts each artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncerConfig {
    /// Path of `registries.conf`.
    pub registries_conf: PathBuf,

    /// Path of `policy.json`.
    pub policy_json: PathBuf,

    /// Root of the certificate trust directory. Deleted and rebuilt on
    /// every pass.
    pub certs_dir: PathBuf,
}

impl Default for SyncerConfig {
    fn default() -> Self {
        Self {
            registries_conf: PathBuf::from(DEFAULT_REGISTRIES_CONF),
            policy_json: PathBuf::from(DEFAULT_POLICY_JSON),
            certs_dir: PathBuf::from(DEFAULT_CERTS_DIR),
        }
    }
}

impl SyncerConfig {
    /// Lays out all artifacts under `root`, mirroring the default layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use sysconfig_syncer::SyncerConfig;
    ///
    /// let config = SyncerConfig::under("/host");
    /// assert_eq!(config.policy_json.to_str(), Some("/host/containers/policy.json"));
    /// assert_eq!(config.certs_dir.to_str(), Some("/host/docker/certs.d"));
    /// ```
    #[must_use]
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            registries_conf: root.join("containers").join("registries.conf"),
            policy_json: root.join("containers").join("policy.json"),
            certs_dir: root.join("docker").join("certs.d"),
        }
    }

    /// Builds a configuration from the defaults, overridden by
    /// `SYSCONFIG_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(REGISTRIES_CONF_ENV) {
            config.registries_conf = path.into();
        }
        if let Some(path) = lookup(POLICY_JSON_ENV) {
            config.policy_json = path.into();
        }
        if let Some(path) = lookup(CERTS_DIR_ENV) {
            config.certs_dir = path.into();
        }
        config
    }

    /// Sets the `registries.conf` path.
    #[must_use]
    pub fn with_registries_conf(mut self, path: impl Into<PathBuf>) -> Self {
        self.registries_conf = path.into();
        self
    }

    /// Sets the `policy.json` path.
    #[must_use]
    pub fn with_policy_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.policy_json = path.into();
        self
    }

    /// Sets the certificate trust directory.
    #[must_use]
    pub fn with_certs_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.certs_dir = path.into();
        self
    }
}
