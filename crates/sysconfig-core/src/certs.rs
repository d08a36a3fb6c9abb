//! Registry CA certificates.
//!
//! Certificates arrive as a flat mapping of registry name to PEM content.
//! Cluster object keys cannot contain `:`, so a port is written as `..`
//! (`registry.example.com..5000`) and mapped back when the trust directory
//! is laid out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// File name the runtime looks for inside each per-registry directory.
pub const CA_CERT_FILE_NAME: &str = "ca.crt";

/// Maps a registry name to its trust directory folder name.
///
/// Only the first `..` is replaced with `:`; everything else passes through.
///
/// # Examples
///
/// ```rust
/// use sysconfig_core::folder_name;
///
/// assert_eq!(folder_name("docker.io..5000"), "docker.io:5000");
/// assert_eq!(folder_name("docker.io"), "docker.io");
/// ```
#[must_use]
pub fn folder_name(registry: &str) -> String {
    registry.replacen("..", ":", 1)
}

/// A registry and the certificate authority to trust for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertTuple {
    /// Registry name, possibly with a `..` port separator.
    pub registry: String,

    /// PEM encoded certificate content.
    pub certificate: String,
}

impl CertTuple {
    /// Creates a new tuple.
    #[must_use]
    pub fn new(registry: impl Into<String>, certificate: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            certificate: certificate.into(),
        }
    }

    /// Converts a `ConfigMap` style data mapping into tuples, in key order.
    #[must_use]
    pub fn from_data_map(data: &BTreeMap<String, String>) -> Vec<Self> {
        data.iter()
            .map(|(registry, certificate)| Self::new(registry.clone(), certificate.clone()))
            .collect()
    }

    /// Folder name of this registry inside the trust directory.
    #[must_use]
    pub fn folder_name(&self) -> String {
        folder_name(&self.registry)
    }

    /// Short SHA-256 fingerprint of the certificate content, for logs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.certificate.as_bytes());
        hex::encode(&digest[..8])
    }
}
