//! Signature verification policy (`policy.json`).
//!
//! Only two requirement types are produced: `insecureAcceptAnything` for the
//! defaults and `reject` for blocked registries. A blocked registry is
//! rejected on the `docker` and `atomic` transports; `docker-daemon` keeps
//! its accept-anything catch-all.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Image-pull mechanism a set of rules is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Transport {
    /// Registry pulls over the Docker distribution API.
    #[serde(rename = "docker")]
    Docker,

    /// Images loaded from a local Docker daemon.
    #[serde(rename = "docker-daemon")]
    DockerDaemon,

    /// Legacy OpenShift atomic registry transport.
    #[serde(rename = "atomic")]
    Atomic,
}

impl Transport {
    /// Transports on which blocked registries are rejected.
    pub const REJECTING: [Self; 2] = [Self::Docker, Self::Atomic];

    /// Returns the name used in `policy.json`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::DockerDaemon => "docker-daemon",
            Self::Atomic => "atomic",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single policy requirement, serialized as `{"type": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PolicyRequirement {
    /// Accept any image, signed or not.
    #[serde(rename = "insecureAcceptAnything")]
    InsecureAcceptAnything,

    /// Refuse every image.
    #[serde(rename = "reject")]
    Reject,
}

/// Per-registry rules within a transport. The empty key is the transport's
/// catch-all scope.
pub type TransportScopes = BTreeMap<String, Vec<PolicyRequirement>>;

/// The whole `policy.json` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyModel {
    default: Vec<PolicyRequirement>,
    transports: BTreeMap<Transport, TransportScopes>,
}

impl Default for PolicyModel {
    fn default() -> Self {
        Self {
            default: vec![PolicyRequirement::InsecureAcceptAnything],
            transports: default_transports(),
        }
    }
}

fn default_transports() -> BTreeMap<Transport, TransportScopes> {
    let mut docker_daemon = TransportScopes::new();
    docker_daemon.insert(
        String::new(),
        vec![PolicyRequirement::InsecureAcceptAnything],
    );

    BTreeMap::from([
        (Transport::DockerDaemon, docker_daemon),
        (Transport::Docker, TransportScopes::new()),
        (Transport::Atomic, TransportScopes::new()),
    ])
}

impl PolicyModel {
    /// Rules configured for `transport`.
    #[must_use]
    pub fn transport(&self, transport: Transport) -> Option<&TransportScopes> {
        self.transports.get(&transport)
    }

    /// Restores the transport rules to their defaults, dropping all rejects.
    pub fn reset_transports(&mut self) {
        self.transports = default_transports();
    }

    /// Adds a reject rule for `registry` on every rejecting transport.
    pub fn reject_registry(&mut self, registry: &str) {
        for transport in Transport::REJECTING {
            self.transports
                .entry(transport)
                .or_default()
                .insert(registry.to_string(), vec![PolicyRequirement::Reject]);
        }
    }

    /// Returns true if `registry` is rejected on every rejecting transport.
    #[must_use]
    pub fn is_rejected(&self, registry: &str) -> bool {
        Transport::REJECTING.iter().all(|transport| {
            self.transports
                .get(transport)
                .and_then(|scopes| scopes.get(registry))
                .is_some_and(|rules| rules.contains(&PolicyRequirement::Reject))
        })
    }

    /// Registries with a reject rule on any transport.
    #[must_use]
    pub fn rejected_registries(&self) -> Vec<&str> {
        let mut rejected: Vec<&str> = self
            .transports
            .values()
            .flat_map(|scopes| scopes.iter())
            .filter(|(_, rules)| rules.contains(&PolicyRequirement::Reject))
            .map(|(registry, _)| registry.as_str())
            .collect();
        rejected.sort_unstable();
        rejected.dedup();
        rejected
    }

    /// Renders the document as pretty-printed `policy.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be encoded.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
