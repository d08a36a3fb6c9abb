//! OpenShift custom resources consumed by the adapters.
//!
//! Only the fields the synchronizer reads are declared; everything else in
//! the upstream schema is ignored on decode.

use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Name of the cluster-wide `Image` configuration object.
pub const CLUSTER_IMAGE_NAME: &str = "cluster";

/// Spec of `imagecontentsourcepolicies.operator.openshift.io`.
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[kube(
    group = "operator.openshift.io",
    version = "v1alpha1",
    kind = "ImageContentSourcePolicy",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ImageContentSourcePolicySpec {
    /// Source repositories and the mirrors that serve their content.
    #[serde(default)]
    pub repository_digest_mirrors: Vec<RepositoryDigestMirrors>,
}

/// One source repository and its mirrors, in preference order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDigestMirrors {
    /// Repository that users refer to in image references.
    pub source: String,

    /// Mirror locations, tried in order.
    #[serde(default)]
    pub mirrors: Vec<String>,
}

/// Spec of `images.config.openshift.io`.
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "Image",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    /// Registry access restrictions for image pulls.
    #[serde(default)]
    pub registry_sources: RegistrySources,
}

/// Allowed, blocked and insecure registries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySources {
    /// Registries pulls are restricted to. Exclusive with `blocked_registries`.
    #[serde(default)]
    pub allowed_registries: Vec<String>,

    /// Registries pulls are denied from. Exclusive with `allowed_registries`.
    #[serde(default)]
    pub blocked_registries: Vec<String>,

    /// Registries reachable without TLS verification.
    #[serde(default)]
    pub insecure_registries: Vec<String>,
}
