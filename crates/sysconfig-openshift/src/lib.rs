//! # Sysconfig OpenShift
//!
//! Adapters from decoded OpenShift objects to the synchronizer's mutation
//! operations:
//!
//! | object | operation |
//! |---|---|
//! | `ImageContentSourcePolicy` | [`ConfigSink::set_mirrors`] / [`ConfigSink::clear_mirrors`] per source |
//! | `Image` named `cluster` | [`ConfigSink::set_registry_policy`] |
//! | `ConfigMap` `openshift-image-registry/image-registry-certificates` | [`ConfigSink::replace_certificates`] |
//!
//! Watching the cluster is left to the caller; each module exposes a
//! `handle` function taking `kube` watcher events.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod certificates;
pub mod icsp;
pub mod image;
pub mod resources;

#[cfg(test)]
mod test_support;

pub use icsp::IcspHandler;
pub use resources::{
    Image, ImageContentSourcePolicy, ImageContentSourcePolicySpec, ImageSpec, RegistrySources,
    RepositoryDigestMirrors, CLUSTER_IMAGE_NAME,
};
pub use sysconfig_syncer::ConfigSink;
