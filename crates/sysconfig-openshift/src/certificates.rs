//! `openshift-image-registry/image-registry-certificates` → trusted registry CAs.
//!
//! The config map's data keys are registry names (with `..` standing in
//! for `:`), the values PEM certificates. Every update replaces the whole
//! trusted set.

use k8s_openapi::api::core::v1::ConfigMap;
use kube::runtime::watcher::Event;
use kube::ResourceExt;
use sysconfig_core::CertTuple;
use sysconfig_syncer::{ConfigSink, Result};
use tracing::{debug, info, warn};

/// Namespace holding the registry certificates config map.
pub const REGISTRY_CERTIFICATES_NAMESPACE: &str = "openshift-image-registry";

/// Name of the registry certificates config map.
pub const REGISTRY_CERTIFICATES_NAME: &str = "image-registry-certificates";

/// Extracts certificate tuples from a config map's data.
#[must_use]
pub fn parse_registry_certs(config_map: &ConfigMap) -> Vec<CertTuple> {
    config_map
        .data
        .as_ref()
        .map(CertTuple::from_data_map)
        .unwrap_or_default()
}

/// Returns true for `openshift-image-registry/image-registry-certificates`.
#[must_use]
pub fn is_registry_certificates(config_map: &ConfigMap) -> bool {
    config_map.name_any() == REGISTRY_CERTIFICATES_NAME
        && config_map.namespace().as_deref() == Some(REGISTRY_CERTIFICATES_NAMESPACE)
}

/// Replaces the trusted certificates from the registry certificates config
/// map. Other config maps are ignored and reported as `Ok(false)`.
///
/// # Errors
///
/// Returns the sink error.
pub async fn on_apply(sink: &dyn ConfigSink, config_map: &ConfigMap) -> Result<bool> {
    if !is_registry_certificates(config_map) {
        debug!(
            config_map = %config_map.name_any(),
            namespace = ?config_map.namespace(),
            "ignoring config map"
        );
        return Ok(false);
    }

    let tuples = parse_registry_certs(config_map);
    info!(
        count = tuples.len(),
        "the image-registry-certificates configmap has been updated"
    );
    for tuple in &tuples {
        debug!(registry = %tuple.registry, fingerprint = %tuple.fingerprint(), "registry certificate");
    }
    sink.replace_certificates(tuples).await?;
    Ok(true)
}

/// Routes one watcher event. Deletions leave the current certificates in
/// place.
pub async fn handle(sink: &dyn ConfigSink, event: Event<ConfigMap>) {
    match event {
        Event::Apply(config_map) | Event::InitApply(config_map) => {
            if let Err(e) = on_apply(sink, &config_map).await {
                warn!(error = %e, "error updating registry certs");
            }
        }
        Event::Delete(_) | Event::Init | Event::InitDone => {}
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::test_support::{Call, RecordingSink};

    fn config_map(name: &str, data: &[(&str, &str)]) -> ConfigMap {
        config_map_in(REGISTRY_CERTIFICATES_NAMESPACE, name, data)
    }

    fn config_map_in(namespace: &str, name: &str, data: &[(&str, &str)]) -> ConfigMap {
        let mut config_map = ConfigMap::default();
        config_map.metadata.name = Some(name.to_string());
        config_map.metadata.namespace = Some(namespace.to_string());
        config_map.data = Some(
            data.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<BTreeMap<_, _>>(),
        );
        config_map
    }

    #[test]
    fn test_parse_registry_certs() {
        let cm = config_map(
            REGISTRY_CERTIFICATES_NAME,
            &[("quay.io", "Q"), ("registry.local..5000", "L")],
        );

        let tuples = parse_registry_certs(&cm);

        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[1].folder_name(), "registry.local:5000");
    }

    #[test]
    fn test_parse_without_data() {
        assert!(parse_registry_certs(&ConfigMap::default()).is_empty());
    }

    #[tokio::test]
    async fn test_registry_certificates_are_replaced() {
        let sink = RecordingSink::default();
        let cm = config_map(REGISTRY_CERTIFICATES_NAME, &[("quay.io", "Q")]);

        assert!(on_apply(&sink, &cm).await.unwrap());
        assert_eq!(
            sink.calls(),
            vec![Call::ReplaceCertificates(vec![CertTuple::new("quay.io", "Q")])]
        );
    }

    #[tokio::test]
    async fn test_other_config_maps_are_ignored() {
        let sink = RecordingSink::default();

        handle(&sink, Event::Apply(config_map("kube-root-ca.crt", &[("ca.crt", "X")]))).await;

        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_same_name_in_other_namespace_is_ignored() {
        let sink = RecordingSink::default();
        let cm = config_map_in("tenant-a", REGISTRY_CERTIFICATES_NAME, &[("evil.io", "E")]);

        let applied = on_apply(&sink, &cm).await.unwrap();

        assert!(!applied);
        assert!(sink.calls().is_empty());
        assert!(!is_registry_certificates(&ConfigMap::default()));
    }
}
