//! `images.config.openshift.io/cluster` → registry allow/block/insecure policy.

use kube::runtime::watcher::Event;
use kube::ResourceExt;
use sysconfig_syncer::{ConfigSink, Result};
use tracing::{debug, info, warn};

use crate::resources::{Image, CLUSTER_IMAGE_NAME};

/// Stores the registry sources of the cluster `Image` object.
///
/// Objects other than `cluster` are ignored and reported as `Ok(false)`.
///
/// # Errors
///
/// Returns the sink error, e.g. `InvalidArgument` when both allowed and
/// blocked registries are set.
pub async fn on_apply(sink: &dyn ConfigSink, image: &Image) -> Result<bool> {
    if image.name_any() != CLUSTER_IMAGE_NAME {
        debug!(image = %image.name_any(), "ignoring non-cluster image config");
        return Ok(false);
    }

    let sources = &image.spec.registry_sources;
    info!(
        allowed = sources.allowed_registries.len(),
        blocked = sources.blocked_registries.len(),
        insecure = sources.insecure_registries.len(),
        "the image.config.openshift.io/cluster object has been updated"
    );
    sink.set_registry_policy(
        &sources.allowed_registries,
        &sources.blocked_registries,
        &sources.insecure_registries,
    )
    .await?;
    Ok(true)
}

/// Routes one watcher event. Deletions are ignored: the last applied
/// registry policy stays in force.
pub async fn handle(sink: &dyn ConfigSink, event: Event<Image>) {
    match event {
        Event::Apply(image) | Event::InitApply(image) => {
            if let Err(e) = on_apply(sink, &image).await {
                warn!(error = %e, "error updating registry conf");
            }
        }
        Event::Delete(image) => {
            warn!(image = %image.name_any(), "ignoring image config deletion");
        }
        Event::Init | Event::InitDone => {}
    }
}
