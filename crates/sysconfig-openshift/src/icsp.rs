//! `ImageContentSourcePolicy` → registry mirrors.
//!
//! Each repository digest mirror source becomes one mirror update. Sources
//! are handled independently: a failing source is logged and skipped.

use std::collections::{HashMap, HashSet};

use kube::runtime::watcher::Event;
use kube::ResourceExt;
use sysconfig_syncer::ConfigSink;
use tracing::{debug, warn};

use crate::resources::ImageContentSourcePolicy;

/// Applies the mirrors of every source in `icsp`. Returns how many sources
/// were applied.
pub async fn on_add(sink: &dyn ConfigSink, icsp: &ImageContentSourcePolicy) -> usize {
    let mut applied = 0;
    for source in &icsp.spec.repository_digest_mirrors {
        match sink
            .set_mirrors(&source.source, source.mirrors.clone())
            .await
        {
            Ok(()) => applied += 1,
            Err(e) => warn!(
                icsp = %icsp.name_any(),
                source = %source.source,
                error = %e,
                "error updating registry mirroring config"
            ),
        }
    }
    applied
}

/// Clears the mirrors of every source in `icsp`. Returns how many sources
/// were cleared.
pub async fn on_delete(sink: &dyn ConfigSink, icsp: &ImageContentSourcePolicy) -> usize {
    let mut cleared = 0;
    for source in &icsp.spec.repository_digest_mirrors {
        match sink.clear_mirrors(&source.source).await {
            Ok(()) => cleared += 1,
            Err(e) => warn!(
                icsp = %icsp.name_any(),
                source = %source.source,
                error = %e,
                "error removing registry mirroring config"
            ),
        }
    }
    cleared
}

/// Clears the sources of `old`, then applies the sources of `new`.
pub async fn on_update(
    sink: &dyn ConfigSink,
    old: &ImageContentSourcePolicy,
    new: &ImageContentSourcePolicy,
) -> usize {
    on_delete(sink, old).await;
    on_add(sink, new).await
}

/// Turns watcher events into add/update/delete calls.
///
/// Watch events carry only the new object, so the last seen version of
/// each policy is kept to compute updates. A relist (`Init` .. `InitDone`)
/// deletes every tracked policy the relist did not return.
#[derive(Debug, Default)]
pub struct IcspHandler {
    known: HashMap<String, ImageContentSourcePolicy>,
    relisted: Option<HashSet<String>>,
}

impl IcspHandler {
    /// Creates a handler that has seen no policies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of policies currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.known.len()
    }

    /// Routes one watcher event.
    pub async fn handle(&mut self, sink: &dyn ConfigSink, event: Event<ImageContentSourcePolicy>) {
        match event {
            Event::Apply(icsp) => self.apply(sink, icsp).await,
            Event::InitApply(icsp) => {
                if let Some(relisted) = &mut self.relisted {
                    relisted.insert(icsp.name_any());
                }
                self.apply(sink, icsp).await;
            }
            Event::Delete(icsp) => {
                self.known.remove(&icsp.name_any());
                on_delete(sink, &icsp).await;
            }
            Event::Init => {
                debug!(tracked = self.known.len(), "image content source policy relist started");
                self.relisted = Some(HashSet::new());
            }
            Event::InitDone => self.finish_relist(sink).await,
        }
    }

    async fn finish_relist(&mut self, sink: &dyn ConfigSink) {
        let Some(relisted) = self.relisted.take() else {
            return;
        };
        let vanished: Vec<String> = self
            .known
            .keys()
            .filter(|name| !relisted.contains(*name))
            .cloned()
            .collect();
        for name in vanished {
            if let Some(icsp) = self.known.remove(&name) {
                debug!(icsp = %name, "image content source policy gone after relist");
                on_delete(sink, &icsp).await;
            }
        }
    }

    async fn apply(&mut self, sink: &dyn ConfigSink, icsp: ImageContentSourcePolicy) {
        let name = icsp.name_any();
        match self.known.get(&name) {
            Some(previous) if previous.spec == icsp.spec => {
                debug!(icsp = %name, "image content source policy unchanged");
            }
            Some(previous) => {
                on_update(sink, previous, &icsp).await;
            }
            None => {
                on_add(sink, &icsp).await;
            }
        }
        self.known.insert(name, icsp);
    }
}
