//! In-process collaborators used by `kamel reconcile`.
//!
//! Nothing here talks to a cluster. Builds resolve immediately to an image
//! reference derived from the registry, applied resources are staged for the
//! caller to print or push, and health is inferred from what this process
//! built or staged.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use kamel_core::action::{
    Applier, BuildOutcome, BuildRequest, Builder, Collaborators, Health, ObservedTarget,
    StatusReader,
};
use kamel_core::apis::INTEGRATION_LABEL;
use kamel_core::collection::Resource;
use kamel_core::types::WorkloadKind;
use kamel_core::Result;

pub struct LocalCluster {
    registry: String,
    staged: Mutex<Vec<Resource>>,
    known: Mutex<HashSet<ObservedTarget>>,
}

impl LocalCluster {
    pub fn new(registry: &str) -> Arc<Self> {
        Arc::new(Self {
            registry: registry.trim_end_matches('/').to_string(),
            staged: Mutex::new(Vec::new()),
            known: Mutex::new(HashSet::new()),
        })
    }

    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators::new(self.clone(), self.clone(), self.clone())
    }

    /// Remove and return everything applied since the last call.
    pub fn take_staged(&self) -> Vec<Resource> {
        std::mem::take(&mut *self.staged.lock().unwrap_or_else(|e| e.into_inner()))
    }

    fn remember(&self, target: ObservedTarget) {
        self.known
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(target);
    }

    fn image_for(&self, request: &BuildRequest) -> String {
        let tag = match request.kind {
            WorkloadKind::Integration => request.context.as_deref().unwrap_or("latest"),
            _ => "latest",
        };
        format!(
            "{}/{}/{}:{}",
            self.registry, request.namespace, request.name, tag
        )
    }
}

impl Builder for LocalCluster {
    fn build(&self, request: &BuildRequest) -> Result<BuildOutcome> {
        let image = self.image_for(request);
        tracing::debug!(name = %request.name, %image, "local build");
        self.remember(ObservedTarget::new(
            request.kind,
            &request.namespace,
            &request.name,
        ));
        Ok(BuildOutcome::Completed { image })
    }
}

impl Applier for LocalCluster {
    fn apply(&self, resources: &[Resource]) -> Result<()> {
        for r in resources {
            match r {
                Resource::IntegrationContext(_) => self.remember(ObservedTarget::new(
                    WorkloadKind::IntegrationContext,
                    r.namespace(),
                    r.name(),
                )),
                _ => {
                    let owner = r
                        .metadata()
                        .labels
                        .as_ref()
                        .and_then(|l| l.get(INTEGRATION_LABEL));
                    if let Some(owner) = owner {
                        self.remember(ObservedTarget::new(
                            WorkloadKind::Integration,
                            r.namespace(),
                            owner,
                        ));
                    }
                }
            }
        }
        self.staged
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(resources);
        Ok(())
    }
}

impl StatusReader for LocalCluster {
    fn observe(&self, target: &ObservedTarget) -> Result<Health> {
        let known = self.known.lock().unwrap_or_else(|e| e.into_inner());
        Ok(if known.contains(target) {
            Health::Ready
        } else {
            Health::Progressing
        })
    }
}
