//! Cluster-backed collaborators for `kamel reconcile --apply`.
//!
//! Resources are server-side applied with `kube` while the handler runs, so
//! an apply failure lands in the workload status like any other deploy error.

use std::sync::Arc;

use anyhow::Context;
use k8s_openapi::api::core::v1::Service;
use kamel_core::action::{Applier, Health, ObservedTarget, StatusReader};
use kamel_core::apis::{API_VERSION, INTEGRATION_LABEL};
use kamel_core::collection::Resource;
use kamel_core::types::WorkloadKind;
use kamel_core::{KamelError, Result};
use kube::api::{Api, ApiResource, DynamicObject, ListParams, Patch, PatchParams};
use kube::core::GroupVersionKind;
use kube::Client;
use tokio::runtime::Runtime;

use crate::local::LocalCluster;

const FIELD_MANAGER: &str = "kamel";

/// Split an `apiVersion` into group and version; core resources have no group.
fn group_version(api_version: &str) -> (&str, &str) {
    api_version.split_once('/').unwrap_or(("", api_version))
}

fn api_resource(api_version: &str, kind: &str) -> ApiResource {
    let (group, version) = group_version(api_version);
    ApiResource::from_gvk(&GroupVersionKind::gvk(group, version, kind))
}

pub struct KubeCluster {
    runtime: Runtime,
    client: std::result::Result<Client, String>,
    /// Successfully applied resources are also staged here for reporting.
    staging: Arc<LocalCluster>,
}

impl KubeCluster {
    /// Connect using the ambient kubeconfig. A connection failure is kept and
    /// reported by every apply or status read instead of aborting the run.
    pub fn connect(staging: Arc<LocalCluster>) -> anyhow::Result<Arc<Self>> {
        let runtime = Runtime::new().context("failed to start async runtime")?;
        let client = runtime
            .block_on(Client::try_default())
            .map_err(|e| format!("failed to connect to the cluster: {e}"));
        if let Err(e) = &client {
            tracing::warn!(error = %e, "cluster unavailable");
        }
        Ok(Arc::new(Self {
            runtime,
            client,
            staging,
        }))
    }

    fn client(&self) -> std::result::Result<&Client, &str> {
        self.client.as_ref().map_err(String::as_str)
    }

    async fn apply_one(client: &Client, r: &Resource) -> anyhow::Result<()> {
        let ar = api_resource(r.api_version(), r.kind());
        let api: Api<DynamicObject> = Api::namespaced_with(client.clone(), r.namespace(), &ar);
        let body = serde_json::to_value(r)?;
        let params = PatchParams::apply(FIELD_MANAGER).force();
        api.patch(r.name(), &params, &Patch::Apply(&body)).await?;
        Ok(())
    }

    async fn integration_health(client: &Client, target: &ObservedTarget) -> kube::Result<Health> {
        let services: Api<Service> = Api::namespaced(client.clone(), &target.namespace);
        let selector = format!("{INTEGRATION_LABEL}={}", target.name);
        let found = services.list(&ListParams::default().labels(&selector)).await?;
        Ok(if found.items.is_empty() {
            Health::Progressing
        } else {
            Health::Ready
        })
    }

    async fn context_health(client: &Client, target: &ObservedTarget) -> kube::Result<Health> {
        let ar = api_resource(API_VERSION, WorkloadKind::IntegrationContext.as_str());
        let api: Api<DynamicObject> = Api::namespaced_with(client.clone(), &target.namespace, &ar);
        let Some(obj) = api.get_opt(&target.name).await? else {
            return Ok(Health::Progressing);
        };
        let phase = obj
            .data
            .get("status")
            .and_then(|s| s.get("phase"))
            .and_then(|p| p.as_str());
        Ok(match phase {
            Some("ready") => Health::Ready,
            Some("error") => Health::Failed(format!("context {} is in error", target.name)),
            _ => Health::Progressing,
        })
    }
}

impl Applier for KubeCluster {
    fn apply(&self, resources: &[Resource]) -> Result<()> {
        if resources.is_empty() {
            return Ok(());
        }
        let client = self.client().map_err(|e| KamelError::Apply(e.to_string()))?;
        for r in resources {
            self.runtime
                .block_on(Self::apply_one(client, r))
                .map_err(|e| {
                    KamelError::Apply(format!(
                        "{} {}/{}: {e:#}",
                        r.kind(),
                        r.namespace(),
                        r.name()
                    ))
                })?;
            tracing::info!(kind = r.kind(), namespace = r.namespace(), name = r.name(), "applied");
        }
        self.staging.apply(resources)
    }
}

impl StatusReader for KubeCluster {
    fn observe(&self, target: &ObservedTarget) -> Result<Health> {
        let client = self
            .client()
            .map_err(|e| KamelError::StatusRead(e.to_string()))?;
        let health = match target.kind {
            WorkloadKind::Integration => {
                self.runtime.block_on(Self::integration_health(client, target))
            }
            WorkloadKind::IntegrationContext => {
                self.runtime.block_on(Self::context_health(client, target))
            }
            WorkloadKind::IntegrationPlatform => return Ok(Health::Ready),
        };
        health.map_err(|e| KamelError::StatusRead(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_group_and_version() {
        assert_eq!(group_version("apps/v1"), ("apps", "v1"));
        assert_eq!(
            group_version("camel.apache.org/v1alpha1"),
            ("camel.apache.org", "v1alpha1")
        );
        assert_eq!(group_version("v1"), ("", "v1"));
    }

    #[test]
    fn context_api_resource_is_namespaced_custom_kind() {
        let ar = api_resource(API_VERSION, "IntegrationContext");
        assert_eq!(ar.group, "camel.apache.org");
        assert_eq!(ar.version, "v1alpha1");
        assert_eq!(ar.kind, "IntegrationContext");
        assert_eq!(ar.plural, "integrationcontexts");
    }
}
