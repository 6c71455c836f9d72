//! IntegrationPlatform lifecycle: initialize → create → start.
//!
//! The platform owns the shared contexts that integrations build on. During
//! `create` it materializes one [`IntegrationContext`] per configured template
//! in its own namespace; `start` waits for all of them to report ready.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Action, Applier, Health, ObservedTarget, StatusReader};
use crate::apis::{
    ClusterType, IntegrationContext, IntegrationPlatform, Workload, CONTEXT_TYPE_LABEL,
};
use crate::collection::Collection;
use crate::config::Config;
use crate::error::Result;
use crate::paths;
use crate::types::{ConditionStatus, ConditionType, PlatformPhase, WorkloadKind};

const PLATFORM_CONTEXT_TYPE: &str = "platform";

fn advance(p: &mut IntegrationPlatform, phase: PlatformPhase) {
    if p.status.phase != Some(phase) {
        tracing::info!(
            platform = p.name(),
            from = p.status.phase.map(|x| x.as_str()).unwrap_or("none"),
            to = phase.as_str(),
            "platform phase changed"
        );
        p.status.phase = Some(phase);
    }
}

// ---------------------------------------------------------------------------
// Initialize
// ---------------------------------------------------------------------------

pub struct InitializeAction {
    config: Arc<Config>,
}

impl InitializeAction {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl Action<IntegrationPlatform> for InitializeAction {
    fn name(&self) -> &str {
        "initialize"
    }

    fn can_handle(&self, p: &IntegrationPlatform) -> bool {
        p.status.phase.is_none()
    }

    fn handle(&self, p: &mut IntegrationPlatform) -> Result<()> {
        paths::validate_name(p.name())?;
        p.default_namespace(&self.config.namespace);
        if p.spec.cluster.is_none() {
            p.spec.cluster = Some(ClusterType::Kubernetes);
        }
        if p.spec.build.registry.is_none() {
            p.spec.build.registry = Some(self.config.registry.clone());
        }
        advance(p, PlatformPhase::Creating);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

pub struct CreateAction {
    config: Arc<Config>,
    applier: Arc<dyn Applier>,
}

impl CreateAction {
    pub fn new(config: Arc<Config>, applier: Arc<dyn Applier>) -> Self {
        Self { config, applier }
    }

    fn default_contexts(&self, namespace: &str) -> Result<Collection> {
        let mut resources = Collection::new();
        for template in &self.config.platform.contexts {
            paths::validate_name(&template.name)?;
            let mut ctx = IntegrationContext::new(&template.name, namespace);
            ctx.metadata.labels = Some(BTreeMap::from([(
                CONTEXT_TYPE_LABEL.to_string(),
                PLATFORM_CONTEXT_TYPE.to_string(),
            )]));
            ctx.spec.dependencies = template.dependencies.clone();
            resources.add(ctx);
        }
        Ok(resources)
    }
}

impl Action<IntegrationPlatform> for CreateAction {
    fn name(&self) -> &str {
        "create"
    }

    fn can_handle(&self, p: &IntegrationPlatform) -> bool {
        p.status.phase == Some(PlatformPhase::Creating)
    }

    fn handle(&self, p: &mut IntegrationPlatform) -> Result<()> {
        let resources = self.default_contexts(p.namespace())?;
        tracing::debug!(
            platform = p.name(),
            contexts = resources.len(),
            "creating platform contexts"
        );
        self.applier.apply(resources.items())?;
        advance(p, PlatformPhase::Starting);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

pub struct StartAction {
    config: Arc<Config>,
    status: Arc<dyn StatusReader>,
}

impl StartAction {
    pub fn new(config: Arc<Config>, status: Arc<dyn StatusReader>) -> Self {
        Self { config, status }
    }
}

impl Action<IntegrationPlatform> for StartAction {
    fn name(&self) -> &str {
        "start"
    }

    fn can_handle(&self, p: &IntegrationPlatform) -> bool {
        p.status.phase == Some(PlatformPhase::Starting)
    }

    fn handle(&self, p: &mut IntegrationPlatform) -> Result<()> {
        let mut pending = Vec::new();
        for template in &self.config.platform.contexts {
            let target = ObservedTarget::new(
                WorkloadKind::IntegrationContext,
                p.namespace(),
                &template.name,
            );
            match self.status.observe(&target)? {
                Health::Ready => {}
                Health::Progressing => pending.push(template.name.clone()),
                Health::Failed(reason) => {
                    p.status.set_condition(
                        ConditionType::Ready,
                        ConditionStatus::False,
                        "ContextFailed",
                        Some(format!("context {}: {reason}", template.name)),
                    );
                    advance(p, PlatformPhase::Error);
                    return Ok(());
                }
            }
        }

        if pending.is_empty() {
            p.status
                .set_condition(ConditionType::Ready, ConditionStatus::True, "Ready", None);
            advance(p, PlatformPhase::Ready);
        } else {
            p.status.set_condition(
                ConditionType::Ready,
                ConditionStatus::False,
                "WaitingForContexts",
                Some(pending.join(", ")),
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::fake::FakeCluster;
    use crate::collection::Resource;
    use crate::error::KamelError;

    fn config() -> Arc<Config> {
        Arc::new(Config::default())
    }

    fn platform(phase: Option<PlatformPhase>) -> IntegrationPlatform {
        let mut p = IntegrationPlatform::new("camel-k", "demo");
        p.status.phase = phase;
        p
    }

    #[test]
    fn initialize_fills_defaults() {
        let action = InitializeAction::new(config());
        let mut p = platform(None);
        action.handle(&mut p).unwrap();
        assert_eq!(p.phase(), Some(PlatformPhase::Creating));
        assert_eq!(p.spec.cluster, Some(ClusterType::Kubernetes));
        assert_eq!(
            p.spec.build.registry.as_deref(),
            Some("docker-registry.default.svc:5000")
        );
    }

    #[test]
    fn initialize_places_platform_in_operator_namespace() {
        let action = InitializeAction::new(config());
        let mut p = IntegrationPlatform::new("camel-k", "");
        action.handle(&mut p).unwrap();
        assert_eq!(p.namespace(), "default");
    }

    #[test]
    fn initialize_keeps_explicit_settings() {
        let action = InitializeAction::new(config());
        let mut p = platform(None);
        p.spec.cluster = Some(ClusterType::OpenShift);
        p.spec.build.registry = Some("quay.io/acme".to_string());
        action.handle(&mut p).unwrap();
        assert_eq!(p.spec.cluster, Some(ClusterType::OpenShift));
        assert_eq!(p.spec.build.registry.as_deref(), Some("quay.io/acme"));
    }

    #[test]
    fn create_applies_default_contexts() {
        let cluster = FakeCluster::new();
        let action = CreateAction::new(config(), cluster.clone());
        let mut p = platform(Some(PlatformPhase::Creating));

        action.handle(&mut p).unwrap();
        assert_eq!(p.phase(), Some(PlatformPhase::Starting));

        let applied = cluster.applied();
        assert_eq!(applied.len(), 1);
        let names: Vec<&str> = applied[0].iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["jvm", "groovy"]);
        for r in &applied[0] {
            assert_eq!(r.namespace(), "demo");
            match r {
                Resource::IntegrationContext(ctx) => {
                    assert_eq!(
                        ctx.metadata.labels.as_ref().unwrap()[CONTEXT_TYPE_LABEL],
                        "platform"
                    );
                    assert!(ctx.spec.dependencies.contains(&"camel:core".to_string()));
                }
                other => panic!("unexpected resource {}", other.kind()),
            }
        }
    }

    #[test]
    fn create_apply_failure_keeps_phase() {
        let cluster = FakeCluster::new();
        cluster.fail_apply("forbidden");
        let action = CreateAction::new(config(), cluster.clone());
        let mut p = platform(Some(PlatformPhase::Creating));

        assert!(matches!(action.handle(&mut p), Err(KamelError::Apply(_))));
        assert_eq!(p.phase(), Some(PlatformPhase::Creating));
    }

    #[test]
    fn start_waits_for_every_context() {
        let cluster = FakeCluster::new();
        cluster.set_health(Ok(Health::Progressing));
        let action = StartAction::new(config(), cluster.clone());
        let mut p = platform(Some(PlatformPhase::Starting));

        action.handle(&mut p).unwrap();
        assert_eq!(p.phase(), Some(PlatformPhase::Starting));
        assert_eq!(cluster.observe_count(), 2);
        assert_eq!(
            p.status.condition(ConditionType::Ready).unwrap().message.as_deref(),
            Some("jvm, groovy")
        );
    }

    #[test]
    fn start_becomes_ready() {
        let cluster = FakeCluster::new();
        let action = StartAction::new(config(), cluster.clone());
        let mut p = platform(Some(PlatformPhase::Starting));

        action.handle(&mut p).unwrap();
        assert_eq!(p.phase(), Some(PlatformPhase::Ready));
        assert!(!action.can_handle(&p));
    }

    #[test]
    fn start_context_failure_moves_to_error() {
        let cluster = FakeCluster::new();
        cluster.set_health(Ok(Health::Failed("build failed".to_string())));
        let action = StartAction::new(config(), cluster.clone());
        let mut p = platform(Some(PlatformPhase::Starting));

        action.handle(&mut p).unwrap();
        assert_eq!(p.phase(), Some(PlatformPhase::Error));
        assert_eq!(cluster.observe_count(), 1);
    }
}
