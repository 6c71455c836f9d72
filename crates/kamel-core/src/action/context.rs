//! IntegrationContext lifecycle: initialize → build → monitor.

use std::sync::Arc;

use super::{Action, BuildOutcome, BuildRequest, Builder, Health, ObservedTarget, StatusReader};
use crate::apis::{IntegrationContext, Workload};
use crate::config::Config;
use crate::error::Result;
use crate::paths;
use crate::types::{ConditionStatus, ConditionType, ContextPhase, WorkloadKind};

fn advance(ctx: &mut IntegrationContext, phase: ContextPhase) {
    if ctx.status.phase != Some(phase) {
        tracing::info!(
            context = ctx.name(),
            from = ctx.status.phase.map(|p| p.as_str()).unwrap_or("none"),
            to = phase.as_str(),
            "context phase changed"
        );
        ctx.status.phase = Some(phase);
    }
}

pub struct InitializeAction {
    config: Arc<Config>,
}

impl InitializeAction {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl Action<IntegrationContext> for InitializeAction {
    fn name(&self) -> &str {
        "initialize"
    }

    fn can_handle(&self, ctx: &IntegrationContext) -> bool {
        ctx.status.phase.is_none()
    }

    fn handle(&self, ctx: &mut IntegrationContext) -> Result<()> {
        paths::validate_name(ctx.name())?;
        ctx.default_namespace(&self.config.namespace);
        advance(ctx, ContextPhase::Initialized);
        Ok(())
    }
}

pub struct BuildAction {
    builder: Arc<dyn Builder>,
}

impl BuildAction {
    pub fn new(builder: Arc<dyn Builder>) -> Self {
        Self { builder }
    }
}

impl Action<IntegrationContext> for BuildAction {
    fn name(&self) -> &str {
        "build"
    }

    fn can_handle(&self, ctx: &IntegrationContext) -> bool {
        matches!(
            ctx.status.phase,
            Some(ContextPhase::Initialized | ContextPhase::Building)
        )
    }

    fn handle(&self, ctx: &mut IntegrationContext) -> Result<()> {
        let request = BuildRequest {
            kind: WorkloadKind::IntegrationContext,
            namespace: ctx.namespace().to_string(),
            name: ctx.name().to_string(),
            dependencies: ctx.spec.dependencies.clone(),
            context: None,
        };
        match self.builder.build(&request) {
            Ok(BuildOutcome::Completed { image }) => {
                ctx.status.set_condition(
                    ConditionType::Built,
                    ConditionStatus::True,
                    "BuildComplete",
                    Some(image.clone()),
                );
                ctx.status.image = Some(image);
                advance(ctx, ContextPhase::Built);
                Ok(())
            }
            Ok(BuildOutcome::Running) => {
                advance(ctx, ContextPhase::Building);
                Ok(())
            }
            Err(e) => {
                ctx.status.set_condition(
                    ConditionType::Built,
                    ConditionStatus::False,
                    "BuildFailed",
                    Some(e.to_string()),
                );
                Err(e)
            }
        }
    }
}

/// Promotes a built context to `ready` once its image is reported usable.
pub struct MonitorAction {
    status: Arc<dyn StatusReader>,
}

impl MonitorAction {
    pub fn new(status: Arc<dyn StatusReader>) -> Self {
        Self { status }
    }
}

impl Action<IntegrationContext> for MonitorAction {
    fn name(&self) -> &str {
        "monitor"
    }

    fn can_handle(&self, ctx: &IntegrationContext) -> bool {
        ctx.status.phase == Some(ContextPhase::Built)
    }

    fn handle(&self, ctx: &mut IntegrationContext) -> Result<()> {
        let target =
            ObservedTarget::new(WorkloadKind::IntegrationContext, ctx.namespace(), ctx.name());
        match self.status.observe(&target)? {
            Health::Ready => {
                ctx.status
                    .set_condition(ConditionType::Ready, ConditionStatus::True, "Ready", None);
                advance(ctx, ContextPhase::Ready);
            }
            Health::Progressing => {}
            Health::Failed(reason) => {
                ctx.status.set_condition(
                    ConditionType::Ready,
                    ConditionStatus::False,
                    "Failed",
                    Some(reason),
                );
                advance(ctx, ContextPhase::Error);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::fake::FakeCluster;
    use crate::error::KamelError;

    fn context(phase: Option<ContextPhase>) -> IntegrationContext {
        let mut ctx = IntegrationContext::new("jvm", "demo");
        ctx.spec.dependencies = vec!["runtime:jvm".to_string(), "camel:core".to_string()];
        ctx.status.phase = phase;
        ctx
    }

    fn initialize() -> InitializeAction {
        InitializeAction::new(Arc::new(Config::default()))
    }

    #[test]
    fn initialize_only_claims_new_contexts() {
        let action = initialize();
        let mut ctx = context(None);
        assert!(action.can_handle(&ctx));
        action.handle(&mut ctx).unwrap();
        assert_eq!(ctx.phase(), Some(ContextPhase::Initialized));
        assert_eq!(ctx.namespace(), "demo");
        assert!(!action.can_handle(&ctx));
    }

    #[test]
    fn initialize_fills_missing_namespace() {
        let mut ctx = IntegrationContext::new("jvm", "");
        initialize().handle(&mut ctx).unwrap();
        assert_eq!(ctx.namespace(), "default");
    }

    #[test]
    fn build_records_image() {
        let cluster = FakeCluster::new();
        let action = BuildAction::new(cluster.clone());
        let mut ctx = context(Some(ContextPhase::Initialized));

        action.handle(&mut ctx).unwrap();
        assert_eq!(ctx.phase(), Some(ContextPhase::Built));
        assert!(ctx.status.image.is_some());

        let builds = cluster.builds.lock().unwrap();
        assert_eq!(builds[0].kind, WorkloadKind::IntegrationContext);
        assert_eq!(builds[0].dependencies, ctx.spec.dependencies);
        assert!(builds[0].context.is_none());
    }

    #[test]
    fn build_running_then_completed() {
        let cluster = FakeCluster::new();
        cluster.set_build(Ok(BuildOutcome::Running));
        let action = BuildAction::new(cluster.clone());
        let mut ctx = context(Some(ContextPhase::Initialized));

        action.handle(&mut ctx).unwrap();
        assert_eq!(ctx.phase(), Some(ContextPhase::Building));

        cluster.set_build(Ok(BuildOutcome::Completed {
            image: "registry.local/demo/jvm:2".to_string(),
        }));
        action.handle(&mut ctx).unwrap();
        assert_eq!(ctx.phase(), Some(ContextPhase::Built));
        assert_eq!(ctx.status.image.as_deref(), Some("registry.local/demo/jvm:2"));
        assert_eq!(cluster.build_count(), 2);
    }

    #[test]
    fn build_error_propagates() {
        let cluster = FakeCluster::new();
        cluster.set_build(Err(KamelError::Build("no space left".to_string())));
        let action = BuildAction::new(cluster.clone());
        let mut ctx = context(Some(ContextPhase::Initialized));

        assert!(matches!(action.handle(&mut ctx), Err(KamelError::Build(_))));
        assert_eq!(ctx.phase(), Some(ContextPhase::Initialized));
    }

    #[test]
    fn monitor_promotes_to_ready() {
        let cluster = FakeCluster::new();
        let action = MonitorAction::new(cluster.clone());
        let mut ctx = context(Some(ContextPhase::Built));

        action.handle(&mut ctx).unwrap();
        assert_eq!(ctx.phase(), Some(ContextPhase::Ready));
        assert!(!action.can_handle(&ctx));
    }

    #[test]
    fn monitor_waits_while_progressing() {
        let cluster = FakeCluster::new();
        cluster.set_health(Ok(Health::Progressing));
        let action = MonitorAction::new(cluster.clone());
        let mut ctx = context(Some(ContextPhase::Built));

        action.handle(&mut ctx).unwrap();
        assert_eq!(ctx.phase(), Some(ContextPhase::Built));
    }

    #[test]
    fn monitor_failure_moves_to_error() {
        let cluster = FakeCluster::new();
        cluster.set_health(Ok(Health::Failed("image pull".to_string())));
        let action = MonitorAction::new(cluster.clone());
        let mut ctx = context(Some(ContextPhase::Built));

        action.handle(&mut ctx).unwrap();
        assert_eq!(ctx.phase(), Some(ContextPhase::Error));
        assert_eq!(
            ctx.status.condition(ConditionType::Ready).unwrap().message.as_deref(),
            Some("image pull")
        );
    }
}
