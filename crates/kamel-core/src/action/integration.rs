//! Integration lifecycle: initialize → build → deploy → monitor.

use std::sync::Arc;

use super::{
    Action, Applier, BuildOutcome, BuildRequest, Builder, Health, ObservedTarget, StatusReader,
};
use crate::apis::{Integration, Workload};
use crate::config::Config;
use crate::environment::Environment;
use crate::error::Result;
use crate::paths;
use crate::traits::Catalog;
use crate::types::{ConditionStatus, ConditionType, IntegrationPhase, WorkloadKind};

fn advance(it: &mut Integration, phase: IntegrationPhase) {
    if it.status.phase != Some(phase) {
        tracing::info!(
            integration = it.name(),
            from = it.status.phase.map(|p| p.as_str()).unwrap_or("none"),
            to = phase.as_str(),
            "integration phase changed"
        );
        it.status.phase = Some(phase);
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

impl Action<Integration> for InitializeAction {
    fn name(&self) -> &str {
        "initialize"
    }

    fn can_handle(&self, it: &Integration) -> bool {
        it.status.phase.is_none()
    }

    fn handle(&self, it: &mut Integration) -> Result<()> {
        paths::validate_name(it.name())?;
        it.default_namespace(&self.config.namespace);
        let context = it
            .spec
            .context
            .clone()
            .unwrap_or_else(|| self.config.default_context.clone());
        it.status.context = Some(context);
        advance(it, IntegrationPhase::Initialized);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

pub struct BuildAction {
    builder: Arc<dyn Builder>,
}

impl BuildAction {
    pub fn new(builder: Arc<dyn Builder>) -> Self {
        Self { builder }
    }
}

impl Action<Integration> for BuildAction {
    fn name(&self) -> &str {
        "build"
    }

    fn can_handle(&self, it: &Integration) -> bool {
        matches!(
            it.status.phase,
            Some(IntegrationPhase::Initialized | IntegrationPhase::Building)
        )
    }

    fn handle(&self, it: &mut Integration) -> Result<()> {
        let request = BuildRequest {
            kind: WorkloadKind::Integration,
            namespace: it.namespace().to_string(),
            name: it.name().to_string(),
            dependencies: it.spec.dependencies.clone(),
            context: it.status.context.clone().or_else(|| it.spec.context.clone()),
        };
        match self.builder.build(&request) {
            Ok(BuildOutcome::Completed { image }) => {
                it.status.set_condition(
                    ConditionType::Built,
                    ConditionStatus::True,
                    "BuildComplete",
                    Some(image.clone()),
                );
                it.status.image = Some(image);
                advance(it, IntegrationPhase::Built);
                Ok(())
            }
            Ok(BuildOutcome::Running) => {
                advance(it, IntegrationPhase::Building);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(integration = it.name(), error = %e, "build failed");
                it.status.set_condition(
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

// ---------------------------------------------------------------------------
// Deploy
// ---------------------------------------------------------------------------

pub struct DeployAction {
    config: Arc<Config>,
    catalog: Arc<Catalog>,
    applier: Arc<dyn Applier>,
}

impl DeployAction {
    pub fn new(config: Arc<Config>, catalog: Arc<Catalog>, applier: Arc<dyn Applier>) -> Self {
        Self {
            config,
            catalog,
            applier,
        }
    }
}

impl Action<Integration> for DeployAction {
    fn name(&self) -> &str {
        "deploy"
    }

    fn can_handle(&self, it: &Integration) -> bool {
        it.status.phase == Some(IntegrationPhase::Built)
    }

    fn handle(&self, it: &mut Integration) -> Result<()> {
        let outcome = {
            let mut env = Environment::new(it, &self.config);
            self.catalog
                .apply(&mut env)
                .and_then(|applied| {
                    let resources = env.into_resources();
                    tracing::debug!(
                        integration = it.name(),
                        traits = ?applied,
                        resources = resources.len(),
                        "applying desired state"
                    );
                    self.applier.apply(resources.items())
                })
        };

        match outcome {
            Ok(()) => {
                it.status.set_condition(
                    ConditionType::Deployed,
                    ConditionStatus::True,
                    "Deployed",
                    None,
                );
                advance(it, IntegrationPhase::Deployed);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(integration = it.name(), error = %e, "deploy failed");
                it.status.set_condition(
                    ConditionType::Deployed,
                    ConditionStatus::False,
                    "DeployFailed",
                    Some(e.to_string()),
                );
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

pub struct MonitorAction {
    status: Arc<dyn StatusReader>,
}

impl MonitorAction {
    pub fn new(status: Arc<dyn StatusReader>) -> Self {
        Self { status }
    }
}

impl Action<Integration> for MonitorAction {
    fn name(&self) -> &str {
        "monitor"
    }

    fn can_handle(&self, it: &Integration) -> bool {
        it.status.phase == Some(IntegrationPhase::Deployed)
    }

    fn handle(&self, it: &mut Integration) -> Result<()> {
        let target = ObservedTarget::new(WorkloadKind::Integration, it.namespace(), it.name());
        match self.status.observe(&target)? {
            Health::Ready => {
                it.status
                    .set_condition(ConditionType::Ready, ConditionStatus::True, "Ready", None);
            }
            Health::Progressing => {
                it.status.set_condition(
                    ConditionType::Ready,
                    ConditionStatus::False,
                    "Progressing",
                    None,
                );
            }
            Health::Failed(reason) => {
                it.status.set_condition(
                    ConditionType::Ready,
                    ConditionStatus::False,
                    "Failed",
                    Some(reason),
                );
                advance(it, IntegrationPhase::Error);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
