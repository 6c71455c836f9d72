//! In-memory collaborators for action and handler tests.

use std::sync::{Arc, Mutex};

use super::{
    Applier, BuildOutcome, BuildRequest, Builder, Collaborators, Health, ObservedTarget,
    StatusReader,
};
use crate::collection::Resource;
use crate::error::{KamelError, Result};

pub(crate) struct FakeCluster {
    pub build_outcome: Mutex<Result<BuildOutcome>>,
    pub health: Mutex<Result<Health>>,
    pub apply_error: Mutex<Option<String>>,
    pub builds: Mutex<Vec<BuildRequest>>,
    pub applied: Mutex<Vec<Vec<Resource>>>,
    pub observed: Mutex<Vec<ObservedTarget>>,
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            build_outcome: Mutex::new(Ok(BuildOutcome::Completed {
                image: "registry.local/demo/hello:1".to_string(),
            })),
            health: Mutex::new(Ok(Health::Ready)),
            apply_error: Mutex::new(None),
            builds: Mutex::new(Vec::new()),
            applied: Mutex::new(Vec::new()),
            observed: Mutex::new(Vec::new()),
        })
    }

    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators::new(self.clone(), self.clone(), self.clone())
    }

    pub fn set_build(&self, outcome: Result<BuildOutcome>) {
        *self.build_outcome.lock().unwrap() = outcome;
    }

    pub fn set_health(&self, health: Result<Health>) {
        *self.health.lock().unwrap() = health;
    }

    pub fn fail_apply(&self, reason: &str) {
        *self.apply_error.lock().unwrap() = Some(reason.to_string());
    }

    pub fn build_count(&self) -> usize {
        self.builds.lock().unwrap().len()
    }

    pub fn applied(&self) -> Vec<Vec<Resource>> {
        self.applied.lock().unwrap().clone()
    }

    pub fn observe_count(&self) -> usize {
        self.observed.lock().unwrap().len()
    }
}

fn replay<T: Clone>(slot: &Mutex<Result<T>>) -> Result<T> {
    match &*slot.lock().unwrap() {
        Ok(v) => Ok(v.clone()),
        Err(e) => Err(match e {
            KamelError::Build(m) => KamelError::Build(m.clone()),
            KamelError::StatusRead(m) => KamelError::StatusRead(m.clone()),
            other => KamelError::Apply(other.to_string()),
        }),
    }
}

impl Builder for FakeCluster {
    fn build(&self, request: &BuildRequest) -> Result<BuildOutcome> {
        self.builds.lock().unwrap().push(request.clone());
        replay(&self.build_outcome)
    }
}

impl Applier for FakeCluster {
    fn apply(&self, resources: &[Resource]) -> Result<()> {
        if let Some(reason) = self.apply_error.lock().unwrap().clone() {
            return Err(KamelError::Apply(reason));
        }
        self.applied.lock().unwrap().push(resources.to_vec());
        Ok(())
    }
}

impl StatusReader for FakeCluster {
    fn observe(&self, target: &ObservedTarget) -> Result<Health> {
        self.observed.lock().unwrap().push(target.clone());
        replay(&self.health)
    }
}
