//! Phase handlers for the three workload kinds.
//!
//! Every kind has an ordered pool of actions. An action claims a resource
//! through [`Action::can_handle`] (a pure function of its phase) and moves it
//! forward in [`Action::handle`]. The order of a pool is the order of the
//! lifecycle: when an action advances the phase, the next entry of the same
//! pool can pick the resource up within the same pass.
//!
//! Anything that talks to the outside world (building images, applying
//! resources, reading their health) goes through the collaborator traits
//! defined here, so the actions themselves stay synchronous and testable.

use std::sync::Arc;

use crate::collection::Resource;
use crate::error::Result;
use crate::types::WorkloadKind;

pub mod context;
pub mod integration;
pub mod platform;

#[cfg(test)]
pub(crate) mod fake;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

pub trait Action<R>: Send + Sync {
    fn name(&self) -> &str;
    fn can_handle(&self, resource: &R) -> bool;
    fn handle(&self, resource: &mut R) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub kind: WorkloadKind,
    pub namespace: String,
    pub name: String,
    pub dependencies: Vec<String>,
    /// The context an integration builds on; `None` for contexts themselves.
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Completed { image: String },
    /// Submitted but not finished; polled again on the next pass.
    Running,
}

pub trait Builder: Send + Sync {
    fn build(&self, request: &BuildRequest) -> Result<BuildOutcome>;
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

pub trait Applier: Send + Sync {
    fn apply(&self, resources: &[Resource]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObservedTarget {
    pub kind: WorkloadKind,
    pub namespace: String,
    pub name: String,
}

impl ObservedTarget {
    pub fn new(kind: WorkloadKind, namespace: &str, name: &str) -> Self {
        Self {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Health {
    Ready,
    Progressing,
    Failed(String),
}

pub trait StatusReader: Send + Sync {
    fn observe(&self, target: &ObservedTarget) -> Result<Health>;
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Collaborators {
    pub builder: Arc<dyn Builder>,
    pub applier: Arc<dyn Applier>,
    pub status: Arc<dyn StatusReader>,
}

impl Collaborators {
    pub fn new(
        builder: Arc<dyn Builder>,
        applier: Arc<dyn Applier>,
        status: Arc<dyn StatusReader>,
    ) -> Self {
        Self {
            builder,
            applier,
            status,
        }
    }
}
