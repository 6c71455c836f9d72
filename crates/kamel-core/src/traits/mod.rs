//! Traits customize the resources generated for an integration.
//!
//! Each trait looks at the [`Environment`] and the collection built so far,
//! decides whether it applies, and appends the resources it owns. The
//! [`Catalog`] runs every registered trait in a fixed order on each deploy.

use crate::apis::Workload;
use crate::collection::Collection;
use crate::environment::Environment;
use crate::error::Result;

pub mod service;

pub use service::ServiceTrait;

pub trait Trait: Send + Sync {
    fn id(&self) -> &'static str;

    /// Returns `Ok(false)` without touching `resources` when the trait does not apply.
    fn customize(&self, env: &Environment, resources: &mut Collection) -> Result<bool>;
}

pub struct Catalog {
    traits: Vec<Box<dyn Trait>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::with_traits(vec![Box::new(ServiceTrait::default())])
    }

    pub fn with_traits(traits: Vec<Box<dyn Trait>>) -> Self {
        Self { traits }
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.traits.iter().map(|t| t.id()).collect()
    }

    /// Run every trait in order against the environment's collection.
    ///
    /// Returns the ids of the traits that applied. On error the collection
    /// is left partially built and must not be applied.
    pub fn apply(&self, env: &mut Environment) -> Result<Vec<&'static str>> {
        let mut resources = std::mem::take(&mut env.resources);
        let mut applied = Vec::new();
        let mut outcome = Ok(());
        for t in &self.traits {
            match t.customize(env, &mut resources) {
                Ok(true) => {
                    tracing::debug!(
                        trait_id = t.id(),
                        integration = env.integration().name(),
                        "trait applied"
                    );
                    applied.push(t.id());
                }
                Ok(false) => {}
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }
        env.resources = resources;
        outcome.map(|_| applied)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
