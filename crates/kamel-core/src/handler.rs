//! Event dispatcher.
//!
//! A [`Handler`] owns one ordered action pool per workload kind. Handling an
//! event walks the pool for the event's kind: every action whose predicate
//! matches runs, in pool order, so one pass may carry a resource through
//! several phases. The first action error ends the pass and is returned as is;
//! retrying is the caller's business.

use std::sync::Arc;

use crate::action::{self, Action, Collaborators};
use crate::apis::{Integration, IntegrationContext, IntegrationPlatform, Workload};
use crate::config::Config;
use crate::error::Result;
use crate::traits::Catalog;

pub type Pool<R> = Vec<Box<dyn Action<R>>>;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Integration(Integration),
    IntegrationContext(IntegrationContext),
    IntegrationPlatform(IntegrationPlatform),
    /// A kind this operator does not manage. Dispatching it is a no-op.
    Unrecognized { api_version: String, kind: String },
}

impl Event {
    pub fn kind(&self) -> &str {
        match self {
            Event::Integration(it) => &it.kind,
            Event::IntegrationContext(ctx) => &ctx.kind,
            Event::IntegrationPlatform(p) => &p.kind,
            Event::Unrecognized { kind, .. } => kind,
        }
    }

    /// Name of the carried workload; `None` for unrecognized events.
    pub fn name(&self) -> Option<&str> {
        match self {
            Event::Integration(it) => Some(it.name()),
            Event::IntegrationContext(ctx) => Some(ctx.name()),
            Event::IntegrationPlatform(p) => Some(p.name()),
            Event::Unrecognized { .. } => None,
        }
    }

    /// Current phase as a string, or `None` when unset or unrecognized.
    pub fn phase(&self) -> Option<&'static str> {
        match self {
            Event::Integration(it) => it.phase().map(|p| p.as_str()),
            Event::IntegrationContext(ctx) => ctx.phase().map(|p| p.as_str()),
            Event::IntegrationPlatform(p) => p.phase().map(|p| p.as_str()),
            Event::Unrecognized { .. } => None,
        }
    }
}

impl From<Integration> for Event {
    fn from(it: Integration) -> Self {
        Event::Integration(it)
    }
}

impl From<IntegrationContext> for Event {
    fn from(ctx: IntegrationContext) -> Self {
        Event::IntegrationContext(ctx)
    }
}

impl From<IntegrationPlatform> for Event {
    fn from(p: IntegrationPlatform) -> Self {
        Event::IntegrationPlatform(p)
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

pub struct Handler {
    integrations: Pool<Integration>,
    contexts: Pool<IntegrationContext>,
    platforms: Pool<IntegrationPlatform>,
}

impl Handler {
    pub fn new(collaborators: Collaborators, config: Arc<Config>) -> Self {
        let catalog = Arc::new(Catalog::new());
        let Collaborators {
            builder,
            applier,
            status,
        } = collaborators;

        let integrations: Pool<Integration> = vec![
            Box::new(action::integration::InitializeAction::new(config.clone())),
            Box::new(action::integration::BuildAction::new(builder.clone())),
            Box::new(action::integration::DeployAction::new(
                config.clone(),
                catalog,
                applier.clone(),
            )),
            Box::new(action::integration::MonitorAction::new(status.clone())),
        ];
        let contexts: Pool<IntegrationContext> = vec![
            Box::new(action::context::InitializeAction::new(config.clone())),
            Box::new(action::context::BuildAction::new(builder)),
            Box::new(action::context::MonitorAction::new(status.clone())),
        ];
        let platforms: Pool<IntegrationPlatform> = vec![
            Box::new(action::platform::InitializeAction::new(config.clone())),
            Box::new(action::platform::CreateAction::new(config.clone(), applier)),
            Box::new(action::platform::StartAction::new(config, status)),
        ];

        Self::with_pools(integrations, contexts, platforms)
    }

    pub fn with_pools(
        integrations: Pool<Integration>,
        contexts: Pool<IntegrationContext>,
        platforms: Pool<IntegrationPlatform>,
    ) -> Self {
        Self {
            integrations,
            contexts,
            platforms,
        }
    }

    /// Run one reconciliation pass, mutating the carried resource in place.
    pub fn handle(&self, event: &mut Event) -> Result<()> {
        match event {
            Event::Integration(it) => run_pool(&self.integrations, it),
            Event::IntegrationContext(ctx) => run_pool(&self.contexts, ctx),
            Event::IntegrationPlatform(p) => run_pool(&self.platforms, p),
            Event::Unrecognized { api_version, kind } => {
                tracing::debug!(%api_version, %kind, "ignoring unrecognized kind");
                Ok(())
            }
        }
    }
}

fn run_pool<R: Workload>(pool: &[Box<dyn Action<R>>], resource: &mut R) -> Result<()> {
    for a in pool {
        if a.can_handle(resource) {
            tracing::debug!(
                action = a.name(),
                kind = R::KIND.as_str(),
                name = resource.name(),
                "invoking action"
            );
            a.handle(resource)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
