//! Reading and writing workload manifests as dispatcher events.

use serde::Deserialize;
use std::path::Path;

use crate::apis::{Integration, IntegrationContext, IntegrationPlatform};
use crate::error::Result;
use crate::handler::Event;
use crate::io;
use crate::types::WorkloadKind;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeMeta {
    #[serde(default)]
    api_version: String,
    kind: String,
}

/// Parse a single YAML document, routing on its `kind` field.
pub fn parse_event(yaml: &str) -> Result<Event> {
    let meta: TypeMeta = serde_yaml::from_str(yaml)?;
    let event = match WorkloadKind::from_kind(&meta.kind) {
        Some(WorkloadKind::Integration) => {
            Event::Integration(serde_yaml::from_str::<Integration>(yaml)?)
        }
        Some(WorkloadKind::IntegrationContext) => {
            Event::IntegrationContext(serde_yaml::from_str::<IntegrationContext>(yaml)?)
        }
        Some(WorkloadKind::IntegrationPlatform) => {
            Event::IntegrationPlatform(serde_yaml::from_str::<IntegrationPlatform>(yaml)?)
        }
        None => Event::Unrecognized {
            api_version: meta.api_version,
            kind: meta.kind,
        },
    };
    Ok(event)
}

pub fn load_event(path: &Path) -> Result<Event> {
    let data = std::fs::read_to_string(path)?;
    parse_event(&data)
}

/// Write the event back to `path`. Unrecognized events are left untouched.
pub fn save_event(path: &Path, event: &Event) -> Result<()> {
    if let Some(yaml) = event.to_yaml()? {
        io::atomic_write(path, yaml.as_bytes())?;
    }
    Ok(())
}

impl Event {
    /// Serialize the carried workload; `None` for unrecognized kinds.
    pub fn to_yaml(&self) -> Result<Option<String>> {
        let yaml = match self {
            Event::Integration(it) => serde_yaml::to_string(it)?,
            Event::IntegrationContext(ctx) => serde_yaml::to_string(ctx)?,
            Event::IntegrationPlatform(p) => serde_yaml::to_string(p)?,
            Event::Unrecognized { .. } => return Ok(None),
        };
        Ok(Some(yaml))
    }
}
