use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

use super::Trait;
use crate::apis::{Workload, INTEGRATION_LABEL};
use crate::collection::Collection;
use crate::environment::{Activation, Environment};
use crate::error::{KamelError, Result};

const SERVICE_TRAIT_ID: &str = "service";
const PORT_KEY: &str = "port";
const DEFAULT_TARGET_PORT: i32 = 8080;
const SERVICE_PORT: i32 = 80;

/// Components whose presence decides whether an integration listens on HTTP.
/// The first dependency found in this table settles the question.
pub const WEB_COMPONENTS: &[(&str, bool)] = &[
    ("camel:servlet", true),
    ("camel:undertow", true),
    ("camel:jetty", true),
    ("camel:netty-http", true),
    ("camel:netty4-http", true),
];

/// Exposes the integration inside the cluster through a `Service`.
pub struct ServiceTrait {
    components: &'static [(&'static str, bool)],
}

impl Default for ServiceTrait {
    fn default() -> Self {
        Self::with_components(WEB_COMPONENTS)
    }
}

impl ServiceTrait {
    pub fn with_components(components: &'static [(&'static str, bool)]) -> Self {
        Self { components }
    }

    fn requires_service(&self, env: &Environment) -> bool {
        env.integration()
            .spec
            .dependencies
            .iter()
            .find_map(|dep| {
                self.components
                    .iter()
                    .find(|entry| entry.0 == dep.as_str())
                    .map(|entry| entry.1)
            })
            .unwrap_or(false)
    }

    fn service_for(&self, env: &Environment) -> Result<Service> {
        let port = env.get_int_config_or(SERVICE_TRAIT_ID, PORT_KEY, DEFAULT_TARGET_PORT)?;
        if !(1..=65535).contains(&port) {
            return Err(KamelError::Configuration {
                trait_id: SERVICE_TRAIT_ID.to_string(),
                key: PORT_KEY.to_string(),
                value: port.to_string(),
                reason: "port must be between 1 and 65535".to_string(),
            });
        }

        let integration = env.integration();
        let labels = BTreeMap::from([(
            INTEGRATION_LABEL.to_string(),
            integration.name().to_string(),
        )]);

        Ok(Service {
            metadata: ObjectMeta {
                name: Some(integration.name().to_string()),
                namespace: Some(integration.namespace().to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                ports: Some(vec![ServicePort {
                    name: Some("http".to_string()),
                    port: SERVICE_PORT,
                    protocol: Some("TCP".to_string()),
                    target_port: Some(IntOrString::Int(port)),
                    ..Default::default()
                }]),
                selector: Some(labels),
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}

impl Trait for ServiceTrait {
    fn id(&self) -> &'static str {
        SERVICE_TRAIT_ID
    }

    fn customize(&self, env: &Environment, resources: &mut Collection) -> Result<bool> {
        match env.activation(SERVICE_TRAIT_ID) {
            Activation::Disabled => return Ok(false),
            Activation::Auto if !self.requires_service(env) => return Ok(false),
            Activation::Auto | Activation::Enabled => {}
        }
        resources.add(self.service_for(env)?);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
