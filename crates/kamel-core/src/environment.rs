//! Per-reconciliation snapshot handed to the trait pipeline.

use crate::apis::{Integration, TraitSpec};
use crate::collection::Collection;
use crate::config::Config;
use crate::error::{KamelError, Result};

/// How a trait decides whether it applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Enabled,
    Disabled,
    /// No explicit setting; the trait runs its own detection heuristic.
    Auto,
}

/// One integration, the operator configuration, and the resources the
/// pipeline has produced so far. Built fresh for every Deploy pass.
#[derive(Debug)]
pub struct Environment<'a> {
    integration: &'a Integration,
    config: &'a Config,
    pub(crate) resources: Collection,
}

impl<'a> Environment<'a> {
    pub fn new(integration: &'a Integration, config: &'a Config) -> Self {
        Self {
            integration,
            config,
            resources: Collection::new(),
        }
    }

    pub fn integration(&self) -> &Integration {
        self.integration
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn resources(&self) -> &Collection {
        &self.resources
    }

    pub fn into_resources(self) -> Collection {
        self.resources
    }

    /// Workload spec first, then the operator default.
    fn layers<'s>(&'s self, trait_id: &str) -> impl Iterator<Item = &'s TraitSpec> + 's {
        self.integration
            .spec
            .traits
            .get(trait_id)
            .into_iter()
            .chain(self.config.trait_defaults(trait_id))
    }

    /// The workload's own spec for `trait_id`, falling back to the operator default.
    pub fn trait_spec(&self, trait_id: &str) -> Option<&TraitSpec> {
        self.layers(trait_id).next()
    }

    pub fn activation(&self, trait_id: &str) -> Activation {
        match self.layers(trait_id).find_map(|s| s.enabled) {
            Some(true) => Activation::Enabled,
            Some(false) => Activation::Disabled,
            None => Activation::Auto,
        }
    }

    pub fn is_auto_detection_mode(&self, trait_id: &str) -> bool {
        self.activation(trait_id) == Activation::Auto
    }

    pub fn get_config(&self, trait_id: &str, key: &str) -> Option<&str> {
        self.layers(trait_id)
            .find_map(|s| s.configuration.get(key))
            .map(String::as_str)
    }

    pub fn get_int_config_or(&self, trait_id: &str, key: &str, default: i32) -> Result<i32> {
        let Some(raw) = self.get_config(trait_id, key) else {
            return Ok(default);
        };
        raw.trim()
            .parse::<i32>()
            .map_err(|e| KamelError::Configuration {
                trait_id: trait_id.to_string(),
                key: key.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn spec(enabled: Option<bool>, options: &[(&str, &str)]) -> TraitSpec {
        TraitSpec {
            enabled,
            configuration: options
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn int_config_absent_returns_default() {
        let it = Integration::new("hello", "demo");
        let cfg = Config::default();
        let env = Environment::new(&it, &cfg);
        assert_eq!(env.get_int_config_or("service", "port", 8080).unwrap(), 8080);
    }

    #[test]
    fn int_config_non_numeric_fails() {
        let it = Integration::new("hello", "demo")
            .with_trait("service", spec(None, &[("port", "abc")]));
        let cfg = Config::default();
        let env = Environment::new(&it, &cfg);

        let err = env.get_int_config_or("service", "port", 8080).unwrap_err();
        match err {
            KamelError::Configuration {
                trait_id, key, value, ..
            } => {
                assert_eq!(trait_id, "service");
                assert_eq!(key, "port");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn workload_option_overrides_operator_default() {
        let it = Integration::new("hello", "demo")
            .with_trait("service", spec(None, &[("port", "9090")]));
        let mut cfg = Config::default();
        cfg.traits
            .insert("service".to_string(), spec(None, &[("port", "7070")]));
        let env = Environment::new(&it, &cfg);
        assert_eq!(env.get_int_config_or("service", "port", 8080).unwrap(), 9090);

        let plain = Integration::new("plain", "demo");
        let env = Environment::new(&plain, &cfg);
        assert_eq!(env.get_int_config_or("service", "port", 8080).unwrap(), 7070);
    }

    #[test]
    fn activation_defaults_to_auto() {
        let it = Integration::new("hello", "demo");
        let cfg = Config::default();
        let env = Environment::new(&it, &cfg);
        assert_eq!(env.activation("service"), Activation::Auto);
        assert!(env.is_auto_detection_mode("service"));
    }

    #[test]
    fn explicit_workload_setting_wins() {
        let it = Integration::new("hello", "demo")
            .with_trait("service", spec(Some(false), &[]));
        let mut cfg = Config::default();
        cfg.traits.insert("service".to_string(), spec(Some(true), &[]));
        let env = Environment::new(&it, &cfg);
        assert_eq!(env.activation("service"), Activation::Disabled);
    }

    #[test]
    fn operator_default_applies_when_workload_silent() {
        let it = Integration::new("hello", "demo")
            .with_trait("service", spec(None, &[("port", "1")]));
        let mut cfg = Config::default();
        cfg.traits.insert("service".to_string(), spec(Some(true), &[]));
        let env = Environment::new(&it, &cfg);
        assert_eq!(env.activation("service"), Activation::Enabled);
    }

    #[test]
    fn trait_spec_prefers_workload_then_operator() {
        let mut cfg = Config::default();
        cfg.traits
            .insert("service".to_string(), spec(Some(true), &[("port", "7070")]));

        let plain = Integration::new("plain", "demo");
        let env = Environment::new(&plain, &cfg);
        assert_eq!(env.trait_spec("service"), cfg.trait_defaults("service"));
        assert!(env.trait_spec("ingress").is_none());

        let it = Integration::new("hello", "demo")
            .with_trait("service", spec(None, &[("port", "9090")]));
        let env = Environment::new(&it, &cfg);
        let own = env.trait_spec("service").unwrap();
        assert_eq!(own.configuration["port"], "9090");
        assert!(own.enabled.is_none());
    }
}
