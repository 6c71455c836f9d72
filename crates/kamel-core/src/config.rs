use crate::apis::TraitSpec;
use crate::error::{KamelError, Result};
use crate::traits::Catalog;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ContextTemplate / PlatformConfig
// ---------------------------------------------------------------------------

/// A shared context created by the platform at bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextTemplate {
    pub name: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_contexts")]
    pub contexts: Vec<ContextTemplate>,
}

fn default_contexts() -> Vec<ContextTemplate> {
    vec![
        ContextTemplate {
            name: "jvm".to_string(),
            dependencies: vec!["runtime:jvm".to_string(), "camel:core".to_string()],
        },
        ContextTemplate {
            name: "groovy".to_string(),
            dependencies: vec![
                "runtime:jvm".to_string(),
                "runtime:groovy".to_string(),
                "camel:core".to_string(),
            ],
        },
    ]
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            contexts: default_contexts(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_registry")]
    pub registry: String,
    #[serde(default = "default_context")]
    pub default_context: String,
    /// Operator-wide trait defaults, overridden per workload.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub traits: BTreeMap<String, TraitSpec>,
    #[serde(default)]
    pub platform: PlatformConfig,
}

fn default_version() -> u32 {
    1
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_registry() -> String {
    "docker-registry.default.svc:5000".to_string()
}

fn default_context() -> String {
    "jvm".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            namespace: default_namespace(),
            registry: default_registry(),
            default_context: default_context(),
            traits: BTreeMap::new(),
            platform: PlatformConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        if cfg.version != 1 {
            return Err(KamelError::InvalidConfig(format!(
                "unsupported config version {}",
                cfg.version
            )));
        }
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    pub fn trait_defaults(&self, trait_id: &str) -> Option<&TraitSpec> {
        self.traits.get(trait_id)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let known = Catalog::new().ids();

        // 1. Trait defaults must name a registered trait
        for trait_id in self.traits.keys() {
            if !known.contains(&trait_id.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("unknown trait '{trait_id}' in traits"),
                });
            }
        }

        // 2. Port-like options must be integers in 1..=65535
        for (trait_id, spec) in &self.traits {
            if let Some(port) = spec.configuration.get("port") {
                let message = match port.trim().parse::<i32>() {
                    Err(_) => {
                        format!("trait '{trait_id}' option 'port' is not an integer: '{port}'")
                    }
                    Ok(p) if !(1..=65535).contains(&p) => format!(
                        "trait '{trait_id}' option 'port' is out of range 1-65535: '{port}'"
                    ),
                    Ok(_) => continue,
                };
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message,
                });
            }
        }

        // 3. Context templates need unique, valid names
        let mut seen = HashSet::new();
        for ctx in &self.platform.contexts {
            if crate::paths::validate_name(&ctx.name).is_err() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("platform context name '{}' is invalid", ctx.name),
                });
            }
            if !seen.insert(ctx.name.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("platform context '{}' is declared twice", ctx.name),
                });
            }
            if ctx.dependencies.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("platform context '{}' has no dependencies", ctx.name),
                });
            }
        }

        // 4. The default context should be one the platform creates
        if !self
            .platform
            .contexts
            .iter()
            .any(|c| c.name == self.default_context)
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "default context '{}' is not created by the platform",
                    self.default_context
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
