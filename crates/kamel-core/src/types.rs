use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::KamelError;

// ---------------------------------------------------------------------------
// WorkloadKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkloadKind {
    Integration,
    IntegrationContext,
    IntegrationPlatform,
}

impl WorkloadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkloadKind::Integration => "Integration",
            WorkloadKind::IntegrationContext => "IntegrationContext",
            WorkloadKind::IntegrationPlatform => "IntegrationPlatform",
        }
    }

    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "Integration" => Some(WorkloadKind::Integration),
            "IntegrationContext" => Some(WorkloadKind::IntegrationContext),
            "IntegrationPlatform" => Some(WorkloadKind::IntegrationPlatform),
            _ => None,
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IntegrationPhase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationPhase {
    Initialized,
    Building,
    Built,
    Deployed,
    Error,
}

impl IntegrationPhase {
    pub fn all() -> &'static [IntegrationPhase] {
        &[
            IntegrationPhase::Initialized,
            IntegrationPhase::Building,
            IntegrationPhase::Built,
            IntegrationPhase::Deployed,
            IntegrationPhase::Error,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntegrationPhase::Initialized => "initialized",
            IntegrationPhase::Building => "building",
            IntegrationPhase::Built => "built",
            IntegrationPhase::Deployed => "deployed",
            IntegrationPhase::Error => "error",
        }
    }
}

impl fmt::Display for IntegrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IntegrationPhase {
    type Err = KamelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntegrationPhase::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| KamelError::InvalidPhase(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ContextPhase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPhase {
    Initialized,
    Building,
    Built,
    Ready,
    Error,
}

impl ContextPhase {
    pub fn all() -> &'static [ContextPhase] {
        &[
            ContextPhase::Initialized,
            ContextPhase::Building,
            ContextPhase::Built,
            ContextPhase::Ready,
            ContextPhase::Error,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContextPhase::Initialized => "initialized",
            ContextPhase::Building => "building",
            ContextPhase::Built => "built",
            ContextPhase::Ready => "ready",
            ContextPhase::Error => "error",
        }
    }
}

impl fmt::Display for ContextPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContextPhase {
    type Err = KamelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContextPhase::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| KamelError::InvalidPhase(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// PlatformPhase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformPhase {
    Creating,
    Starting,
    Ready,
    Error,
}

impl PlatformPhase {
    pub fn all() -> &'static [PlatformPhase] {
        &[
            PlatformPhase::Creating,
            PlatformPhase::Starting,
            PlatformPhase::Ready,
            PlatformPhase::Error,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlatformPhase::Creating => "creating",
            PlatformPhase::Starting => "starting",
            PlatformPhase::Ready => "ready",
            PlatformPhase::Error => "error",
        }
    }
}

impl fmt::Display for PlatformPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlatformPhase {
    type Err = KamelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlatformPhase::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| KamelError::InvalidPhase(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Condition types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    Built,
    Deployed,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integration_phase_parse_and_display() {
        for phase in IntegrationPhase::all() {
            let parsed: IntegrationPhase = phase.as_str().parse().unwrap();
            assert_eq!(parsed, *phase);
            assert_eq!(phase.to_string(), phase.as_str());
        }
        assert!("running".parse::<IntegrationPhase>().is_err());
    }

    #[test]
    fn context_phase_rejects_unknown() {
        let err = "deployed".parse::<ContextPhase>().unwrap_err();
        assert!(matches!(err, KamelError::InvalidPhase(p) if p == "deployed"));
    }

    #[test]
    fn phases_serialize_lowercase() {
        let yaml = serde_yaml::to_string(&IntegrationPhase::Deployed).unwrap();
        assert_eq!(yaml.trim(), "deployed");
        let parsed: PlatformPhase = serde_yaml::from_str("starting").unwrap();
        assert_eq!(parsed, PlatformPhase::Starting);
    }

    #[test]
    fn workload_kind_from_kind() {
        assert_eq!(
            WorkloadKind::from_kind("IntegrationContext"),
            Some(WorkloadKind::IntegrationContext)
        );
        assert_eq!(WorkloadKind::from_kind("Service"), None);
    }
}
