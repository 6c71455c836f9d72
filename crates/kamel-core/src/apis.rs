//! Workload kinds watched by the operator.
//!
//! The three kinds share the Kubernetes object layout (`apiVersion`, `kind`,
//! `metadata`, `spec`, `status`) and serialize as the manifests users write.

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{
    ConditionStatus, ConditionType, ContextPhase, IntegrationPhase, PlatformPhase, WorkloadKind,
};

pub const API_VERSION: &str = "camel.apache.org/v1alpha1";

/// Label carried by every resource generated for an integration.
pub const INTEGRATION_LABEL: &str = "camel.apache.org/integration";

/// Label marking who created an integration context.
pub const CONTEXT_TYPE_LABEL: &str = "camel.apache.org/context.type";

// ---------------------------------------------------------------------------
// Workload
// ---------------------------------------------------------------------------

/// Uniform identity accessors over the three workload kinds.
pub trait Workload {
    const KIND: WorkloadKind;

    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    fn namespace(&self) -> &str {
        self.metadata().namespace.as_deref().unwrap_or_default()
    }

    /// Place the workload in `namespace` when its manifest names none.
    fn default_namespace(&mut self, namespace: &str) {
        if self.namespace().is_empty() {
            self.metadata_mut().namespace = Some(namespace.to_string());
        }
    }
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn object_meta(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// TraitSpec
// ---------------------------------------------------------------------------

/// Per-trait configuration. `enabled: None` leaves the trait in auto-detection mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configuration: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub status: ConditionStatus,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_transition_time: DateTime<Utc>,
}

/// Add or replace the condition of the given type.
///
/// The transition time only moves when the status value changes.
fn set_condition(
    conditions: &mut Vec<Condition>,
    condition_type: ConditionType,
    status: ConditionStatus,
    reason: &str,
    message: Option<String>,
) {
    let last_transition_time = conditions
        .iter()
        .find(|c| c.condition_type == condition_type && c.status == status)
        .map(|c| c.last_transition_time)
        .unwrap_or_else(Utc::now);
    conditions.retain(|c| c.condition_type != condition_type);
    conditions.push(Condition {
        condition_type,
        status,
        reason: reason.to_string(),
        message,
        last_transition_time,
    });
}

fn find_condition(conditions: &[Condition], condition_type: ConditionType) -> Option<&Condition> {
    conditions.iter().find(|c| c.condition_type == condition_type)
}

// ---------------------------------------------------------------------------
// Integration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "Integration::default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: IntegrationSpec,
    #[serde(default)]
    pub status: IntegrationStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub traits: BTreeMap<String, TraitSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<IntegrationPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl IntegrationStatus {
    pub fn set_condition(
        &mut self,
        condition_type: ConditionType,
        status: ConditionStatus,
        reason: &str,
        message: Option<String>,
    ) {
        set_condition(&mut self.conditions, condition_type, status, reason, message);
    }

    pub fn condition(&self, condition_type: ConditionType) -> Option<&Condition> {
        find_condition(&self.conditions, condition_type)
    }
}

impl Integration {
    fn default_kind() -> String {
        WorkloadKind::Integration.as_str().to_string()
    }

    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            api_version: default_api_version(),
            kind: Self::default_kind(),
            metadata: object_meta(name, namespace),
            spec: IntegrationSpec::default(),
            status: IntegrationStatus::default(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_trait(mut self, id: &str, spec: TraitSpec) -> Self {
        self.spec.traits.insert(id.to_string(), spec);
        self
    }

    pub fn phase(&self) -> Option<IntegrationPhase> {
        self.status.phase
    }
}

impl Workload for Integration {
    const KIND: WorkloadKind = WorkloadKind::Integration;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

// ---------------------------------------------------------------------------
// IntegrationContext
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationContext {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "IntegrationContext::default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: IntegrationContextSpec,
    #[serde(default)]
    pub status: IntegrationContextStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationContextSpec {
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub traits: BTreeMap<String, TraitSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationContextStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<ContextPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl IntegrationContextStatus {
    pub fn set_condition(
        &mut self,
        condition_type: ConditionType,
        status: ConditionStatus,
        reason: &str,
        message: Option<String>,
    ) {
        set_condition(&mut self.conditions, condition_type, status, reason, message);
    }

    pub fn condition(&self, condition_type: ConditionType) -> Option<&Condition> {
        find_condition(&self.conditions, condition_type)
    }
}

impl IntegrationContext {
    fn default_kind() -> String {
        WorkloadKind::IntegrationContext.as_str().to_string()
    }

    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            api_version: default_api_version(),
            kind: Self::default_kind(),
            metadata: object_meta(name, namespace),
            spec: IntegrationContextSpec::default(),
            status: IntegrationContextStatus::default(),
        }
    }

    pub fn phase(&self) -> Option<ContextPhase> {
        self.status.phase
    }
}

impl Workload for IntegrationContext {
    const KIND: WorkloadKind = WorkloadKind::IntegrationContext;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

// ---------------------------------------------------------------------------
// IntegrationPlatform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationPlatform {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "IntegrationPlatform::default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: IntegrationPlatformSpec,
    #[serde(default)]
    pub status: IntegrationPlatformStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterType {
    Kubernetes,
    OpenShift,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationPlatformSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterType>,
    #[serde(default)]
    pub build: PlatformBuildSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformBuildSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_strategy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationPlatformStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PlatformPhase>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl IntegrationPlatformStatus {
    pub fn set_condition(
        &mut self,
        condition_type: ConditionType,
        status: ConditionStatus,
        reason: &str,
        message: Option<String>,
    ) {
        set_condition(&mut self.conditions, condition_type, status, reason, message);
    }

    pub fn condition(&self, condition_type: ConditionType) -> Option<&Condition> {
        find_condition(&self.conditions, condition_type)
    }
}

impl IntegrationPlatform {
    fn default_kind() -> String {
        WorkloadKind::IntegrationPlatform.as_str().to_string()
    }

    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            api_version: default_api_version(),
            kind: Self::default_kind(),
            metadata: object_meta(name, namespace),
            spec: IntegrationPlatformSpec::default(),
            status: IntegrationPlatformStatus::default(),
        }
    }

    pub fn phase(&self) -> Option<PlatformPhase> {
        self.status.phase
    }
}

impl Workload for IntegrationPlatform {
    const KIND: WorkloadKind = WorkloadKind::IntegrationPlatform;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
