//! Ordered container of the cluster resources that make up a workload's
//! desired state.
//!
//! Resources are only ever appended. Lookups filter by kind and scan in
//! insertion order; [`Collection::get`] keeps the *last* match, so a trait
//! that wants to correct an earlier resource adds a replacement rather than
//! editing in place.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Serialize;

use crate::apis::IntegrationContext;

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Deployment(Deployment),
    ConfigMap(ConfigMap),
    Service(Service),
    IntegrationContext(IntegrationContext),
}

impl Resource {
    pub fn api_version(&self) -> &str {
        match self {
            Resource::Deployment(_) => <Deployment as k8s_openapi::Resource>::API_VERSION,
            Resource::ConfigMap(_) => <ConfigMap as k8s_openapi::Resource>::API_VERSION,
            Resource::Service(_) => <Service as k8s_openapi::Resource>::API_VERSION,
            Resource::IntegrationContext(ctx) => ctx.api_version.as_str(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Resource::Deployment(_) => <Deployment as k8s_openapi::Resource>::KIND,
            Resource::ConfigMap(_) => <ConfigMap as k8s_openapi::Resource>::KIND,
            Resource::Service(_) => <Service as k8s_openapi::Resource>::KIND,
            Resource::IntegrationContext(ctx) => ctx.kind.as_str(),
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Resource::Deployment(r) => &r.metadata,
            Resource::ConfigMap(r) => &r.metadata,
            Resource::Service(r) => &r.metadata,
            Resource::IntegrationContext(r) => &r.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.metadata().namespace.as_deref().unwrap_or_default()
    }
}

impl From<Deployment> for Resource {
    fn from(r: Deployment) -> Self {
        Resource::Deployment(r)
    }
}

impl From<ConfigMap> for Resource {
    fn from(r: ConfigMap) -> Self {
        Resource::ConfigMap(r)
    }
}

impl From<Service> for Resource {
    fn from(r: Service) -> Self {
        Resource::Service(r)
    }
}

impl From<IntegrationContext> for Resource {
    fn from(r: IntegrationContext) -> Self {
        Resource::IntegrationContext(r)
    }
}

// ---------------------------------------------------------------------------
// ResourceKind (kind filter)
// ---------------------------------------------------------------------------

/// A payload type that can be selected out of a [`Resource`].
pub trait ResourceKind {
    fn from_resource(resource: &Resource) -> Option<&Self>;
}

impl ResourceKind for Deployment {
    fn from_resource(resource: &Resource) -> Option<&Self> {
        match resource {
            Resource::Deployment(r) => Some(r),
            _ => None,
        }
    }
}

impl ResourceKind for ConfigMap {
    fn from_resource(resource: &Resource) -> Option<&Self> {
        match resource {
            Resource::ConfigMap(r) => Some(r),
            _ => None,
        }
    }
}

impl ResourceKind for Service {
    fn from_resource(resource: &Resource) -> Option<&Self> {
        match resource {
            Resource::Service(r) => Some(r),
            _ => None,
        }
    }
}

impl ResourceKind for IntegrationContext {
    fn from_resource(resource: &Resource) -> Option<&Self> {
        match resource {
            Resource::IntegrationContext(r) => Some(r),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Vec<Resource>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: impl Into<Resource>) {
        self.items.push(resource.into());
    }

    pub fn items(&self) -> &[Resource] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.items.iter()
    }

    /// Call `visitor` on every resource of kind `K`, in insertion order.
    pub fn visit<K, F>(&self, mut visitor: F)
    where
        K: ResourceKind,
        F: FnMut(&K),
    {
        for resource in &self.items {
            if let Some(r) = K::from_resource(resource) {
                visitor(r);
            }
        }
    }

    /// Return the last resource of kind `K` that satisfies `filter`.
    pub fn get<K, F>(&self, filter: F) -> Option<&K>
    where
        K: ResourceKind,
        F: Fn(&K) -> bool,
    {
        let mut found = None;
        for resource in &self.items {
            if let Some(r) = K::from_resource(resource) {
                if filter(r) {
                    found = Some(r);
                }
            }
        }
        found
    }

    /// Call `visitor` on the metadata of every resource regardless of kind.
    pub fn visit_meta<F>(&self, mut visitor: F)
    where
        F: FnMut(&ObjectMeta),
    {
        for resource in &self.items {
            visitor(resource.metadata());
        }
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config_map(name: &str, data: &str) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            data: Some(BTreeMap::from([("value".to_string(), data.to_string())])),
            ..Default::default()
        }
    }

    fn service(name: &str) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn data(cm: &ConfigMap) -> &str {
        cm.data
            .as_ref()
            .and_then(|d| d.get("value"))
            .map(String::as_str)
            .unwrap_or_default()
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut c = Collection::new();
        c.add(service("a"));
        c.add(config_map("b", "1"));
        c.add(service("c"));

        let names: Vec<&str> = c.items().iter().map(Resource::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn visit_filters_by_kind() {
        let mut c = Collection::new();
        c.add(service("a"));
        c.add(config_map("b", "1"));
        c.add(service("c"));

        let mut seen = Vec::new();
        c.visit(|s: &Service| seen.push(s.metadata.name.clone().unwrap()));
        assert_eq!(seen, vec!["a", "c"]);

        let mut count = 0;
        c.visit(|_: &Deployment| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn get_returns_last_match() {
        let mut c = Collection::new();
        c.add(config_map("settings", "first"));
        c.add(service("settings"));
        c.add(config_map("settings", "second"));
        c.add(config_map("other", "third"));

        let found = c
            .get(|cm: &ConfigMap| cm.metadata.name.as_deref() == Some("settings"))
            .unwrap();
        assert_eq!(data(found), "second");
    }

    #[test]
    fn get_returns_none_when_nothing_matches() {
        let mut c = Collection::new();
        c.add(service("a"));
        assert!(c
            .get(|cm: &ConfigMap| cm.metadata.name.as_deref() == Some("a"))
            .is_none());
        assert!(c
            .get(|s: &Service| s.metadata.name.as_deref() == Some("missing"))
            .is_none());
    }

    #[test]
    fn visit_meta_covers_every_kind() {
        let mut c = Collection::new();
        c.add(service("a"));
        c.add(config_map("b", "1"));
        c.add(IntegrationContext::new("jvm", "demo"));

        let mut names = Vec::new();
        c.visit_meta(|m| names.push(m.name.clone().unwrap_or_default()));
        assert_eq!(names, vec!["a", "b", "jvm"]);
    }

    #[test]
    fn resource_kind_and_version() {
        let svc: Resource = service("a").into();
        assert_eq!(svc.kind(), "Service");
        assert_eq!(svc.api_version(), "v1");

        let ctx: Resource = IntegrationContext::new("jvm", "demo").into();
        assert_eq!(ctx.kind(), "IntegrationContext");
        assert_eq!(ctx.api_version(), "camel.apache.org/v1alpha1");
        assert_eq!(ctx.namespace(), "demo");
    }

    #[test]
    fn service_serializes_with_type_meta() {
        let svc: Resource = service("a").into();
        let value = serde_json::to_value(&svc).unwrap();
        assert_eq!(value["kind"], "Service");
        assert_eq!(value["apiVersion"], "v1");
        assert_eq!(value["metadata"]["name"], "a");
    }
}
