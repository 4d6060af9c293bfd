//! Live-children snapshot and the desired-children claim model.
//!
//! The snapshot is a read-only, point-in-time view of the child objects
//! belonging to one run, keyed by name. The desired list is the append-only
//! declarative set produced by a single reconciliation; any live child absent
//! from it is pruned by the external diff/apply collaborator, never by this
//! engine.

use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
use k8s_openapi::Resource as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::Result;

/// Point-in-time view of a run's live children, keyed by resource name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildrenSnapshot {
    /// Live worker pods.
    #[serde(rename = "Pod.v1")]
    pub pods: BTreeMap<String, Pod>,
    /// Live config maps (generated embedded sources).
    #[serde(rename = "ConfigMap.v1")]
    pub config_maps: BTreeMap<String, ConfigMap>,
    /// Live secrets.
    #[serde(rename = "Secret.v1")]
    pub secrets: BTreeMap<String, Secret>,
}

/// A child resource the engine can own, as a closed tagged variant.
#[derive(Debug, Clone)]
pub enum ChildResource {
    /// A worker pod.
    Pod(Pod),
    /// A generated config map.
    ConfigMap(ConfigMap),
    /// A generated secret.
    Secret(Secret),
}

impl ChildResource {
    /// Returns the resource name, or the empty string when unset.
    #[must_use]
    pub fn name(&self) -> &str {
        let meta = match self {
            Self::Pod(o) => &o.metadata,
            Self::ConfigMap(o) => &o.metadata,
            Self::Secret(o) => &o.metadata,
        };
        meta.name.as_deref().unwrap_or("")
    }

    /// Returns the Kubernetes kind of the wrapped object.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Pod(_) => Pod::KIND,
            Self::ConfigMap(_) => ConfigMap::KIND,
            Self::Secret(_) => Secret::KIND,
        }
    }

    /// Encodes the object as JSON with `apiVersion` and `kind` injected, the
    /// shape the diff/apply collaborator consumes.
    ///
    /// # Errors
    ///
    /// Returns an error if the object fails to serialize.
    pub fn to_value(&self) -> Result<Value> {
        let (mut value, api_version, kind) = match self {
            Self::Pod(o) => (serde_json::to_value(o)?, Pod::API_VERSION, Pod::KIND),
            Self::ConfigMap(o) => (
                serde_json::to_value(o)?,
                ConfigMap::API_VERSION,
                ConfigMap::KIND,
            ),
            Self::Secret(o) => (serde_json::to_value(o)?, Secret::API_VERSION, Secret::KIND),
        };
        if let Value::Object(map) = &mut value {
            map.insert("apiVersion".to_string(), Value::String(api_version.into()));
            map.insert("kind".to_string(), Value::String(kind.into()));
        }
        Ok(value)
    }
}

/// Ordered, append-only list of the children this reconciliation believes
/// should exist.
#[derive(Debug, Clone, Default)]
pub struct DesiredChildren {
    children: Vec<ChildResource>,
}

impl DesiredChildren {
    /// Creates an empty desired-children list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `child` in the desired list and returns the currently-live
    /// child of the same kind and name, if one exists in the snapshot.
    ///
    /// The returned live object lets callers preserve live-assigned fields
    /// when merging. This function never deletes: pruning happens externally
    /// by omission from the desired list.
    pub fn claim(
        &mut self,
        child: ChildResource,
        snapshot: &ChildrenSnapshot,
    ) -> Option<ChildResource> {
        let current = match &child {
            ChildResource::Pod(o) => name_of(&o.metadata)
                .and_then(|n| snapshot.pods.get(n))
                .cloned()
                .map(ChildResource::Pod),
            ChildResource::ConfigMap(o) => name_of(&o.metadata)
                .and_then(|n| snapshot.config_maps.get(n))
                .cloned()
                .map(ChildResource::ConfigMap),
            ChildResource::Secret(o) => name_of(&o.metadata)
                .and_then(|n| snapshot.secrets.get(n))
                .cloned()
                .map(ChildResource::Secret),
        };
        self.children.push(child);
        current
    }

    /// Appends a child without consulting the snapshot.
    pub fn push(&mut self, child: ChildResource) {
        self.children.push(child);
    }

    /// Returns the registered children in append order.
    #[must_use]
    pub fn as_slice(&self) -> &[ChildResource] {
        &self.children
    }

    /// Number of registered children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if no children have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Encodes the whole list for the sync response.
    ///
    /// # Errors
    ///
    /// Returns an error if any object fails to serialize.
    pub fn to_values(&self) -> Result<Vec<Value>> {
        self.children.iter().map(ChildResource::to_value).collect()
    }
}

fn name_of(meta: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta) -> Option<&str> {
    meta.name.as_deref()
}
