//! The declarative spec document of a run resource.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::id::RunKind;

/// The spec of a Plan/Apply/Destroy run resource.
///
/// All fields are optional on the wire; the engine applies defaults from its
/// configuration where the spec is silent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunSpec {
    /// Named provider configurations, each optionally backed by a Secret.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provider_config: Vec<ProviderConfig>,
    /// Source bundle references.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    /// Literal input variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tf_vars: BTreeMap<String, String>,
    /// Cross-resource input variables read from other apply resources'
    /// outputs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tf_inputs: Vec<TerraformInput>,
    /// External vars-from reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tf_vars_from: Option<VarsFromRef>,
    /// Name of a plan resource whose artifact this run consumes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tf_plan: Option<String>,
    /// Adopt another resource's spec wholesale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_from: Option<SpecFrom>,
    /// Backend bucket override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_bucket: Option<String>,
    /// Backend prefix override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_prefix: Option<String>,
    /// Worker image override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Worker image pull-policy override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
    /// Per-resource override of the pod retry budget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

/// A named provider configuration entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Provider name (e.g. `google`).
    pub name: String,
    /// Name of the Secret holding the provider credentials, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

/// One source bundle reference. Exactly one of the fields is expected to be
/// set; the engine resolves each kind through the source provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceRef {
    /// Name of a ConfigMap holding Terraform configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map: Option<String>,
    /// Inline Terraform configuration, materialized as a generated ConfigMap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded: Option<String>,
    /// Object-storage URL of a source archive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_storage: Option<String>,
}

/// A cross-resource input: variables read from another apply resource's
/// output status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerraformInput {
    /// Name of the source apply resource.
    pub name: String,
    /// Mapping from the source's output names to this run's variable names.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub var_map: BTreeMap<String, String>,
}

/// External vars-from reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VarsFromRef {
    /// Read variables from a ConfigMap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map: Option<String>,
    /// Read variables from another apply resource's recorded tfvars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tf_apply: Option<String>,
}

/// A reference causing this resource to adopt another resource's spec.
///
/// At most one field may be set; `reference` resolves them in the fixed
/// plan, apply, destroy order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecFrom {
    /// Adopt the spec of a plan resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tf_plan: Option<String>,
    /// Adopt the spec of an apply resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tf_apply: Option<String>,
    /// Adopt the spec of a destroy resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tf_destroy: Option<String>,
}

impl SpecFrom {
    /// Returns the referenced resource's kind and name, if any.
    #[must_use]
    pub fn reference(&self) -> Option<(RunKind, &str)> {
        if let Some(name) = self.tf_plan.as_deref() {
            Some((RunKind::Plan, name))
        } else if let Some(name) = self.tf_apply.as_deref() {
            Some((RunKind::Apply, name))
        } else {
            self.tf_destroy
                .as_deref()
                .map(|name| (RunKind::Destroy, name))
        }
    }
}
