//! The parent resource document and the hook sync envelope.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::children::ChildrenSnapshot;
use crate::error::{Error, Result};
use crate::id::{RunIdentity, RunKind};
use crate::spec::RunSpec;
use crate::status::RunStatus;

/// A Plan/Apply/Destroy custom resource as delivered by the framework.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunResource {
    /// API version of the custom resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// Resource kind (`TerraformPlan`, `TerraformApply`, `TerraformDestroy`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Object metadata; namespace and name identify the run.
    pub metadata: ObjectMeta,
    /// The declarative spec.
    pub spec: RunSpec,
    /// Last known status, absent for a brand-new resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RunStatus>,
}

impl RunResource {
    /// Returns the resource namespace, or the empty string when unset.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or("")
    }

    /// Returns the resource name, or the empty string when unset.
    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or("")
    }

    /// Returns the run kind parsed from the resource's `kind` field.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is missing or unknown.
    pub fn run_kind(&self) -> Result<RunKind> {
        self.kind
            .as_deref()
            .ok_or_else(|| Error::UnknownKind {
                value: String::new(),
            })?
            .parse()
    }

    /// Builds the run identity for a known kind.
    #[must_use]
    pub fn identity(&self, kind: RunKind) -> RunIdentity {
        RunIdentity::new(self.namespace(), self.name(), kind)
    }
}

/// The sync request delivered by the hook transport: the parent resource and
/// a snapshot of its live children.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRequest {
    /// The parent resource being reconciled.
    pub parent: RunResource,
    /// Snapshot of the parent's live children.
    #[serde(default)]
    pub children: ChildrenSnapshot,
}

/// The sync response: a full status replacement and the complete desired
/// child set.
#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    /// Full replacement of the parent's status document.
    pub status: RunStatus,
    /// The declarative child set, encoded with `apiVersion`/`kind`.
    pub children: Vec<Value>,
}
