//! Run identity: kind, namespace/name, and the derived workspace.
//!
//! Every component receives the run's identity as an explicit value rather
//! than re-deriving strings from naming conventions. The workspace identifier
//! `{namespace}-{name}` is deterministic and stable for the life of the run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The three kinds of run resource.
///
/// The wire encoding uses the short parent-type names that the hook transport
/// and pod naming scheme rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RunKind {
    /// A `terraform plan` run.
    #[serde(rename = "tfplan")]
    Plan,
    /// A `terraform apply` run.
    #[serde(rename = "tfapply")]
    Apply,
    /// A `terraform destroy` run.
    #[serde(rename = "tfdestroy")]
    Destroy,
}

impl RunKind {
    /// Returns the short parent-type name (`tfplan`, `tfapply`, `tfdestroy`).
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Plan => "tfplan",
            Self::Apply => "tfapply",
            Self::Destroy => "tfdestroy",
        }
    }

    /// Returns the custom-resource kind name (`TerraformPlan`, ...).
    #[must_use]
    pub const fn resource_kind(&self) -> &'static str {
        match self {
            Self::Plan => "TerraformPlan",
            Self::Apply => "TerraformApply",
            Self::Destroy => "TerraformDestroy",
        }
    }

    /// Returns the worker command argument for this kind.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Apply => "apply",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for RunKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tfplan" | "TerraformPlan" => Ok(Self::Plan),
            "tfapply" | "TerraformApply" => Ok(Self::Apply),
            "tfdestroy" | "TerraformDestroy" => Ok(Self::Destroy),
            other => Err(Error::UnknownKind {
                value: other.to_string(),
            }),
        }
    }
}

/// The identity of a run resource, threaded through every component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunIdentity {
    /// Namespace of the parent resource.
    pub namespace: String,
    /// Name of the parent resource.
    pub name: String,
    /// Kind of the parent resource.
    pub kind: RunKind,
}

impl RunIdentity {
    /// Creates a new run identity.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, kind: RunKind) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            kind,
        }
    }

    /// Returns the deterministic workspace identifier `{namespace}-{name}`.
    ///
    /// The workspace is stable across the run's lifetime; the remote state
    /// file path is derived from it.
    #[must_use]
    pub fn workspace(&self) -> String {
        format!("{}-{}", self.namespace, self.name)
    }

    /// Returns the pod-name prefix `{name}-{kind}-` for ordinal pod naming.
    #[must_use]
    pub fn pod_name_prefix(&self) -> String {
        format!("{}-{}-", self.name, self.kind.short_name())
    }
}

impl fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}
