//! Run lifecycle states.
//!
//! The state identifiers are a public compatibility surface: they are
//! persisted in status documents and must remain parseable across controller
//! versions. Unknown identifiers are a decode error, never a silent default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Lifecycle state machine states.
///
/// `Idle` is the steady state with no in-flight run. The `*Pending` states
/// are dependency gates: they carry no error and expect a later re-invocation
/// to succeed once the external resource appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Initial state for a new resource; also the landing state for fatal
    /// consistency violations.
    #[serde(rename = "NONE")]
    None,
    /// Steady state, no changes pending.
    #[serde(rename = "IDLE")]
    Idle,
    /// A wait completed; transitions back through the idle handler to pick up
    /// newly available data.
    #[serde(rename = "WAIT_COMPLETE")]
    WaitComplete,
    /// Waiting for the `specFrom` source resource to become available.
    #[serde(rename = "SPEC_FROM_PENDING")]
    SpecFromPending,
    /// Waiting for a source ConfigMap or object-storage source.
    #[serde(rename = "SOURCE_PENDING")]
    SourcePending,
    /// Waiting for a provider credentials Secret.
    #[serde(rename = "PROVIDER_PENDING")]
    ProviderPending,
    /// Waiting for the referenced plan artifact.
    #[serde(rename = "TFPLAN_PENDING")]
    TfPlanPending,
    /// Waiting for output variables from one or more apply resources.
    #[serde(rename = "TFINPUT_PENDING")]
    TfInputPending,
    /// Waiting to read variables from an external vars-from source.
    #[serde(rename = "TFVARSFROM_PENDING")]
    TfVarsFromPending,
    /// Worker pod dispatched, waiting for it to complete.
    #[serde(rename = "POD_RUNNING")]
    PodRunning,
    /// A pod failed and is being retried up to the attempt limit.
    #[serde(rename = "POD_RETRY")]
    PodRetry,
}

impl RunState {
    /// Returns the fixed wire identifier for this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Idle => "IDLE",
            Self::WaitComplete => "WAIT_COMPLETE",
            Self::SpecFromPending => "SPEC_FROM_PENDING",
            Self::SourcePending => "SOURCE_PENDING",
            Self::ProviderPending => "PROVIDER_PENDING",
            Self::TfPlanPending => "TFPLAN_PENDING",
            Self::TfInputPending => "TFINPUT_PENDING",
            Self::TfVarsFromPending => "TFVARSFROM_PENDING",
            Self::PodRunning => "POD_RUNNING",
            Self::PodRetry => "POD_RETRY",
        }
    }

    /// Returns true if this is a dependency-gate wait state.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::SpecFromPending
                | Self::SourcePending
                | Self::ProviderPending
                | Self::TfPlanPending
                | Self::TfInputPending
                | Self::TfVarsFromPending
        )
    }

    /// Returns true if a worker pod may legitimately be active in this state.
    #[must_use]
    pub const fn allows_active_pod(&self) -> bool {
        matches!(self, Self::PodRunning | Self::PodRetry)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(Self::None),
            "IDLE" => Ok(Self::Idle),
            "WAIT_COMPLETE" => Ok(Self::WaitComplete),
            "SPEC_FROM_PENDING" => Ok(Self::SpecFromPending),
            "SOURCE_PENDING" => Ok(Self::SourcePending),
            "PROVIDER_PENDING" => Ok(Self::ProviderPending),
            "TFPLAN_PENDING" => Ok(Self::TfPlanPending),
            "TFINPUT_PENDING" => Ok(Self::TfInputPending),
            "TFVARSFROM_PENDING" => Ok(Self::TfVarsFromPending),
            "POD_RUNNING" => Ok(Self::PodRunning),
            "POD_RETRY" => Ok(Self::PodRetry),
            other => Err(Error::UnknownState {
                value: other.to_string(),
            }),
        }
    }
}
