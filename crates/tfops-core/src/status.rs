//! The status document the engine returns as a full replacement.
//!
//! All persisted state lives here; the engine keeps nothing in memory between
//! invocations. Fields describing a finished run are cleared at the start of
//! every new run via [`RunStatus::clear_run_results`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::state::RunState;

/// Aggregated phase of the current worker pod, summarized for status readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodStatusSummary {
    /// No pod dispatched yet, or phase not yet observed.
    #[serde(rename = "UNKNOWN")]
    Unknown,
    /// The worker pod is active.
    #[serde(rename = "RUNNING")]
    Running,
    /// The worker pod completed successfully.
    #[serde(rename = "SUCCEEDED")]
    Succeeded,
    /// The worker pod failed (possibly terminally, after retries).
    #[serde(rename = "FAILED")]
    Failed,
}

impl Default for PodStatusSummary {
    fn default() -> Self {
        Self::Unknown
    }
}

/// One output variable captured after a successful apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputVar {
    /// The output value, rendered as a string.
    pub value: String,
    /// Whether the value is marked sensitive.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
}

/// Aspects of a run reported through the conditions list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionType {
    /// All referenced provider credential secrets resolved.
    ProviderConfigReady,
    /// All configured sources resolved into a bundle.
    SourceReady,
    /// The current worker pod reached a terminal phase.
    PodComplete,
    /// The run finished successfully end to end.
    Ready,
}

/// Observed status of one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    /// The condition holds.
    True,
    /// The condition does not hold.
    False,
}

/// One observed condition of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// The aspect of the run this condition reports on.
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    /// Whether the aspect currently holds.
    pub status: ConditionStatus,
}

/// Persisted record of the last-dispatched source bundle, used by the change
/// detector to decide whether the idle state must be exited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourcesStatus {
    /// Content hash per source ConfigMap name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub config_map_hashes: BTreeMap<String, String>,
    /// Names of the generated embedded-source ConfigMaps.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embedded_config_maps: Vec<String>,
}

/// The status of a run resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunStatus {
    /// Current lifecycle state.
    pub state_current: RunState,
    /// Name of the current (or last dispatched) worker pod.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pod_name: String,
    /// Workspace identifier, `{namespace}-{name}`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub workspace: String,
    /// Remote state-file path.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state_file: String,
    /// Plan artifact reference produced by a plan run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tf_plan: Option<String>,
    /// Output variables, set only after a successful apply.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tf_output: BTreeMap<String, OutputVar>,
    /// When the current run's pod started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the current run finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Wall-clock duration of the finished run, e.g. `64s`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Aggregated worker pod phase.
    pub pod_status: PodStatusSummary,
    /// Record of the last-dispatched source bundle.
    #[serde(skip_serializing_if = "SourcesStatus::is_empty")]
    pub sources: SourcesStatus,
    /// Observed conditions, one entry per [`ConditionType`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl SourcesStatus {
    /// Returns true if no source record has been persisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.config_map_hashes.is_empty() && self.embedded_config_maps.is_empty()
    }
}

impl RunStatus {
    /// Clears the fields describing a finished run.
    ///
    /// Called at the start of every new dispatch so stale outputs and
    /// timestamps from a prior run never survive into the next one.
    pub fn clear_run_results(&mut self) {
        self.tf_plan = None;
        self.tf_output.clear();
        self.started_at = None;
        self.finished_at = None;
        self.duration = None;
        self.pod_status = PodStatusSummary::Unknown;
    }

    /// Records a condition, replacing any existing entry of the same type.
    pub fn set_condition(&mut self, condition_type: ConditionType, holds: bool) {
        let status = if holds {
            ConditionStatus::True
        } else {
            ConditionStatus::False
        };
        match self
            .conditions
            .iter_mut()
            .find(|c| c.condition_type == condition_type)
        {
            Some(existing) => existing.status = status,
            None => self.conditions.push(Condition {
                condition_type,
                status,
            }),
        }
    }

    /// Looks up the recorded status of a condition type.
    #[must_use]
    pub fn condition(&self, condition_type: ConditionType) -> Option<ConditionStatus> {
        self.conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
            .map(|c| c.status)
    }
}
