//! Pod lifecycle tracking: phase aggregation, ordinal naming, and outcome
//! capture.

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use serde::Deserialize;
use std::collections::BTreeMap;

use tfops_core::{ChildrenSnapshot, OutputVar, RunIdentity, RunStatus};

/// Aggregated phases of a run's live pods.
///
/// Every pod is classified into exactly one bucket: any non-terminal phase,
/// unknown included, counts as active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodCounts {
    /// Pods in a non-terminal phase.
    pub active: usize,
    /// Pods in phase `Succeeded`.
    pub succeeded: usize,
    /// Pods in phase `Failed`.
    pub failed: usize,
    /// Name of the last active pod seen, if any.
    pub last_active: Option<String>,
}

/// Classifies a pod collection in a single pass.
#[must_use]
pub fn classify(pods: &BTreeMap<String, Pod>) -> PodCounts {
    let mut counts = PodCounts::default();
    for (name, pod) in pods {
        match pod_phase(pod) {
            "Succeeded" => counts.succeeded += 1,
            "Failed" => counts.failed += 1,
            _ => {
                counts.active += 1;
                counts.last_active = Some(name.clone());
            }
        }
    }
    counts
}

/// Returns the pod's phase string, or the empty string when unreported.
#[must_use]
pub fn pod_phase(pod: &Pod) -> &str {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("")
}

/// Computes the next ordinal pod name for a run.
///
/// The ordinal is one past the highest suffix found in the children snapshot
/// or in the status's recorded pod name, so names stay unique across retries
/// of the same run and across consecutive runs whose pods still linger in
/// the snapshot.
#[must_use]
pub fn next_ordinal_pod_name(
    identity: &RunIdentity,
    status: &RunStatus,
    children: &ChildrenSnapshot,
) -> String {
    let prefix = identity.pod_name_prefix();
    let mut next = 0u32;
    for name in children.pods.keys() {
        if let Some(ordinal) = parse_ordinal(name, &prefix) {
            next = next.max(ordinal.saturating_add(1));
        }
    }
    if let Some(ordinal) = parse_ordinal(&status.pod_name, &prefix) {
        next = next.max(ordinal.saturating_add(1));
    }
    format!("{prefix}{next}")
}

fn parse_ordinal(name: &str, prefix: &str) -> Option<u32> {
    name.strip_prefix(prefix)?.parse().ok()
}

/// Outcome document a worker writes to its container termination message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunOutcome {
    /// Output variables produced by an apply.
    pub outputs: BTreeMap<String, OutputVar>,
    /// Plan artifact reference produced by a plan.
    pub tf_plan: Option<String>,
}

/// Parses the run outcome from a terminated pod's first container.
///
/// Returns `None` when the pod has not terminated or wrote no parseable
/// outcome; a succeeded run without outputs is still a success.
#[must_use]
pub fn parse_run_outcome(pod: &Pod) -> Option<RunOutcome> {
    let message = pod
        .status
        .as_ref()?
        .container_statuses
        .as_ref()?
        .iter()
        .find_map(|cs| {
            cs.state
                .as_ref()?
                .terminated
                .as_ref()?
                .message
                .clone()
        })?;
    serde_json::from_str(&message).ok()
}

/// Returns when the pod's first container terminated, if it has.
#[must_use]
pub fn pod_finished_at(pod: &Pod) -> Option<DateTime<Utc>> {
    pod.status
        .as_ref()?
        .container_statuses
        .as_ref()?
        .iter()
        .find_map(|cs| {
            cs.state
                .as_ref()?
                .terminated
                .as_ref()?
                .finished_at
                .as_ref()
                .map(|t| t.0)
        })
}

/// Returns when the pod started, if reported.
#[must_use]
pub fn pod_started_at(pod: &Pod) -> Option<DateTime<Utc>> {
    pod.status.as_ref()?.start_time.as_ref().map(|t| t.0)
}
