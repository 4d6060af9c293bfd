//! The running handler: a worker pod has been dispatched and is being
//! tracked to completion.

use metrics::counter;

use tfops_core::{ChildResource, ConditionType, PodStatusSummary, RunState};

use crate::error::Result;
use crate::metrics::{labels, names};
use crate::track::{parse_run_outcome, pod_finished_at, pod_phase, pod_started_at};

use super::Ctx;

pub(crate) fn handle(ctx: &mut Ctx<'_>) -> Result<RunState> {
    // While a run is in flight every live child stays desired; pruning only
    // happens from the idle dispatch path when a new run begins.
    keep_all_children(ctx);

    let Some(pod) = ctx.children.pods.get(&ctx.status.pod_name).cloned() else {
        // The tracked pod disappeared (deleted out from under us). Route
        // back through the idle handler, which will re-dispatch.
        tracing::warn!(
            run = %ctx.identity,
            pod = %ctx.status.pod_name,
            "tracked pod missing from snapshot"
        );
        return Ok(RunState::WaitComplete);
    };

    if ctx.status.started_at.is_none() {
        ctx.status.started_at = pod_started_at(&pod);
    }

    match pod_phase(&pod) {
        "Succeeded" => {
            if let Some(outcome) = parse_run_outcome(&pod) {
                ctx.status.tf_output = outcome.outputs;
                ctx.status.tf_plan = outcome.tf_plan;
            }
            ctx.status.finished_at = pod_finished_at(&pod);
            if let (Some(started), Some(finished)) =
                (ctx.status.started_at, ctx.status.finished_at)
            {
                let seconds = (finished - started).num_seconds().max(0);
                ctx.status.duration = Some(format!("{seconds}s"));
            }
            ctx.status.pod_status = PodStatusSummary::Succeeded;
            ctx.status.set_condition(ConditionType::PodComplete, true);
            ctx.status.set_condition(ConditionType::Ready, true);

            counter!(
                names::RUNS_COMPLETED_TOTAL,
                labels::KIND => ctx.kind.short_name(),
                labels::RESULT => "succeeded",
            )
            .increment(1);
            tracing::info!(
                run = %ctx.identity,
                pod = %ctx.status.pod_name,
                duration = ctx.status.duration.as_deref().unwrap_or(""),
                "worker pod succeeded"
            );
            Ok(RunState::Idle)
        }
        "Failed" => {
            ctx.status.pod_status = PodStatusSummary::Failed;
            ctx.status.set_condition(ConditionType::PodComplete, true);
            ctx.status.set_condition(ConditionType::Ready, false);
            tracing::warn!(
                run = %ctx.identity,
                pod = %ctx.status.pod_name,
                "worker pod failed"
            );
            Ok(RunState::PodRetry)
        }
        _ => {
            ctx.status.pod_status = PodStatusSummary::Running;
            Ok(RunState::PodRunning)
        }
    }
}

/// Re-claims every child in the snapshot into the desired list.
pub(super) fn keep_all_children(ctx: &mut Ctx<'_>) {
    for pod in ctx.children.pods.values() {
        ctx.desired.push(ChildResource::Pod(pod.clone()));
    }
    for config_map in ctx.children.config_maps.values() {
        ctx.desired.push(ChildResource::ConfigMap(config_map.clone()));
    }
    for secret in ctx.children.secrets.values() {
        ctx.desired.push(ChildResource::Secret(secret.clone()));
    }
}
