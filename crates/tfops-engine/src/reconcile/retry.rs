//! The retry handler: the prior worker pod failed and a replacement is
//! dispatched up to the configured attempt limit.
//!
//! Failed pods stay claimed during the retry window, so the attempt count
//! survives re-invocation as the failed-pod count in the snapshot rather
//! than as hidden in-memory state.

use metrics::counter;

use tfops_core::{ChildResource, ConditionType, PodStatusSummary, RunState};

use crate::error::Result;
use crate::metrics::{labels, names};
use crate::track::classify;

use super::{idle, running, Ctx};

pub(crate) fn handle(ctx: &mut Ctx<'_>) -> Result<RunState> {
    let counts = classify(&ctx.children.pods);

    if counts.active > 0 {
        // A duplicate delivery can land here after the replacement pod was
        // already dispatched. Track it instead of dispatching another.
        running::keep_all_children(ctx);
        return Ok(RunState::PodRunning);
    }

    let Some(parent) = idle::effective_parent(ctx) else {
        return Ok(RunState::SpecFromPending);
    };

    let max_attempts = parent.spec.max_attempts.unwrap_or(ctx.config.max_attempts);
    let attempts = u32::try_from(counts.failed).unwrap_or(u32::MAX);

    if attempts >= max_attempts {
        // Terminal failure: reported via status, not retried further. The
        // recorded source hash keeps the idle short-circuit from immediately
        // re-dispatching an unchanged run.
        running::keep_all_children(ctx);
        ctx.status.pod_status = PodStatusSummary::Failed;
        ctx.status.set_condition(ConditionType::PodComplete, true);
        ctx.status.set_condition(ConditionType::Ready, false);
        counter!(
            names::RUNS_COMPLETED_TOTAL,
            labels::KIND => ctx.kind.short_name(),
            labels::RESULT => "failed",
        )
        .increment(1);
        tracing::warn!(
            run = %ctx.identity,
            attempts,
            max_attempts,
            "worker pod retries exhausted, marking run failed"
        );
        return Ok(RunState::Idle);
    }

    // Keep the failed attempts alive so the snapshot keeps counting them,
    // then dispatch the next ordinal pod through the shared gates.
    for pod in ctx.children.pods.values() {
        ctx.desired.push(ChildResource::Pod(pod.clone()));
    }
    counter!(names::POD_RETRIES_TOTAL, labels::KIND => ctx.kind.short_name()).increment(1);
    tracing::info!(
        run = %ctx.identity,
        attempt = attempts + 1,
        max_attempts,
        "retrying failed worker pod"
    );

    idle::dispatch(ctx, &parent)
}
