//! The idle handler: entry point for a new or restarted run.
//!
//! Gate ordering is significant and fixed: spec inheritance first (it can
//! rewrite the entire effective spec), then the idle short-circuit, then the
//! active-pod safety check, then the dependency gates in spec order. Each
//! gate early-exits with a distinct pending state and no error, so operators
//! can tell which prerequisite is blocking.

use metrics::counter;
use std::collections::BTreeMap;

use tfops_core::{ChildResource, ConditionType, RunResource, RunState};

use crate::detect::change_detected;
use crate::error::{Error, Result};
use crate::metrics::{labels, names};
use crate::pod::{make_state_file_path, WorkerPod};
use crate::track::{classify, next_ordinal_pod_name};

use super::Ctx;

pub(crate) fn handle(ctx: &mut Ctx<'_>) -> Result<RunState> {
    // Gate 1: spec inheritance.
    let Some(parent) = effective_parent(ctx) else {
        return Ok(RunState::SpecFromPending);
    };

    // Gate 2: the common no-op path. Only an already-idle run short-circuits;
    // every other state re-entering here has work to do.
    if ctx.status.state_current == RunState::Idle
        && !change_detected(ctx.resources, &parent, ctx.status)
    {
        return Ok(RunState::Idle);
    }

    // Gate 3: safety. Pods may only be active in POD_RUNNING or POD_RETRY;
    // anything active here means overlapping invocations for this parent.
    let counts = classify(&ctx.children.pods);
    if counts.active > 0 {
        return Err(Error::consistency(format!(
            "{} pod(s) active in IDLE, re-sync collision",
            counts.active
        )));
    }

    dispatch(ctx, &parent)
}

/// Resolves the effective parent, adopting the `specFrom` source's spec when
/// one is referenced. Returns `None` while the source resource is missing.
pub(super) fn effective_parent(ctx: &Ctx<'_>) -> Option<RunResource> {
    let mut parent = ctx.parent.clone();
    let Some(reference) = parent.spec.spec_from.as_ref().and_then(|s| s.reference()) else {
        return Some(parent);
    };
    let (source_kind, source_name) = reference;

    match ctx
        .resources
        .get_terraform(source_kind, ctx.parent.namespace(), source_name)
    {
        Ok(source) => {
            // Log the first resolution once; subsequent idle passes are
            // silent.
            if ctx.status.state_current == RunState::SpecFromPending {
                tracing::info!(
                    run = %ctx.identity,
                    source_kind = source_kind.resource_kind(),
                    source = source_name,
                    "using spec from referenced resource"
                );
            }
            parent.spec = source.spec;
            Some(parent)
        }
        Err(unavailable) => {
            tracing::info!(
                run = %ctx.identity,
                source_kind = source_kind.resource_kind(),
                source = source_name,
                reason = %unavailable,
                "waiting for specFrom resource to become available"
            );
            None
        }
    }
}

/// Runs the dependency gates and, when all pass, dispatches a new worker pod.
///
/// Shared by the idle and retry handlers; the caller has already performed
/// whatever safety checks its state requires.
pub(super) fn dispatch(ctx: &mut Ctx<'_>, parent: &RunResource) -> Result<RunState> {
    // New ordinal pod name, unique across retries of this run.
    let pod_name = next_ordinal_pod_name(&ctx.identity, ctx.status, ctx.children);

    // Gate: provider credential secrets.
    let mut provider_secret_keys: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for provider in &parent.spec.provider_config {
        let Some(secret_name) = &provider.secret_name else {
            continue;
        };
        match ctx
            .resources
            .get_provider_config_secret(ctx.parent.namespace(), secret_name)
        {
            Ok(keys) => {
                provider_secret_keys.insert(secret_name.clone(), keys);
            }
            Err(unavailable) => {
                tracing::warn!(
                    run = %ctx.identity,
                    secret = %secret_name,
                    reason = %unavailable,
                    "waiting for provider config secret"
                );
                ctx.status
                    .set_condition(ConditionType::ProviderConfigReady, false);
                return Ok(RunState::ProviderPending);
            }
        }
    }
    ctx.status
        .set_condition(ConditionType::ProviderConfigReady, true);

    // Gate: the source bundle.
    let bundle = match ctx.resources.get_source_data(parent, &pod_name) {
        Ok(bundle) => bundle,
        Err(unavailable) => {
            tracing::warn!(run = %ctx.identity, reason = %unavailable, "waiting for config sources");
            ctx.status.set_condition(ConditionType::SourceReady, false);
            return Ok(RunState::SourcePending);
        }
    };
    ctx.status.set_condition(ConditionType::SourceReady, true);

    // Generated embedded-source ConfigMaps become desired children as soon
    // as the bundle resolves, so they survive any later gate's wait.
    for config_map in bundle.embedded_config_maps.clone() {
        ctx.desired
            .claim(ChildResource::ConfigMap(config_map), ctx.children);
    }

    // Gate: cross-resource input variables.
    let tf_inputs = if parent.spec.tf_inputs.is_empty() {
        BTreeMap::new()
    } else {
        match ctx.resources.get_tf_inputs(parent) {
            Ok(vars) => vars,
            Err(unavailable) => {
                tracing::warn!(run = %ctx.identity, reason = %unavailable, "waiting for tfinputs");
                return Ok(RunState::TfInputPending);
            }
        }
    };

    // Gate: vars-from reference.
    let tf_vars_from = if parent.spec.tf_vars_from.is_none() {
        BTreeMap::new()
    } else {
        match ctx.resources.get_tf_vars_from(parent) {
            Ok(vars) => vars,
            Err(unavailable) => {
                tracing::warn!(run = %ctx.identity, reason = %unavailable, "waiting for tfvars source");
                return Ok(RunState::TfVarsFromPending);
            }
        }
    };

    // Gate: plan artifact, for runs that consume one.
    let tf_plan_file = if parent.spec.tf_plan.is_none() {
        None
    } else {
        match ctx.resources.get_tf_plan_file(parent) {
            Ok(file) => Some(file),
            Err(unavailable) => {
                tracing::warn!(run = %ctx.identity, reason = %unavailable, "waiting for plan artifact");
                return Ok(RunState::TfPlanPending);
            }
        }
    };

    // All gates passed; assemble the worker pod from spec overrides and
    // configured defaults.
    let image = parent
        .spec
        .image
        .clone()
        .unwrap_or_else(|| ctx.config.default_image.clone());
    let image_pull_policy = parent
        .spec
        .image_pull_policy
        .clone()
        .unwrap_or_else(|| ctx.config.default_image_pull_policy.clone());
    let backend_bucket = parent
        .spec
        .backend_bucket
        .clone()
        .unwrap_or_else(|| ctx.config.default_backend_bucket.clone());
    let backend_prefix = parent
        .spec
        .backend_prefix
        .clone()
        .unwrap_or_else(|| ctx.config.default_backend_prefix.clone());
    let workspace = ctx.identity.workspace();

    // Persist the dispatched bundle record for the change detector.
    ctx.status.sources.config_map_hashes = bundle.config_map_hashes.clone();
    ctx.status.sources.embedded_config_maps = bundle.embedded_names();

    let worker = WorkerPod {
        image,
        image_pull_policy,
        namespace: ctx.parent.namespace().to_string(),
        project: ctx.config.project.clone(),
        workspace: workspace.clone(),
        source: bundle,
        provider_secret_keys,
        backend_bucket: backend_bucket.clone(),
        backend_prefix: backend_prefix.clone(),
        run_name: ctx.parent.name().to_string(),
        tf_plan_file,
        tf_inputs,
        tf_vars: parent.spec.tf_vars.clone(),
        tf_vars_from,
    };

    let pod = match worker.build(&pod_name, ctx.kind) {
        Ok(pod) => pod,
        Err(err) => {
            // A local spec/config problem, not external unavailability:
            // waiting will not resolve it, so remain IDLE instead of pending.
            tracing::error!(run = %ctx.identity, error = %err, "failed to build worker pod");
            return Ok(RunState::Idle);
        }
    };

    ctx.desired.push(ChildResource::Pod(pod));

    ctx.status.pod_name = pod_name.clone();
    ctx.status.workspace = workspace.clone();
    ctx.status.state_file = make_state_file_path(&backend_bucket, &backend_prefix, &workspace);
    ctx.status.clear_run_results();
    ctx.status.set_condition(ConditionType::PodComplete, false);
    ctx.status.set_condition(ConditionType::Ready, false);

    counter!(names::PODS_DISPATCHED_TOTAL, labels::KIND => ctx.kind.short_name()).increment(1);
    tracing::info!(run = %ctx.identity, pod = %pod_name, "created worker pod");

    Ok(RunState::PodRunning)
}
