//! Change detection for the idle short-circuit.
//!
//! An already-idle run must restart when the underlying source content drifts
//! even though no explicit event indicated change (a ConfigMap edited in
//! place, for example). Drift is decided by recomputing the source bundle
//! hashes and comparing them against the record persisted at the last
//! dispatch.

use tfops_core::{RunResource, RunStatus};

use crate::deps::ExternalResources;

/// Returns true if the run's sources have drifted since the last dispatch.
///
/// A source that has become unavailable also counts as drift: the idle
/// handler's dependency gates will then surface the proper pending state
/// instead of silently holding `IDLE` against stale content.
pub fn change_detected(
    resources: &dyn ExternalResources,
    parent: &RunResource,
    status: &RunStatus,
) -> bool {
    let bundle = match resources.get_source_data(parent, &status.pod_name) {
        Ok(bundle) => bundle,
        Err(unavailable) => {
            tracing::debug!(
                reason = %unavailable,
                "source unavailable during idle comparison, treating as drift"
            );
            return true;
        }
    };

    if bundle.config_map_hashes != status.sources.config_map_hashes {
        return true;
    }
    bundle.embedded_names() != status.sources.embedded_config_maps
}
