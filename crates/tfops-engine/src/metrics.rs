//! Observability metrics for the reconciliation engine.
//!
//! Exposed via the `metrics` crate facade; install an exporter (for example
//! `metrics-exporter-prometheus`) in the hosting process to publish them.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `tfops_reconciles_total` | Counter | `kind`, `state` | Reconcile invocations by resulting state |
//! | `tfops_pods_dispatched_total` | Counter | `kind` | Worker pods dispatched |
//! | `tfops_pod_retries_total` | Counter | `kind` | Worker pod retry dispatches |
//! | `tfops_runs_completed_total` | Counter | `kind`, `result` | Finished runs by outcome |

/// Metric names as constants for consistency.
pub mod names {
    /// Counter: reconcile invocations by resulting state.
    pub const RECONCILES_TOTAL: &str = "tfops_reconciles_total";
    /// Counter: worker pods dispatched.
    pub const PODS_DISPATCHED_TOTAL: &str = "tfops_pods_dispatched_total";
    /// Counter: worker pod retry dispatches.
    pub const POD_RETRIES_TOTAL: &str = "tfops_pod_retries_total";
    /// Counter: finished runs by outcome.
    pub const RUNS_COMPLETED_TOTAL: &str = "tfops_runs_completed_total";
}

/// Label keys used across metrics.
pub mod labels {
    /// Run kind (`tfplan`, `tfapply`, `tfdestroy`).
    pub const KIND: &str = "kind";
    /// Resulting lifecycle state.
    pub const STATE: &str = "state";
    /// Run outcome (`succeeded`, `failed`).
    pub const RESULT: &str = "result";
}
