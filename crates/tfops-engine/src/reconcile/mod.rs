//! The state machine driver.
//!
//! ## Design Principles
//!
//! 1. **Pure**: one invocation reads the parent, its last status, and the
//!    children snapshot, and produces a replacement status plus a desired
//!    child set. No create/update/delete calls are ever issued here.
//! 2. **Idempotent**: repeated invocations with unchanged inputs produce the
//!    same outputs; duplicate delivery is expected, not exceptional.
//! 3. **Stateless**: everything persisted lives in the returned status, so
//!    the engine resumes cleanly after an operator restart.
//! 4. **Pending over failure**: a missing external dependency is a named
//!    wait state with a nil error, never a hard failure.

mod idle;
mod retry;
mod running;

use metrics::counter;

use tfops_core::{ChildrenSnapshot, DesiredChildren, RunIdentity, RunKind, RunResource, RunState, RunStatus};

use crate::config::EngineConfig;
use crate::deps::ExternalResources;
use crate::error::Result;
use crate::metrics::{labels, names};

/// The reconciliation engine.
///
/// Holds only immutable configuration; collaborators are passed per call so
/// the same engine value can serve many parents concurrently.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

/// Per-invocation context threaded through the state handlers.
pub(crate) struct Ctx<'a> {
    pub config: &'a EngineConfig,
    pub resources: &'a dyn ExternalResources,
    pub kind: RunKind,
    pub parent: &'a RunResource,
    pub identity: RunIdentity,
    pub status: &'a mut RunStatus,
    pub children: &'a ChildrenSnapshot,
    pub desired: &'a mut DesiredChildren,
}

impl Engine {
    /// Creates an engine with the given configuration.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one reconciliation for `parent`.
    ///
    /// Mutates `status` (full replacement semantics) and appends to
    /// `desired`; returns the next lifecycle state, already recorded in
    /// `status.state_current`.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal consistency violations; the status is
    /// then left in state `NONE` and the framework's next event re-invokes
    /// regardless.
    pub fn reconcile(
        &self,
        resources: &dyn ExternalResources,
        kind: RunKind,
        parent: &RunResource,
        status: &mut RunStatus,
        children: &ChildrenSnapshot,
        desired: &mut DesiredChildren,
    ) -> Result<RunState> {
        let identity = parent.identity(kind);
        let current = status.state_current;

        let mut ctx = Ctx {
            config: &self.config,
            resources,
            kind,
            parent,
            identity,
            status,
            children,
            desired,
        };

        let outcome = match current {
            // A brand-new resource, a completed wait, and every dependency
            // gate all re-enter through the idle handler; it owns the gate
            // ordering and the idle short-circuit.
            RunState::None
            | RunState::Idle
            | RunState::WaitComplete
            | RunState::SpecFromPending
            | RunState::SourcePending
            | RunState::ProviderPending
            | RunState::TfPlanPending
            | RunState::TfInputPending
            | RunState::TfVarsFromPending => idle::handle(&mut ctx),
            RunState::PodRunning => running::handle(&mut ctx),
            RunState::PodRetry => retry::handle(&mut ctx),
        };

        match outcome {
            Ok(next) => {
                status.state_current = next;
                counter!(
                    names::RECONCILES_TOTAL,
                    labels::KIND => kind.short_name(),
                    labels::STATE => next.as_str(),
                )
                .increment(1);
                Ok(next)
            }
            Err(err) => {
                status.state_current = RunState::None;
                counter!(
                    names::RECONCILES_TOTAL,
                    labels::KIND => kind.short_name(),
                    labels::STATE => RunState::None.as_str(),
                )
                .increment(1);
                Err(err)
            }
        }
    }
}
