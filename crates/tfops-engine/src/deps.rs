//! Collaborator interfaces consumed by the dependency resolvers.
//!
//! Every method is a synchronous, side-effect-free, bounded read against
//! already-fetched snapshots or lightweight external lookups. "Not yet
//! available" is the only error class; there is no internal retry or backoff.
//! Waiting is expressed by the engine as a pending state, and retry timing is
//! owned by the invoking framework's re-sync interval.

use std::collections::BTreeMap;
use std::fmt;

use tfops_core::{RunKind, RunResource};

use crate::source::SourceBundle;

/// Signals that an external dependency is not yet available.
///
/// Never surfaced as a hard failure; the engine maps it to the corresponding
/// `*_PENDING` state with a nil error.
#[derive(Debug, Clone)]
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    /// Creates an unavailability signal with a human-readable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The human-readable reason, used in WARN logs only.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for Unavailable {}

/// External reads the dependency resolvers perform.
///
/// Implementations must not block on the worker or loop internally; each call
/// either returns resolved data or fails fast with [`Unavailable`].
pub trait ExternalResources {
    /// Fetches another run resource by kind, namespace, and name.
    ///
    /// # Errors
    ///
    /// Returns [`Unavailable`] while the resource does not exist.
    fn get_terraform(
        &self,
        kind: RunKind,
        namespace: &str,
        name: &str,
    ) -> Result<RunResource, Unavailable>;

    /// Fetches the key names of a provider-credential Secret.
    ///
    /// # Errors
    ///
    /// Returns [`Unavailable`] while the Secret does not exist.
    fn get_provider_config_secret(
        &self,
        namespace: &str,
        secret_name: &str,
    ) -> Result<Vec<String>, Unavailable>;

    /// Resolves the parent's source references into a single bundle.
    ///
    /// `pod_name` names the pod the bundle is being assembled for, so
    /// generated embedded-source ConfigMaps can be named deterministically
    /// per dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`Unavailable`] while any required source is missing.
    fn get_source_data(
        &self,
        parent: &RunResource,
        pod_name: &str,
    ) -> Result<SourceBundle, Unavailable>;

    /// Resolves cross-resource input variables from other apply resources'
    /// output status.
    ///
    /// # Errors
    ///
    /// Returns [`Unavailable`] while any referenced output is missing.
    fn get_tf_inputs(&self, parent: &RunResource) -> Result<BTreeMap<String, String>, Unavailable>;

    /// Resolves the external vars-from reference.
    ///
    /// # Errors
    ///
    /// Returns [`Unavailable`] while the vars source is missing.
    fn get_tf_vars_from(
        &self,
        parent: &RunResource,
    ) -> Result<BTreeMap<String, String>, Unavailable>;

    /// Resolves the plan artifact reference for runs that consume one.
    ///
    /// # Errors
    ///
    /// Returns [`Unavailable`] while the referenced plan has not produced an
    /// artifact.
    fn get_tf_plan_file(&self, parent: &RunResource) -> Result<String, Unavailable>;
}
