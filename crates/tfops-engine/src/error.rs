//! Error types for the reconciliation engine.

/// The result type used throughout `tfops-engine`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a reconciliation.
///
/// Dependency waits are not errors: they are expressed as pending states
/// with a nil error. This enum covers the fatal consistency class and the
/// local build-failure class only.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The live children contradict the recorded state. Returned alongside
    /// state `NONE`; surfaced to the operator, not retried by this engine.
    #[error("consistency violation: {message}")]
    ConsistencyViolation {
        /// Description of the violation.
        message: String,
    },

    /// A source bundle carried no usable content.
    #[error("no data found in source {name}")]
    EmptySource {
        /// Name of the offending source.
        name: String,
    },

    /// Worker pod construction failed from the run's own spec or config.
    ///
    /// This is the soft class: the idle handler logs it at ERROR and remains
    /// `IDLE`, because waiting will not resolve a local spec problem.
    #[error("pod build failed: {message}")]
    PodBuild {
        /// Description of the failure.
        message: String,
    },

    /// An error from the shared resource model.
    #[error("resource model error: {0}")]
    Core(#[from] tfops_core::Error),
}

impl Error {
    /// Creates a consistency-violation error.
    #[must_use]
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::ConsistencyViolation {
            message: message.into(),
        }
    }

    /// Creates a pod-build error.
    #[must_use]
    pub fn pod_build(message: impl Into<String>) -> Self {
        Self::PodBuild {
            message: message.into(),
        }
    }
}
