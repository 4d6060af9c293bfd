//! Engine configuration.
//!
//! Constructed once at process start and passed explicitly into every
//! resolver and builder call; never mutated afterward.

/// Immutable engine configuration and resource-manifest defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Project / account identifier passed to the worker.
    pub project: String,
    /// Worker image used when the spec carries no override.
    pub default_image: String,
    /// Worker image pull policy used when the spec carries no override.
    pub default_image_pull_policy: String,
    /// Backend bucket used when the spec carries no override.
    pub default_backend_bucket: String,
    /// Backend prefix used when the spec carries no override.
    pub default_backend_prefix: String,
    /// Maximum worker pod attempts per run before the run is marked failed.
    pub max_attempts: u32,
}

impl EngineConfig {
    /// Creates a configuration for `project` with stock defaults.
    ///
    /// The default backend bucket is `{project}-tfops`.
    #[must_use]
    pub fn new(project: impl Into<String>) -> Self {
        let project = project.into();
        let default_backend_bucket = format!("{project}-tfops");
        Self {
            project,
            default_image: "tfops/terraform-worker:latest".to_string(),
            default_image_pull_policy: "IfNotPresent".to_string(),
            default_backend_bucket,
            default_backend_prefix: "terraform".to_string(),
            max_attempts: 3,
        }
    }

    /// Overrides the default worker image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>, pull_policy: impl Into<String>) -> Self {
        self.default_image = image.into();
        self.default_image_pull_policy = pull_policy.into();
        self
    }

    /// Overrides the default backend location.
    #[must_use]
    pub fn with_backend(mut self, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.default_backend_bucket = bucket.into();
        self.default_backend_prefix = prefix.into();
        self
    }

    /// Overrides the pod attempt limit.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}
