//! Worker pod construction.
//!
//! A pure builder: the same inputs always produce the same pod object, and
//! all resolved configuration reaches the worker exclusively through the
//! returned object (mounted sources, mounted provider secrets, environment).
//! There is no side channel to the worker.

use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, EnvVar, Pod, PodSpec, SecretVolumeSource, Volume,
    VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

use tfops_core::RunKind;

use crate::error::{Error, Result};
use crate::source::SourceBundle;

/// Worker entrypoint; the per-mode command argument is fixed by [`RunKind`].
pub const POD_ENTRYPOINT: &str = "/entrypoint.sh";

/// Mount root for source ConfigMaps.
pub const SOURCE_MOUNT_ROOT: &str = "/opt/tfops/source";

/// Mount root for provider credential Secrets.
pub const PROVIDER_MOUNT_ROOT: &str = "/var/run/tfops/provider";

/// Derives the remote state-file path for a workspace.
#[must_use]
pub fn make_state_file_path(bucket: &str, prefix: &str, workspace: &str) -> String {
    format!("gs://{bucket}/{prefix}/{workspace}.tfstate")
}

/// All resolved inputs needed to build one worker pod.
#[derive(Debug, Clone)]
pub struct WorkerPod {
    /// Worker image.
    pub image: String,
    /// Worker image pull policy.
    pub image_pull_policy: String,
    /// Namespace the pod runs in.
    pub namespace: String,
    /// Project / account identifier.
    pub project: String,
    /// Workspace identifier.
    pub workspace: String,
    /// Resolved source bundle.
    pub source: SourceBundle,
    /// Provider secret name to key-name list.
    pub provider_secret_keys: BTreeMap<String, Vec<String>>,
    /// Backend bucket.
    pub backend_bucket: String,
    /// Backend prefix.
    pub backend_prefix: String,
    /// Name of the parent run resource.
    pub run_name: String,
    /// Plan artifact consumed by this run, if any.
    pub tf_plan_file: Option<String>,
    /// Resolved cross-resource input variables.
    pub tf_inputs: BTreeMap<String, String>,
    /// Literal variables from the spec.
    pub tf_vars: BTreeMap<String, String>,
    /// Variables resolved from the vars-from reference.
    pub tf_vars_from: BTreeMap<String, String>,
}

impl WorkerPod {
    /// Builds the worker pod object for `pod_name` in command mode `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PodBuild`] if the run has no sources to mount or an
    /// input is structurally unusable. Build failures are local spec
    /// problems, not external unavailability.
    pub fn build(&self, pod_name: &str, mode: RunKind) -> Result<Pod> {
        if self.source.is_empty() {
            return Err(Error::pod_build("run has no resolved sources"));
        }
        if self.workspace.is_empty() {
            return Err(Error::pod_build("workspace must not be empty"));
        }

        let (volumes, mounts) = self.volumes_and_mounts();

        let container = Container {
            name: "terraform".to_string(),
            image: Some(self.image.clone()),
            image_pull_policy: Some(self.image_pull_policy.clone()),
            command: Some(vec![POD_ENTRYPOINT.to_string()]),
            args: Some(vec![mode.command().to_string()]),
            env: Some(self.env()),
            volume_mounts: if mounts.is_empty() { None } else { Some(mounts) },
            ..Container::default()
        };

        Ok(Pod {
            metadata: ObjectMeta {
                name: Some(pod_name.to_string()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.labels(mode)),
                ..ObjectMeta::default()
            },
            spec: Some(PodSpec {
                containers: vec![container],
                restart_policy: Some("Never".to_string()),
                volumes: if volumes.is_empty() { None } else { Some(volumes) },
                ..PodSpec::default()
            }),
            status: None,
        })
    }

    fn labels(&self, mode: RunKind) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert("app".to_string(), "tfops".to_string());
        labels.insert("run".to_string(), self.run_name.clone());
        labels.insert("kind".to_string(), mode.short_name().to_string());
        labels
    }

    fn env(&self) -> Vec<EnvVar> {
        let mut env = vec![
            env_var("PROJECT_ID", &self.project),
            env_var("WORKSPACE", &self.workspace),
            env_var("NAMESPACE", &self.namespace),
            env_var("BACKEND_BUCKET", &self.backend_bucket),
            env_var("BACKEND_PREFIX", &self.backend_prefix),
            env_var(
                "STATE_FILE",
                &make_state_file_path(&self.backend_bucket, &self.backend_prefix, &self.workspace),
            ),
        ];
        if let Some(plan) = &self.tf_plan_file {
            env.push(env_var("TFPLAN", plan));
        }
        if !self.source.object_storage.is_empty() {
            env.push(env_var("SOURCE_OBJECTS", &self.source.object_storage.join(",")));
        }

        // Precedence: literal vars, then cross-resource inputs, then the
        // vars-from source; later layers overwrite earlier ones.
        let mut vars = self.tf_vars.clone();
        for (name, value) in &self.tf_inputs {
            vars.insert(name.clone(), value.clone());
        }
        for (name, value) in &self.tf_vars_from {
            vars.insert(name.clone(), value.clone());
        }
        for (name, value) in &vars {
            env.push(env_var(&format!("TF_VAR_{name}"), value));
        }
        env
    }

    fn source_config_map_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (cm_name, _key) in &self.source.config_map_keys {
            if !names.contains(cm_name) {
                names.push(cm_name.clone());
            }
        }
        for name in self.source.embedded_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    fn volume_list(&self) -> Vec<Volume> {
        let mut volumes = Vec::new();
        for cm_name in self.source_config_map_names() {
            volumes.push(Volume {
                name: format!("source-{cm_name}"),
                config_map: Some(ConfigMapVolumeSource {
                    name: cm_name,
                    ..ConfigMapVolumeSource::default()
                }),
                ..Volume::default()
            });
        }
        for secret_name in self.provider_secret_keys.keys() {
            volumes.push(Volume {
                name: format!("provider-{secret_name}"),
                secret: Some(SecretVolumeSource {
                    secret_name: Some(secret_name.clone()),
                    ..SecretVolumeSource::default()
                }),
                ..Volume::default()
            });
        }
        volumes
    }

    fn volumes_and_mounts(&self) -> (Vec<Volume>, Vec<VolumeMount>) {
        let volumes = self.volume_list();
        let mut mounts = Vec::new();
        for cm_name in self.source_config_map_names() {
            mounts.push(VolumeMount {
                name: format!("source-{cm_name}"),
                mount_path: format!("{SOURCE_MOUNT_ROOT}/{cm_name}"),
                read_only: Some(true),
                ..VolumeMount::default()
            });
        }
        for secret_name in self.provider_secret_keys.keys() {
            mounts.push(VolumeMount {
                name: format!("provider-{secret_name}"),
                mount_path: format!("{PROVIDER_MOUNT_ROOT}/{secret_name}"),
                read_only: Some(true),
                ..VolumeMount::default()
            });
        }
        (volumes, mounts)
    }
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        value_from: None,
    }
}
