//! Shared test fixtures: an in-memory collaborator and resource builders.

#![allow(dead_code)]

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    ConfigMap, ContainerState, ContainerStateTerminated, ContainerStatus, Pod, PodStatus,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};

use tfops_core::{ChildrenSnapshot, RunKind, RunResource, RunSpec};
use tfops_engine::source::ConfigMapSourceData;
use tfops_engine::{ExternalResources, SourceBundle, Unavailable};

/// In-memory implementation of the collaborator reads. Anything absent from
/// the maps is reported as unavailable, exactly like a missing live resource.
#[derive(Debug, Default)]
pub struct MockResources {
    pub terraforms: BTreeMap<(RunKind, String, String), RunResource>,
    pub provider_secrets: BTreeMap<(String, String), Vec<String>>,
    pub config_maps: BTreeMap<(String, String), BTreeMap<String, String>>,
    pub tf_inputs: Option<BTreeMap<String, String>>,
    pub tf_vars_from: Option<BTreeMap<String, String>>,
    pub tf_plan_files: BTreeMap<String, String>,
}

impl MockResources {
    pub fn with_config_map(mut self, namespace: &str, name: &str, data: &[(&str, &str)]) -> Self {
        self.config_maps.insert(
            (namespace.to_string(), name.to_string()),
            data.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
        self
    }

    pub fn with_provider_secret(mut self, namespace: &str, name: &str, keys: &[&str]) -> Self {
        self.provider_secrets.insert(
            (namespace.to_string(), name.to_string()),
            keys.iter().map(|k| (*k).to_string()).collect(),
        );
        self
    }

    pub fn with_terraform(mut self, kind: RunKind, resource: RunResource) -> Self {
        let key = (
            kind,
            resource.namespace().to_string(),
            resource.name().to_string(),
        );
        self.terraforms.insert(key, resource);
        self
    }
}

impl ExternalResources for MockResources {
    fn get_terraform(
        &self,
        kind: RunKind,
        namespace: &str,
        name: &str,
    ) -> Result<RunResource, Unavailable> {
        self.terraforms
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Unavailable::new(format!("{} {namespace}/{name} not found", kind.resource_kind())))
    }

    fn get_provider_config_secret(
        &self,
        namespace: &str,
        secret_name: &str,
    ) -> Result<Vec<String>, Unavailable> {
        self.provider_secrets
            .get(&(namespace.to_string(), secret_name.to_string()))
            .cloned()
            .ok_or_else(|| Unavailable::new(format!("secret {namespace}/{secret_name} not found")))
    }

    fn get_source_data(
        &self,
        parent: &RunResource,
        pod_name: &str,
    ) -> Result<SourceBundle, Unavailable> {
        let namespace = parent.namespace().to_string();
        let mut bundle = SourceBundle::default();
        for (index, source) in parent.spec.sources.iter().enumerate() {
            if let Some(cm_name) = &source.config_map {
                let data = self
                    .config_maps
                    .get(&(namespace.clone(), cm_name.clone()))
                    .cloned()
                    .ok_or_else(|| {
                        Unavailable::new(format!("configmap {namespace}/{cm_name} not found"))
                    })?;
                let source_data = ConfigMapSourceData::new(data);
                source_data
                    .validate(cm_name)
                    .map_err(|e| Unavailable::new(e.to_string()))?;
                bundle
                    .config_map_hashes
                    .insert(cm_name.clone(), source_data.content_hash());
                for (key, _) in source_data.iter() {
                    bundle.config_map_keys.push((cm_name.clone(), key.clone()));
                }
            }
            if let Some(embedded) = &source.embedded {
                let cm_name = format!("{pod_name}-embedded-{index}");
                bundle.embedded_config_maps.push(ConfigMap {
                    metadata: ObjectMeta {
                        name: Some(cm_name),
                        namespace: Some(namespace.clone()),
                        ..ObjectMeta::default()
                    },
                    data: Some(BTreeMap::from([(
                        "terraform.tf".to_string(),
                        embedded.clone(),
                    )])),
                    ..ConfigMap::default()
                });
            }
            if let Some(object) = &source.object_storage {
                bundle.object_storage.push(object.clone());
            }
        }
        Ok(bundle)
    }

    fn get_tf_inputs(&self, _parent: &RunResource) -> Result<BTreeMap<String, String>, Unavailable> {
        self.tf_inputs
            .clone()
            .ok_or_else(|| Unavailable::new("tfinput outputs not yet available"))
    }

    fn get_tf_vars_from(
        &self,
        _parent: &RunResource,
    ) -> Result<BTreeMap<String, String>, Unavailable> {
        self.tf_vars_from
            .clone()
            .ok_or_else(|| Unavailable::new("tfvars source not yet available"))
    }

    fn get_tf_plan_file(&self, parent: &RunResource) -> Result<String, Unavailable> {
        let plan_name = parent.spec.tf_plan.clone().unwrap_or_default();
        self.tf_plan_files
            .get(&plan_name)
            .cloned()
            .ok_or_else(|| Unavailable::new(format!("plan artifact for {plan_name} not available")))
    }
}

pub fn parent(kind: RunKind, namespace: &str, name: &str, spec: RunSpec) -> RunResource {
    RunResource {
        api_version: Some("tfops.example.com/v1".to_string()),
        kind: Some(kind.resource_kind().to_string()),
        metadata: ObjectMeta {
            namespace: Some(namespace.to_string()),
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        spec,
        status: None,
    }
}

pub fn spec_with_config_map(cm_name: &str) -> RunSpec {
    RunSpec {
        sources: vec![tfops_core::spec::SourceRef {
            config_map: Some(cm_name.to_string()),
            ..tfops_core::spec::SourceRef::default()
        }],
        ..RunSpec::default()
    }
}

pub fn pod_with_phase(name: &str, phase: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..PodStatus::default()
        }),
        ..Pod::default()
    }
}

/// A succeeded pod carrying a termination-message outcome and timing.
pub fn finished_pod(name: &str, phase: &str, message: &str) -> Pod {
    let started = chrono::DateTime::parse_from_rfc3339("2026-08-25T10:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let finished = chrono::DateTime::parse_from_rfc3339("2026-08-25T10:01:04Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let mut pod = pod_with_phase(name, phase);
    let status = pod.status.as_mut().unwrap();
    status.start_time = Some(Time(started));
    status.container_statuses = Some(vec![ContainerStatus {
        name: "terraform".to_string(),
        state: Some(ContainerState {
            terminated: Some(ContainerStateTerminated {
                exit_code: i32::from(phase == "Failed"),
                message: Some(message.to_string()),
                finished_at: Some(Time(finished)),
                ..ContainerStateTerminated::default()
            }),
            ..ContainerState::default()
        }),
        ..ContainerStatus::default()
    }]);
    pod
}

pub fn snapshot_with_pods(pods: Vec<Pod>) -> ChildrenSnapshot {
    let mut snapshot = ChildrenSnapshot::default();
    for pod in pods {
        let name = pod.metadata.name.clone().unwrap_or_default();
        snapshot.pods.insert(name, pod);
    }
    snapshot
}
