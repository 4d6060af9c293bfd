//! Idle-handler scenarios: dependency gates, change detection, and the
//! dispatch path.

mod common;

use common::{parent, pod_with_phase, snapshot_with_pods, spec_with_config_map, MockResources};

use tfops_core::spec::{ProviderConfig, SpecFrom, SourceRef, VarsFromRef};
use tfops_core::{
    ChildResource, ChildrenSnapshot, ConditionStatus, ConditionType, DesiredChildren,
    PodStatusSummary, RunKind, RunSpec, RunState, RunStatus,
};
use tfops_engine::{Engine, EngineConfig, Error};

fn engine() -> Engine {
    Engine::new(EngineConfig::new("acme"))
}

const CM_HASH_AB: &str = "96b9b1ac6b5cca0d3d53b5c7a23def3a020599ca";

#[test]
fn missing_spec_from_resource_is_spec_from_pending() {
    let resources = MockResources::default();
    let spec = RunSpec {
        spec_from: Some(SpecFrom {
            tf_plan: Some("x".to_string()),
            ..SpecFrom::default()
        }),
        ..RunSpec::default()
    };
    let tf = parent(RunKind::Apply, "ns", "a", spec);
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::SpecFromPending);
    assert_eq!(status.state_current, RunState::SpecFromPending);
    assert!(desired.is_empty());
}

#[test]
fn spec_from_adopts_referenced_spec() {
    let plan = parent(RunKind::Plan, "ns", "base", spec_with_config_map("base-src"));
    let resources = MockResources::default()
        .with_terraform(RunKind::Plan, plan)
        .with_config_map("ns", "base-src", &[("main.tf", "resource {}")]);

    let spec = RunSpec {
        spec_from: Some(SpecFrom {
            tf_plan: Some("base".to_string()),
            ..SpecFrom::default()
        }),
        ..RunSpec::default()
    };
    let tf = parent(RunKind::Apply, "ns", "follower", spec);
    let mut status = RunStatus {
        state_current: RunState::SpecFromPending,
        ..RunStatus::default()
    };
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::PodRunning);
    // The dispatched pod mounts the adopted source, not the follower's own
    // (empty) source list.
    assert!(status.sources.config_map_hashes.contains_key("base-src"));
    assert_eq!(status.pod_name, "follower-tfapply-0");
}

#[test]
fn provider_gate_is_checked_before_source_gate() {
    // Both the provider secret and the source ConfigMap are missing; the
    // fixed gate order reports the provider first.
    let resources = MockResources::default();
    let mut spec = spec_with_config_map("tf-src");
    spec.provider_config = vec![ProviderConfig {
        name: "google".to_string(),
        secret_name: Some("creds".to_string()),
    }];
    let tf = parent(RunKind::Apply, "ns", "a", spec);
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::ProviderPending);
}

#[test]
fn missing_source_is_source_pending() {
    let resources = MockResources::default().with_provider_secret("ns", "creds", &["key.json"]);
    let mut spec = spec_with_config_map("tf-src");
    spec.provider_config = vec![ProviderConfig {
        name: "google".to_string(),
        secret_name: Some("creds".to_string()),
    }];
    let tf = parent(RunKind::Apply, "ns", "a", spec);
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::SourcePending);
}

#[test]
fn source_gate_is_checked_before_tfinput_gate() {
    let resources = MockResources::default();
    let mut spec = spec_with_config_map("tf-src");
    spec.tf_inputs = vec![tfops_core::spec::TerraformInput {
        name: "upstream".to_string(),
        var_map: std::collections::BTreeMap::new(),
    }];
    let tf = parent(RunKind::Apply, "ns", "a", spec);
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::SourcePending);
}

#[test]
fn unresolved_tfinputs_are_tfinput_pending() {
    let resources = MockResources::default().with_config_map("ns", "tf-src", &[("a", "b")]);
    let mut spec = spec_with_config_map("tf-src");
    spec.tf_inputs = vec![tfops_core::spec::TerraformInput {
        name: "upstream".to_string(),
        var_map: std::collections::BTreeMap::new(),
    }];
    let tf = parent(RunKind::Apply, "ns", "a", spec);
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::TfInputPending);
}

#[test]
fn unresolved_vars_from_is_tfvarsfrom_pending() {
    let resources = MockResources::default().with_config_map("ns", "tf-src", &[("a", "b")]);
    let mut spec = spec_with_config_map("tf-src");
    spec.tf_vars_from = Some(VarsFromRef {
        config_map: Some("vars".to_string()),
        ..VarsFromRef::default()
    });
    let tf = parent(RunKind::Apply, "ns", "a", spec);
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::TfVarsFromPending);
}

#[test]
fn tfvarsfrom_gate_is_checked_before_tfplan_gate() {
    // Both the vars-from source and the plan artifact are missing; the fixed
    // gate order reports the vars-from wait first.
    let resources = MockResources::default().with_config_map("ns", "tf-src", &[("a", "b")]);
    let mut spec = spec_with_config_map("tf-src");
    spec.tf_vars_from = Some(VarsFromRef {
        config_map: Some("vars".to_string()),
        ..VarsFromRef::default()
    });
    spec.tf_plan = Some("base-plan".to_string());
    let tf = parent(RunKind::Apply, "ns", "a", spec);
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::TfVarsFromPending);
}

#[test]
fn unresolved_plan_artifact_is_tfplan_pending() {
    let resources = MockResources::default().with_config_map("ns", "tf-src", &[("a", "b")]);
    let mut spec = spec_with_config_map("tf-src");
    spec.tf_plan = Some("base-plan".to_string());
    let tf = parent(RunKind::Apply, "ns", "a", spec);
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::TfPlanPending);
}

#[test]
fn gate_outcomes_are_reported_as_conditions() {
    // Missing provider secret: the condition records the blocked gate.
    let resources = MockResources::default();
    let mut spec = spec_with_config_map("tf-src");
    spec.provider_config = vec![ProviderConfig {
        name: "google".to_string(),
        secret_name: Some("creds".to_string()),
    }];
    let tf = parent(RunKind::Apply, "ns", "a", spec);
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();
    assert_eq!(
        status.condition(ConditionType::ProviderConfigReady),
        Some(ConditionStatus::False)
    );

    // Once the secret and the source exist, both gate conditions flip and
    // the dispatch marks the new run incomplete.
    let resources = MockResources::default()
        .with_provider_secret("ns", "creds", &["key.json"])
        .with_config_map("ns", "tf-src", &[("a", "b")]);
    let mut desired = DesiredChildren::new();
    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::PodRunning);
    assert_eq!(
        status.condition(ConditionType::ProviderConfigReady),
        Some(ConditionStatus::True)
    );
    assert_eq!(
        status.condition(ConditionType::SourceReady),
        Some(ConditionStatus::True)
    );
    assert_eq!(
        status.condition(ConditionType::PodComplete),
        Some(ConditionStatus::False)
    );
    assert_eq!(
        status.condition(ConditionType::Ready),
        Some(ConditionStatus::False)
    );
}

#[test]
fn active_pod_while_idle_is_a_fatal_consistency_violation() {
    let resources = MockResources::default().with_config_map("ns", "tf-src", &[("a", "b")]);
    let tf = parent(RunKind::Apply, "ns", "a", spec_with_config_map("tf-src"));
    let mut status = RunStatus {
        state_current: RunState::Idle,
        ..RunStatus::default()
    };
    let children = snapshot_with_pods(vec![pod_with_phase("a-tfapply-0", "Running")]);
    let mut desired = DesiredChildren::new();

    let err = engine()
        .reconcile(&resources, RunKind::Apply, &tf, &mut status, &children, &mut desired)
        .unwrap_err();

    assert!(matches!(err, Error::ConsistencyViolation { .. }));
    assert_eq!(status.state_current, RunState::None);
}

#[test]
fn dispatch_records_hash_and_transitions_to_pod_running() {
    let resources = MockResources::default().with_config_map("ns", "a", &[("a", "b")]);
    let tf = parent(RunKind::Apply, "ns", "a", spec_with_config_map("a"));
    let mut status = RunStatus {
        state_current: RunState::Idle,
        ..RunStatus::default()
    };
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::PodRunning);
    assert_eq!(status.sources.config_map_hashes["a"], CM_HASH_AB);
    assert_eq!(status.pod_name, "a-tfapply-0");
    assert_eq!(status.workspace, "ns-a");
    assert_eq!(status.state_file, "gs://acme-tfops/terraform/ns-a.tfstate");
    assert_eq!(status.pod_status, PodStatusSummary::Unknown);
    assert!(status.tf_output.is_empty());
    assert!(status.started_at.is_none());

    let pods: Vec<&str> = desired
        .as_slice()
        .iter()
        .filter(|c| matches!(c, ChildResource::Pod(_)))
        .map(ChildResource::name)
        .collect();
    assert_eq!(pods, vec!["a-tfapply-0"]);
}

#[test]
fn unchanged_source_short_circuits_idle() {
    let resources = MockResources::default().with_config_map("ns", "a", &[("a", "b")]);
    let tf = parent(RunKind::Apply, "ns", "a", spec_with_config_map("a"));
    let mut status = RunStatus {
        state_current: RunState::Idle,
        pod_name: "a-tfapply-0".to_string(),
        workspace: "ns-a".to_string(),
        ..RunStatus::default()
    };
    status
        .sources
        .config_map_hashes
        .insert("a".to_string(), CM_HASH_AB.to_string());
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::Idle);
    assert!(desired.is_empty());
    assert_eq!(status.pod_name, "a-tfapply-0");
}

#[test]
fn changed_source_content_forces_redispatch() {
    let resources = MockResources::default().with_config_map("ns", "a", &[("a", "changed")]);
    let tf = parent(RunKind::Apply, "ns", "a", spec_with_config_map("a"));
    let mut status = RunStatus {
        state_current: RunState::Idle,
        pod_name: "a-tfapply-0".to_string(),
        ..RunStatus::default()
    };
    status
        .sources
        .config_map_hashes
        .insert("a".to_string(), CM_HASH_AB.to_string());
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::PodRunning);
    // New ordinal, derived from the recorded pod name.
    assert_eq!(status.pod_name, "a-tfapply-1");
    assert_ne!(status.sources.config_map_hashes["a"], CM_HASH_AB);
}

#[test]
fn idle_pass_after_dispatch_appends_no_second_pod() {
    let resources = MockResources::default().with_config_map("ns", "a", &[("a", "b")]);
    let tf = parent(RunKind::Apply, "ns", "a", spec_with_config_map("a"));
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let first = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();
    assert_eq!(first, RunState::PodRunning);
    assert_eq!(desired.len(), 1);

    // The framework applied the pod; the next invocation sees it live.
    let children = snapshot_with_pods(vec![pod_with_phase("a-tfapply-0", "Running")]);
    let mut desired_second = DesiredChildren::new();
    let second = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &children,
            &mut desired_second,
        )
        .unwrap();

    assert_eq!(second, RunState::PodRunning);
    // The existing pod is kept desired; no new pod name appears.
    let names: Vec<&str> = desired_second.as_slice().iter().map(ChildResource::name).collect();
    assert_eq!(names, vec!["a-tfapply-0"]);
    assert_eq!(status.pod_name, "a-tfapply-0");
}

#[test]
fn build_failure_stays_idle_with_no_children() {
    // A run with no sources at all cannot build a worker pod; that is a
    // local spec problem, not an external wait.
    let resources = MockResources::default();
    let tf = parent(RunKind::Apply, "ns", "a", RunSpec::default());
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Apply,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::Idle);
    assert!(desired.is_empty());
    assert!(status.pod_name.is_empty());
}

#[test]
fn embedded_sources_become_desired_config_maps() {
    let resources = MockResources::default();
    let spec = RunSpec {
        sources: vec![SourceRef {
            embedded: Some("resource \"null_resource\" \"x\" {}".to_string()),
            ..SourceRef::default()
        }],
        ..RunSpec::default()
    };
    let tf = parent(RunKind::Plan, "ns", "inline", spec);
    let mut status = RunStatus::default();
    let mut desired = DesiredChildren::new();

    let next = engine()
        .reconcile(
            &resources,
            RunKind::Plan,
            &tf,
            &mut status,
            &ChildrenSnapshot::default(),
            &mut desired,
        )
        .unwrap();

    assert_eq!(next, RunState::PodRunning);
    let kinds: Vec<&str> = desired.as_slice().iter().map(ChildResource::kind).collect();
    assert_eq!(kinds, vec!["ConfigMap", "Pod"]);
    assert_eq!(
        status.sources.embedded_config_maps,
        vec!["inline-tfplan-0-embedded-0".to_string()]
    );
}
