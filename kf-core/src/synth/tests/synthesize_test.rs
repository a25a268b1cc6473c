use kf_testutils::TEST_NAMESPACE;

use super::*;

#[rstest]
#[traced_test]
fn test_synthesize_default(pod: PodFixture) {
    assert_ok!(pod.validate());
    assert_eq!(pod.api_version, "v1");
    assert_eq!(pod.kind, "Pod");
    assert_eq!(pod.phase(), PodPhase::Running);
    assert_eq!(pod.metadata.namespace, TEST_NAMESPACE);
    assert_eq!(pod.metadata.creation_timestamp, lifecycle::timestamp(REFERENCE_TS));
    assert_len_eq_x!(&pod.spec.containers, 1);
    assert_eq!(pod.spec.containers[0].name, DEFAULT_APP_NAME);
    assert_eq!(pod.spec.containers[0].image, DEFAULT_IMAGE);
    assert_eq!(pod.status.qos_class, QosClass::Burstable);
    assert!(logs_contain("synthesized Running pod test-ns/podinfo-"));
}

#[rstest]
fn test_synthesize_deterministic(descriptor: ScenarioDescriptor) {
    let d = descriptor.container_count(3).restart_count(2);
    assert_eq!(synthesize(&d).unwrap(), synthesize(&d).unwrap());
}

#[rstest]
fn test_synthesize_seed_changes_identity(descriptor: ScenarioDescriptor) {
    let a = synthesize(&descriptor.clone().seed("one")).unwrap();
    let b = synthesize(&descriptor.seed("two")).unwrap();
    assert_ne!(a.metadata.uid, b.metadata.uid);
    assert_ne!(a.metadata.name, b.metadata.name);
    assert_ne!(a.status.container_statuses[0].container_id, b.status.container_statuses[0].container_id);
}

#[rstest]
fn test_synthesize_owner_reference(pod: PodFixture) {
    let rf = pod.metadata.controller_ref().unwrap();
    assert_eq!(rf.api_version, "apps/v1");
    assert_eq!(rf.kind, "ReplicaSet");
    assert_eq!(rf.block_owner_deletion, Some(true));
    assert_ne!(rf.uid, pod.metadata.uid);

    let hash = &pod.metadata.labels[POD_TEMPLATE_HASH_LABEL_KEY];
    assert_eq!(rf.name, format!("{DEFAULT_APP_NAME}-{hash}"));
    assert_eq!(pod.metadata.generate_name, Some(format!("{}-", rf.name)));
    assert_starts_with!(pod.metadata.name, pod.metadata.generate_name.as_deref().unwrap());
    assert_len_eq_x!(&pod.metadata.name, rf.name.len() + 6);
}

#[rstest]
fn test_synthesize_without_owner_reference(descriptor: ScenarioDescriptor) {
    let pod = synthesize(&descriptor.with_owner_reference(false)).unwrap();
    assert_is_empty!(pod.metadata.owner_references);
    assert_none!(pod.metadata.controller_ref());
    assert_eq!(pod.metadata.labels, klabel!(APP_KUBERNETES_IO_NAME_KEY => DEFAULT_APP_NAME));
    assert_eq!(pod.metadata.generate_name.as_deref(), Some("podinfo-"));
}

#[rstest]
fn test_synthesize_multiple_containers(descriptor: ScenarioDescriptor) {
    let pod = synthesize(&descriptor.container_count(3)).unwrap();
    let names: Vec<_> = pod.spec.containers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["podinfo", "podinfo-1", "podinfo-2"]);

    let second = &pod.spec.containers[1];
    assert_eq!(second.port_named("http"), Some(HTTP_PORT + PORT_STRIDE));
    assert_eq!(second.port_named("http-metrics"), Some(METRICS_PORT + PORT_STRIDE));
    assert_eq!(second.port_named("grpc"), Some(GRPC_PORT + PORT_STRIDE));
    assert_contains!(second.command, &format!("--port={}", HTTP_PORT + PORT_STRIDE));

    let container_ids: Vec<_> = pod.status.container_statuses.iter().map(|cs| cs.container_id.clone()).collect();
    assert_len_eq_x!(&container_ids, 3);
    assert_ne!(container_ids[0], container_ids[1]);
    assert_ne!(container_ids[1], container_ids[2]);
}

#[rstest]
fn test_synthesize_service_account_volume(pod: PodFixture) {
    let volume = pod
        .spec
        .volumes
        .iter()
        .find(|v| v.name.starts_with(KUBE_SVC_ACCOUNT_VOLUME_NAME_PREFIX))
        .unwrap();
    let VolumeSource::Projected(projected) = &volume.source else {
        panic!("expected projected volume, got {:?}", volume.source);
    };
    assert_eq!(projected.default_mode, Some(0o644));
    assert_len_eq_x!(&projected.sources, 3);

    for c in &pod.spec.containers {
        let mount = c.volume_mounts.iter().find(|m| m.name == volume.name).unwrap();
        assert_eq!(mount.mount_path, KUBE_SVC_ACCOUNT_MOUNT_PATH);
        assert!(mount.read_only);
    }
}

#[rstest]
fn test_synthesize_running(descriptor: ScenarioDescriptor) {
    let pod = synthesize(&descriptor.container_count(2)).unwrap();
    for cs in &pod.status.container_statuses {
        assert!(cs.ready);
        assert!(cs.state.is_running());
        assert_none!(cs.last_state);
    }
    for type_ in PodConditionType::ALL {
        assert_eq!(pod.condition(*type_), ConditionStatus::True);
    }
    assert_some!(&pod.status.pod_ip);
    assert_eq!(pod.status.pod_ips[0].ip, pod.status.pod_ip.clone().unwrap());
}

#[rstest]
fn test_synthesize_pending_example() {
    let d = ScenarioDescriptor::default()
        .phase(PodPhase::Pending)
        .container_count(2)
        .namespace("test-ns");
    let pod = synthesize(&d).unwrap();

    assert_len_eq_x!(&pod.spec.containers, 2);
    assert_eq!(pod.status.phase, PodPhase::Pending);
    assert_eq!(pod.metadata.namespace, "test-ns");
    assert_len_eq_x!(&pod.status.container_statuses, 2);
    for cs in &pod.status.container_statuses {
        assert!(!cs.state.is_running());
        assert!(!cs.ready);
    }
}

#[rstest]
fn test_synthesize_failed_example() {
    let d = ScenarioDescriptor::default().phase(PodPhase::Failed).container_count(1);
    let pod = synthesize(&d).unwrap();

    assert_len_eq_x!(&pod.status.container_statuses, 1);
    let state = &pod.status.container_statuses[0].state;
    assert!(state.is_terminated());
    assert_ne!(state.exit_code(), Some(0));
    assert_eq!(pod.condition(PodConditionType::Ready), ConditionStatus::False);
    assert_eq!(pod.condition(PodConditionType::ContainersReady), ConditionStatus::False);
    assert_eq!(pod.spec.restart_policy, RestartPolicy::Never);
}

#[rstest]
fn test_synthesize_running_without_containers() {
    let d = ScenarioDescriptor::default().phase(PodPhase::Running).container_count(0);
    let err = synthesize(&d).unwrap_err();
    assert!(err.mentions("containerCount"));
    assert!(err.mentions("phase"));
}

#[rstest]
fn test_synthesize_pending_without_containers(descriptor: ScenarioDescriptor) {
    let pod = synthesize(&descriptor.phase(PodPhase::Pending).container_count(0)).unwrap();
    assert_is_empty!(pod.spec.containers);
    assert_is_empty!(pod.status.container_statuses);
    assert_eq!(pod.status.qos_class, QosClass::BestEffort);
}

#[rstest]
fn test_synthesize_restarts(descriptor: ScenarioDescriptor) {
    let pod = synthesize(&descriptor.restart_count(3)).unwrap();
    let cs = &pod.status.container_statuses[0];
    assert_eq!(cs.restart_count, 3);

    let Some(ContainerState::Terminated(last)) = &cs.last_state else {
        panic!("expected terminated last state, got {:?}", cs.last_state);
    };
    assert_eq!(last.exit_code, FAILED_EXIT_CODE);
    assert_ne!(last.container_id, cs.container_id);
    assert_lt!(last.finished_at.0.timestamp(), cs.state.start_ts().unwrap());
}

#[rstest]
fn test_synthesize_unknown(descriptor: ScenarioDescriptor) {
    let pod = synthesize(&descriptor.phase(PodPhase::Unknown)).unwrap();
    assert_is_empty!(pod.status.container_statuses);
    for type_ in PodConditionType::ALL {
        assert_eq!(pod.condition(*type_), ConditionStatus::Unknown);
    }
}

#[rstest]
fn test_synthesize_custom_image(descriptor: ScenarioDescriptor) {
    let image = "127.0.0.1:31999/stefanprodan/podinfo-2985051089:6.1.6";
    let pod = synthesize(&descriptor.image(image).app_name("cool-name-podinfo")).unwrap();
    assert_eq!(pod.spec.containers[0].image, image);
    assert_eq!(pod.spec.containers[0].name, "cool-name-podinfo");
    assert_starts_with!(
        pod.status.container_statuses[0].image_id,
        "127.0.0.1:31999/stefanprodan/podinfo-2985051089@sha256:"
    );
}
