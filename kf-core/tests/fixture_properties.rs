use std::thread;

use assertables::*;
use kf_core::prelude::*;
use kf_testutils::*;
use rstest::*;

fn descriptors() -> Vec<ScenarioDescriptor> {
    let mut descriptors = vec![];
    for phase in PodPhase::ALL {
        for count in [1, 3] {
            for with_owner in [true, false] {
                let restarts = if phase.is_terminal() { 0 } else { 2 };
                let policy = match phase {
                    PodPhase::Succeeded | PodPhase::Failed => RestartPolicy::OnFailure,
                    _ => RestartPolicy::Always,
                };
                descriptors.push(
                    test_descriptor()
                        .phase(*phase)
                        .container_count(count)
                        .restart_count(restarts)
                        .restart_policy(policy)
                        .with_owner_reference(with_owner),
                );
            }
        }
    }
    descriptors
}

#[test_log::test]
fn test_every_descriptor_is_valid_and_round_trips() {
    for d in descriptors() {
        let pod = synthesize(&d).unwrap();
        assert_ok!(pod.validate());
        assert_eq!(pod.phase(), d.phase.unwrap());

        for format in [Format::Json, Format::Yaml] {
            let out = render(&pod, format).unwrap();
            assert_eq!(out, render(&synthesize(&d).unwrap(), format).unwrap());
            assert_eq!(parse(&out, format).unwrap(), pod);
        }
    }
}

#[test_log::test]
fn test_synthesize_from_many_threads() {
    let expected: Vec<_> = descriptors()
        .iter()
        .map(|d| render(&synthesize(d).unwrap(), Format::Json).unwrap())
        .collect();

    let rendered: Vec<Vec<String>> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    descriptors()
                        .iter()
                        .map(|d| render(&synthesize(d).unwrap(), Format::Json).unwrap())
                        .collect()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for out in rendered {
        assert_eq!(out, expected);
    }
}

#[rstest]
fn test_running_pod_containers(test_pod: PodFixture) {
    for cs in &test_pod.status.container_statuses {
        assert!(cs.ready);
        assert!(cs.state.is_running());
    }
}

#[rstest]
fn test_pending_pod_containers(test_pending_pod: PodFixture) {
    assert_len_eq_x!(&test_pending_pod.spec.containers, 2);
    assert_len_eq_x!(&test_pending_pod.status.container_statuses, 2);
    assert_eq!(test_pending_pod.metadata.namespace, TEST_NAMESPACE);
    for cs in &test_pending_pod.status.container_statuses {
        assert!(!cs.state.is_running());
    }
}

#[rstest]
fn test_failed_pod_containers(test_failed_pod: PodFixture) {
    let [cs] = test_failed_pod.status.container_statuses.as_slice() else {
        panic!("expected exactly one container status");
    };
    assert!(cs.state.is_terminated());
    assert_ne!(cs.state.exit_code(), Some(0));
    assert_eq!(test_failed_pod.condition(PodConditionType::Ready), ConditionStatus::False);
    assert_eq!(test_failed_pod.condition(PodConditionType::ContainersReady), ConditionStatus::False);
}

#[rstest]
fn test_crash_loop_restarts(test_crash_looping_pod: PodFixture) {
    let cs = &test_crash_looping_pod.status.container_statuses[0];
    assert_eq!(cs.restart_count as i64, TEST_RESTART_COUNT);
    assert_some!(&cs.last_state);
    assert_eq!(test_crash_looping_pod.phase(), PodPhase::Running);
}

#[rstest]
fn test_running_without_containers() {
    let err = synthesize(&ScenarioDescriptor::default().container_count(0).phase(PodPhase::Running)).unwrap_err();
    assert_eq!(err.field, "containerCount");
    assert!(err.mentions("phase"));
}

#[rstest]
fn test_transition_matches_synthesis(test_descriptor: ScenarioDescriptor, test_pending_pod: PodFixture) {
    let running = transition(&test_pending_pod, PodPhase::Running).unwrap();
    let direct = synthesize(&test_descriptor.container_count(2)).unwrap();
    assert_eq!(running.status, direct.status);
    assert_eq!(running.spec, direct.spec);
}

#[rstest]
fn test_podinfo_fixture(podinfo_pod: corev1::Pod, podinfo_fixture: PodFixture) {
    assert_eq!(podinfo_fixture.metadata.name, PODINFO_NAME);
    assert_eq!(podinfo_fixture.metadata.namespace, PODINFO_NAMESPACE);
    assert_eq!(
        podinfo_fixture.status.container_statuses[0].container_id.as_deref(),
        Some(PODINFO_CONTAINER_ID)
    );
    assert_eq!(PodFixture::try_from(&podinfo_pod).unwrap(), podinfo_fixture);

    let owner = owner_object(&podinfo_fixture).unwrap();
    assert_eq!(owner.metadata.uid.as_deref(), Some(PODINFO_OWNER_UID));
}

#[rstest]
fn test_app_name(test_descriptor: ScenarioDescriptor) {
    let pod = synthesize(&test_descriptor.app_name(TEST_APP_NAME)).unwrap();
    assert_eq!(pod.spec.containers[0].name, TEST_APP_NAME);
    assert_starts_with!(pod.metadata.name.as_str(), format!("{TEST_APP_NAME}-").as_str());
    assert_eq!(pod.metadata.labels[APP_KUBERNETES_IO_NAME_KEY], TEST_APP_NAME);
}
