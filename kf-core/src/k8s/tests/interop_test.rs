use kf_testutils::PODINFO_JSON;
use tracing_test::traced_test;

use super::*;

#[fixture]
fn podinfo_pod() -> corev1::Pod {
    serde_json::from_str(PODINFO_JSON).unwrap()
}

#[rstest]
fn test_to_pod(pod: PodFixture) {
    let k8s_pod = pod.to_pod().unwrap();
    assert_eq!(k8s_pod.metadata.name.as_deref(), Some(pod.metadata.name.as_str()));
    assert_eq!(k8s_pod.metadata.namespace.as_deref(), Some("test-ns"));

    let spec = k8s_pod.spec.unwrap();
    assert_eq!(spec.containers[0].name, "podinfo");
    assert_eq!(spec.restart_policy.as_deref(), Some("Always"));

    let status = k8s_pod.status.unwrap();
    assert_eq!(status.phase.as_deref(), Some("Running"));
    assert_eq!(status.qos_class.as_deref(), Some("Burstable"));
    let cs = &status.container_statuses.unwrap()[0];
    assert!(cs.ready);
    assert_some!(cs.state.as_ref().unwrap().running.as_ref());
}

#[rstest]
#[case::pending(PodPhase::Pending, 0)]
#[case::running(PodPhase::Running, 0)]
#[case::crash_loop(PodPhase::Pending, 4)]
#[case::restarted(PodPhase::Running, 2)]
#[case::unknown(PodPhase::Unknown, 0)]
fn test_pod_round_trip(descriptor: ScenarioDescriptor, #[case] phase: PodPhase, #[case] restarts: i64) {
    let pod = synthesize(&descriptor.phase(phase).restart_count(restarts).container_count(2)).unwrap();
    assert_eq!(PodFixture::try_from(&pod.to_pod().unwrap()).unwrap(), pod);
}

#[rstest]
fn test_failed_pod_round_trip(failed_pod: PodFixture) {
    assert_eq!(PodFixture::try_from(&failed_pod.to_pod().unwrap()).unwrap(), failed_pod);
}

#[rstest]
fn test_try_from_podinfo(podinfo_pod: corev1::Pod, podinfo: PodFixture) {
    assert_eq!(PodFixture::try_from(&podinfo_pod).unwrap(), podinfo);
}

#[rstest]
#[traced_test]
fn test_try_from_invalid(mut podinfo_pod: corev1::Pod) {
    podinfo_pod.status.as_mut().unwrap().phase = Some("Succeeded".into());
    let err = PodFixture::try_from(&podinfo_pod).unwrap_err();
    assert_eq!(err.downcast_ref::<ValidationError>().unwrap().field, "spec.restartPolicy");
    assert!(logs_contain("is not a valid fixture"));
}

#[rstest]
fn test_try_from_empty_pod() {
    let err = PodFixture::try_from(&corev1::Pod::default()).unwrap_err();
    assert_none!(err.downcast_ref::<ValidationError>());
}
