use k8s_openapi::api::core::v1 as corev1;
use kf_core::prelude::*;
use rstest::fixture;

use crate::constants::*;

#[fixture]
pub fn test_descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::default().namespace(TEST_NAMESPACE).seed(TEST_SEED)
}

#[fixture]
pub fn test_pod(test_descriptor: ScenarioDescriptor, #[default(PodPhase::Running)] phase: PodPhase) -> PodFixture {
    synthesize(&test_descriptor.phase(phase)).unwrap()
}

#[fixture]
pub fn test_pending_pod(test_descriptor: ScenarioDescriptor) -> PodFixture {
    synthesize(&test_descriptor.phase(PodPhase::Pending).container_count(2)).unwrap()
}

#[fixture]
pub fn test_failed_pod(test_descriptor: ScenarioDescriptor) -> PodFixture {
    synthesize(&test_descriptor.phase(PodPhase::Failed)).unwrap()
}

#[fixture]
pub fn test_crash_looping_pod(test_descriptor: ScenarioDescriptor) -> PodFixture {
    synthesize(&test_descriptor.restart_count(TEST_RESTART_COUNT)).unwrap()
}

#[fixture]
pub fn podinfo_pod() -> corev1::Pod {
    serde_json::from_str(PODINFO_JSON).unwrap()
}

#[fixture]
pub fn podinfo_fixture() -> PodFixture {
    parse(PODINFO_JSON, Format::Json).unwrap()
}
