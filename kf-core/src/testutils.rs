use kf_testutils::{
    TEST_NAMESPACE,
    TEST_SEED,
};
use rstest::fixture;

use crate::prelude::*;

#[fixture]
pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::default().namespace(TEST_NAMESPACE).seed(TEST_SEED)
}

#[fixture]
pub fn pod(descriptor: ScenarioDescriptor) -> PodFixture {
    synthesize(&descriptor).unwrap()
}

#[fixture]
pub fn pending_pod(descriptor: ScenarioDescriptor) -> PodFixture {
    synthesize(&descriptor.phase(PodPhase::Pending)).unwrap()
}

#[fixture]
pub fn failed_pod(descriptor: ScenarioDescriptor) -> PodFixture {
    synthesize(&descriptor.phase(PodPhase::Failed)).unwrap()
}

#[fixture]
pub fn unknown_pod(descriptor: ScenarioDescriptor) -> PodFixture {
    synthesize(&descriptor.phase(PodPhase::Unknown)).unwrap()
}

#[fixture]
pub fn podinfo() -> PodFixture {
    serde_json::from_str(kf_testutils::PODINFO_JSON).unwrap()
}
