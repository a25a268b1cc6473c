use serde_json as json;
use tracing::*;

use crate::errors::*;
use crate::prelude::*;

// The fixture model uses the same wire names as the upstream API types, so conversion in either
// direction is a trip through serde_json::Value.  Going from a Pod to a fixture additionally runs
// the validator, since an arbitrary Pod needn't satisfy the fixture invariants.
impl PodFixture {
    pub fn to_pod(&self) -> anyhow::Result<corev1::Pod> {
        Ok(json::from_value(json::to_value(self)?)?)
    }
}

impl TryFrom<&corev1::Pod> for PodFixture {
    type Error = anyhow::Error;

    fn try_from(pod: &corev1::Pod) -> anyhow::Result<PodFixture> {
        let fixture: PodFixture = json::from_value(json::to_value(pod)?)?;
        if let Err(err) = fixture.validate() {
            warn!("pod {} is not a valid fixture: {err}", fixture.namespaced_name());
            bail!(err);
        }
        Ok(fixture)
    }
}
