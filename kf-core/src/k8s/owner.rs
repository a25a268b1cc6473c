use std::collections::BTreeMap;

use kube::core::{
    ApiResource,
    DynamicObject,
};
use serde_json::json;
use tracing::*;

use crate::errors::*;
use crate::k8s::GVK;
use crate::prelude::*;

// Build the ReplicaSet that the fixture's controller reference points at.  The pod fixture is
// the only replica, so the owner's replica counts mirror the pod's readiness; its template is the
// pod spec minus the fields the scheduler fills in.
pub fn owner_object(fixture: &PodFixture) -> anyhow::Result<DynamicObject> {
    let Some(rf) = fixture.metadata.controller_ref() else {
        bail!("pod {} has no controller reference", fixture.namespaced_name());
    };

    let gvk = GVK::from_owner_ref(rf)?;
    ensure!(
        gvk == GVK::replica_set(),
        "cannot synthesize owner of type {gvk} for pod {}",
        fixture.namespaced_name()
    );

    let labels: BTreeMap<_, _> = fixture
        .metadata
        .labels
        .iter()
        .filter(|(k, _)| [APP_KUBERNETES_IO_NAME_KEY, POD_TEMPLATE_HASH_LABEL_KEY].contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut template_spec = serde_json::to_value(&fixture.spec)?;
    if let Some(spec) = template_spec.as_object_mut() {
        spec.remove("nodeName");
    }

    let ready = (fixture.condition(PodConditionType::Ready) == ConditionStatus::True) as i32;
    let mut owner = DynamicObject::new(&rf.name, &ApiResource::from_gvk(gvk.as_ref()))
        .within(&fixture.metadata.namespace)
        .data(json!({
            "spec": {
                "replicas": 1,
                "selector": {"matchLabels": labels},
                "template": {
                    "metadata": {"labels": labels},
                    "spec": template_spec,
                },
            },
            "status": {
                "replicas": 1,
                "fullyLabeledReplicas": 1,
                "readyReplicas": ready,
                "availableReplicas": ready,
                "observedGeneration": 1,
            },
        }));

    owner.metadata.uid = Some(rf.uid.clone());
    owner.metadata.labels = Some(labels);
    owner.metadata.generation = Some(1);
    owner.metadata.creation_timestamp = Some(fixture.metadata.creation_timestamp.clone());

    debug!("synthesized owner {gvk} {} for {}", rf.name, fixture.namespaced_name());
    Ok(owner)
}
