use std::collections::BTreeSet;

use serde::{
    Deserialize,
    Serialize,
};
use tracing::*;

use super::*;
use crate::errors::*;
use crate::lifecycle;
use crate::macros::string_enum;
use crate::prelude::*;

string_enum! {
    RestartPolicy {
        Always => "Always",
        OnFailure => "OnFailure",
        Never => "Never",
    }
}

string_enum! {
    DnsPolicy {
        ClusterFirst => "ClusterFirst",
        ClusterFirstWithHostNet => "ClusterFirstWithHostNet",
        Default => "Default",
        Disabled => "None",
    }
}

string_enum! {
    PreemptionPolicy {
        PreemptLowerPriority => "PreemptLowerPriority",
        Never => "Never",
    }
}

// Kubernetes' QoS rules: a pod with no requests or limits anywhere is BestEffort; a pod where every
// container has cpu and memory limits, with requests (if given) equal to those limits, is
// Guaranteed; everything else is Burstable.
pub fn qos_class(containers: &[Container]) -> QosClass {
    if containers.iter().all(|c| c.resources.is_empty()) {
        return QosClass::BestEffort;
    }

    let guaranteed = containers.iter().all(|c| {
        [RESOURCE_CPU, RESOURCE_MEMORY].iter().all(|res| match c.resources.limits.get(*res) {
            Some(lim) => c
                .resources
                .effective_request(res)
                .is_some_and(|req| matches!((quantity_value(req), quantity_value(lim)), (Some(r), Some(l)) if r == l)),
            None => false,
        })
    });

    if guaranteed { QosClass::Guaranteed } else { QosClass::Burstable }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub containers: Vec<Container>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,

    pub scheduler_name: String,
    pub restart_policy: RestartPolicy,
    pub service_account_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,

    pub dns_policy: DnsPolicy,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_pull_secrets: Vec<LocalObjectReference>,

    pub termination_grace_period_seconds: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_service_links: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preemption_policy: Option<PreemptionPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl PodSpec {
    pub fn container(&self, name: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.name == name)
    }

    pub fn qos_class(&self) -> QosClass {
        qos_class(&self.containers)
    }
}

impl Validate for PodSpec {
    fn validate(&self) -> ValidationResult<()> {
        validate_each(&self.containers, "containers")?;
        check_unique(self.containers.iter().map(|c| c.name.as_str()), "containers", "name")?;

        validate_each(&self.volumes, "volumes")?;
        check_unique(self.volumes.iter().map(|v| v.name.as_str()), "volumes", "name")?;

        let volume_names: BTreeSet<_> = self.volumes.iter().map(|v| v.name.as_str()).collect();
        for (i, c) in self.containers.iter().enumerate() {
            for (j, m) in c.volume_mounts.iter().enumerate() {
                check!(
                    volume_names.contains(m.name.as_str()),
                    format!("containers[{i}].volumeMounts[{j}].name"),
                    "{:?} does not reference a declared volume",
                    m.name
                );
            }
        }

        validate_each(&self.tolerations, "tolerations")?;

        check!(!self.scheduler_name.is_empty(), "schedulerName", "must be non-empty");
        super::names::check_dns1123_subdomain("serviceAccountName", &self.service_account_name)?;
        if let Some(sa) = &self.service_account {
            check!(
                *sa == self.service_account_name,
                "serviceAccount",
                "deprecated alias {sa:?} must match serviceAccountName {:?}",
                self.service_account_name
            );
        }
        for (i, secret) in self.image_pull_secrets.iter().enumerate() {
            super::names::check_dns1123_subdomain(&format!("imagePullSecrets[{i}].name"), &secret.name)?;
        }
        check!(
            self.termination_grace_period_seconds >= 0,
            "terminationGracePeriodSeconds",
            "must be non-negative, got {}",
            self.termination_grace_period_seconds
        );
        if let Some(node) = &self.node_name {
            super::names::check_dns1123_subdomain("nodeName", node)?;
        }
        Ok(())
    }
}

// The root of a fixture: one observed state of a Pod, exactly as the API server would return it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodFixture {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: PodSpec,
    pub status: PodStatus,
}

impl PodFixture {
    pub fn new(metadata: ObjectMeta, spec: PodSpec, status: PodStatus) -> ValidationResult<PodFixture> {
        PodFixture {
            api_version: POD_API_VERSION.into(),
            kind: POD_KIND.into(),
            metadata,
            spec,
            status,
        }
        .validated()
    }

    pub fn phase(&self) -> PodPhase {
        self.status.phase
    }

    pub fn condition(&self, type_: PodConditionType) -> ConditionStatus {
        self.status.condition(type_)
    }

    pub fn namespaced_name(&self) -> String {
        self.metadata.namespaced_name()
    }

    // containerStatuses must line up one-to-one with spec.containers; the only exception is a pod
    // in phase Unknown, where the node has stopped reporting and the list may be empty
    fn check_container_correspondence(&self) -> ValidationResult<()> {
        let statuses = &self.status.container_statuses;
        if self.status.phase == PodPhase::Unknown && statuses.is_empty() {
            return Ok(());
        }

        check!(
            statuses.len() == self.spec.containers.len(),
            "status.containerStatuses",
            "expected {} entries (one per container), found {}",
            self.spec.containers.len(),
            statuses.len()
        );
        for (i, cs) in statuses.iter().enumerate() {
            check!(
                self.spec.container(&cs.name).is_some(),
                format!("status.containerStatuses[{i}].name"),
                "{:?} does not match any container in spec.containers",
                cs.name
            );
        }
        Ok(())
    }
}

impl Validate for PodFixture {
    fn validate(&self) -> ValidationResult<()> {
        check!(
            self.api_version == POD_API_VERSION,
            "apiVersion",
            "must be {POD_API_VERSION:?}, got {:?}",
            self.api_version
        );
        check!(self.kind == POD_KIND, "kind", "must be {POD_KIND:?}, got {:?}", self.kind);

        self.metadata.validate().within("metadata")?;
        self.spec.validate().within("spec")?;
        self.status.validate().within("status")?;

        self.check_container_correspondence()?;

        let expected_qos = self.spec.qos_class();
        check!(
            self.status.qos_class == expected_qos,
            "status.qosClass",
            "container resources imply {expected_qos}, got {}",
            self.status.qos_class
        );

        lifecycle::check_phase_consistency(&self.spec, &self.status)?;

        debug!("validated pod fixture {}", self.namespaced_name());
        Ok(())
    }
}
