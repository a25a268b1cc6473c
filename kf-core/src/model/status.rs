use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};

use super::names::*;
use super::*;
use crate::errors::*;
use crate::macros::string_enum;
use crate::prelude::*;

string_enum! {
    PodPhase {
        Pending => "Pending",
        Running => "Running",
        Succeeded => "Succeeded",
        Failed => "Failed",
        Unknown => "Unknown",
    }
}

impl Default for PodPhase {
    fn default() -> PodPhase {
        PodPhase::Running
    }
}

string_enum! {
    PodConditionType {
        Initialized => "Initialized",
        Ready => "Ready",
        ContainersReady => "ContainersReady",
        PodScheduled => "PodScheduled",
    }
}

string_enum! {
    ConditionStatus {
        True => "True",
        False => "False",
        Unknown => "Unknown",
    }
}

impl From<bool> for ConditionStatus {
    fn from(b: bool) -> ConditionStatus {
        if b { ConditionStatus::True } else { ConditionStatus::False }
    }
}

string_enum! {
    QosClass {
        Guaranteed => "Guaranteed",
        Burstable => "Burstable",
        BestEffort => "BestEffort",
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStateWaiting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStateRunning {
    pub started_at: metav1::Time,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStateTerminated {
    pub exit_code: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "containerID")]
    pub container_id: Option<String>,

    pub started_at: metav1::Time,
    pub finished_at: metav1::Time,
}

// As per the Kubernetes API it is an error for a ContainerState to have more than one of
// `waiting`, `running`, or `terminated` set; an externally-tagged enum serializes to exactly that
// shape (`{"running": {"startedAt": ...}}`) and can't represent the broken cases at all.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerState {
    Waiting(ContainerStateWaiting),
    Running(ContainerStateRunning),
    Terminated(ContainerStateTerminated),
}

impl ContainerState {
    pub fn waiting(reason: &str) -> ContainerState {
        ContainerState::Waiting(ContainerStateWaiting { reason: Some(reason.into()), message: None })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ContainerState::Running(_))
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, ContainerState::Terminated(_))
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ContainerState::Terminated(t) => Some(t.exit_code),
            _ => None,
        }
    }

    pub fn start_ts(&self) -> Option<i64> {
        match self {
            ContainerState::Running(r) => Some(r.started_at.0.timestamp()),
            ContainerState::Terminated(t) => Some(t.started_at.0.timestamp()),
            ContainerState::Waiting(_) => None,
        }
    }

    pub fn end_ts(&self) -> Option<i64> {
        match self {
            ContainerState::Terminated(t) => Some(t.finished_at.0.timestamp()),
            _ => None,
        }
    }
}

impl Validate for ContainerState {
    fn validate(&self) -> ValidationResult<()> {
        if let ContainerState::Terminated(t) = self {
            check!(
                t.finished_at.0 >= t.started_at.0,
                "terminated.finishedAt",
                "must not be earlier than terminated.startedAt"
            );
        }
        Ok(())
    }
}

// Real API responses render an absent lastState as `{}`, which isn't any of the three states
fn empty_state_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ContainerState>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeEmpty {
        State(ContainerState),
        Empty {},
    }

    Ok(match Option::<MaybeEmpty>::deserialize(deserializer)? {
        Some(MaybeEmpty::State(s)) => Some(s),
        Some(MaybeEmpty::Empty {}) | None => None,
    })
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatus {
    pub name: String,
    pub image: String,

    #[serde(rename = "imageID")]
    pub image_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "containerID")]
    pub container_id: Option<String>,

    pub ready: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<bool>,

    pub restart_count: i32,
    pub state: ContainerState,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "empty_state_as_none")]
    pub last_state: Option<ContainerState>,
}

impl Validate for ContainerStatus {
    fn validate(&self) -> ValidationResult<()> {
        check_dns1123_label("name", &self.name)?;
        check!(!self.image.is_empty(), "image", "must be non-empty");
        check!(self.restart_count >= 0, "restartCount", "must be non-negative, got {}", self.restart_count);
        self.state.validate().within("state")?;

        check!(
            !self.ready || self.state.is_running(),
            "ready",
            "a container can only be ready while it is running"
        );
        if !matches!(self.state, ContainerState::Waiting(_)) {
            check!(self.container_id.is_some(), "containerID", "must be set once the container has been created");
        }

        if let Some(last) = &self.last_state {
            last.validate().within("lastState")?;
            check!(last.is_terminated(), "lastState", "must be a terminated state");
            check!(
                self.restart_count > 0,
                "lastState",
                "a previous termination requires restartCount > 0"
            );
            if let (Some(prev_end), Some(cur_start)) = (last.end_ts(), self.state.start_ts()) {
                check!(prev_end <= cur_start, "lastState", "previous run must finish before the current one starts");
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodCondition {
    #[serde(rename = "type")]
    pub type_: PodConditionType,
    pub status: ConditionStatus,
    pub last_transition_time: metav1::Time,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_probe_time: Option<metav1::Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PodIp {
    pub ip: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    pub phase: PodPhase,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "hostIP")]
    pub host_ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "podIP")]
    pub pod_ip: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "podIPs")]
    pub pod_ips: Vec<PodIp>,

    pub qos_class: QosClass,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<metav1::Time>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<PodCondition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_statuses: Vec<ContainerStatus>,
}

impl PodStatus {
    // Absent condition types are treated as Unknown
    pub fn condition(&self, type_: PodConditionType) -> ConditionStatus {
        self.conditions
            .iter()
            .find(|c| c.type_ == type_)
            .map_or(ConditionStatus::Unknown, |c| c.status)
    }

    pub fn container_status(&self, name: &str) -> Option<&ContainerStatus> {
        self.container_statuses.iter().find(|cs| cs.name == name)
    }

    pub fn max_restart_count(&self) -> i32 {
        self.container_statuses.iter().map(|cs| cs.restart_count).max().unwrap_or(0)
    }
}

impl Validate for PodStatus {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(ip) = &self.host_ip {
            check_ip("hostIP", ip)?;
        }
        if let Some(ip) = &self.pod_ip {
            check_ip("podIP", ip)?;
        }
        for (i, pip) in self.pod_ips.iter().enumerate() {
            check_ip(&format!("podIPs[{i}].ip"), &pip.ip)?;
        }
        if let (Some(ip), Some(first)) = (&self.pod_ip, self.pod_ips.first()) {
            check!(*ip == first.ip, "podIPs", "first entry {:?} must match podIP {ip:?}", first.ip);
        }

        check_unique(self.conditions.iter().map(|c| c.type_.as_str()), "conditions", "type")?;
        if self.condition(PodConditionType::Ready) == ConditionStatus::True {
            check!(
                self.condition(PodConditionType::ContainersReady) == ConditionStatus::True,
                "conditions",
                "Ready=True requires ContainersReady=True"
            );
        }

        validate_each(&self.container_statuses, "containerStatuses")?;
        check_unique(self.container_statuses.iter().map(|cs| cs.name.as_str()), "containerStatuses", "name")?;

        // the pod's start time is when the kubelet acknowledged it, which has to precede every
        // container start we know about
        if let Some(start) = &self.start_time {
            let earliest = self.container_statuses.iter().filter_map(|cs| cs.state.start_ts()).min();
            if let Some(ts) = earliest {
                check!(
                    start.0.timestamp() <= ts,
                    "startTime",
                    "must not be later than the earliest container start"
                );
            }
        }
        Ok(())
    }
}
