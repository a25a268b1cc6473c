use chrono::{
    DateTime,
    TimeDelta,
    Utc,
};
use tracing::*;

use crate::errors::*;
use crate::prelude::*;

// The pod lifecycle is modelled as a small state machine over the five canonical phases:
//
//   Pending -> Running -> {Succeeded, Failed}
//
// plus Unknown, which is reachable from every other phase and simulates the node going dark.
// Unknown is terminal: once nobody is reporting on the pod, there's nothing to move it forward.
//
// Each phase maps to a fixed "profile" describing what the status of a pod in that phase looks
// like: the value of each of the four standard conditions, and what state the containers are in.
// Everything about the derived status is a function of the phase, the containers, and a Timeline,
// so it is reproducible by construction.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContainerPhase {
    Waiting,
    Running,
    Terminated { exit_code: i32 },
}

#[derive(Clone, Copy, Debug)]
pub struct PhaseProfile {
    pub conditions: [(PodConditionType, ConditionStatus); 4],

    // None means the pod has no container statuses at all
    pub containers: Option<ContainerPhase>,
}

const PENDING: PhaseProfile = PhaseProfile {
    conditions: [
        (PodConditionType::Initialized, ConditionStatus::False),
        (PodConditionType::Ready, ConditionStatus::False),
        (PodConditionType::ContainersReady, ConditionStatus::False),
        (PodConditionType::PodScheduled, ConditionStatus::True),
    ],
    containers: Some(ContainerPhase::Waiting),
};

const RUNNING: PhaseProfile = PhaseProfile {
    conditions: [
        (PodConditionType::Initialized, ConditionStatus::True),
        (PodConditionType::Ready, ConditionStatus::True),
        (PodConditionType::ContainersReady, ConditionStatus::True),
        (PodConditionType::PodScheduled, ConditionStatus::True),
    ],
    containers: Some(ContainerPhase::Running),
};

const SUCCEEDED: PhaseProfile = PhaseProfile {
    conditions: [
        (PodConditionType::Initialized, ConditionStatus::True),
        (PodConditionType::Ready, ConditionStatus::False),
        (PodConditionType::ContainersReady, ConditionStatus::False),
        (PodConditionType::PodScheduled, ConditionStatus::True),
    ],
    containers: Some(ContainerPhase::Terminated { exit_code: 0 }),
};

const FAILED: PhaseProfile = PhaseProfile {
    conditions: SUCCEEDED.conditions,
    containers: Some(ContainerPhase::Terminated { exit_code: FAILED_EXIT_CODE }),
};

const UNKNOWN: PhaseProfile = PhaseProfile {
    conditions: [
        (PodConditionType::Initialized, ConditionStatus::Unknown),
        (PodConditionType::Ready, ConditionStatus::Unknown),
        (PodConditionType::ContainersReady, ConditionStatus::Unknown),
        (PodConditionType::PodScheduled, ConditionStatus::Unknown),
    ],
    containers: None,
};

impl PodPhase {
    pub fn profile(&self) -> &'static PhaseProfile {
        match self {
            PodPhase::Pending => &PENDING,
            PodPhase::Running => &RUNNING,
            PodPhase::Succeeded => &SUCCEEDED,
            PodPhase::Failed => &FAILED,
            PodPhase::Unknown => &UNKNOWN,
        }
    }

    pub fn successors(&self) -> &'static [PodPhase] {
        match self {
            PodPhase::Pending => &[PodPhase::Running, PodPhase::Unknown],
            PodPhase::Running => &[PodPhase::Succeeded, PodPhase::Failed, PodPhase::Unknown],
            PodPhase::Succeeded | PodPhase::Failed => &[PodPhase::Unknown],
            PodPhase::Unknown => &[],
        }
    }

    pub fn can_transition_to(&self, next: PodPhase) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PodPhase::Succeeded | PodPhase::Failed | PodPhase::Unknown)
    }

    // Phases in which the containers have definitely been created, so a pod without any containers
    // can't be in them
    pub fn requires_containers(&self) -> bool {
        matches!(self, PodPhase::Running | PodPhase::Succeeded | PodPhase::Failed)
    }
}

// Instants (in seconds since the epoch) of the events in a pod's life.  All phases of a given pod
// share one timeline, so a fixture that is transitioned from Pending to Running to Succeeded sees
// monotonically increasing, mutually consistent timestamps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timeline {
    pub scheduled: i64,
    pub started: i64,
    pub ready: i64,
    pub finished: i64,
    pub lost: i64,
}

impl Timeline {
    // Every restart pushes the current container start out by the crash-loop backoff
    pub fn new(origin: i64, restart_count: i32) -> Timeline {
        let started = origin + CONTAINER_START_DELAY_SECONDS + RESTART_BACKOFF_SECONDS * restart_count as i64;
        let finished = started + RUN_DURATION_SECONDS;
        Timeline {
            scheduled: origin,
            started,
            ready: started + READINESS_DELAY_SECONDS,
            finished,
            lost: finished + OBSERVABILITY_LOST_AFTER_SECONDS,
        }
    }

    // The previous (crashed) run of a container that has restarted
    pub fn last_run(&self) -> (i64, i64) {
        let start = self.started - RESTART_BACKOFF_SECONDS;
        (start, start + CRASH_AFTER_SECONDS)
    }

    pub fn condition_time(&self, phase: PodPhase, type_: PodConditionType) -> i64 {
        match (phase, type_) {
            (PodPhase::Unknown, _) => self.lost,
            (_, PodConditionType::PodScheduled | PodConditionType::Initialized) => self.scheduled,
            (PodPhase::Running, _) => self.ready,
            (PodPhase::Succeeded | PodPhase::Failed, _) => self.finished,
            (PodPhase::Pending, _) => self.scheduled,
        }
    }
}

impl Default for Timeline {
    fn default() -> Timeline {
        Timeline::new(REFERENCE_TS, 0)
    }
}

pub fn timestamp(secs: i64) -> metav1::Time {
    metav1::Time(DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(secs))
}

// Per-container identifiers that the container runtime would have assigned; they come from the
// synthesizer's seed so they're stable across runs.
#[derive(Clone, Debug)]
pub struct RuntimeIds {
    pub container_id: String,
    pub previous_container_id: String,
    pub image_id: String,
}

pub struct Observation<'a> {
    pub containers: &'a [Container],
    pub runtime_ids: &'a [RuntimeIds],
    pub restart_count: i32,
    pub host_ip: &'a str,
    pub pod_ip: &'a str,
    pub timeline: Timeline,
}

fn condition_reason(phase: PodPhase, type_: PodConditionType, status: ConditionStatus) -> Option<String> {
    if status != ConditionStatus::False {
        return None;
    }
    let reason = match (phase, type_) {
        (PodPhase::Succeeded | PodPhase::Failed, PodConditionType::Ready | PodConditionType::ContainersReady) => {
            "PodCompleted"
        },
        (_, PodConditionType::Ready | PodConditionType::ContainersReady) => "ContainersNotReady",
        (_, PodConditionType::Initialized) => "PodNotInitialized",
        _ => return None,
    };
    Some(reason.into())
}

fn container_status(
    phase: PodPhase,
    cp: ContainerPhase,
    container: &Container,
    ids: &RuntimeIds,
    obs: &Observation,
) -> ContainerStatus {
    let tl = &obs.timeline;
    let restarted = obs.restart_count > 0;
    let state = match cp {
        ContainerPhase::Waiting if restarted => ContainerState::waiting("CrashLoopBackOff"),
        ContainerPhase::Waiting => ContainerState::waiting("ContainerCreating"),
        ContainerPhase::Running => ContainerState::Running(ContainerStateRunning { started_at: timestamp(tl.started) }),
        ContainerPhase::Terminated { exit_code } => ContainerState::Terminated(ContainerStateTerminated {
            exit_code,
            reason: Some(if exit_code == 0 { "Completed" } else { "Error" }.into()),
            container_id: Some(format!("{CONTAINER_RUNTIME_SCHEME}{}", ids.container_id)),
            started_at: timestamp(tl.started),
            finished_at: timestamp(tl.finished),
        }),
    };

    let last_state = restarted.then(|| {
        let (start, end) = tl.last_run();
        ContainerState::Terminated(ContainerStateTerminated {
            exit_code: FAILED_EXIT_CODE,
            reason: Some("Error".into()),
            container_id: Some(format!("{CONTAINER_RUNTIME_SCHEME}{}", ids.previous_container_id)),
            started_at: timestamp(start),
            finished_at: timestamp(end),
        })
    });

    // a crash-looping container still has the ID of its last incarnation
    let container_id = match cp {
        ContainerPhase::Waiting if restarted => Some(ids.previous_container_id.clone()),
        ContainerPhase::Waiting => None,
        _ => Some(ids.container_id.clone()),
    }
    .map(|id| format!("{CONTAINER_RUNTIME_SCHEME}{id}"));

    debug!("derived {phase} state for container {}: {state:?}", container.name);
    ContainerStatus {
        name: container.name.clone(),
        image: container.image.clone(),
        image_id: ids.image_id.clone(),
        container_id,
        ready: cp == ContainerPhase::Running,
        started: Some(cp == ContainerPhase::Running),
        restart_count: obs.restart_count,
        state,
        last_state,
    }
}

// Build the status block for a pod in the given phase.  The result always satisfies the
// cross-entity invariants checked by PodFixture::validate, whatever the containers look like.
pub fn derive_status(phase: PodPhase, obs: &Observation) -> PodStatus {
    let profile = phase.profile();
    let tl = &obs.timeline;

    let conditions = profile
        .conditions
        .iter()
        .map(|&(type_, status)| {
            // init has already completed once a container has run and crashed
            let status = match (phase, type_) {
                (PodPhase::Pending, PodConditionType::Initialized) if obs.restart_count > 0 => ConditionStatus::True,
                _ => status,
            };
            (type_, status)
        })
        .map(|(type_, status)| PodCondition {
            type_,
            status,
            last_transition_time: timestamp(tl.condition_time(phase, type_)),
            last_probe_time: None,
            reason: condition_reason(phase, type_, status),
            message: None,
        })
        .collect();

    let container_statuses = match profile.containers {
        Some(cp) => obs
            .containers
            .iter()
            .zip(obs.runtime_ids.iter())
            .map(|(c, ids)| container_status(phase, cp, c, ids, obs))
            .collect(),
        None => vec![],
    };

    // The kubelet hasn't assigned a pod IP while the sandbox is still being created, and once the
    // node stops reporting we don't know anything about where the pod lives
    let (host_ip, pod_ip) = match phase {
        PodPhase::Unknown => (None, None),
        PodPhase::Pending => (Some(obs.host_ip.to_string()), None),
        _ => (Some(obs.host_ip.to_string()), Some(obs.pod_ip.to_string())),
    };

    PodStatus {
        phase,
        pod_ips: pod_ip.iter().map(|ip| PodIp { ip: ip.clone() }).collect(),
        host_ip,
        pod_ip,
        qos_class: qos_class(obs.containers),
        start_time: (phase != PodPhase::Unknown).then(|| timestamp(tl.scheduled)),
        conditions,
        container_statuses,
    }
}

// The phase-dependent invariants: what the conditions and container states must look like for
// the claimed phase, and which restart policies make that phase reachable at all.
pub fn check_phase_consistency(spec: &PodSpec, status: &PodStatus) -> ValidationResult<()> {
    let phase = status.phase;
    let statuses = &status.container_statuses;

    if phase.requires_containers() {
        check!(
            !spec.containers.is_empty(),
            "spec.containers",
            "phase={phase} requires at least one container"
        );
    }

    match phase {
        PodPhase::Running => {
            for (i, cs) in statuses.iter().enumerate() {
                check!(
                    cs.state.is_running() && cs.ready,
                    format!("status.containerStatuses[{i}]"),
                    "phase=Running requires every container to be running and ready"
                );
            }
            for type_ in [PodConditionType::Ready, PodConditionType::ContainersReady] {
                check!(
                    status.condition(type_) == ConditionStatus::True,
                    "status.conditions",
                    "phase=Running requires {type_}=True, got {}",
                    status.condition(type_)
                );
            }
        },
        PodPhase::Pending => {
            for (i, cs) in statuses.iter().enumerate() {
                check!(
                    !cs.state.is_running(),
                    format!("status.containerStatuses[{i}].state"),
                    "phase=Pending forbids running containers"
                );
            }
        },
        PodPhase::Succeeded | PodPhase::Failed => {
            check!(
                spec.restart_policy != RestartPolicy::Always,
                "spec.restartPolicy",
                "restartPolicy=Always incompatible with phase={phase}"
            );
            for (i, cs) in statuses.iter().enumerate() {
                let field = format!("status.containerStatuses[{i}].state");
                check!(cs.state.is_terminated(), field, "phase={phase} requires every container to be terminated");
                if phase == PodPhase::Succeeded {
                    check!(cs.state.exit_code() == Some(0), field, "phase=Succeeded requires exit code 0");
                }
            }
            if phase == PodPhase::Failed {
                check!(
                    statuses.iter().any(|cs| cs.state.exit_code().is_some_and(|c| c != 0)),
                    "status.containerStatuses",
                    "phase=Failed requires at least one non-zero exit code"
                );
            }
            for type_ in [PodConditionType::Ready, PodConditionType::ContainersReady] {
                check!(
                    status.condition(type_) == ConditionStatus::False,
                    "status.conditions",
                    "phase={phase} requires {type_}=False, got {}",
                    status.condition(type_)
                );
            }
        },
        PodPhase::Unknown => (),
    }

    if spec.restart_policy == RestartPolicy::Never {
        for (i, cs) in statuses.iter().enumerate() {
            check!(
                cs.restart_count == 0,
                format!("status.containerStatuses[{i}].restartCount"),
                "restartCount={} incompatible with restartPolicy=Never",
                cs.restart_count
            );
        }
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage, coverage(off))]
mod tests;
