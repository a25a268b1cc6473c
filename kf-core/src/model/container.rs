use std::collections::BTreeMap;
use std::ops::Not;

use serde::{
    Deserialize,
    Serialize,
};

use super::names::*;
use super::*;
use crate::errors::*;
use crate::macros::string_enum;
use crate::prelude::*;

pub const RESOURCE_CPU: &str = "cpu";
pub const RESOURCE_MEMORY: &str = "memory";
pub const RESOURCE_EPHEMERAL_STORAGE: &str = "ephemeral-storage";

const MAX_PORT: i64 = 65535;

string_enum! {
    Protocol {
        Tcp => "TCP",
        Udp => "UDP",
        Sctp => "SCTP",
    }
}

impl Default for Protocol {
    fn default() -> Protocol {
        Protocol::Tcp
    }
}

string_enum! {
    ImagePullPolicy {
        Always => "Always",
        IfNotPresent => "IfNotPresent",
        Never => "Never",
    }
}

string_enum! {
    TerminationMessagePolicy {
        File => "File",
        FallbackToLogsOnError => "FallbackToLogsOnError",
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub container_port: i32,

    #[serde(default)]
    pub protocol: Protocol,
}

impl ContainerPort {
    // Takes the port as an i64 so that out-of-range input (negative, or too big for the wire
    // format) is reported as a validation failure instead of silently wrapping
    pub fn new(name: &str, port: i64, protocol: Protocol) -> ValidationResult<ContainerPort> {
        check!((1..=MAX_PORT).contains(&port), "containerPort", "{port} is outside the range 1-{MAX_PORT}");
        ContainerPort {
            name: Some(name.into()),
            container_port: port as i32,
            protocol,
        }
        .validated()
    }
}

impl Validate for ContainerPort {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(n) = &self.name {
            check_port_name("name", n)?;
        }
        let port = self.container_port as i64;
        check!((1..=MAX_PORT).contains(&port), "containerPort", "{port} is outside the range 1-{MAX_PORT}");
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub name: String,

    #[serde(default)]
    pub value: String,
}

impl EnvVar {
    pub fn new(name: &str, value: &str) -> EnvVar {
        EnvVar { name: name.into(), value: value.into() }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecAction {
    pub command: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    pub exec: ExecAction,
    pub failure_threshold: i32,
    pub initial_delay_seconds: i32,
    pub period_seconds: i32,
    pub success_threshold: i32,
    pub timeout_seconds: i32,
}

impl Probe {
    // An exec probe with the same defaults the API server fills in
    pub fn exec(command: &[&str]) -> Probe {
        Probe {
            exec: ExecAction { command: command.iter().map(|s| s.to_string()).collect() },
            failure_threshold: 3,
            initial_delay_seconds: 0,
            period_seconds: 10,
            success_threshold: 1,
            timeout_seconds: 1,
        }
    }
}

impl Validate for Probe {
    fn validate(&self) -> ValidationResult<()> {
        check!(!self.exec.command.is_empty(), "exec.command", "must be non-empty");
        check!(self.failure_threshold >= 1, "failureThreshold", "must be at least 1");
        check!(self.initial_delay_seconds >= 0, "initialDelaySeconds", "must be non-negative");
        check!(self.period_seconds >= 1, "periodSeconds", "must be at least 1");
        check!(self.success_threshold >= 1, "successThreshold", "must be at least 1");
        check!(self.timeout_seconds >= 1, "timeoutSeconds", "must be at least 1");
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, Quantity>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, Quantity>,
}

impl ResourceRequirements {
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty() && self.requests.is_empty()
    }

    // The API server defaults a missing request to the corresponding limit
    pub fn effective_request(&self, resource: &str) -> Option<&Quantity> {
        self.requests.get(resource).or_else(|| self.limits.get(resource))
    }
}

impl Validate for ResourceRequirements {
    fn validate(&self) -> ValidationResult<()> {
        for (kind, list) in [("limits", &self.limits), ("requests", &self.requests)] {
            for (resource, q) in list {
                let field = format!("{kind}.{resource}");
                check!(
                    [RESOURCE_CPU, RESOURCE_MEMORY, RESOURCE_EPHEMERAL_STORAGE].contains(&resource.as_str())
                        || resource.contains('/'),
                    field,
                    "unsupported resource name {resource:?}"
                );
                check_quantity(&field, q)?;
            }
        }

        for (resource, req) in &self.requests {
            if let Some(lim) = self.limits.get(resource) {
                let field = format!("requests.{resource}");
                check!(
                    check_quantity(&field, req)? <= check_quantity(&field, lim)?,
                    field,
                    "request {:?} exceeds limit {:?}",
                    req.0,
                    lim.0
                );
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub mount_path: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "<&bool>::not")]
    pub read_only: bool,
}

impl VolumeMount {
    pub fn new(name: &str, mount_path: &str, read_only: bool) -> ValidationResult<VolumeMount> {
        VolumeMount {
            mount_path: mount_path.into(),
            name: name.into(),
            read_only,
        }
        .validated()
    }
}

impl Validate for VolumeMount {
    fn validate(&self) -> ValidationResult<()> {
        check_dns1123_label("name", &self.name)?;
        check!(self.mount_path.starts_with('/'), "mountPath", "{:?} must be an absolute path", self.mount_path);
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub name: String,
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<ImagePullPolicy>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,

    #[serde(default, skip_serializing_if = "ResourceRequirements::is_empty")]
    pub resources: ResourceRequirements,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_message_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_message_policy: Option<TerminationMessagePolicy>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

impl Container {
    // The minimal valid container; everything else is filled in with struct-update syntax
    pub fn new(name: &str, image: &str) -> ValidationResult<Container> {
        Container {
            name: name.into(),
            image: image.into(),
            image_pull_policy: None,
            command: vec![],
            env: vec![],
            ports: vec![],
            resources: Default::default(),
            liveness_probe: None,
            readiness_probe: None,
            termination_message_path: None,
            termination_message_policy: None,
            volume_mounts: vec![],
        }
        .validated()
    }

    pub fn image_ref(&self) -> ValidationResult<ImageReference> {
        ImageReference::parse(&self.image)
    }

    pub fn port_named(&self, name: &str) -> Option<i32> {
        self.ports
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
            .map(|p| p.container_port)
    }
}

impl Validate for Container {
    fn validate(&self) -> ValidationResult<()> {
        check_dns1123_label("name", &self.name)?;
        self.image_ref()?;

        validate_each(&self.ports, "ports")?;
        check_unique(self.ports.iter().filter_map(|p| p.name.as_deref()), "ports", "name")?;
        check_unique(
            self.ports.iter().map(|p| format!("{}/{}", p.container_port, p.protocol)),
            "ports",
            "containerPort/protocol",
        )?;

        for (i, e) in self.env.iter().enumerate() {
            check_env_var_name(&format!("env[{i}].name"), &e.name)?;
        }
        check_unique(self.env.iter().map(|e| e.name.as_str()), "env", "name")?;

        self.resources.validate().within("resources")?;

        if let Some(probe) = &self.liveness_probe {
            probe.validate().within("livenessProbe")?;
            check!(
                probe.success_threshold == 1,
                "livenessProbe.successThreshold",
                "must be 1 for liveness probes, got {}",
                probe.success_threshold
            );
        }
        if let Some(probe) = &self.readiness_probe {
            probe.validate().within("readinessProbe")?;
        }

        if let Some(path) = &self.termination_message_path {
            check!(path.starts_with('/'), "terminationMessagePath", "{path:?} must be an absolute path");
        }

        validate_each(&self.volume_mounts, "volumeMounts")?;
        check_unique(self.volume_mounts.iter().map(|m| m.mount_path.as_str()), "volumeMounts", "mountPath")?;
        Ok(())
    }
}
