use std::fmt;
use std::fs::File;

use serde::{
    Deserialize,
    Serialize,
};
use tracing::*;

use crate::errors::*;
use crate::model::names::check_dns1123_label;
use crate::prelude::*;

// Seeds can be written either way in a descriptor; `seed: 42` and `seed: "42"` are the same seed.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Seed {
    Int(i64),
    Str(String),
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Seed::Int(i) => write!(f, "{i}"),
            Seed::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Seed {
        Seed::Str(s.into())
    }
}

impl From<i64> for Seed {
    fn from(i: i64) -> Seed {
        Seed::Int(i)
    }
}

// The knobs a test author turns to pick a fixture.  Everything is optional; `resolve` fills in
// defaults and rejects combinations that no real pod could be in.  Counts are signed so that a
// negative value in a YAML file is reported as a validation failure instead of a parse error.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScenarioDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PodPhase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<Seed>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_owner_reference: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,
}

// A descriptor with every default applied and every cross-field rule checked
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedScenario {
    pub phase: PodPhase,
    pub container_count: usize,
    pub namespace: String,
    pub seed: String,
    pub restart_count: i32,
    pub with_owner_reference: bool,
    pub app_name: String,
    pub image: ImageReference,
    pub restart_policy: RestartPolicy,
}

impl ScenarioDescriptor {
    pub fn load(filename: &str) -> anyhow::Result<ScenarioDescriptor> {
        Ok(serde_yaml::from_reader(File::open(filename)?)?)
    }

    // YAML is a superset of JSON, so this handles JSON descriptors too
    pub fn from_yaml(contents: &str) -> anyhow::Result<ScenarioDescriptor> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn phase(mut self, phase: PodPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn container_count(mut self, count: i64) -> Self {
        self.container_count = Some(count);
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn restart_count(mut self, count: i64) -> Self {
        self.restart_count = Some(count);
        self
    }

    pub fn with_owner_reference(mut self, with_owner_reference: bool) -> Self {
        self.with_owner_reference = Some(with_owner_reference);
        self
    }

    pub fn app_name(mut self, app_name: &str) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn image(mut self, image: &str) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = Some(policy);
        self
    }

    pub fn resolve(&self) -> ValidationResult<ResolvedScenario> {
        let phase = self.phase.unwrap_or_default();

        let count = self.container_count.unwrap_or(DEFAULT_CONTAINER_COUNT as i64);
        check!(count >= 0, "containerCount", "must be non-negative, got {count}");
        check!(
            count <= MAX_CONTAINER_COUNT as i64,
            "containerCount",
            "must be at most {MAX_CONTAINER_COUNT}, got {count}"
        );
        check!(
            count > 0 || !phase.requires_containers(),
            "containerCount",
            "containerCount=0 incompatible with phase={phase}"
        );

        let restart_count = self.restart_count.unwrap_or(0);
        check!(restart_count >= 0, "restartCount", "must be non-negative, got {restart_count}");
        check!(
            restart_count <= i32::MAX as i64,
            "restartCount",
            "must fit in a 32-bit integer, got {restart_count}"
        );

        // a pod that runs to completion has to be allowed to stay stopped
        let default_policy = match phase {
            PodPhase::Succeeded | PodPhase::Failed => RestartPolicy::Never,
            _ => RestartPolicy::Always,
        };
        let restart_policy = self.restart_policy.unwrap_or(default_policy);
        check!(
            !(restart_policy == RestartPolicy::Always && matches!(phase, PodPhase::Succeeded | PodPhase::Failed)),
            "restartPolicy",
            "restartPolicy=Always incompatible with phase={phase}"
        );
        check!(
            !(restart_policy == RestartPolicy::Never && restart_count > 0),
            "restartCount",
            "restartCount={restart_count} incompatible with restartPolicy=Never"
        );

        let namespace = self.namespace.clone().unwrap_or_else(|| DEFAULT_NAMESPACE.into());
        check_dns1123_label("namespace", &namespace)?;

        // the app name ends up as a container name and, with suffixes attached, as the pod name
        let app_name = self.app_name.clone().unwrap_or_else(|| DEFAULT_APP_NAME.into());
        check_dns1123_label("appName", &app_name)?;
        check!(
            app_name.len() <= MAX_APP_NAME_LEN,
            "appName",
            "must be at most {MAX_APP_NAME_LEN} characters, got {}",
            app_name.len()
        );

        let image = ImageReference::parse(self.image.as_deref().unwrap_or(DEFAULT_IMAGE))?;
        if image.digest.is_some() {
            warn!("ignoring digest on scenario image {image}; container image IDs are derived from the seed");
        }

        let seed = self.seed.as_ref().map(|s| s.to_string()).unwrap_or_else(|| DEFAULT_SEED.into());

        Ok(ResolvedScenario {
            phase,
            container_count: count as usize,
            namespace,
            seed,
            restart_count: restart_count as i32,
            with_owner_reference: self.with_owner_reference.unwrap_or(true),
            app_name,
            image: ImageReference { digest: None, ..image },
            restart_policy,
        })
    }
}

#[cfg(test)]
mod tests;
