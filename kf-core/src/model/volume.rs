use serde::{
    Deserialize,
    Serialize,
};

use super::names::*;
use super::*;
use crate::errors::*;
use crate::macros::string_enum;
use crate::prelude::*;

const MAX_FILE_MODE: i32 = 0o777;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyToPath {
    pub key: String,
    pub path: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyDirVolumeSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_limit: Option<Quantity>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapVolumeSource {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<KeyToPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<i32>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretVolumeSource {
    pub secret_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<KeyToPath>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<i32>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountTokenProjection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_seconds: Option<i64>,
    pub path: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapProjection {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<KeyToPath>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFieldSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    pub field_path: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownwardApiVolumeFile {
    pub field_ref: ObjectFieldSelector,
    pub path: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownwardApiProjection {
    pub items: Vec<DownwardApiVolumeFile>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VolumeProjection {
    ServiceAccountToken(ServiceAccountTokenProjection),
    ConfigMap(ConfigMapProjection),
    #[serde(rename = "downwardAPI")]
    DownwardApi(DownwardApiProjection),
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedVolumeSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<i32>,
    pub sources: Vec<VolumeProjection>,
}

// The Kubernetes API lets a volume set any of a couple dozen source fields and rejects the object
// unless exactly one is set; modelling the source as an enum makes "exactly one" a property of the
// type.  It's flattened into the volume so that the wire format is `{"name": ..., "emptyDir": {}}`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VolumeSource {
    EmptyDir(EmptyDirVolumeSource),
    Projected(ProjectedVolumeSource),
    ConfigMap(ConfigMapVolumeSource),
    Secret(SecretVolumeSource),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub name: String,

    #[serde(flatten)]
    pub source: VolumeSource,
}

impl Volume {
    pub fn new(name: &str, source: VolumeSource) -> ValidationResult<Volume> {
        Volume { name: name.into(), source }.validated()
    }

    pub fn empty_dir(name: &str) -> ValidationResult<Volume> {
        Volume::new(name, VolumeSource::EmptyDir(Default::default()))
    }
}

fn check_mode(field: &str, mode: Option<i32>) -> ValidationResult<()> {
    if let Some(m) = mode {
        check!((0..=MAX_FILE_MODE).contains(&m), field, "{m:#o} is not a valid file mode");
    }
    Ok(())
}

fn check_items(items: &[KeyToPath]) -> ValidationResult<()> {
    for (i, item) in items.iter().enumerate() {
        check!(!item.key.is_empty(), format!("items[{i}].key"), "must be non-empty");
        check_relative_path(&format!("items[{i}].path"), &item.path)?;
    }
    Ok(())
}

impl Validate for VolumeProjection {
    fn validate(&self) -> ValidationResult<()> {
        match self {
            VolumeProjection::ServiceAccountToken(sat) => {
                if let Some(exp) = sat.expiration_seconds {
                    check!(
                        exp >= MIN_SVC_ACCOUNT_TOKEN_EXPIRATION_SECONDS,
                        "serviceAccountToken.expirationSeconds",
                        "must be at least {MIN_SVC_ACCOUNT_TOKEN_EXPIRATION_SECONDS}, got {exp}"
                    );
                }
                check_relative_path("serviceAccountToken.path", &sat.path)
            },
            VolumeProjection::ConfigMap(cm) => {
                check_dns1123_subdomain("configMap.name", &cm.name)?;
                check_items(&cm.items).within("configMap")
            },
            VolumeProjection::DownwardApi(dapi) => {
                for (i, item) in dapi.items.iter().enumerate() {
                    check!(
                        !item.field_ref.field_path.is_empty(),
                        format!("downwardAPI.items[{i}].fieldRef.fieldPath"),
                        "must be non-empty"
                    );
                    check_relative_path(&format!("downwardAPI.items[{i}].path"), &item.path)?;
                }
                Ok(())
            },
        }
    }
}

impl Validate for Volume {
    fn validate(&self) -> ValidationResult<()> {
        check_dns1123_label("name", &self.name)?;
        match &self.source {
            VolumeSource::EmptyDir(ed) => {
                if let Some(q) = &ed.size_limit {
                    check_quantity("emptyDir.sizeLimit", q)?;
                }
            },
            VolumeSource::Projected(p) => {
                check_mode("projected.defaultMode", p.default_mode)?;
                check!(!p.sources.is_empty(), "projected.sources", "must be non-empty");
                validate_each(&p.sources, "projected.sources")?;
            },
            VolumeSource::ConfigMap(cm) => {
                check_dns1123_subdomain("configMap.name", &cm.name)?;
                check_mode("configMap.defaultMode", cm.default_mode)?;
                check_items(&cm.items).within("configMap")?;
            },
            VolumeSource::Secret(s) => {
                check_dns1123_subdomain("secret.secretName", &s.secret_name)?;
                check_mode("secret.defaultMode", s.default_mode)?;
                check_items(&s.items).within("secret")?;
            },
        }
        Ok(())
    }
}

string_enum! {
    TolerationOperator {
        Exists => "Exists",
        Equal => "Equal",
    }
}

string_enum! {
    TaintEffect {
        NoSchedule => "NoSchedule",
        PreferNoSchedule => "PreferNoSchedule",
        NoExecute => "NoExecute",
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toleration {
    pub key: String,
    pub operator: TolerationOperator,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    pub effect: TaintEffect,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toleration_seconds: Option<i64>,
}

impl Toleration {
    // The tolerations the DefaultTolerationSeconds admission plugin adds to every pod
    pub fn evict_after(key: &str, seconds: i64) -> ValidationResult<Toleration> {
        Toleration {
            key: key.into(),
            operator: TolerationOperator::Exists,
            value: None,
            effect: TaintEffect::NoExecute,
            toleration_seconds: Some(seconds),
        }
        .validated()
    }
}

impl Validate for Toleration {
    fn validate(&self) -> ValidationResult<()> {
        check_qualified_key("key", &self.key)?;
        if self.operator == TolerationOperator::Exists {
            check!(self.value.is_none(), "value", "must be empty when operator is Exists");
        }
        if let Some(secs) = self.toleration_seconds {
            check!(
                self.effect == TaintEffect::NoExecute,
                "tolerationSeconds",
                "only allowed with effect NoExecute, not {}",
                self.effect
            );
            check!(secs >= 0, "tolerationSeconds", "must be non-negative, got {secs}");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LocalObjectReference {
    pub name: String,
}

#[cfg(test)]
mod test {
    use assertables::*;
    use rstest::*;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn test_volume_wire_format() {
        let vol = Volume::empty_dir("data").unwrap();
        assert_eq!(serde_json::to_value(&vol).unwrap(), json!({"name": "data", "emptyDir": {}}));
    }

    #[rstest]
    fn test_projected_volume_parses() {
        let vol: Volume = serde_json::from_value(json!({
            "name": "kube-api-access-vn9dc",
            "projected": {
                "defaultMode": 420,
                "sources": [
                    {"serviceAccountToken": {"expirationSeconds": 3607, "path": "token"}},
                    {"configMap": {"items": [{"key": "ca.crt", "path": "ca.crt"}], "name": "kube-root-ca.crt"}},
                    {"downwardAPI": {"items": [{
                        "fieldRef": {"apiVersion": "v1", "fieldPath": "metadata.namespace"},
                        "path": "namespace",
                    }]}},
                ],
            },
        }))
        .unwrap();

        assert_ok!(vol.validate());
        let VolumeSource::Projected(p) = &vol.source else { panic!("expected projected volume") };
        assert_len_eq_x!(&p.sources, 3);
        assert!(matches!(p.sources[2], VolumeProjection::DownwardApi(_)));
    }

    #[rstest]
    fn test_short_token_expiry() {
        let src = VolumeSource::Projected(ProjectedVolumeSource {
            default_mode: None,
            sources: vec![VolumeProjection::ServiceAccountToken(ServiceAccountTokenProjection {
                expiration_seconds: Some(60),
                path: "token".into(),
            })],
        });
        let err = Volume::new("tok", src).unwrap_err();
        assert_eq!(err.field, "projected.sources[0].serviceAccountToken.expirationSeconds");
    }

    #[rstest]
    fn test_escaping_item_path() {
        let src = VolumeSource::ConfigMap(ConfigMapVolumeSource {
            name: "cfg".into(),
            items: vec![KeyToPath { key: "k".into(), path: "../etc/passwd".into() }],
            default_mode: None,
        });
        assert_eq!(Volume::new("cfg", src).unwrap_err().field, "configMap.items[0].path");
    }

    #[rstest]
    fn test_toleration_exists_with_value() {
        let tol = Toleration {
            value: Some("yes".into()),
            ..Toleration::evict_after(NOT_READY_TAINT_KEY, 300).unwrap()
        };
        assert_eq!(tol.validate().unwrap_err().field, "value");
    }

    #[rstest]
    fn test_toleration_seconds_wrong_effect() {
        let tol = Toleration {
            effect: TaintEffect::NoSchedule,
            ..Toleration::evict_after(UNREACHABLE_TAINT_KEY, 300).unwrap()
        };
        let err = tol.validate().unwrap_err();
        assert_eq!(err.field, "tolerationSeconds");
        assert_contains!(err.rule, "NoExecute");
    }
}
