use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};

use super::names::*;
use super::*;
use crate::errors::*;
use crate::k8s::GVK;
use crate::prelude::*;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_owner_deletion: Option<bool>,
}

impl OwnerReference {
    // A controller reference is what the ReplicaSet/Job/etc. controllers put on the pods they
    // own; `blockOwnerDeletion` is set so that foreground deletion of the owner waits on the pod
    pub fn controller(gvk: &GVK, name: &str, uid: &str) -> ValidationResult<OwnerReference> {
        OwnerReference {
            api_version: gvk.api_version(),
            kind: gvk.as_ref().kind.clone(),
            name: name.into(),
            uid: uid.into(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }
        .validated()
    }

    pub fn is_controller(&self) -> bool {
        self.controller == Some(true)
    }
}

impl Validate for OwnerReference {
    fn validate(&self) -> ValidationResult<()> {
        GVK::from_owner_ref(self).map_err(|err| ValidationError::new("apiVersion", err.to_string()))?;
        check!(!self.kind.is_empty(), "kind", "must be non-empty");
        check_dns1123_subdomain("name", &self.name)?;
        check!(!self.uid.is_empty(), "uid", "must be non-empty");
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,

    pub namespace: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,

    pub resource_version: String,
    pub uid: String,
    pub creation_timestamp: metav1::Time,
}

impl ObjectMeta {
    pub fn controller_ref(&self) -> Option<&OwnerReference> {
        self.owner_references.iter().find(|r| r.is_controller())
    }

    pub fn namespaced_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl Validate for ObjectMeta {
    fn validate(&self) -> ValidationResult<()> {
        check_dns1123_subdomain("name", &self.name)?;
        if let Some(prefix) = &self.generate_name {
            check_generate_name("generateName", prefix)?;
            check!(
                self.name.starts_with(prefix.as_str()),
                "name",
                "{:?} does not start with generateName {prefix:?}",
                self.name
            );
        }
        check_dns1123_label("namespace", &self.namespace)?;

        for (k, v) in &self.labels {
            check_qualified_key("labels", k)?;
            check!(v.len() <= 63, format!("labels[{k}]"), "value {v:?} exceeds 63 characters");
        }
        for k in self.annotations.keys() {
            check_qualified_key("annotations", k)?;
        }

        validate_each(&self.owner_references, "ownerReferences")?;
        let controllers = self.owner_references.iter().filter(|r| r.is_controller()).count();
        check!(
            controllers <= 1,
            "ownerReferences",
            "at most one owner reference may have controller=true, found {controllers}"
        );
        check_unique(self.owner_references.iter().map(|r| r.uid.as_str()), "ownerReferences", "uid")?;

        check_decimal("resourceVersion", &self.resource_version)?;
        check!(!self.uid.is_empty(), "uid", "must be non-empty");
        Ok(())
    }
}
