use std::borrow::Cow;
use std::fmt;

use kube::core::GroupVersionKind;

use crate::constants::*;
use crate::errors::*;
use crate::model::OwnerReference;

// GVK is a "newtype" wrapper around kube's GroupVersionKind with the conversions needed to go
// between owner references and the objects they point at.  Displayed as "group/version.kind", or
// "version.kind" for the core group.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct GVK(GroupVersionKind);

impl GVK {
    pub fn new(group: &str, version: &str, kind: &str) -> GVK {
        GVK(GroupVersionKind::gvk(group, version, kind))
    }

    pub fn replica_set() -> GVK {
        GVK::new(APPS_GROUP, APPS_VERSION, REPLICASET_KIND)
    }

    pub fn from_owner_ref(rf: &OwnerReference) -> anyhow::Result<GVK> {
        let parts: Vec<_> = rf.api_version.split('/').collect();

        match parts[..] {
            [version] if !version.is_empty() => Ok(GVK::new("", version, &rf.kind)),
            [group, version] if !group.is_empty() && !version.is_empty() => Ok(GVK::new(group, version, &rf.kind)),
            _ => bail!("invalid format for api_version: {:?}", rf.api_version),
        }
    }

    pub fn api_version(&self) -> String {
        self.0.api_version()
    }
}

impl AsRef<GroupVersionKind> for GVK {
    fn as_ref(&self) -> &GroupVersionKind {
        &self.0
    }
}

impl fmt::Display for GVK {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut group = Cow::from(&self.0.group);
        if !group.is_empty() {
            group.to_mut().push('/');
        }

        write!(f, "{group}{}.{}", self.0.version, self.0.kind)
    }
}
