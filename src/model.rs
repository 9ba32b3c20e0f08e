use kube::core::{ApiResource, GroupVersionKind};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceKind {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl ResourceKind {
    pub fn pipeline() -> Self {
        Self {
            group: "devops.kubesphere.io".to_string(),
            version: "v1alpha3".to_string(),
            kind: "Pipeline".to_string(),
            plural: "pipelines".to_string(),
        }
    }

    pub fn namespace() -> Self {
        Self {
            group: String::new(),
            version: "v1".to_string(),
            kind: "Namespace".to_string(),
            plural: "namespaces".to_string(),
        }
    }

    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.plural)
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.plural)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceKinds {
    pub pipeline: ResourceKind,
    pub namespace: ResourceKind,
    pub namespace_selector: String,
}

impl Default for ResourceKinds {
    fn default() -> Self {
        Self {
            pipeline: ResourceKind::pipeline(),
            namespace: ResourceKind::namespace(),
            namespace_selector: DEFAULT_NAMESPACE_SELECTOR.to_string(),
        }
    }
}

pub const DEFAULT_NAMESPACE_SELECTOR: &str = "kubesphere.io/devopsproject";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub namespace: String,
    pub name: String,
}

impl ResourceRef {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub namespace: String,
    pub names: Vec<String>,
}

impl Target {
    pub fn refs(&self) -> impl Iterator<Item = ResourceRef> + '_ {
        self.names
            .iter()
            .map(|name| ResourceRef::new(&self.namespace, name))
    }
}
