use anyhow::{Context, Result};
use async_trait::async_trait;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::DynamicObject;
use kube::{Api, Client, Config};
use tracing::debug;

use crate::error::StoreError;
use crate::model::ResourceKind;

/// Untyped access to a resource store, keyed by schema descriptor.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Lists `kind` in `namespace`, or cluster wide when `namespace` is `None`.
    async fn list(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError>;

    async fn get(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, StoreError>;

    /// Replaces the stored object. The store validates `metadata.resourceVersion`.
    async fn update(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        instance: &DynamicObject,
    ) -> Result<DynamicObject, StoreError>;

    async fn delete(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError>;
}

pub struct KubeGateway {
    client: Client,
    context: String,
    cluster: String,
}

impl KubeGateway {
    pub async fn new(context: Option<String>) -> Result<Self> {
        let kubeconfig = Kubeconfig::read().ok();

        let config = if let Some(kubeconfig_value) = kubeconfig.clone() {
            let options = KubeConfigOptions {
                context: context.clone(),
                cluster: None,
                user: None,
            };
            Config::from_custom_kubeconfig(kubeconfig_value, &options)
                .await
                .context("failed to infer Kubernetes configuration")?
        } else {
            if context.is_some() {
                anyhow::bail!("kubeconfig not found; --context is unavailable in this environment");
            }
            Config::infer()
                .await
                .context("failed to infer Kubernetes configuration")?
        };

        let cluster = config.cluster_url.to_string();
        let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;
        let context = context
            .or_else(|| {
                kubeconfig
                    .as_ref()
                    .and_then(|cfg| cfg.current_context.clone())
            })
            .unwrap_or_else(|| "in-cluster".to_string());

        Ok(Self {
            client,
            context,
            cluster,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    fn namespaced(&self, kind: &ResourceKind, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &kind.api_resource())
    }
}

#[async_trait]
impl ResourceClient for KubeGateway {
    async fn list(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError> {
        let api = match namespace {
            Some(namespace) => self.namespaced(kind, namespace),
            None => Api::all_with(self.client.clone(), &kind.api_resource()),
        };
        let mut params = ListParams::default();
        if let Some(selector) = label_selector {
            params = params.labels(selector);
        }
        debug!(%kind, ?namespace, ?label_selector, "listing resources");
        let list = api.list(&params).await?;
        Ok(list.items)
    }

    async fn get(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, StoreError> {
        debug!(%kind, namespace, name, "getting resource");
        Ok(self.namespaced(kind, namespace).get(name).await?)
    }

    async fn update(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        instance: &DynamicObject,
    ) -> Result<DynamicObject, StoreError> {
        let name = instance
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| StoreError::Rejected("metadata.name is required".to_string()))?;
        debug!(%kind, namespace, name, "replacing resource");
        Ok(self
            .namespaced(kind, namespace)
            .replace(name, &PostParams::default(), instance)
            .await?)
    }

    async fn delete(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        debug!(%kind, namespace, name, "deleting resource");
        let _ = self
            .namespaced(kind, namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}
