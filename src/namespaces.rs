use kube::ResourceExt;
use tracing::{debug, warn};

use crate::k8s::ResourceClient;
use crate::model::ResourceKinds;

/// Names of namespaces carrying the pipeline membership label.
///
/// Listing failures are logged and reported as "no eligible namespaces".
pub async fn list_namespaces(client: &dyn ResourceClient, kinds: &ResourceKinds) -> Vec<String> {
    let selector = Some(kinds.namespace_selector.as_str()).filter(|value| !value.is_empty());
    match client.list(&kinds.namespace, None, selector).await {
        Ok(items) => {
            let names = items
                .iter()
                .map(|item| item.name_any())
                .collect::<Vec<_>>();
            debug!(count = names.len(), "listed pipeline namespaces");
            names
        }
        Err(error) => {
            warn!(%error, "failed to list pipeline namespaces");
            Vec::new()
        }
    }
}
