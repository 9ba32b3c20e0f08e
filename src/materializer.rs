use kube::core::DynamicObject;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, info};

use crate::error::{PipelineError, StoreError};
use crate::k8s::ResourceClient;
use crate::model::{ResourceKind, ResourceRef};

const JSON_INDENT: &[u8] = b"    ";

pub struct Materializer<'a> {
    client: &'a dyn ResourceClient,
    kind: &'a ResourceKind,
}

impl<'a> Materializer<'a> {
    pub fn new(client: &'a dyn ResourceClient, kind: &'a ResourceKind) -> Self {
        Self { client, kind }
    }

    pub async fn fetch(&self, reference: &ResourceRef) -> Result<DynamicObject, PipelineError> {
        debug!(%reference, "fetching pipeline");
        self.client
            .get(self.kind, &reference.namespace, &reference.name)
            .await
            .map_err(|source| PipelineError::Fetch {
                reference: reference.clone(),
                source,
            })
    }

    /// Writes `instance` back. A stale `resourceVersion` fails with [`PipelineError::Conflict`].
    pub async fn commit(
        &self,
        namespace: &str,
        instance: &DynamicObject,
    ) -> Result<DynamicObject, PipelineError> {
        let Some(name) = instance.metadata.name.as_deref() else {
            return Err(PipelineError::Commit {
                reference: ResourceRef::new(namespace, "<unnamed>"),
                source: StoreError::Rejected("metadata.name is required".to_string()),
            });
        };
        let reference = ResourceRef::new(namespace, name);

        match self.client.update(self.kind, namespace, instance).await {
            Ok(updated) => {
                info!(
                    %reference,
                    resource_version = updated.metadata.resource_version.as_deref().unwrap_or("-"),
                    "pipeline updated"
                );
                Ok(updated)
            }
            Err(StoreError::Conflict(message)) => {
                Err(PipelineError::Conflict { reference, message })
            }
            Err(source) => Err(PipelineError::Commit { reference, source }),
        }
    }
}

/// Indented JSON with object keys in sorted order at every depth.
pub fn to_json(instance: &DynamicObject) -> Result<String, PipelineError> {
    let value = serde_json::to_value(instance).map_err(|error| encode_error(instance, error))?;
    let value = canonicalize(value);

    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(JSON_INDENT));
    value
        .serialize(&mut serializer)
        .map_err(|error| encode_error(instance, error))?;
    buffer.push(b'\n');
    String::from_utf8(buffer).map_err(|error| encode_error(instance, error))
}

/// The YAML text shown to operators. Encoding the same value twice yields the same bytes.
pub fn to_text(instance: &DynamicObject) -> Result<String, PipelineError> {
    let json = to_json(instance)?;
    let value: serde_yaml::Value =
        serde_json::from_str(&json).map_err(|error| encode_error(instance, error))?;
    serde_yaml::to_string(&value).map_err(|error| encode_error(instance, error))
}

pub fn from_text(reference: &ResourceRef, text: &str) -> Result<DynamicObject, PipelineError> {
    serde_yaml::from_str(text).map_err(|source| PipelineError::Decode {
        reference: reference.to_string(),
        source,
    })
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries = map.into_iter().collect::<Vec<_>>();
            entries.sort_by(|left, right| left.0.cmp(&right.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, canonicalize(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

fn display_name(instance: &DynamicObject) -> String {
    let namespace = instance.metadata.namespace.as_deref().unwrap_or("-");
    let name = instance.metadata.name.as_deref().unwrap_or("<unnamed>");
    format!("{namespace}/{name}")
}

fn encode_error<E>(instance: &DynamicObject, error: E) -> PipelineError
where
    E: std::error::Error + Send + Sync + 'static,
{
    PipelineError::Encode {
        reference: display_name(instance),
        source: Box::new(error),
    }
}
