use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::model::{DEFAULT_NAMESPACE_SELECTOR, ResourceKind, ResourceKinds};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginConfig {
    pub source: Option<String>,
    pub kinds: ResourceKinds,
    pub editor: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PluginConfigFile {
    #[serde(default)]
    pipeline: Option<ResourceKind>,
    #[serde(default, alias = "namespaces")]
    namespace: Option<ResourceKind>,
    #[serde(default, alias = "selector")]
    namespace_selector: Option<String>,
    #[serde(default)]
    editor: Option<String>,
}

impl PluginConfig {
    /// Loads `explicit` when given, otherwise the first discovered config file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover_config_path(),
        };
        let Some(path) = path else {
            debug!("no config file found, using defaults");
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::parse(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.source = Some(path.display().to_string());
        debug!(source = %path.display(), "loaded config");
        Ok(config)
    }

    fn parse(raw: &str) -> Result<Self> {
        let parsed: PluginConfigFile = if raw.trim().is_empty() {
            PluginConfigFile::default()
        } else {
            serde_yaml::from_str(raw)?
        };

        let kinds = ResourceKinds {
            pipeline: parsed.pipeline.unwrap_or_else(ResourceKind::pipeline),
            namespace: parsed.namespace.unwrap_or_else(ResourceKind::namespace),
            namespace_selector: parsed
                .namespace_selector
                .unwrap_or_else(|| DEFAULT_NAMESPACE_SELECTOR.to_string()),
        };
        let editor = parsed.editor.filter(|value| !value.trim().is_empty());

        Ok(Self {
            source: None,
            kinds,
            editor,
        })
    }
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("PIPELINE_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("kubectl-pipeline.yaml"),
        PathBuf::from("kubectl-pipeline.yml"),
        PathBuf::from(".kubectl-pipeline.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/kubectl-pipeline/config.yaml"),
            PathBuf::from(&home).join(".config/kubectl-pipeline/config.yml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}
