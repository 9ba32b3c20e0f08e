use kube::ResourceExt;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::k8s::ResourceClient;
use crate::model::{ResourceKinds, Target};
use crate::namespaces::list_namespaces;
use crate::prompt::Prompter;

const NAMESPACE_PROMPT: &str = "Please select the namespace which you want to check:";
const PIPELINE_PROMPT: &str = "Please select the pipelines that you want to check:";

pub struct Locator<'a> {
    client: &'a dyn ResourceClient,
    prompter: &'a dyn Prompter,
    kinds: &'a ResourceKinds,
}

impl<'a> Locator<'a> {
    pub fn new(
        client: &'a dyn ResourceClient,
        prompter: &'a dyn Prompter,
        kinds: &'a ResourceKinds,
    ) -> Self {
        Self {
            client,
            prompter,
            kinds,
        }
    }

    /// `[ns, name, ...]` is taken verbatim. `[ns]` lists every pipeline in `ns`.
    /// `[]` asks for the namespace first.
    pub async fn resolve(&self, args: &[String]) -> Result<Target, PipelineError> {
        if let [namespace, names @ ..] = args
            && !names.is_empty()
        {
            return Ok(Target {
                namespace: namespace.clone(),
                names: names.to_vec(),
            });
        }

        let namespace = match args.first() {
            Some(namespace) => namespace.clone(),
            None => self.select_namespace().await?,
        };
        let names = self.pipeline_names(&namespace).await?;
        Ok(Target { namespace, names })
    }

    /// Like [`Locator::resolve`], but listed names are narrowed by the operator.
    pub async fn resolve_selection(&self, args: &[String]) -> Result<Target, PipelineError> {
        let explicit = args.len() >= 2;
        let mut target = self.resolve(args).await?;
        if explicit {
            return Ok(target);
        }

        if target.names.is_empty() {
            info!(namespace = %target.namespace, "no pipelines found");
            return Ok(target);
        }

        target.names = self
            .prompter
            .select_many(PIPELINE_PROMPT, &target.names)
            .map_err(|error| PipelineError::prompt("select pipelines", error))?;
        debug!(namespace = %target.namespace, selected = ?target.names, "pipelines selected");
        Ok(target)
    }

    async fn select_namespace(&self) -> Result<String, PipelineError> {
        let candidates = list_namespaces(self.client, self.kinds).await;
        if candidates.is_empty() {
            return Err(PipelineError::NotFound);
        }
        self.prompter
            .select_one(NAMESPACE_PROMPT, &candidates)
            .map_err(|error| PipelineError::prompt("select namespace", error))
    }

    async fn pipeline_names(&self, namespace: &str) -> Result<Vec<String>, PipelineError> {
        let items = self
            .client
            .list(&self.kinds.pipeline, Some(namespace), None)
            .await
            .map_err(|source| PipelineError::Resolution {
                what: format!("pipelines in namespace {namespace}"),
                source,
            })?;
        Ok(items.iter().map(|item| item.name_any()).collect())
    }
}
