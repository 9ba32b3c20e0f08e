use std::io::Write;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::k8s::ResourceClient;
use crate::locator::Locator;
use crate::materializer::{Materializer, from_text, to_json, to_text};
use crate::model::{ResourceKinds, ResourceRef, Target};
use crate::prompt::Prompter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Runs pipeline commands one name at a time, stopping at the first failure.
pub struct Executor<'a> {
    client: &'a dyn ResourceClient,
    prompter: &'a dyn Prompter,
    kinds: &'a ResourceKinds,
}

impl<'a> Executor<'a> {
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

    fn locator(&self) -> Locator<'a> {
        Locator::new(self.client, self.prompter, self.kinds)
    }

    fn materializer(&self) -> Materializer<'a> {
        Materializer::new(self.client, &self.kinds.pipeline)
    }

    pub async fn list(
        &self,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<Target, PipelineError> {
        let target = self.locator().resolve(args).await?;
        for name in &target.names {
            writeln!(out, "{name}")?;
        }
        Ok(target)
    }

    pub async fn view(
        &self,
        args: &[String],
        format: OutputFormat,
        out: &mut dyn Write,
    ) -> Result<Target, PipelineError> {
        let target = self.locator().resolve_selection(args).await?;
        let materializer = self.materializer();
        for reference in target.refs() {
            let instance = materializer.fetch(&reference).await?;
            let text = match format {
                OutputFormat::Yaml => to_text(&instance)?,
                OutputFormat::Json => to_json(&instance)?,
            };
            writeln!(out, "{text}")?;
        }
        Ok(target)
    }

    pub async fn delete(
        &self,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<Target, PipelineError> {
        let target = self.locator().resolve_selection(args).await?;
        for reference in target.refs() {
            writeln!(out, "{}", reference.name)?;
            self.client
                .delete(&self.kinds.pipeline, &reference.namespace, &reference.name)
                .await
                .map_err(|source| PipelineError::Delete {
                    reference: reference.clone(),
                    source,
                })?;
            info!(%reference, "pipeline deleted");
        }
        Ok(target)
    }

    pub async fn edit(
        &self,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<Target, PipelineError> {
        let target = self.locator().resolve_selection(args).await?;
        for reference in target.refs() {
            writeln!(out, "get pipeline {reference}")?;
            self.edit_one(&reference).await?;
        }
        Ok(target)
    }

    async fn edit_one(&self, reference: &ResourceRef) -> Result<(), PipelineError> {
        let materializer = self.materializer();
        let instance = materializer.fetch(reference).await?;
        let text = to_text(&instance)?;

        let prompt = format!("Edit pipeline {reference}");
        let edited = self
            .prompter
            .edit_text(&prompt, &text)
            .map_err(|error| PipelineError::prompt(&prompt, error))?;
        if edited.trim().is_empty() {
            warn!(%reference, "edited pipeline is empty, cancelling edit");
            return Err(PipelineError::InputAborted(prompt));
        }

        let updated = from_text(reference, &edited)?;
        materializer.commit(&reference.namespace, &updated).await?;
        Ok(())
    }
}
