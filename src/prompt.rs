use dialoguer::{Editor, MultiSelect, Select};
use tracing::debug;

use crate::error::PromptError;

/// Interactive operator input.
///
/// Every method blocks until the operator answers. Cancelling a prompt
/// surfaces as [`PromptError::Cancelled`].
pub trait Prompter: Send + Sync {
    fn select_one(&self, prompt: &str, options: &[String]) -> Result<String, PromptError>;

    /// An empty selection is a valid answer.
    fn select_many(&self, prompt: &str, options: &[String]) -> Result<Vec<String>, PromptError>;

    /// Opens `initial` in an editor and returns the submitted text.
    fn edit_text(&self, prompt: &str, initial: &str) -> Result<String, PromptError>;
}

#[derive(Debug, Default)]
pub struct DialoguerPrompter {
    editor: Option<String>,
}

impl DialoguerPrompter {
    pub fn new(editor: Option<String>) -> Self {
        Self { editor }
    }

    /// Configured editor, if any. Without one dialoguer falls back to `VISUAL`/`EDITOR`.
    fn editor_override(&self) -> Option<&str> {
        self.editor
            .as_deref()
            .map(str::trim)
            .filter(|editor| !editor.is_empty())
    }
}

impl Prompter for DialoguerPrompter {
    fn select_one(&self, prompt: &str, options: &[String]) -> Result<String, PromptError> {
        if options.is_empty() {
            return Err(PromptError::Cancelled);
        }
        let index = Select::new()
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact_opt()?
            .ok_or(PromptError::Cancelled)?;
        Ok(options[index].clone())
    }

    fn select_many(&self, prompt: &str, options: &[String]) -> Result<Vec<String>, PromptError> {
        if options.is_empty() {
            return Ok(Vec::new());
        }
        let indexes = MultiSelect::new()
            .with_prompt(prompt)
            .items(options)
            .interact_opt()?
            .ok_or(PromptError::Cancelled)?;
        Ok(indexes
            .into_iter()
            .filter_map(|index| options.get(index).cloned())
            .collect())
    }

    fn edit_text(&self, prompt: &str, initial: &str) -> Result<String, PromptError> {
        eprintln!("{prompt}");
        let edited = match self.editor_override() {
            Some(executable) => {
                debug!(%executable, "launching configured editor");
                Editor::new()
                    .executable(executable)
                    .extension(".yaml")
                    .require_save(false)
                    .trim_newlines(false)
                    .edit(initial)
            }
            None => Editor::new()
                .extension(".yaml")
                .require_save(false)
                .trim_newlines(false)
                .edit(initial),
        };
        edited
            .map_err(|error| PromptError::Terminal(error.into()))?
            .ok_or(PromptError::Cancelled)
    }
}
