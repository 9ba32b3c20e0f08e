use crate::model::ResourceRef;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("resource version conflict: {0}")]
    Conflict(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Api(kube::Error),
}

impl From<kube::Error> for StoreError {
    fn from(error: kube::Error) -> Self {
        if let kube::Error::Api(response) = &error
            && response.code == 409
        {
            return StoreError::Conflict(response.message.clone());
        }
        StoreError::Api(error)
    }
}

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("prompt cancelled by operator")]
    Cancelled,
    #[error("prompt failed: {0}")]
    Terminal(#[from] dialoguer::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no pipeline namespace found in this cluster")]
    NotFound,
    #[error("cannot list {what}, error: {source}")]
    Resolution {
        what: String,
        #[source]
        source: StoreError,
    },
    #[error("{0}: aborted by operator")]
    InputAborted(String),
    #[error("{context}: {source}")]
    Prompt {
        context: String,
        #[source]
        source: PromptError,
    },
    #[error("cannot get pipeline {reference}, error: {source}")]
    Fetch {
        reference: ResourceRef,
        #[source]
        source: StoreError,
    },
    #[error("cannot encode pipeline {reference}, error: {source}")]
    Encode {
        reference: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("cannot decode edited pipeline {reference}, error: {source}")]
    Decode {
        reference: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("cannot update pipeline {reference}, error: {source}")]
    Commit {
        reference: ResourceRef,
        #[source]
        source: StoreError,
    },
    #[error("cannot update pipeline {reference}, it was modified on the server: {message}")]
    Conflict {
        reference: ResourceRef,
        message: String,
    },
    #[error("cannot delete pipeline {reference}, error: {source}")]
    Delete {
        reference: ResourceRef,
        #[source]
        source: StoreError,
    },
    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn prompt(context: &str, error: PromptError) -> Self {
        match error {
            PromptError::Cancelled => PipelineError::InputAborted(context.to_string()),
            source => PipelineError::Prompt {
                context: context.to_string(),
                source,
            },
        }
    }

    pub fn is_commit_failure(&self) -> bool {
        matches!(
            self,
            PipelineError::Commit { .. } | PipelineError::Conflict { .. }
        )
    }
}
