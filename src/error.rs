use thiserror::Error;

use crate::fetch::FetchError;

/// Failure taxonomy shared by the loaders, the orchestrator and the media builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Network or HTTP failure while fetching a resource.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response was well-formed transport-wise but lacked the expected shape or key.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// No entity key is known for this entity, so no media locator can be built.
    #[error("media unavailable for {0}")]
    MediaUnavailable(String),
}

impl From<FetchError> for PipelineError {
    fn from(err: FetchError) -> Self {
        PipelineError::Transport(err.0)
    }
}
