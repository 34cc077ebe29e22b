use serde::Serialize;
use thiserror::Error;

use crate::error::StageError;
use crate::stages::Stage;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },

    #[error("Run cancelled before the {before} stage")]
    Cancelled { before: Stage },

    #[error("Cannot assemble article: {missing} output is missing")]
    Incomplete { missing: Stage },
}

impl PipelineError {
    /// Stage the run stopped at.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Stage { stage, .. } => *stage,
            PipelineError::Cancelled { before } => *before,
            PipelineError::Incomplete { missing } => *missing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    ArticleIndexUnavailable { error: String },
    UnresolvedInternalLink { slug: String },
}
