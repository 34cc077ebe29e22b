//! The six generation stages.
//!
//! Each stage is a `build_prompt` function (pure, unit-tested) plus an async
//! `run_*` function that sends the prompt through a [`ModelClient`] and turns
//! the reply into the stage's record. Stages never retry on their own.
//!
//! [`ModelClient`]: crate::provider::ModelClient

pub mod humanizer;
pub mod ideas;
pub mod optimizer;
pub mod research;
pub mod scorer;
pub mod writer;

use serde::{Deserialize, Serialize};

use tracing::debug;

use crate::config::{EngineConfig, ModelRole, StageParams};
use crate::error::StageError;
use crate::provider::{CompletionRequest, ModelClient};

pub use humanizer::{run_humanizer, HumanizerOutput};
pub use ideas::{run_ideas, IdeaOutput};
pub use optimizer::{run_optimizer, OptimizerOutput};
pub use research::{run_research, ResearchOutput};
pub use scorer::{run_scorer, Rating, ScorerOutput};
pub use writer::{run_writer, WriterOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Research,
    Writer,
    Humanizer,
    Optimizer,
    Scorer,
    Ideas,
}

impl Stage {
    /// Execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Research,
        Stage::Writer,
        Stage::Humanizer,
        Stage::Optimizer,
        Stage::Scorer,
        Stage::Ideas,
    ];

    /// Provider role the stage calls.
    pub fn role(&self) -> ModelRole {
        match self {
            Stage::Research => ModelRole::Research,
            Stage::Writer => ModelRole::Writer,
            Stage::Humanizer => ModelRole::Humanizer,
            Stage::Optimizer | Stage::Scorer | Stage::Ideas => ModelRole::Optimizer,
        }
    }

    pub fn params(&self, config: &EngineConfig) -> StageParams {
        let params = &config.stage_params;
        match self {
            Stage::Research => params.research,
            Stage::Writer => params.writer,
            Stage::Humanizer => params.humanizer,
            Stage::Optimizer => params.optimizer,
            Stage::Scorer => params.scorer,
            Stage::Ideas => params.ideas,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Research => write!(f, "research"),
            Stage::Writer => write!(f, "writer"),
            Stage::Humanizer => write!(f, "humanizer"),
            Stage::Optimizer => write!(f, "optimizer"),
            Stage::Scorer => write!(f, "scorer"),
            Stage::Ideas => write!(f, "ideas"),
        }
    }
}

/// Sends one stage prompt and returns the non-empty reply text.
pub(crate) async fn complete(
    client: &dyn ModelClient,
    config: &EngineConfig,
    stage: Stage,
    prompt: String,
    json_mode: bool,
) -> Result<String, StageError> {
    let request = CompletionRequest::new(stage.role(), prompt, stage.params(config));
    let request = if json_mode { request.json_mode() } else { request };

    let reply = client.complete(&request).await?;
    if reply.trim().is_empty() {
        return Err(StageError::EmptyResponse { stage });
    }

    debug!(stage = %stage, chars = reply.chars().count(), "Provider reply received");
    Ok(reply)
}
