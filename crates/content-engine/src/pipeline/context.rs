use serde::Serialize;

use crate::article::ArticleInput;
use crate::catalog::ExistingArticle;
use crate::stages::{
    HumanizerOutput, IdeaOutput, OptimizerOutput, ResearchOutput, ScorerOutput, WriterOutput,
};

use super::error::PipelineWarning;

/// The intermediate bag: every stage output produced so far.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineContext {
    // Input
    pub input: ArticleInput,

    // Set by step_research
    pub research: Option<ResearchOutput>,

    // Set by step_writer
    pub draft: Option<WriterOutput>,

    // Set by step_humanizer
    pub humanized: Option<HumanizerOutput>,

    // Set by step_optimizer, along with the article list it was given
    pub optimized: Option<OptimizerOutput>,
    pub existing_articles: Vec<ExistingArticle>,

    // Set by step_scorer
    pub score: Option<ScorerOutput>,

    // Set by step_ideas
    pub ideas: Option<Vec<IdeaOutput>>,

    // Non-fatal warnings
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineContext {
    pub fn new(input: ArticleInput) -> Self {
        Self {
            input,
            research: None,
            draft: None,
            humanized: None,
            optimized: None,
            existing_articles: Vec::new(),
            score: None,
            ideas: None,
            warnings: Vec::new(),
        }
    }

    /// Stages whose output is present, in execution order.
    pub fn completed_stages(&self) -> Vec<crate::stages::Stage> {
        use crate::stages::Stage;

        let present = [
            (Stage::Research, self.research.is_some()),
            (Stage::Writer, self.draft.is_some()),
            (Stage::Humanizer, self.humanized.is_some()),
            (Stage::Optimizer, self.optimized.is_some()),
            (Stage::Scorer, self.score.is_some()),
            (Stage::Ideas, self.ideas.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(stage, done)| done.then_some(stage))
            .collect()
    }
}
