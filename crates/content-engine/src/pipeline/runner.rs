use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::article::{ArticleInput, ArticleOutput};
use crate::catalog::ArticleIndex;
use crate::config::EngineConfig;
use crate::error::StageError;
use crate::provider::ModelClient;
use crate::sanitize;
use crate::stages::{self, ScorerOutput, Stage};

use super::context::PipelineContext;
use super::error::{PipelineError, PipelineWarning};
use super::progress::{ProgressEvent, ProgressReporter};

/// Outcome of one run. The intermediate bag is returned whether or not the
/// run succeeded.
#[derive(Debug)]
pub struct GenerationResult {
    pub run_id: Uuid,
    pub outcome: Result<ArticleOutput, PipelineError>,
    pub intermediate: PipelineContext,
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct ContentEngine {
    config: Arc<EngineConfig>,
    client: Arc<dyn ModelClient>,
    index: Arc<dyn ArticleIndex>,
}

impl ContentEngine {
    pub fn new(
        config: Arc<EngineConfig>,
        client: Arc<dyn ModelClient>,
        index: Arc<dyn ArticleIndex>,
    ) -> Self {
        Self {
            config,
            client,
            index,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the six stages in order and assembles the article.
    ///
    /// Stops at the first failing stage. Cancellation is checked before each
    /// stage; a call already in flight runs to completion.
    pub async fn generate(
        &self,
        input: ArticleInput,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> GenerationResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline",
            run_id = %run_id,
            author = %input.author,
            topic = %sanitize::truncate(&input.topic, 80),
        );

        let mut ctx = PipelineContext::new(input);
        let started = Instant::now();
        let outcome = self
            .run_stages(&mut ctx, progress, cancel)
            .instrument(span)
            .await;

        match &outcome {
            Ok(article) => info!(
                run_id = %run_id,
                slug = %article.slug,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Article generated"
            ),
            Err(e) => warn!(run_id = %run_id, error = %e, "Run stopped"),
        }

        GenerationResult {
            run_id,
            outcome,
            intermediate: ctx,
        }
    }

    /// Scores arbitrary content without running the other stages.
    pub async fn analyze(&self, title: &str, content: &str) -> Result<ScorerOutput, StageError> {
        stages::run_scorer(self.client.as_ref(), &self.config, title, content)
            .instrument(info_span!("analyze", title = %sanitize::truncate(title, 80)))
            .await
    }

    async fn run_stages(
        &self,
        ctx: &mut PipelineContext,
        progress: &dyn ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ArticleOutput, PipelineError> {
        for stage in Stage::ALL {
            progress.report(ProgressEvent::pending(stage));
        }

        for stage in Stage::ALL {
            if cancel.is_cancelled() {
                info!(before = %stage, "Cancellation requested, skipping remaining stages");
                return Err(PipelineError::Cancelled { before: stage });
            }

            progress.report(ProgressEvent::running(stage, self.running_message(stage)));
            let started = Instant::now();

            let result = self
                .run_step(stage, ctx)
                .instrument(info_span!("stage", stage = %stage))
                .await;

            match result {
                Ok(message) => {
                    info!(
                        stage = %stage,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "{}", message
                    );
                    progress.report(ProgressEvent::complete(stage, message));
                }
                Err(source) => {
                    progress.report(ProgressEvent::error(stage, source.to_string()));
                    return Err(PipelineError::Stage { stage, source });
                }
            }
        }

        assemble(ctx)
    }

    fn running_message(&self, stage: Stage) -> String {
        let family = self.config.models.binding(stage.role()).provider.family();
        match stage {
            Stage::Research => format!("Researching topic with {}...", family),
            Stage::Writer => format!("Writing article with {}...", family),
            Stage::Humanizer => format!("Humanizing with {}...", family),
            Stage::Optimizer => format!("Optimizing SEO with {}...", family),
            Stage::Scorer => "Scoring against the StepTen rubric...".to_string(),
            Stage::Ideas => "Generating related article ideas...".to_string(),
        }
    }

    /// Runs one stage, stores its output in `ctx` and returns the completion
    /// message.
    async fn run_step(&self, stage: Stage, ctx: &mut PipelineContext) -> Result<String, StageError> {
        match stage {
            Stage::Research => self.step_research(ctx).await,
            Stage::Writer => self.step_writer(ctx).await,
            Stage::Humanizer => self.step_humanizer(ctx).await,
            Stage::Optimizer => self.step_optimizer(ctx).await,
            Stage::Scorer => self.step_scorer(ctx).await,
            Stage::Ideas => self.step_ideas(ctx).await,
        }
    }

    async fn step_research(&self, ctx: &mut PipelineContext) -> Result<String, StageError> {
        let research = stages::run_research(
            self.client.as_ref(),
            &self.config,
            &ctx.input.topic,
            &ctx.input.target_keywords,
        )
        .await?;

        let message = format!("Found {} sources", research.sources.len());
        ctx.research = Some(research);
        Ok(message)
    }

    async fn step_writer(&self, ctx: &mut PipelineContext) -> Result<String, StageError> {
        let research = require(&ctx.research, Stage::Writer, "research")?;
        let draft =
            stages::run_writer(self.client.as_ref(), &self.config, &ctx.input, research).await?;

        let message = format!("Draft: {} words, {} sections", draft.word_count, draft.h2_count);
        ctx.draft = Some(draft);
        Ok(message)
    }

    async fn step_humanizer(&self, ctx: &mut PipelineContext) -> Result<String, StageError> {
        let draft = require(&ctx.draft, Stage::Humanizer, "draft")?;
        let humanized = stages::run_humanizer(
            self.client.as_ref(),
            &self.config,
            &draft.content,
            ctx.input.author,
        )
        .await?;

        ctx.humanized = Some(humanized);
        Ok("Content humanized".to_string())
    }

    async fn step_optimizer(&self, ctx: &mut PipelineContext) -> Result<String, StageError> {
        let existing = match self.index.published_articles().await {
            Ok(articles) => articles,
            Err(error) => {
                warn!(error = %error, "Article index unavailable, optimizing without internal links");
                ctx.warnings
                    .push(PipelineWarning::ArticleIndexUnavailable { error });
                Vec::new()
            }
        };
        debug!(count = existing.len(), "Existing articles for internal linking");

        let draft = require(&ctx.draft, Stage::Optimizer, "draft")?;
        let humanized = require(&ctx.humanized, Stage::Optimizer, "humanized content")?;
        let optimized = stages::run_optimizer(
            self.client.as_ref(),
            &self.config,
            &draft.title,
            &humanized.content,
            &existing,
        )
        .await?;

        for link in optimized.unresolved_internal_links(&existing) {
            ctx.warnings.push(PipelineWarning::UnresolvedInternalLink {
                slug: link.slug().to_string(),
            });
        }

        let message = format!(
            "Generated meta, schema, {} internal links",
            optimized.internal_links.len()
        );
        ctx.existing_articles = existing;
        ctx.optimized = Some(optimized);
        Ok(message)
    }

    async fn step_scorer(&self, ctx: &mut PipelineContext) -> Result<String, StageError> {
        let draft = require(&ctx.draft, Stage::Scorer, "draft")?;
        let humanized = require(&ctx.humanized, Stage::Scorer, "humanized content")?;
        let score = stages::run_scorer(
            self.client.as_ref(),
            &self.config,
            &draft.title,
            &humanized.content,
        )
        .await?;

        let message = format!("Score: {:.1} ({})", score.weighted_score, score.rating);
        ctx.score = Some(score);
        Ok(message)
    }

    async fn step_ideas(&self, ctx: &mut PipelineContext) -> Result<String, StageError> {
        let draft = require(&ctx.draft, Stage::Ideas, "draft")?;
        let humanized = require(&ctx.humanized, Stage::Ideas, "humanized content")?;
        let ideas = stages::run_ideas(
            self.client.as_ref(),
            &self.config,
            &draft.title,
            &ctx.input.topic,
            &humanized.content,
        )
        .await?;

        let message = format!("Generated {} related ideas", ideas.len());
        ctx.ideas = Some(ideas);
        Ok(message)
    }
}

fn require<'a, T>(
    value: &'a Option<T>,
    stage: Stage,
    what: &str,
) -> Result<&'a T, StageError> {
    value
        .as_ref()
        .ok_or_else(|| StageError::contract(stage, format!("{} not available", what)))
}

fn assemble(ctx: &PipelineContext) -> Result<ArticleOutput, PipelineError> {
    let missing = |stage| PipelineError::Incomplete { missing: stage };

    let research = ctx.research.as_ref().ok_or_else(|| missing(Stage::Research))?;
    let draft = ctx.draft.as_ref().ok_or_else(|| missing(Stage::Writer))?;
    let humanized = ctx.humanized.as_ref().ok_or_else(|| missing(Stage::Humanizer))?;
    let optimized = ctx.optimized.as_ref().ok_or_else(|| missing(Stage::Optimizer))?;
    let score = ctx.score.as_ref().ok_or_else(|| missing(Stage::Scorer))?;
    let ideas = ctx.ideas.as_deref().ok_or_else(|| missing(Stage::Ideas))?;

    Ok(ArticleOutput::assemble(
        &ctx.input, research, draft, humanized, optimized, score, ideas,
    ))
}
