//! End-to-end pipeline runs against scripted providers.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{call_roles, client_through, full_run_client, replies, EngineBuilder};
use content_engine::catalog::{ArticleIndex, ExistingArticle};
use content_engine::content;
use content_engine::pipeline::{PipelineWarning, RecordingProgress};
use content_engine::stages::writer::{
    HOT_TAKE_MARKER, PERSONAL_STORY_MARKER, RAW_THOUGHTS_MARKER, REAL_EXAMPLE_MARKER,
};
use content_engine::{
    ArticleInput, Author, ModelRole, NoopProgress, PipelineError, ProviderError, Rating,
    ScriptedClient, Stage, StageError, StageStatus,
};
use tokio_util::sync::CancellationToken;

fn input() -> ArticleInput {
    let mut input = ArticleInput::new("Remote team rituals", Author::Clark);
    input.target_keywords = vec!["remote rituals".to_string()];
    input
}

// ── Successful runs ──

#[tokio::test]
async fn test_word_count_and_read_time_follow_the_draft() {
    let client = Arc::new(full_run_client());
    let result = EngineBuilder::new()
        .build(client.clone())
        .generate(input(), &NoopProgress, &CancellationToken::new())
        .await;

    let article = result.outcome.unwrap();
    let draft = result.intermediate.draft.as_ref().unwrap();

    assert_eq!(article.word_count, draft.word_count);
    assert_eq!(article.word_count, content::word_count(replies::DRAFT));
    assert_eq!(article.read_time, article.word_count.div_ceil(200));
}

#[tokio::test]
async fn test_article_cross_references_stage_outputs() {
    let client = Arc::new(full_run_client());
    let result = EngineBuilder::new()
        .build(client.clone())
        .generate(input(), &NoopProgress, &CancellationToken::new())
        .await;

    let article = result.outcome.unwrap();
    assert_eq!(article.title, "Remote Rituals That Actually Survive Time Zones");
    assert_eq!(article.slug, "remote-team-rituals");
    assert_eq!(article.content, replies::HUMANIZED);
    assert!(article
        .excerpt
        .starts_with("Look, most remote rituals die within a month."));
    assert!(article.excerpt.ends_with("..."));
    assert_eq!(article.author, Author::Clark);

    assert_eq!(
        article.meta.keywords,
        vec!["remote team rituals", "async standups", "distributed teams"]
    );
    assert!(article.meta.schema.faq.is_some());
    assert_eq!(
        article.research.statistics,
        vec!["64% of remote workers skip optional video calls"]
    );
    assert_eq!(article.seo.internal_links.len(), 1);
    assert_eq!(article.seo.internal_links[0].url, "/tales/async-first-hiring");
    assert_eq!(article.seo.external_links[0].url, "https://example.com/pulse");
    assert_eq!(article.seo.breadcrumbs.len(), 3);
    assert_eq!(article.related_ideas.len(), 3);
    assert!(result.intermediate.warnings.is_empty());

    assert_eq!(
        call_roles(&client),
        vec![
            ModelRole::Research,
            ModelRole::Writer,
            ModelRole::Humanizer,
            ModelRole::Optimizer,
            ModelRole::Optimizer,
            ModelRole::Optimizer,
        ]
    );
}

#[tokio::test]
async fn test_reference_scores_give_35_and_requires_revision() {
    let client = Arc::new(full_run_client());
    let result = EngineBuilder::new()
        .build(client)
        .generate(input(), &NoopProgress, &CancellationToken::new())
        .await;

    let score = result.intermediate.score.as_ref().unwrap();
    assert_eq!(score.weighted_score, 35.0);
    assert_eq!(score.rating, Rating::RequiresRevision);
    // Provider-supplied total is kept; it is advisory only.
    assert_eq!(score.total_score, 50.0);

    let article = result.outcome.unwrap();
    assert_eq!(article.score.total, 35.0);
    assert_eq!(
        article.score.suggestions,
        vec!["Shorten the meta title", "Add a diagram"]
    );
}

#[tokio::test]
async fn test_scored_structure_is_attached() {
    let client = Arc::new(full_run_client());
    let result = EngineBuilder::new()
        .build(client)
        .generate(input(), &NoopProgress, &CancellationToken::new())
        .await;

    let structure = &result.intermediate.score.as_ref().unwrap().structure;
    assert!(structure.has_title_heading);
    assert!(structure.has_faq);
    assert_eq!(structure.h2_count, 2);
}

// ── Voice injection ──

#[tokio::test]
async fn test_absent_voice_fields_leave_no_markers_in_writer_prompt() {
    let client = Arc::new(
        ScriptedClient::new()
            .reply(ModelRole::Research, replies::RESEARCH_MINIMAL)
            .reply(ModelRole::Writer, replies::DRAFT),
    );
    let result = EngineBuilder::new()
        .build(client.clone())
        .generate(
            ArticleInput::new("X", Author::Stepten),
            &NoopProgress,
            &CancellationToken::new(),
        )
        .await;

    let writer_prompt = &client.requests_for(ModelRole::Writer)[0].prompt;
    assert!(writer_prompt.contains("One finding"));
    assert!(writer_prompt.contains("One question?"));
    for marker in [
        PERSONAL_STORY_MARKER,
        HOT_TAKE_MARKER,
        REAL_EXAMPLE_MARKER,
        RAW_THOUGHTS_MARKER,
    ] {
        assert!(!writer_prompt.contains(marker), "unexpected {}", marker);
    }

    // The run itself stops at the humanizer, which has no scripted reply.
    assert_eq!(result.outcome.unwrap_err().stage(), Stage::Humanizer);
}

#[tokio::test]
async fn test_present_voice_field_reaches_writer_prompt() {
    let client = Arc::new(client_through(Stage::Writer));
    let mut input = input();
    input.voice_injection.hot_take = Some("Daily standups are theatre.".to_string());

    EngineBuilder::new()
        .build(client.clone())
        .generate(input, &NoopProgress, &CancellationToken::new())
        .await;

    let writer_prompt = &client.requests_for(ModelRole::Writer)[0].prompt;
    assert!(writer_prompt.contains(HOT_TAKE_MARKER));
    assert!(writer_prompt.contains("Daily standups are theatre."));
    assert!(!writer_prompt.contains(PERSONAL_STORY_MARKER));
}

// ── Partial failure ──

#[tokio::test]
async fn test_research_without_braces_produces_no_downstream_output() {
    let client = Arc::new(
        ScriptedClient::new().reply(ModelRole::Research, "Sorry, I could not research that."),
    );
    let result = EngineBuilder::new()
        .build(client.clone())
        .generate(input(), &NoopProgress, &CancellationToken::new())
        .await;

    assert!(matches!(
        result.outcome,
        Err(PipelineError::Stage {
            stage: Stage::Research,
            source: StageError::Extraction {
                expected: "object",
                ..
            }
        })
    ));

    let ctx = &result.intermediate;
    assert!(ctx.research.is_none());
    assert!(ctx.draft.is_none());
    assert!(ctx.humanized.is_none());
    assert!(ctx.optimized.is_none());
    assert!(ctx.score.is_none());
    assert!(ctx.ideas.is_none());
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_optimizer_failure_keeps_research_draft_and_humanized() {
    let client = Arc::new(client_through(Stage::Humanizer).fail(
        ModelRole::Optimizer,
        ProviderError::Status {
            role: ModelRole::Optimizer,
            status: 403,
            body: "forbidden".to_string(),
        },
    ));
    let progress = RecordingProgress::new();
    let result = EngineBuilder::new()
        .build(client.clone())
        .generate(input(), &progress, &CancellationToken::new())
        .await;

    let err = result.outcome.unwrap_err();
    assert_eq!(err.stage(), Stage::Optimizer);
    assert!(err.to_string().contains("403"));

    let ctx = &result.intermediate;
    assert_eq!(
        ctx.research.as_ref().unwrap().key_findings[0],
        "Async standups beat live ones for teams across 3+ time zones"
    );
    assert_eq!(ctx.draft.as_ref().unwrap().content, replies::DRAFT);
    assert_eq!(ctx.humanized.as_ref().unwrap().content, replies::HUMANIZED);
    assert!(ctx.optimized.is_none());
    assert!(ctx.score.is_none());
    assert!(ctx.ideas.is_none());

    let transitions = progress.transitions();
    assert_eq!(
        transitions.last(),
        Some(&(Stage::Optimizer, StageStatus::Error))
    );
    assert!(!transitions
        .iter()
        .any(|(stage, status)| *stage == Stage::Scorer && *status != StageStatus::Pending));
}

#[tokio::test]
async fn test_out_of_range_score_is_contract_error() {
    let client = Arc::new(client_through(Stage::Optimizer).reply(
        ModelRole::Optimizer,
        replies::scorer([10.0, 20.0, 30.0, 140.0, 50.0, 60.0, 70.0]),
    ));
    let result = EngineBuilder::new()
        .build(client)
        .generate(input(), &NoopProgress, &CancellationToken::new())
        .await;

    assert!(matches!(
        result.outcome,
        Err(PipelineError::Stage {
            stage: Stage::Scorer,
            source: StageError::Contract { .. }
        })
    ));
    assert!(result.intermediate.optimized.is_some());
}

// ── Collaborators ──

struct OfflineIndex;

#[async_trait]
impl ArticleIndex for OfflineIndex {
    async fn published_articles(&self) -> Result<Vec<ExistingArticle>, String> {
        Err("connection refused".to_string())
    }
}

#[tokio::test]
async fn test_unavailable_index_is_a_warning_not_a_failure() {
    let client = Arc::new(full_run_client());
    let result = EngineBuilder::new()
        .index(Arc::new(OfflineIndex))
        .build(client)
        .generate(input(), &NoopProgress, &CancellationToken::new())
        .await;

    assert!(result.is_success());
    let warnings = &result.intermediate.warnings;
    assert!(warnings.contains(&PipelineWarning::ArticleIndexUnavailable {
        error: "connection refused".to_string()
    }));
    // The suggested slug cannot be resolved against an empty list.
    assert!(warnings.contains(&PipelineWarning::UnresolvedInternalLink {
        slug: "async-first-hiring".to_string()
    }));
}

// ── Progress and cancellation ──

#[tokio::test]
async fn test_progress_is_emitted_in_stage_order() {
    let progress = RecordingProgress::new();
    EngineBuilder::new()
        .build(Arc::new(full_run_client()))
        .generate(input(), &progress, &CancellationToken::new())
        .await;

    let active: Vec<(Stage, StageStatus)> = progress
        .transitions()
        .into_iter()
        .filter(|(_, status)| *status != StageStatus::Pending)
        .collect();

    let expected: Vec<(Stage, StageStatus)> = Stage::ALL
        .iter()
        .flat_map(|s| [(*s, StageStatus::Running), (*s, StageStatus::Complete)])
        .collect();
    assert_eq!(active, expected);

    let timestamps: Vec<_> = progress.events().iter().map(|e| e.timestamp).collect();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_cancelled_run_returns_partial_bag() {
    let client = Arc::new(full_run_client());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = EngineBuilder::new()
        .build(client.clone())
        .generate(input(), &NoopProgress, &cancel)
        .await;

    assert!(matches!(
        result.outcome,
        Err(PipelineError::Cancelled {
            before: Stage::Research
        })
    ));
    assert!(result.intermediate.completed_stages().is_empty());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let engine = Arc::new(EngineBuilder::new().build(Arc::new(
        ScriptedClient::new()
            .reply(ModelRole::Research, replies::RESEARCH)
            .reply(ModelRole::Research, "no json here"),
    )));

    let cancel = CancellationToken::new();
    let a = engine.generate(input(), &NoopProgress, &cancel);
    let b = engine.generate(input(), &NoopProgress, &cancel);
    let (a, b) = tokio::join!(a, b);

    assert_ne!(a.run_id, b.run_id);
    let research_done = [&a, &b]
        .iter()
        .filter(|r| r.intermediate.research.is_some())
        .count();
    assert_eq!(research_done, 1);
}

// ── Standalone analyzer ──

#[tokio::test]
async fn test_analyze_runs_only_the_scorer() {
    let client = Arc::new(
        ScriptedClient::new().reply(
            ModelRole::Optimizer,
            replies::scorer([95.0, 95.0, 95.0, 95.0, 95.0, 95.0, 95.0]),
        ),
    );
    let engine = EngineBuilder::new().build(client.clone());

    let score = engine
        .analyze("Any Title", "# Any Title\n\nBody text.")
        .await
        .unwrap();

    assert_eq!(score.weighted_score, 95.0);
    assert_eq!(score.rating, Rating::Exceptional);
    assert!(!score.structure.has_faq);
    assert_eq!(call_roles(&client), vec![ModelRole::Optimizer]);
}
