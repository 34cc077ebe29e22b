//! Run input and the final assembled article.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::content;
use crate::personality::Author;
use crate::stages::optimizer::{Breadcrumb, SchemaMarkup};
use crate::stages::research::Source;
use crate::stages::scorer::Rating;
use crate::stages::{
    HumanizerOutput, IdeaOutput, OptimizerOutput, ResearchOutput, ScorerOutput, WriterOutput,
};

/// Author-supplied raw material. Each field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInjection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_story: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_take: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_thoughts: Option<String>,
}

impl VoiceInjection {
    pub fn is_empty(&self) -> bool {
        [
            &self.personal_story,
            &self.hot_take,
            &self.real_example,
            &self.raw_thoughts,
        ]
        .iter()
        .all(|f| f.as_deref().map(str::trim).unwrap_or_default().is_empty())
    }
}

/// Everything a run starts from. Never modified during the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInput {
    pub topic: String,
    pub author: Author,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silo: Option<String>,
    #[serde(default)]
    pub voice_injection: VoiceInjection,
    #[serde(default)]
    pub target_keywords: Vec<String>,
}

impl ArticleInput {
    pub fn new(topic: impl Into<String>, author: Author) -> Self {
        Self {
            topic: topic.into(),
            author,
            silo: None,
            voice_injection: VoiceInjection::default(),
            target_keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleMeta {
    pub title: String,
    pub description: String,
    /// Primary keyword first, then the secondary ones.
    pub keywords: Vec<String>,
    pub schema: SchemaMarkup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSummary {
    pub sources: Vec<Source>,
    pub statistics: Vec<String>,
    pub gaps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalLink {
    /// Sentence after which the link goes.
    pub text: String,
    pub url: String,
    pub anchor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub url: String,
    pub anchor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoBlock {
    pub internal_links: Vec<InternalLink>,
    pub external_links: Vec<ExternalLink>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// The recomputed weighted score.
    pub total: f64,
    pub rating: Rating,
    /// Category score by rubric key.
    pub breakdown: BTreeMap<String, f64>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleOutput {
    pub slug: String,
    pub title: String,
    pub author: Author,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silo: Option<String>,
    pub content: String,
    pub excerpt: String,
    pub meta: ArticleMeta,
    pub research: ResearchSummary,
    pub seo: SeoBlock,
    pub score: ScoreSummary,
    pub related_ideas: Vec<String>,
    pub word_count: usize,
    /// Minutes, `ceil(word_count / 200)`.
    pub read_time: usize,
}

/// Site path of a published article.
pub fn article_url(slug: &str) -> String {
    format!("/tales/{}", slug)
}

impl ArticleOutput {
    /// Cross-references the six stage outputs into the final artifact.
    /// Word count is the writer's figure for the draft.
    pub fn assemble(
        input: &ArticleInput,
        research: &ResearchOutput,
        draft: &WriterOutput,
        humanized: &HumanizerOutput,
        optimized: &OptimizerOutput,
        score: &ScorerOutput,
        ideas: &[IdeaOutput],
    ) -> Self {
        let mut keywords = vec![optimized.keywords.primary.clone()];
        keywords.extend(optimized.keywords.secondary.iter().cloned());

        Self {
            slug: optimized.meta.slug.clone(),
            title: draft.title.clone(),
            author: input.author,
            silo: input.silo.clone(),
            content: humanized.content.clone(),
            excerpt: content::excerpt(&humanized.content),
            meta: ArticleMeta {
                title: optimized.meta.title.clone(),
                description: optimized.meta.description.clone(),
                keywords,
                schema: optimized.schema.clone(),
            },
            research: ResearchSummary {
                sources: research.sources.clone(),
                statistics: research.statistics.iter().map(|s| s.stat.clone()).collect(),
                gaps: research.competitor_gaps.clone(),
            },
            seo: SeoBlock {
                internal_links: optimized
                    .internal_links
                    .iter()
                    .map(|l| InternalLink {
                        text: l.insert_after.clone(),
                        url: article_url(l.slug()),
                        anchor: l.anchor_text.clone(),
                    })
                    .collect(),
                external_links: research
                    .suggested_outbound_links
                    .iter()
                    .map(|l| ExternalLink {
                        url: l.url.clone(),
                        anchor: l.anchor.clone(),
                    })
                    .collect(),
                breadcrumbs: optimized.breadcrumbs.clone(),
            },
            score: ScoreSummary {
                total: score.weighted_score,
                rating: score.rating,
                breakdown: score
                    .scores
                    .named()
                    .iter()
                    .map(|(key, c)| (key.to_string(), c.score))
                    .collect(),
                suggestions: score
                    .prioritized_improvements
                    .iter()
                    .map(|i| i.action.clone())
                    .collect(),
            },
            related_ideas: ideas.iter().map(|i| i.title.clone()).collect(),
            word_count: draft.word_count,
            read_time: content::read_time(draft.word_count),
        }
    }
}
