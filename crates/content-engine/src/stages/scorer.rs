//! Seven-category weighted scoring rubric.
//!
//! The provider is trusted for the subjective part only: per-category scores,
//! sub-criteria verdicts and feedback. The weighted score and the rating tier
//! are always recomputed here from the configured weights and the fixed tier
//! thresholds, whatever the provider proposed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EngineConfig, ScoringWeights};
use crate::content::StructureReport;
use crate::decode;
use crate::error::StageError;
use crate::prompt::PromptTemplate;
use crate::provider::ModelClient;

use super::Stage;

/// One rubric category as presented to the scoring model.
#[derive(Debug)]
pub struct RubricCategory {
    /// JSON key in the reply's `scores` object.
    pub key: &'static str,
    pub label: &'static str,
    /// Sub-criterion and the points it is worth.
    pub criteria: &'static [(&'static str, u32)],
}

/// Categories in weight order (see [`ScoringWeights::as_array`]).
pub static RUBRIC: [RubricCategory; 7] = [
    RubricCategory {
        key: "titlePower",
        label: "TITLE POWER",
        criteria: &[
            ("Contains a number (not a year)", 20),
            ("Contains a power word (brutal, secret, shocking, proven, etc.)", 25),
            ("Creates curiosity gap", 25),
            ("50-60 characters", 15),
            ("Keyword near start", 15),
        ],
    },
    RubricCategory {
        key: "humanVoice",
        label: "HUMAN VOICE",
        criteria: &[
            ("Personal story/experience present", 25),
            ("Unpopular opinion/hot take present", 25),
            ("Specific real-world example", 20),
            ("Thoughts NOT findable via research", 15),
            ("Conversational tone throughout", 15),
        ],
    },
    RubricCategory {
        key: "contentQuality",
        label: "CONTENT QUALITY",
        criteria: &[
            ("Topic fully covered (not padded)", 25),
            ("Unique insights not found elsewhere", 25),
            ("Proper H1→H2→H3 hierarchy", 15),
            ("Headings every 150-300 words", 15),
            ("Short paragraphs (3-4 sentences max)", 10),
            ("Bullet lists where appropriate", 10),
        ],
    },
    RubricCategory {
        key: "visualEngagement",
        label: "VISUAL ENGAGEMENT",
        criteria: &[
            ("Hero video present", 30),
            ("Featured image (custom)", 25),
            ("Infographic/diagram", 20),
            ("All images have alt text", 15),
            ("Good visual hierarchy", 10),
        ],
    },
    RubricCategory {
        key: "technicalSeo",
        label: "TECHNICAL SEO",
        criteria: &[
            ("Title tag 50-60 chars with keyword", 20),
            ("Meta description 120-155 chars", 20),
            ("URL slug short and descriptive", 15),
            ("Schema markup present", 25),
            ("No broken links", 10),
            ("Publish date visible", 10),
        ],
    },
    RubricCategory {
        key: "internalEcosystem",
        label: "INTERNAL ECOSYSTEM",
        criteria: &[
            ("2-3 internal links with enriched anchors", 35),
            ("1-2 external links to authorities", 25),
            ("Part of a content silo", 20),
            ("Breadcrumb navigation", 10),
            ("Spawned related ideas", 10),
        ],
    },
    RubricCategory {
        key: "aiVisibility",
        label: "AI VISIBILITY",
        criteria: &[
            ("Answer-first format used", 40),
            ("FAQ section included", 30),
            ("Self-contained sections", 20),
            ("Clear entity definitions", 10),
        ],
    },
];

const INTRO: &str = "You are the StepTen Content Analyzer. Your job is to score content against our methodology and provide actionable feedback.";

const OUTPUT_FORMAT: &str = r#"## OUTPUT FORMAT

Return as JSON:

{
  "scores": {
    "titlePower": {
      "score": 85,
      "maxPossible": 100,
      "breakdown": {
        "hasNumber": true,
        "hasPowerWord": true,
        "createsCuriosity": true,
        "correctLength": false,
        "keywordPosition": true
      },
      "feedback": "Strong title but slightly too long at 68 characters"
    },
    "humanVoice": {
      "score": 70,
      "maxPossible": 100,
      "breakdown": {
        "personalStory": true,
        "hotTake": false,
        "realExample": true,
        "uniqueThoughts": true,
        "conversationalTone": false
      },
      "feedback": "Good personal elements but missing a strong opinion/hot take"
    },
    "contentQuality": { /* same structure */ },
    "visualEngagement": { /* same structure */ },
    "technicalSeo": { /* same structure */ },
    "internalEcosystem": { /* same structure */ },
    "aiVisibility": { /* same structure */ }
  },
  "totalScore": 78,
  "weightedScore": 76.5,
  "rating": "GOOD",
  "topStrengths": [
    "Strong human voice with personal stories",
    "Well-structured with proper heading hierarchy"
  ],
  "topWeaknesses": [
    "Missing hero video",
    "No FAQ section for AI visibility"
  ],
  "prioritizedImprovements": [
    {
      "priority": 1,
      "category": "visualEngagement",
      "action": "Add a hero video to increase engagement",
      "impact": "High - video increases time on page by 88%"
    }
  ]
}

Be critical but constructive. The goal is to help improve the content, not just assign a number."#;

fn default_max_possible() -> f64 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub score: f64,
    #[serde(default = "default_max_possible")]
    pub max_possible: f64,
    #[serde(default)]
    pub breakdown: BTreeMap<String, bool>,
    #[serde(default)]
    pub feedback: String,
}

impl CategoryScore {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            max_possible: default_max_possible(),
            breakdown: BTreeMap::new(),
            feedback: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub title_power: CategoryScore,
    pub human_voice: CategoryScore,
    pub content_quality: CategoryScore,
    pub visual_engagement: CategoryScore,
    pub technical_seo: CategoryScore,
    pub internal_ecosystem: CategoryScore,
    pub ai_visibility: CategoryScore,
}

impl CategoryScores {
    /// Categories paired with their rubric key, in weight order.
    pub fn named(&self) -> [(&'static str, &CategoryScore); 7] {
        [
            (RUBRIC[0].key, &self.title_power),
            (RUBRIC[1].key, &self.human_voice),
            (RUBRIC[2].key, &self.content_quality),
            (RUBRIC[3].key, &self.visual_engagement),
            (RUBRIC[4].key, &self.technical_seo),
            (RUBRIC[5].key, &self.internal_ecosystem),
            (RUBRIC[6].key, &self.ai_visibility),
        ]
    }

    pub fn scores(&self) -> [f64; 7] {
        self.named().map(|(_, c)| c.score)
    }

    pub fn mean(&self) -> f64 {
        round2(self.scores().iter().sum::<f64>() / 7.0)
    }

    /// Every score within `0..=max_possible` and every `max_possible`
    /// within `0..=100`.
    pub fn check_bounds(&self) -> Result<(), String> {
        for (key, category) in self.named() {
            if !(category.max_possible >= 0.0 && category.max_possible <= 100.0) {
                return Err(format!(
                    "{}.maxPossible {} outside 0..=100",
                    key, category.max_possible
                ));
            }
            if !(category.score >= 0.0 && category.score <= category.max_possible) {
                return Err(format!(
                    "{}.score {} outside 0..={}",
                    key, category.score, category.max_possible
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rating {
    Exceptional,
    Excellent,
    Good,
    NeedsWork,
    RequiresRevision,
}

impl Rating {
    /// Tier for a weighted score; lower bounds are inclusive.
    pub fn from_weighted(score: f64) -> Self {
        if score >= 90.0 {
            Rating::Exceptional
        } else if score >= 80.0 {
            Rating::Excellent
        } else if score >= 70.0 {
            Rating::Good
        } else if score >= 60.0 {
            Rating::NeedsWork
        } else {
            Rating::RequiresRevision
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Exceptional => "EXCEPTIONAL",
            Rating::Excellent => "EXCELLENT",
            Rating::Good => "GOOD",
            Rating::NeedsWork => "NEEDS_WORK",
            Rating::RequiresRevision => "REQUIRES_REVISION",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub category: String,
    pub action: String,
    #[serde(default)]
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorerOutput {
    pub scores: CategoryScores,
    pub total_score: f64,
    pub weighted_score: f64,
    pub rating: Rating,
    pub top_strengths: Vec<String>,
    pub top_weaknesses: Vec<String>,
    pub prioritized_improvements: Vec<Improvement>,
    /// Deterministic structure check of the scored content.
    pub structure: StructureReport,
}

/// Reply as sent by the provider; its aggregates are advisory only.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScorerReply {
    scores: CategoryScores,
    #[serde(default)]
    total_score: Option<f64>,
    #[serde(default)]
    weighted_score: Option<f64>,
    #[serde(default)]
    rating: Option<String>,
    #[serde(default)]
    top_strengths: Vec<String>,
    #[serde(default)]
    top_weaknesses: Vec<String>,
    #[serde(default)]
    prioritized_improvements: Vec<Improvement>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weighted sum of the seven category scores, rounded to two decimals.
pub fn weighted_score(scores: &CategoryScores, weights: &ScoringWeights) -> f64 {
    let sum: f64 = scores
        .scores()
        .iter()
        .zip(weights.as_array())
        .map(|(score, weight)| score * weight)
        .sum();
    round2(sum)
}

fn criteria_section(weights: &ScoringWeights) -> String {
    let mut out = String::from("## SCORING CRITERIA\n\nScore each category from 0-100 based on these criteria:");
    for (i, (category, weight)) in RUBRIC.iter().zip(weights.as_array()).enumerate() {
        out.push_str(&format!(
            "\n\n### {}. {} (Weight: {}%)",
            i + 1,
            category.label,
            (weight * 100.0).round()
        ));
        for (criterion, points) in category.criteria {
            out.push_str(&format!("\n- {}: +{}", criterion, points));
        }
    }
    out
}

pub fn build_prompt(title: &str, content: &str, weights: &ScoringWeights) -> String {
    PromptTemplate::new()
        .text(INTRO)
        .text(format!(
            "## THE CONTENT TO ANALYZE\n\nTitle: {}\n\nContent:\n{}",
            title, content
        ))
        .text(criteria_section(weights))
        .text(OUTPUT_FORMAT)
        .render()
}

/// Scores any title/content pair. Usable without the rest of the pipeline.
pub async fn run_scorer(
    client: &dyn ModelClient,
    config: &EngineConfig,
    title: &str,
    content: &str,
) -> Result<ScorerOutput, StageError> {
    let prompt = build_prompt(title, content, &config.scoring);
    let reply = super::complete(client, config, Stage::Scorer, prompt, true).await?;
    let raw: RawScorerReply = decode::decode_object(Stage::Scorer, &reply)?;

    finalize(raw, content, &config.scoring)
}

fn finalize(
    raw: RawScorerReply,
    content: &str,
    weights: &ScoringWeights,
) -> Result<ScorerOutput, StageError> {
    raw.scores
        .check_bounds()
        .map_err(|message| StageError::contract(Stage::Scorer, message))?;

    let weighted = weighted_score(&raw.scores, weights);
    let rating = Rating::from_weighted(weighted);

    if let Some(proposed) = raw.weighted_score {
        if (proposed - weighted).abs() > 0.01 {
            debug!(proposed, computed = weighted, "Overriding provider weighted score");
        }
    }
    if let Some(proposed) = raw.rating.as_deref() {
        if proposed != rating.as_str() {
            debug!(proposed, computed = %rating, "Overriding provider rating");
        }
    }

    let mut improvements = raw.prioritized_improvements;
    improvements.sort_by_key(|i| i.priority);

    Ok(ScorerOutput {
        total_score: raw.total_score.unwrap_or_else(|| raw.scores.mean()),
        weighted_score: weighted,
        rating,
        scores: raw.scores,
        top_strengths: raw.top_strengths,
        top_weaknesses: raw.top_weaknesses,
        prioritized_improvements: improvements,
        structure: StructureReport::analyze(content),
    })
}
