//! Topic research: findings, statistics, gaps and candidate links.

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::EngineConfig;
use crate::decode;
use crate::error::StageError;
use crate::prompt::PromptTemplate;
use crate::provider::ModelClient;
use crate::sanitize::sanitize_for_prompt;

use super::Stage;

const KEYWORDS_FALLBACK: &str = "none specified";

const INTRO: &str = "You are a research assistant for a content creation engine. Your job is to do DEEP research on a topic and return structured, actionable insights.";

const REQUIREMENTS: &str = r#"## WHAT I NEED FROM YOU

### 1. FACTUAL RESEARCH
- Current statistics and data (with years - nothing older than 2 years unless it's foundational)
- Studies and research findings
- Industry trends and changes
- Expert opinions and quotes (with attribution)

### 2. COMPETITOR CONTENT ANALYSIS
- What are the top-ranking articles saying about this?
- What angles are they taking?
- What questions are they answering?

### 3. CONTENT GAPS
- What are competitors MISSING?
- What questions are people asking that aren't being answered well?
- What controversial or underexplored angles exist?
- What would make OUR article different and better?

### 4. SOURCE URLS
- Provide actual URLs for every fact and statistic
- Prioritize authoritative sources (.gov, .edu, reputable publications)
- Include at least 5-10 solid sources

### 5. SEARCH INTENT
- What is someone searching for this topic actually trying to achieve?
- What problem are they trying to solve?
- Where are they in their journey (awareness, consideration, decision)?"#;

const OUTPUT_FORMAT: &str = r#"## OUTPUT FORMAT

Return your research as JSON:

{
  "topic": "the topic researched",
  "searchIntent": "what the searcher wants to achieve",
  "keyFindings": [
    "Key finding 1 with specific data",
    "Key finding 2 with specific data"
  ],
  "statistics": [
    {
      "stat": "73% of companies...",
      "source": "Source name",
      "url": "https://...",
      "year": 2024
    }
  ],
  "competitorGaps": [
    "Gap 1: Most articles don't address...",
    "Gap 2: Nobody is talking about..."
  ],
  "controversialAngles": [
    "Hot take: Actually, the conventional wisdom is wrong because..."
  ],
  "questionsToAnswer": [
    "Question people are asking 1",
    "Question people are asking 2"
  ],
  "sources": [
    {
      "title": "Article title",
      "url": "https://...",
      "snippet": "Relevant excerpt",
      "authority": "high|medium|low"
    }
  ],
  "suggestedOutboundLinks": [
    {
      "url": "https://...",
      "anchor": "suggested anchor text",
      "reason": "why this is a good link"
    }
  ]
}

Be thorough. This research is the foundation for content that needs to rank AND provide genuine value."#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchOutput {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub search_intent: String,
    pub key_findings: Vec<String>,
    pub statistics: Vec<Statistic>,
    #[serde(default)]
    pub competitor_gaps: Vec<String>,
    #[serde(default)]
    pub controversial_angles: Vec<String>,
    pub questions_to_answer: Vec<String>,
    pub sources: Vec<Source>,
    #[serde(default)]
    pub suggested_outbound_links: Vec<OutboundLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    pub stat: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
}

impl Statistic {
    /// `stat (source, year)` as used in the writer prompt.
    pub fn cited(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({}, {})", self.stat, self.source, year),
            None => format!("{} ({})", self.stat, self.source),
        }
    }
}

/// Case-insensitive tag; missing or unrecognised values count as low.
fn lenient_authority<'de, D>(deserializer: D) -> Result<Authority, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(
        match value.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref() {
            Some("high") => Authority::High,
            Some("medium") => Authority::Medium,
            _ => Authority::Low,
        },
    )
}

/// Accepts `2024`, `"2024"` or `null`; anything else becomes `None`.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Authority {
    High,
    Medium,
    #[default]
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, deserialize_with = "lenient_authority")]
    pub authority: Authority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundLink {
    pub url: String,
    #[serde(default)]
    pub anchor: String,
    #[serde(default)]
    pub reason: String,
}

pub fn build_prompt(topic: &str, keywords: &[String]) -> String {
    let keywords = if keywords.is_empty() {
        KEYWORDS_FALLBACK.to_string()
    } else {
        keywords.join(", ")
    };

    PromptTemplate::new()
        .text(INTRO)
        .text(format!(
            "## YOUR TASK\n\nResearch the following topic comprehensively:\n{}\n\nTarget keywords to consider: {}",
            sanitize_for_prompt(topic),
            sanitize_for_prompt(&keywords)
        ))
        .text(REQUIREMENTS)
        .text(OUTPUT_FORMAT)
        .render()
}

pub async fn run_research(
    client: &dyn ModelClient,
    config: &EngineConfig,
    topic: &str,
    keywords: &[String],
) -> Result<ResearchOutput, StageError> {
    let prompt = build_prompt(topic, keywords);
    let reply = super::complete(client, config, Stage::Research, prompt, false).await?;

    let mut research: ResearchOutput = decode::decode_object(Stage::Research, &reply)?;
    if research.topic.trim().is_empty() {
        research.topic = topic.to_string();
    }
    Ok(research)
}
