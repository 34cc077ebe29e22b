//! Follow-up article ideas linked to the current one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::content;
use crate::decode;
use crate::error::StageError;
use crate::personality::Author;
use crate::prompt::PromptTemplate;
use crate::provider::ModelClient;

use super::Stage;

/// Ideas kept per run.
pub const MAX_IDEAS: usize = 5;

/// Words of the article sent as its summary.
pub const SUMMARY_WORDS: usize = 500;

const INTRO: &str = "Based on this article, generate 5 related article ideas that would:
1. Be valuable to the same audience
2. Create opportunities for internal linking
3. Cover related but distinct topics
4. Fill content gaps in this subject area";

const REQUIREMENTS: &str = "## REQUIREMENTS FOR EACH IDEA

1. Should be linkable TO from this article (contextually relevant)
2. Should be able to link BACK to this article
3. Different enough to not cannibalize this article's keywords
4. Specific enough to be actionable
5. Interesting enough that someone would want to read it";

const OUTPUT_FORMAT: &str = r#"## OUTPUT FORMAT

Return as JSON array:

[
  {
    "title": "Suggested title with number and power word",
    "topic": "Brief description of what this article would cover",
    "angle": "The unique angle or perspective",
    "targetKeyword": "Primary keyword to target",
    "linkOpportunity": "How this connects to the original article",
    "suggestedAuthor": "stepten|pinky|reina|clark - who should write this",
    "priority": 1-5
  }
]

Make these genuinely good ideas - things that would actually rank and provide value."#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaOutput {
    pub title: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub angle: String,
    #[serde(default)]
    pub target_keyword: String,
    #[serde(default)]
    pub link_opportunity: String,
    pub suggested_author: Author,
    /// 1 (highest) to 5.
    pub priority: u8,
}

/// First 500 words followed by `...`.
pub fn content_summary(content: &str) -> String {
    format!("{}...", content::first_words(content, SUMMARY_WORDS))
}

pub fn build_prompt(title: &str, topic: &str, content: &str) -> String {
    PromptTemplate::new()
        .text(INTRO)
        .text(format!(
            "## THE ARTICLE\n\nTitle: {}\nTopic: {}\n\nContent Summary:\n{}",
            title,
            topic,
            content_summary(content)
        ))
        .text(REQUIREMENTS)
        .text(OUTPUT_FORMAT)
        .render()
}

pub async fn run_ideas(
    client: &dyn ModelClient,
    config: &EngineConfig,
    title: &str,
    topic: &str,
    content: &str,
) -> Result<Vec<IdeaOutput>, StageError> {
    let prompt = build_prompt(title, topic, content);
    let reply = super::complete(client, config, Stage::Ideas, prompt, false).await?;
    let mut ideas: Vec<IdeaOutput> = decode::decode_array(Stage::Ideas, &reply)?;

    if let Some(idea) = ideas.iter().find(|i| !(1..=5).contains(&i.priority)) {
        return Err(StageError::contract(
            Stage::Ideas,
            format!("priority {} of '{}' outside 1..=5", idea.priority, idea.title),
        ));
    }

    if ideas.len() > MAX_IDEAS {
        debug!(returned = ideas.len(), "Dropping ideas beyond the first {}", MAX_IDEAS);
        ideas.truncate(MAX_IDEAS);
    }
    Ok(ideas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelRole;
    use crate::provider::ScriptedClient;

    fn idea_json(n: usize) -> String {
        let items: Vec<String> = (1..=n)
            .map(|i| {
                format!(
                    r#"{{"title": "Idea {}", "topic": "t", "angle": "a", "targetKeyword": "k", "linkOpportunity": "l", "suggestedAuthor": "reina", "priority": {}}}"#,
                    i,
                    (i % 5) + 1
                )
            })
            .collect();
        format!("Here you go:\n[{}]\nEnjoy!", items.join(",\n"))
    }

    #[test]
    fn test_summary_uses_first_500_words() {
        let content = "word ".repeat(800);
        let summary = content_summary(&content);
        assert_eq!(summary.split_whitespace().count(), 500);
        assert!(summary.ends_with("word..."));
    }

    #[test]
    fn test_prompt_contains_article_fields() {
        let prompt = build_prompt("My Title", "My Topic", "short body");
        assert!(prompt.contains("Title: My Title\nTopic: My Topic"));
        assert!(prompt.contains("Content Summary:\nshort body..."));
    }

    #[tokio::test]
    async fn test_run_ideas_parses_array() {
        let client = ScriptedClient::new().reply(ModelRole::Optimizer, idea_json(5));
        let ideas = run_ideas(&client, &EngineConfig::default(), "T", "X", "body")
            .await
            .unwrap();
        assert_eq!(ideas.len(), 5);
        assert_eq!(ideas[0].suggested_author, Author::Reina);
        assert_eq!(client.requests()[0].max_tokens, 2000);
    }

    #[tokio::test]
    async fn test_run_ideas_keeps_at_most_five() {
        let client = ScriptedClient::new().reply(ModelRole::Optimizer, idea_json(8));
        let ideas = run_ideas(&client, &EngineConfig::default(), "T", "X", "body")
            .await
            .unwrap();
        assert_eq!(ideas.len(), MAX_IDEAS);
        assert_eq!(ideas[4].title, "Idea 5");
    }

    #[tokio::test]
    async fn test_run_ideas_without_array_is_extraction_error() {
        let client = ScriptedClient::new().reply(ModelRole::Optimizer, "{\"title\": \"x\"}");
        let err = run_ideas(&client, &EngineConfig::default(), "T", "X", "body")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StageError::Extraction {
                stage: Stage::Ideas,
                expected: "array"
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_author_is_contract_error() {
        let reply = r#"[{"title": "x", "suggestedAuthor": "brain", "priority": 1}]"#;
        let client = ScriptedClient::new().reply(ModelRole::Optimizer, reply);
        let err = run_ideas(&client, &EngineConfig::default(), "T", "X", "body")
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Contract { .. }));
    }
}
