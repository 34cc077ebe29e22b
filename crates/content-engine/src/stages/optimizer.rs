//! SEO metadata, keywords, link suggestions and schema markup.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::ExistingArticle;
use crate::config::{ContentRequirements, EngineConfig};
use crate::decode;
use crate::error::StageError;
use crate::prompt::PromptTemplate;
use crate::provider::ModelClient;

use super::Stage;

pub const NO_EXISTING_ARTICLES: &str = "No existing articles yet.";

const INTRO: &str = "You are an SEO optimization engine. Analyze this article and generate all required SEO elements.";

const OUTPUT_FORMAT: &str = r#"## OUTPUT FORMAT

Return as JSON:

{
  "meta": {
    "title": "Meta title here",
    "description": "Meta description here",
    "slug": "url-slug-here"
  },
  "keywords": {
    "primary": "main keyword",
    "secondary": ["keyword 2", "keyword 3", "keyword 4"],
    "longTail": ["long tail phrase 1", "long tail phrase 2"]
  },
  "internalLinks": [
    {
      "targetArticle": "slug of article to link to",
      "insertAfter": "Quote the sentence after which to insert the link",
      "anchorText": "the enriched anchor text to use",
      "reason": "why this link is relevant"
    }
  ],
  "schema": {
    "article": { /* Article JSON-LD */ },
    "breadcrumb": { /* BreadcrumbList JSON-LD */ },
    "faq": { /* FAQPage JSON-LD if applicable */ }
  },
  "breadcrumbs": [
    { "name": "Home", "url": "/" },
    { "name": "Category", "url": "/category" },
    { "name": "Article Title", "url": "/tales/slug" }
  ],
  "suggestions": [
    "SEO improvement suggestion 1",
    "SEO improvement suggestion 2"
  ]
}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaTags {
    pub title: String,
    pub description: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordSet {
    pub primary: String,
    #[serde(default)]
    pub secondary: Vec<String>,
    #[serde(default)]
    pub long_tail: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalLinkSuggestion {
    /// Slug of the existing article to link to.
    pub target_article: String,
    /// Sentence after which the link goes.
    #[serde(default)]
    pub insert_after: String,
    #[serde(default)]
    pub anchor_text: String,
    #[serde(default)]
    pub reason: String,
}

impl InternalLinkSuggestion {
    /// Target slug with any `/tales/` prefix or surrounding slashes removed,
    /// since the prompt lists existing articles by URL.
    pub fn slug(&self) -> &str {
        let target = self.target_article.trim();
        target
            .strip_prefix("/tales/")
            .unwrap_or(target)
            .trim_matches('/')
    }
}

/// JSON-LD fragments, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaMarkup {
    #[serde(default)]
    pub article: Value,
    #[serde(default)]
    pub breadcrumb: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerOutput {
    pub meta: MetaTags,
    pub keywords: KeywordSet,
    #[serde(default)]
    pub internal_links: Vec<InternalLinkSuggestion>,
    #[serde(default)]
    pub schema: SchemaMarkup,
    #[serde(default)]
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl OptimizerOutput {
    /// Link suggestions whose target slug is not among `existing`.
    pub fn unresolved_internal_links<'a>(
        &'a self,
        existing: &[ExistingArticle],
    ) -> Vec<&'a InternalLinkSuggestion> {
        self.internal_links
            .iter()
            .filter(|link| !existing.iter().any(|a| a.slug == link.slug()))
            .collect()
    }
}

/// `- title (/tales/slug): excerpt` per article.
pub fn existing_article_list(existing: &[ExistingArticle]) -> String {
    if existing.is_empty() {
        return NO_EXISTING_ARTICLES.to_string();
    }
    existing
        .iter()
        .map(|a| format!("- {} (/tales/{}): {}", a.title, a.slug, a.excerpt))
        .collect::<Vec<_>>()
        .join("\n")
}

fn task(req: &ContentRequirements) -> String {
    format!(
        "## YOUR TASK

Generate comprehensive SEO optimization for this article.

### 1. META TITLE
- {t_min}-{t_max} characters
- Include primary keyword near the start
- Make it compelling (not just descriptive)
- Different from the H1 but related

### 2. META DESCRIPTION
- {d_min}-{d_max} characters
- Include a clear call-to-action
- Mention the primary benefit
- Include primary keyword naturally

### 3. URL SLUG
- 3-5 words max
- Lowercase, hyphens only
- No dates or numbers unless essential
- Include primary keyword

### 4. PRIMARY & SECONDARY KEYWORDS
- Identify the main keyword this should rank for
- Identify 3-5 secondary keywords
- Include long-tail variations

### 5. INTERNAL LINK SUGGESTIONS
For each existing article that's relevant, suggest:
- Where in THIS article to place the link (quote the sentence)
- What anchor text to use (semantic, enriched - NOT \"click here\")
- Why this link makes sense
Only link to slugs from the list above.

### 6. SCHEMA MARKUP
Generate JSON-LD for:
- Article schema
- BreadcrumbList schema
- FAQ schema (if FAQ section exists)

### 7. BREADCRUMBS
Based on the topic, suggest the breadcrumb path:
Home > Category > Subcategory > This Article",
        t_min = req.title_length.min,
        t_max = req.title_length.max,
        d_min = req.meta_desc_length.min,
        d_max = req.meta_desc_length.max,
    )
}

pub fn build_prompt(
    title: &str,
    content: &str,
    existing: &[ExistingArticle],
    requirements: &ContentRequirements,
) -> String {
    PromptTemplate::new()
        .text(INTRO)
        .text(format!("## THE ARTICLE\n\nTitle: {}\n\nContent:\n{}", title, content))
        .block(
            "## EXISTING ARTICLES ON THE SITE (for internal linking)\n",
            existing_article_list(existing),
        )
        .text(task(requirements))
        .text(OUTPUT_FORMAT)
        .render()
}

pub async fn run_optimizer(
    client: &dyn ModelClient,
    config: &EngineConfig,
    title: &str,
    content: &str,
    existing: &[ExistingArticle],
) -> Result<OptimizerOutput, StageError> {
    let prompt = build_prompt(title, content, existing, &config.requirements);
    let reply = super::complete(client, config, Stage::Optimizer, prompt, false).await?;
    let optimized: OptimizerOutput = decode::decode_object(Stage::Optimizer, &reply)?;

    for link in optimized.unresolved_internal_links(existing) {
        warn!(
            target_slug = %link.slug(),
            "Internal link suggestion targets an unknown article"
        );
    }

    Ok(optimized)
}
