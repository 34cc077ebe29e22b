//! Lookup of already-published articles for internal linking.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingArticle {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
}

/// Content-store collaborator. A failed lookup is not fatal to a run: the
/// optimizer then works from an empty list.
#[async_trait]
pub trait ArticleIndex: Send + Sync {
    async fn published_articles(&self) -> Result<Vec<ExistingArticle>, String>;
}

/// Fixed in-memory article list.
#[derive(Debug, Clone, Default)]
pub struct StaticArticleIndex {
    articles: Vec<ExistingArticle>,
}

impl StaticArticleIndex {
    pub fn new(articles: Vec<ExistingArticle>) -> Self {
        Self { articles }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleIndex for StaticArticleIndex {
    async fn published_articles(&self) -> Result<Vec<ExistingArticle>, String> {
        Ok(self.articles.clone())
    }
}
