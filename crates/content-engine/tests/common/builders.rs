//! Builders for scripted clients and engines.

#![allow(dead_code)]

use std::sync::Arc;

use content_engine::catalog::{ArticleIndex, ExistingArticle, StaticArticleIndex};
use content_engine::{ContentEngine, EngineConfig, ModelRole, ScriptedClient, Stage};

use super::replies;

/// Category scores of the reference scenario: weighted 35.0.
pub const REFERENCE_SCORES: [f64; 7] = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0];

/// Scripted client answering every stage up to and including `last`.
pub fn client_through(last: Stage) -> ScriptedClient {
    let client = ScriptedClient::new();
    for stage in Stage::ALL {
        let reply = match stage {
            Stage::Research => replies::RESEARCH.to_string(),
            Stage::Writer => replies::DRAFT.to_string(),
            Stage::Humanizer => replies::HUMANIZED.to_string(),
            Stage::Optimizer => replies::OPTIMIZER.to_string(),
            Stage::Scorer => replies::scorer(REFERENCE_SCORES),
            Stage::Ideas => replies::IDEAS.to_string(),
        };
        client.push(stage.role(), Ok(reply));
        if stage == last {
            break;
        }
    }
    client
}

/// Scripted client answering all six stages.
pub fn full_run_client() -> ScriptedClient {
    client_through(Stage::Ideas)
}

pub fn existing_articles() -> Vec<ExistingArticle> {
    vec![ExistingArticle {
        slug: "async-first-hiring".to_string(),
        title: "Async-First Hiring".to_string(),
        excerpt: "How we hire across time zones.".to_string(),
    }]
}

/// Builder for `ContentEngine` instances backed by a scripted client.
pub struct EngineBuilder {
    config: EngineConfig,
    index: Arc<dyn ArticleIndex>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            index: Arc::new(StaticArticleIndex::new(existing_articles())),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn index(mut self, index: Arc<dyn ArticleIndex>) -> Self {
        self.index = index;
        self
    }

    pub fn build(self, client: Arc<ScriptedClient>) -> ContentEngine {
        ContentEngine::new(Arc::new(self.config), client, self.index)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Roles in the order the client saw them.
pub fn call_roles(client: &ScriptedClient) -> Vec<ModelRole> {
    client.requests().iter().map(|r| r.role).collect()
}
