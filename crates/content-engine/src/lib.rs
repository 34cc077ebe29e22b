pub mod article;
pub mod catalog;
pub mod config;
pub mod content;
pub mod decode;
pub mod error;
pub mod personality;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod sanitize;
pub mod secrets;
pub mod stages;

pub use article::{ArticleInput, ArticleOutput, VoiceInjection};
pub use catalog::{ArticleIndex, ExistingArticle, StaticArticleIndex};
pub use config::{load_config, load_config_from_str, EngineConfig, ModelRole, ProviderKind};
pub use error::{ConfigError, EngineError, ProviderError, Result, StageError};
pub use personality::{personality, Author, Personality, UnknownAuthor};
pub use pipeline::{
    BroadcastProgress, ContentEngine, GenerationResult, LogProgress, NoopProgress,
    PipelineContext, PipelineError, ProgressEvent, ProgressReporter, StageStatus,
};
pub use provider::{HttpModelClient, ModelClient, ResilientClient, ScriptedClient};
pub use secrets::{resolve_secret, resolve_secret_optional, ApiKeys, SecretError};
pub use stages::{Rating, ScorerOutput, Stage};
