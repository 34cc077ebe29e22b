use std::path::PathBuf;
use thiserror::Error;

use crate::config::ModelRole;
use crate::stages::Stage;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Credential error: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Scoring weights must sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },
}

/// Failures talking to a generative-model endpoint.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request to {role} provider failed: {message}")]
    Transport { role: ModelRole, message: String },

    #[error("{role} provider returned HTTP {status}: {body}")]
    Status {
        role: ModelRole,
        status: u16,
        body: String,
    },

    #[error("{role} provider call timed out after {seconds}s")]
    Timeout { role: ModelRole, seconds: u64 },

    #[error("Circuit open for {role} provider, call refused")]
    CircuitOpen { role: ModelRole },

    #[error("No API key configured for {provider}")]
    MissingCredential { provider: String },

    #[error("Failed to create HTTP client: {0}")]
    ClientInit(String),

    #[error("Failed to decode {role} provider envelope: {message}")]
    Decode { role: ModelRole, message: String },
}

impl ProviderError {
    /// Rate limits, server-side failures and network trouble. Request
    /// validation failures (400/401/403/404/422) are never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Transport { .. } | ProviderError::Timeout { .. } => true,
            ProviderError::Status { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            ProviderError::CircuitOpen { .. }
            | ProviderError::MissingCredential { .. }
            | ProviderError::ClientInit(_)
            | ProviderError::Decode { .. } => false,
        }
    }
}

/// Errors raised by a single pipeline stage.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{stage} provider returned an empty response")]
    EmptyResponse { stage: Stage },

    #[error("No JSON {expected} found in {stage} output")]
    Extraction {
        stage: Stage,
        expected: &'static str,
    },

    #[error("Failed to parse {stage} JSON: {reason}. Fragment was: {fragment}")]
    Parse {
        stage: Stage,
        reason: String,
        fragment: String,
    },

    #[error("{stage} output violates its contract: {message}")]
    Contract { stage: Stage, message: String },
}

impl StageError {
    pub fn contract(stage: Stage, message: impl Into<String>) -> Self {
        StageError::Contract {
            stage,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
