//! Generative-model provider adapter.
//!
//! Stages only ever see [`ModelClient`]. The production implementation is
//! [`HttpModelClient`] wrapped in [`ResilientClient`]; tests use
//! [`ScriptedClient`].

pub mod envelope;
pub mod http;
pub mod resilience;
pub mod scripted;

use async_trait::async_trait;

use crate::config::{ModelRole, StageParams};
use crate::error::ProviderError;

pub use http::HttpModelClient;
pub use resilience::{CircuitBreaker, CircuitState, ResilientClient, RetryPolicy};
pub use scripted::ScriptedClient;

/// One provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub role: ModelRole,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
    /// Ask the provider for a JSON-only reply where the wire format supports it.
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn new(role: ModelRole, prompt: impl Into<String>, params: StageParams) -> Self {
        Self {
            role,
            prompt: prompt.into(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            json_mode: false,
        }
    }

    pub fn json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// Sends one prompt to the provider bound to a role and returns the reply
/// text. An empty string means the provider answered without usable text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

#[async_trait]
impl<C: ModelClient + ?Sized> ModelClient for std::sync::Arc<C> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        (**self).complete(request).await
    }
}
