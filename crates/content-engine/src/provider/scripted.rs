//! Canned-reply client for tests and offline runs.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ModelRole;
use crate::error::ProviderError;

use super::{CompletionRequest, ModelClient};

/// Replies queued per role and handed out in order. Every request is
/// recorded so tests can inspect the prompts that were sent.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<HashMap<ModelRole, VecDeque<Result<String, ProviderError>>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    latency: Option<Duration>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, role: ModelRole, text: impl Into<String>) -> Self {
        self.push(role, Ok(text.into()));
        self
    }

    pub fn fail(self, role: ModelRole, error: ProviderError) -> Self {
        self.push(role, Err(error));
        self
    }

    /// Delays every reply, for exercising timeouts.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn push(&self, role: ModelRole, reply: Result<String, ProviderError>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(role)
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn requests_for(&self, role: ModelRole) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.role == role)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&request.role)
            .and_then(VecDeque::pop_front);

        next.unwrap_or_else(|| {
            Err(ProviderError::Status {
                role: request.role,
                status: 404,
                body: "no scripted reply left".to_string(),
            })
        })
    }
}
