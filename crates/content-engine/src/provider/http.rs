//! HTTP transport for model providers.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::Value;

use crate::config::{ModelsConfig, ProviderKind};
use crate::error::ProviderError;
use crate::sanitize;
use crate::secrets::ApiKeys;

use super::envelope::{self, AuthScheme, ANTHROPIC_VERSION};
use super::{CompletionRequest, ModelClient};

/// Maximum length of an error body carried into a [`ProviderError`].
const MAX_ERROR_BODY_LENGTH: usize = 200;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to the provider bound to each role over HTTPS.
///
/// Holds no per-run state beyond the credentials it was built with, so one
/// instance can serve concurrent runs.
pub struct HttpModelClient {
    client: Client,
    models: ModelsConfig,
    keys: ApiKeys,
}

impl HttpModelClient {
    pub fn new(models: ModelsConfig, keys: ApiKeys) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            models,
            keys,
        })
    }

    /// Providers whose role has no credential configured.
    pub fn missing_credentials(&self) -> Vec<ProviderKind> {
        let mut missing: Vec<ProviderKind> = crate::config::ModelRole::ALL
            .iter()
            .map(|role| self.models.binding(*role).provider)
            .filter(|provider| !self.keys.contains(*provider))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let role = request.role;
        let binding = self.models.binding(role);
        let key = self
            .keys
            .get(binding.provider)
            .ok_or_else(|| ProviderError::MissingCredential {
                provider: binding.provider.to_string(),
            })?;

        let url = envelope::request_url(binding);
        let body = envelope::build_body(binding, request);

        debug!(
            "POST {} ({} {}, {} prompt chars)",
            sanitize::redact_url(&url),
            binding.provider,
            binding.model,
            request.prompt.chars().count()
        );

        let mut builder = self.client.post(&url).json(&body);
        builder = match envelope::auth_scheme(binding.provider) {
            AuthScheme::Bearer => builder.bearer_auth(key.expose_secret()),
            AuthScheme::ApiKeyHeader => builder
                .header("x-api-key", key.expose_secret())
                .header("anthropic-version", ANTHROPIC_VERSION),
            AuthScheme::QueryKey => builder.query(&[("key", key.expose_secret())]),
        };

        // reqwest errors embed the request URL, which carries the key for
        // query-authenticated providers.
        let response = builder.send().await.map_err(|e| {
            let e = e.without_url();
            if e.is_timeout() {
                ProviderError::Timeout {
                    role,
                    seconds: DEFAULT_CONNECT_TIMEOUT.as_secs(),
                }
            } else {
                ProviderError::Transport {
                    role,
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "{} provider returned HTTP {}: {}",
                role,
                status.as_u16(),
                sanitize::truncate(&body, MAX_ERROR_BODY_LENGTH)
            );
            return Err(ProviderError::Status {
                role,
                status: status.as_u16(),
                body: sanitize::truncate(&body, MAX_ERROR_BODY_LENGTH),
            });
        }

        let reply: Value = response.json().await.map_err(|e| ProviderError::Decode {
            role,
            message: e.without_url().to_string(),
        })?;

        match envelope::extract_text(binding.provider, &reply) {
            Some(text) => Ok(text),
            None => {
                warn!(
                    "{} provider reply had no text: {}",
                    role,
                    sanitize::for_log(&reply.to_string())
                );
                Ok(String::new())
            }
        }
    }
}
