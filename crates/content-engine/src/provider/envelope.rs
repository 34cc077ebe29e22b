//! Provider wire formats.
//!
//! Three envelope families cover every supported provider:
//!
//! | Family            | Providers                 | Reply text                               |
//! |-------------------|---------------------------|------------------------------------------|
//! | Chat completions  | perplexity, xai, openai   | `choices[0].message.content`             |
//! | Messages          | anthropic                 | `content[0].text`                        |
//! | Generate content  | google                    | `candidates[0].content.parts[0].text`    |
//!
//! Nothing here touches credentials; [`AuthScheme`] only says where the key
//! goes and the HTTP client attaches it.

use serde_json::{json, Map, Value};

use crate::config::{ModelBinding, ProviderKind};

use super::CompletionRequest;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Where a provider expects its API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>` plus `anthropic-version`
    ApiKeyHeader,
    /// `?key=<key>` query parameter
    QueryKey,
}

pub fn auth_scheme(provider: ProviderKind) -> AuthScheme {
    match provider {
        ProviderKind::Perplexity | ProviderKind::Xai | ProviderKind::Openai => AuthScheme::Bearer,
        ProviderKind::Anthropic => AuthScheme::ApiKeyHeader,
        ProviderKind::Google => AuthScheme::QueryKey,
    }
}

/// Full request URL for a binding. For google the configured endpoint is the
/// API base and the model is part of the path.
pub fn request_url(binding: &ModelBinding) -> String {
    match binding.provider {
        ProviderKind::Google => format!(
            "{}/models/{}:generateContent",
            binding.endpoint.trim_end_matches('/'),
            binding.model
        ),
        _ => binding.endpoint.clone(),
    }
}

pub fn build_body(binding: &ModelBinding, request: &CompletionRequest) -> Value {
    match binding.provider {
        ProviderKind::Perplexity | ProviderKind::Xai | ProviderKind::Openai => {
            chat_body(binding, request)
        }
        ProviderKind::Anthropic => messages_body(binding, request),
        ProviderKind::Google => generate_content_body(request),
    }
}

fn user_messages(prompt: &str) -> Value {
    json!([{ "role": "user", "content": prompt }])
}

fn chat_body(binding: &ModelBinding, request: &CompletionRequest) -> Value {
    let mut body = Map::new();
    body.insert("model".into(), json!(binding.model));
    body.insert("messages".into(), user_messages(&request.prompt));
    body.insert("max_tokens".into(), json!(request.max_tokens));
    if let Some(t) = request.temperature {
        body.insert("temperature".into(), json!(t));
    }
    // Only the OpenAI API itself accepts response_format reliably.
    if request.json_mode && binding.provider == ProviderKind::Openai {
        body.insert("response_format".into(), json!({ "type": "json_object" }));
    }
    Value::Object(body)
}

fn messages_body(binding: &ModelBinding, request: &CompletionRequest) -> Value {
    let mut body = Map::new();
    body.insert("model".into(), json!(binding.model));
    body.insert("max_tokens".into(), json!(request.max_tokens));
    body.insert("messages".into(), user_messages(&request.prompt));
    if let Some(t) = request.temperature {
        body.insert("temperature".into(), json!(t));
    }
    Value::Object(body)
}

fn generate_content_body(request: &CompletionRequest) -> Value {
    let mut generation = Map::new();
    if let Some(t) = request.temperature {
        generation.insert("temperature".into(), json!(t));
    }
    generation.insert("maxOutputTokens".into(), json!(request.max_tokens));
    if request.json_mode {
        generation.insert("responseMimeType".into(), json!("application/json"));
    }

    json!({
        "contents": [{ "parts": [{ "text": request.prompt }] }],
        "generationConfig": Value::Object(generation),
    })
}

/// Reply text from a provider envelope, `None` when the expected path is
/// missing or not a string.
pub fn extract_text(provider: ProviderKind, reply: &Value) -> Option<String> {
    let text = match provider {
        ProviderKind::Perplexity | ProviderKind::Xai | ProviderKind::Openai => {
            reply.pointer("/choices/0/message/content")
        }
        ProviderKind::Anthropic => reply.pointer("/content/0/text"),
        ProviderKind::Google => reply.pointer("/candidates/0/content/parts/0/text"),
    };
    text.and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelRole, ModelsConfig, StageParams};

    fn request(json_mode: bool, temperature: Option<f32>) -> CompletionRequest {
        let req = CompletionRequest::new(
            ModelRole::Optimizer,
            "score this",
            StageParams {
                temperature,
                max_tokens: 4000,
            },
        );
        if json_mode {
            req.json_mode()
        } else {
            req
        }
    }

    #[test]
    fn test_google_url_and_body() {
        let models = ModelsConfig::default();
        let binding = models.binding(ModelRole::Optimizer);
        assert_eq!(
            request_url(binding),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let body = build_body(binding, &request(true, Some(0.2)));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "score this");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4000);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_google_body_without_json_mode() {
        let models = ModelsConfig::default();
        let body = build_body(models.binding(ModelRole::Optimizer), &request(false, None));
        assert!(body["generationConfig"].get("responseMimeType").is_none());
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_anthropic_body() {
        let models = ModelsConfig::default();
        let binding = models.binding(ModelRole::Writer);
        let body = build_body(binding, &request(false, None));
        assert_eq!(body["model"], "claude-opus-4-6");
        assert_eq!(body["max_tokens"], 4000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(auth_scheme(binding.provider), AuthScheme::ApiKeyHeader);
        assert_eq!(request_url(binding), binding.endpoint);
    }

    #[test]
    fn test_chat_body_json_mode_only_for_openai() {
        let xai = ModelBinding {
            provider: ProviderKind::Xai,
            model: "grok".into(),
            endpoint: "https://api.x.ai/v1/chat/completions".into(),
        };
        let body = build_body(&xai, &request(true, None));
        assert!(body.get("response_format").is_none());

        let openai = ModelBinding {
            provider: ProviderKind::Openai,
            ..xai
        };
        let body = build_body(&openai, &request(true, None));
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_extract_text_per_family() {
        let chat = json!({"choices": [{"message": {"content": "hi"}}]});
        assert_eq!(
            extract_text(ProviderKind::Perplexity, &chat).as_deref(),
            Some("hi")
        );

        let messages = json!({"content": [{"type": "text", "text": "draft"}]});
        assert_eq!(
            extract_text(ProviderKind::Anthropic, &messages).as_deref(),
            Some("draft")
        );

        let gemini = json!({"candidates": [{"content": {"parts": [{"text": "{}"}]}}]});
        assert_eq!(
            extract_text(ProviderKind::Google, &gemini).as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn test_extract_text_missing_path() {
        assert!(extract_text(ProviderKind::Google, &json!({"candidates": []})).is_none());
        assert!(extract_text(ProviderKind::Xai, &json!({"choices": [{"message": {}}]})).is_none());
    }
}
