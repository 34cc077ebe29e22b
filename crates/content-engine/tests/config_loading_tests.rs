//! Table-driven tests for engine config loading and validation.

use std::io::Write;

use content_engine::config::{load_config, load_config_from_str, ModelRole, ProviderKind};
use content_engine::ConfigError;
use tempfile::NamedTempFile;

/// Represents a single config loading test case.
struct ConfigTestCase {
    /// Test case name for identification.
    name: &'static str,
    /// The config JSON content to test.
    config_json: &'static str,
    /// Whether loading should succeed.
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "empty_object_uses_builtin_registry",
        config_json: "{}",
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "override_one_model",
        config_json: r#"{
            "models": {
                "writer": {
                    "provider": "openai",
                    "model": "gpt-4o",
                    "endpoint": "https://api.openai.com/v1/chat/completions"
                }
            }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "custom_weights_summing_to_one",
        config_json: r#"{
            "scoring": {
                "title_power": 0.2,
                "human_voice": 0.2,
                "content_quality": 0.2,
                "visual_engagement": 0.1,
                "technical_seo": 0.1,
                "internal_ecosystem": 0.1,
                "ai_visibility": 0.1
            }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "weights_not_summing_to_one",
        config_json: r#"{
            "scoring": {
                "title_power": 0.5,
                "human_voice": 0.5,
                "content_quality": 0.5,
                "visual_engagement": 0.0,
                "technical_seo": 0.0,
                "internal_ecosystem": 0.0,
                "ai_visibility": 0.0
            }
        }"#,
        should_succeed: false,
        expected_error: Some("must sum to 1.0"),
    },
    ConfigTestCase {
        name: "unknown_provider",
        config_json: r#"{
            "models": {
                "research": {"provider": "mistral", "model": "m", "endpoint": "https://x"}
            }
        }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "endpoint_without_scheme",
        config_json: r#"{
            "models": {
                "research": {"provider": "perplexity", "model": "m", "endpoint": "api.perplexity.ai"}
            }
        }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "inverted_title_range",
        config_json: r#"{
            "requirements": {
                "title_length": {"min": 70, "max": 50}
            }
        }"#,
        should_succeed: false,
        expected_error: Some("title_length"),
    },
    ConfigTestCase {
        name: "zero_retry_attempts",
        config_json: r#"{"resilience": {"retry": {"max_attempts": 0}}}"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "unsupported_version",
        config_json: r#"{"version": "2.0"}"#,
        should_succeed: false,
        expected_error: Some("Unsupported config version"),
    },
    ConfigTestCase {
        name: "invalid_json",
        config_json: r#"{"models": "#,
        should_succeed: false,
        expected_error: Some("parse"),
    },
];

#[test]
fn test_config_loading_table() {
    for case in CONFIG_TESTS {
        let result = load_config_from_str(case.config_json);
        match (case.should_succeed, &result) {
            (true, Ok(_)) => {}
            (true, Err(e)) => panic!("{}: expected success, got error: {}", case.name, e),
            (false, Ok(_)) => panic!("{}: expected failure, got success", case.name),
            (false, Err(e)) => {
                if let Some(expected) = case.expected_error {
                    assert!(
                        e.to_string().contains(expected),
                        "{}: error '{}' does not contain '{}'",
                        case.name,
                        e,
                        expected
                    );
                }
            }
        }
    }
}

#[test]
fn test_partial_models_keep_defaults_for_other_roles() {
    let config = load_config_from_str(
        r#"{"models": {"writer": {"provider": "openai", "model": "gpt-4o", "endpoint": "https://api.openai.com/v1/chat/completions"}}}"#,
    )
    .unwrap();

    assert_eq!(
        config.models.binding(ModelRole::Writer).provider,
        ProviderKind::Openai
    );
    assert_eq!(
        config.models.binding(ModelRole::Research).provider,
        ProviderKind::Perplexity
    );
}

#[test]
fn test_load_from_file_and_missing_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"resilience": {{"timeout_secs": 30}}}}"#).unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.resilience.timeout_secs, 30);

    let missing = load_config("/nonexistent/engine.json");
    assert!(matches!(missing, Err(ConfigError::ReadFile { .. })));
}
