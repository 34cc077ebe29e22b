use std::path::Path;

use crate::config::schema::{ContentRequirements, EngineConfig, Range};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

const WEIGHT_TOLERANCE: f64 = 1e-6;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<EngineConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: EngineConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

/// Semantic checks the schema cannot express.
pub fn validate_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let sum = config.scoring.sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ConfigError::InvalidWeights { sum });
    }

    validate_requirements(&config.requirements)?;

    let retry = &config.resilience.retry;
    if retry.max_attempts == 0 {
        return Err(ConfigError::Validation {
            message: "retry.max_attempts must be at least 1".to_string(),
        });
    }
    if retry.initial_delay_ms > retry.max_delay_ms {
        return Err(ConfigError::Validation {
            message: format!(
                "retry.initial_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                retry.initial_delay_ms, retry.max_delay_ms
            ),
        });
    }

    Ok(())
}

fn validate_requirements(requirements: &ContentRequirements) -> Result<(), ConfigError> {
    if requirements.min_word_count > requirements.max_word_count {
        return Err(ConfigError::Validation {
            message: format!(
                "min_word_count ({}) exceeds max_word_count ({})",
                requirements.min_word_count, requirements.max_word_count
            ),
        });
    }

    for (name, range) in [
        ("title_length", requirements.title_length),
        ("meta_desc_length", requirements.meta_desc_length),
        ("heading_interval", requirements.heading_interval),
    ] {
        check_range(name, range)?;
    }

    Ok(())
}

fn check_range(name: &str, range: Range) -> Result<(), ConfigError> {
    if range.min > range.max {
        return Err(ConfigError::Validation {
            message: format!("{}: min {} exceeds max {}", name, range.min, range.max),
        });
    }
    Ok(())
}
