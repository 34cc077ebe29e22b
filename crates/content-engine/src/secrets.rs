//! Credential resolution for model providers.
//!
//! Keys are supplied per run by the caller and never persisted by the
//! pipeline. Each key is resolved from, in priority order:
//!
//! 1. **Direct value** - passed in by the caller
//! 2. **Key file** - a local `KEY=value` env file (e.g. `.env.local`)
//! 3. **Environment variable** - the process environment

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use crate::config::ProviderKind;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from multiple sources in priority order:
/// 1. Direct value (if provided and non-empty)
/// 2. File contents (if path provided)
/// 3. Environment variable (if name provided)
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct {
        if !value.is_empty() {
            return Ok(SecretString::from(value.to_string()));
        }
    }

    if let Some(path) = file_path {
        if !path.is_empty() {
            let expanded = expand_home(path);
            return match fs::read_to_string(&expanded) {
                Ok(content) => Ok(SecretString::from(content.trim().to_string())),
                Err(e) => Err(SecretError::FileReadError {
                    path: expanded,
                    source: e,
                }),
            };
        }
    }

    if let Some(var_name) = env_var {
        if !var_name.is_empty() {
            return match std::env::var(var_name) {
                Ok(value) => Ok(SecretString::from(value.trim())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: var_name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: var_name.to_string(),
                }),
            };
        }
    }

    Err(SecretError::NoSourceProvided)
}

/// Resolves a secret, returning None if no source is provided or the
/// environment variable is unset.
pub fn resolve_secret_optional(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<Option<SecretString>> {
    match resolve_secret(direct, file_path, env_var) {
        Ok(secret) if secret.expose_secret().is_empty() => Ok(None),
        Ok(secret) => Ok(Some(secret)),
        Err(SecretError::NoSourceProvided) | Err(SecretError::EnvVarNotSet { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Expands `~` to the user's home directory (`~user/path` is not supported).
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            if path == "~" {
                return home.to_string_lossy().into_owned();
            }
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

/// Parses `KEY=value` lines. Blank lines and `#` comments are skipped and
/// one pair of surrounding single or double quotes is stripped from values.
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Environment variable holding the key for a provider.
pub fn env_var_for(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Perplexity => "PERPLEXITY_API_KEY",
        ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        ProviderKind::Xai => "GROK_API_KEY",
        ProviderKind::Google => "GOOGLE_GENERATIVE_AI_API_KEY",
        ProviderKind::Openai => "OPENAI_API_KEY",
    }
}

/// Per-run provider credentials.
#[derive(Default)]
pub struct ApiKeys {
    keys: HashMap<ProviderKind, SecretString>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut providers: Vec<String> = self.keys.keys().map(|p| p.to_string()).collect();
        providers.sort();
        f.debug_struct("ApiKeys")
            .field("providers", &providers)
            .finish()
    }
}

impl ApiKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, provider: ProviderKind, key: impl Into<String>) -> Self {
        self.insert(provider, SecretString::from(key.into()));
        self
    }

    pub fn insert(&mut self, provider: ProviderKind, key: SecretString) {
        self.keys.insert(provider, key);
    }

    pub fn get(&self, provider: ProviderKind) -> Option<&SecretString> {
        self.keys.get(&provider)
    }

    pub fn contains(&self, provider: ProviderKind) -> bool {
        self.keys.contains_key(&provider)
    }

    /// Loads keys from the process environment only.
    pub fn from_env() -> Result<Self> {
        Self::from_values(&HashMap::new())
    }

    /// Loads keys from a `KEY=value` file, falling back to the process
    /// environment for keys the file does not define. A missing file is
    /// not an error.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let values = match fs::read_to_string(path) {
            Ok(content) => parse_env_file(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(SecretError::FileReadError {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        Self::from_values(&values)
    }

    fn from_values(values: &HashMap<String, String>) -> Result<Self> {
        let mut keys = ApiKeys::new();
        for provider in [
            ProviderKind::Perplexity,
            ProviderKind::Anthropic,
            ProviderKind::Xai,
            ProviderKind::Google,
            ProviderKind::Openai,
        ] {
            let var = env_var_for(provider);
            let direct = values.get(var).map(String::as_str);
            if let Some(secret) = resolve_secret_optional(direct, None, Some(var))? {
                keys.insert(provider, secret);
            }
        }
        Ok(keys)
    }
}
