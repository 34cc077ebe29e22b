use serde::{Deserialize, Serialize};

/// Wire family of a generative-model vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Perplexity,
    Anthropic,
    Xai,
    Google,
    Openai,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Perplexity => write!(f, "perplexity"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::Xai => write!(f, "xai"),
            ProviderKind::Google => write!(f, "google"),
            ProviderKind::Openai => write!(f, "openai"),
        }
    }
}

impl ProviderKind {
    /// Model family name shown in progress messages.
    pub fn family(&self) -> &'static str {
        match self {
            ProviderKind::Perplexity => "Perplexity",
            ProviderKind::Anthropic => "Claude",
            ProviderKind::Xai => "Grok",
            ProviderKind::Google => "Gemini",
            ProviderKind::Openai => "GPT",
        }
    }
}

/// Logical provider role a stage is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelRole {
    Research,
    Writer,
    Humanizer,
    /// Shared by the optimizer, scorer and idea-generation stages.
    Optimizer,
}

impl ModelRole {
    pub const ALL: [ModelRole; 4] = [
        ModelRole::Research,
        ModelRole::Writer,
        ModelRole::Humanizer,
        ModelRole::Optimizer,
    ];
}

impl std::fmt::Display for ModelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelRole::Research => write!(f, "research"),
            ModelRole::Writer => write!(f, "writer"),
            ModelRole::Humanizer => write!(f, "humanizer"),
            ModelRole::Optimizer => write!(f, "optimizer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBinding {
    pub provider: ProviderKind,
    pub model: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_research_model")]
    pub research: ModelBinding,
    #[serde(default = "default_writer_model")]
    pub writer: ModelBinding,
    #[serde(default = "default_humanizer_model")]
    pub humanizer: ModelBinding,
    #[serde(default = "default_optimizer_model")]
    pub optimizer: ModelBinding,
}

impl ModelsConfig {
    pub fn binding(&self, role: ModelRole) -> &ModelBinding {
        match role {
            ModelRole::Research => &self.research,
            ModelRole::Writer => &self.writer,
            ModelRole::Humanizer => &self.humanizer,
            ModelRole::Optimizer => &self.optimizer,
        }
    }
}

fn default_research_model() -> ModelBinding {
    ModelBinding {
        provider: ProviderKind::Perplexity,
        model: "sonar-pro".to_string(),
        endpoint: "https://api.perplexity.ai/chat/completions".to_string(),
    }
}

fn default_writer_model() -> ModelBinding {
    ModelBinding {
        provider: ProviderKind::Anthropic,
        model: "claude-opus-4-6".to_string(),
        endpoint: "https://api.anthropic.com/v1/messages".to_string(),
    }
}

fn default_humanizer_model() -> ModelBinding {
    ModelBinding {
        provider: ProviderKind::Xai,
        model: "grok-4-1-fast-reasoning".to_string(),
        endpoint: "https://api.x.ai/v1/chat/completions".to_string(),
    }
}

fn default_optimizer_model() -> ModelBinding {
    ModelBinding {
        provider: ProviderKind::Google,
        model: "gemini-2.5-flash".to_string(),
        endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            research: default_research_model(),
            writer: default_writer_model(),
            humanizer: default_humanizer_model(),
            optimizer: default_optimizer_model(),
        }
    }
}

/// Weights of the seven rubric categories, in rubric order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub title_power: f64,
    pub human_voice: f64,
    pub content_quality: f64,
    pub visual_engagement: f64,
    pub technical_seo: f64,
    pub internal_ecosystem: f64,
    pub ai_visibility: f64,
}

impl ScoringWeights {
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.title_power,
            self.human_voice,
            self.content_quality,
            self.visual_engagement,
            self.technical_seo,
            self.internal_ecosystem,
            self.ai_visibility,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_power: 0.10,
            human_voice: 0.25,
            content_quality: 0.20,
            visual_engagement: 0.15,
            technical_seo: 0.15,
            internal_ecosystem: 0.10,
            ai_visibility: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequirements {
    #[serde(default = "default_min_word_count")]
    pub min_word_count: u32,
    #[serde(default = "default_max_word_count")]
    pub max_word_count: u32,
    #[serde(default = "default_title_length")]
    pub title_length: Range,
    #[serde(default = "default_meta_desc_length")]
    pub meta_desc_length: Range,
    /// Words between second-level headings.
    #[serde(default = "default_heading_interval")]
    pub heading_interval: Range,
    #[serde(default = "default_paragraph_max_sentences")]
    pub paragraph_max_sentences: u32,
    #[serde(default = "default_internal_links_min")]
    pub internal_links_min: u32,
    #[serde(default = "default_external_links_min")]
    pub external_links_min: u32,
}

fn default_min_word_count() -> u32 {
    1000
}

fn default_max_word_count() -> u32 {
    4000
}

fn default_title_length() -> Range {
    Range { min: 50, max: 60 }
}

fn default_meta_desc_length() -> Range {
    Range { min: 120, max: 155 }
}

fn default_heading_interval() -> Range {
    Range { min: 150, max: 300 }
}

fn default_paragraph_max_sentences() -> u32 {
    4
}

fn default_internal_links_min() -> u32 {
    2
}

fn default_external_links_min() -> u32 {
    1
}

impl Default for ContentRequirements {
    fn default() -> Self {
        Self {
            min_word_count: default_min_word_count(),
            max_word_count: default_max_word_count(),
            title_length: default_title_length(),
            meta_desc_length: default_meta_desc_length(),
            heading_interval: default_heading_interval(),
            paragraph_max_sentences: default_paragraph_max_sentences(),
            internal_links_min: default_internal_links_min(),
            external_links_min: default_external_links_min(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerWords {
    pub urgency: Vec<String>,
    pub emotion: Vec<String>,
    pub curiosity: Vec<String>,
    pub authority: Vec<String>,
    pub benefit: Vec<String>,
}

impl PowerWords {
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.urgency
            .iter()
            .chain(&self.emotion)
            .chain(&self.curiosity)
            .chain(&self.authority)
            .chain(&self.benefit)
            .map(String::as_str)
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for PowerWords {
    fn default() -> Self {
        Self {
            urgency: words(&["brutal", "urgent", "critical", "essential", "must-know"]),
            emotion: words(&["shocking", "heartbreaking", "inspiring", "infuriating"]),
            curiosity: words(&[
                "secret",
                "hidden",
                "surprising",
                "strange",
                "nobody-talks-about",
            ]),
            authority: words(&["proven", "research-backed", "expert", "definitive"]),
            benefit: words(&["simple", "easy", "quick", "guaranteed", "effortless"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures that open the circuit.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// How long an open circuit refuses calls before a half-open probe.
    #[serde(default = "default_open_secs")]
    pub open_secs: u64,
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_open_secs() -> u64 {
    60
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            open_secs: default_open_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Sampling parameters for one stage's provider call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageParams {
    #[serde(default)]
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageParamsConfig {
    #[serde(default = "default_research_params")]
    pub research: StageParams,
    #[serde(default = "default_writer_params")]
    pub writer: StageParams,
    #[serde(default = "default_humanizer_params")]
    pub humanizer: StageParams,
    #[serde(default = "default_optimizer_params")]
    pub optimizer: StageParams,
    #[serde(default = "default_scorer_params")]
    pub scorer: StageParams,
    #[serde(default = "default_ideas_params")]
    pub ideas: StageParams,
}

fn default_research_params() -> StageParams {
    StageParams {
        temperature: None,
        max_tokens: 4000,
    }
}

fn default_writer_params() -> StageParams {
    StageParams {
        temperature: None,
        max_tokens: 8000,
    }
}

fn default_humanizer_params() -> StageParams {
    StageParams {
        temperature: None,
        max_tokens: 8000,
    }
}

fn default_optimizer_params() -> StageParams {
    StageParams {
        temperature: Some(0.3),
        max_tokens: 4000,
    }
}

fn default_scorer_params() -> StageParams {
    StageParams {
        temperature: Some(0.2),
        max_tokens: 4000,
    }
}

fn default_ideas_params() -> StageParams {
    StageParams {
        temperature: Some(0.7),
        max_tokens: 2000,
    }
}

impl Default for StageParamsConfig {
    fn default() -> Self {
        Self {
            research: default_research_params(),
            writer: default_writer_params(),
            humanizer: default_humanizer_params(),
            optimizer: default_optimizer_params(),
            scorer: default_scorer_params(),
            ideas: default_ideas_params(),
        }
    }
}

/// Read-only registry shared by every stage of every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub scoring: ScoringWeights,
    #[serde(default)]
    pub requirements: ContentRequirements,
    #[serde(default)]
    pub power_words: PowerWords,
    #[serde(default)]
    pub resilience: ResilienceConfig,
    #[serde(default)]
    pub stage_params: StageParamsConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            models: ModelsConfig::default(),
            scoring: ScoringWeights::default(),
            requirements: ContentRequirements::default(),
            power_words: PowerWords::default(),
            resilience: ResilienceConfig::default(),
            stage_params: StageParamsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = ScoringWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shared_role_binding() {
        let models = ModelsConfig::default();
        assert_eq!(
            models.binding(ModelRole::Optimizer).provider,
            ProviderKind::Google
        );
        assert_eq!(models.binding(ModelRole::Writer).model, "claude-opus-4-6");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"resilience": {"timeout_secs": 5}}"#).unwrap();
        assert_eq!(config.resilience.timeout_secs, 5);
        assert_eq!(config.resilience.retry.max_attempts, 3);
        assert_eq!(config.stage_params.scorer.temperature, Some(0.2));
        assert_eq!(config.requirements.title_length, Range { min: 50, max: 60 });
    }

    #[test]
    fn test_power_words_iterates_every_group() {
        let power_words = PowerWords::default();
        let words: Vec<&str> = power_words.all().collect();
        assert!(words.contains(&"brutal"));
        assert!(words.contains(&"effortless"));
        assert_eq!(words.len(), 23);
    }
}
