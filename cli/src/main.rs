//! Command-line runner: generates one article (or scores existing content)
//! and writes the results to an output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use content_engine::config::ModelsConfig;
use content_engine::secrets::env_var_for;
use content_engine::{
    load_config, ApiKeys, ArticleInput, Author, ContentEngine, EngineConfig, GenerationResult,
    HttpModelClient, LogProgress, ModelRole, ResilientClient, StaticArticleIndex, VoiceInjection,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;

const SAMPLE_INPUT: &str = include_str!("../sample-input.json");

#[derive(Parser, Debug)]
#[command(name = "content-engine")]
#[command(about = "Generate, humanize, optimize and score articles")]
#[command(version)]
struct Cli {
    /// `KEY=value` file with provider API keys
    #[arg(long, global = true, default_value = ".env.local")]
    env_file: PathBuf,

    /// Engine config JSON; built-in defaults when omitted
    #[arg(long, global = true, env = "CONTENT_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory the results are written to
    #[arg(long, global = true, default_value = "output")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full six-stage pipeline
    Generate(GenerateArgs),
    /// Score an existing markdown article
    Score {
        #[arg(long)]
        title: String,
        /// Markdown file holding the article body
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// JSON file with the full article input
    #[arg(long, conflicts_with_all = ["topic", "author"])]
    input: Option<PathBuf>,

    #[arg(long, requires = "author")]
    topic: Option<String>,

    /// stepten, pinky, reina or clark
    #[arg(long, requires = "topic")]
    author: Option<Author>,

    #[arg(long)]
    silo: Option<String>,

    /// Target keyword, repeatable
    #[arg(long = "keyword")]
    keywords: Vec<String>,

    #[arg(long)]
    personal_story: Option<String>,

    #[arg(long)]
    hot_take: Option<String>,

    #[arg(long)]
    real_example: Option<String>,

    #[arg(long)]
    raw_thoughts: Option<String>,
}

impl GenerateArgs {
    fn into_input(self) -> Result<ArticleInput> {
        if let Some(path) = &self.input {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {}", path.display()))?;
            return serde_json::from_str(&raw)
                .with_context(|| format!("Invalid article input in {}", path.display()));
        }

        let (Some(topic), Some(author)) = (self.topic, self.author) else {
            info!("No input given, using the built-in sample article");
            return serde_json::from_str(SAMPLE_INPUT).context("Built-in sample input is invalid");
        };

        Ok(ArticleInput {
            topic,
            author,
            silo: self.silo,
            voice_injection: VoiceInjection {
                personal_story: self.personal_story,
                hot_take: self.hot_take,
                real_example: self.real_example,
                raw_thoughts: self.raw_thoughts,
            },
            target_keywords: self.keywords,
        })
    }
}

fn init_tracing() -> Result<()> {
    tracing_log::LogTracer::init().context("Failed to bridge log records into tracing")?;

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

/// Fails early, naming the environment variables, when a needed key is absent.
fn check_credentials(models: &ModelsConfig, keys: &ApiKeys, roles: &[ModelRole]) -> Result<()> {
    let mut missing: Vec<&str> = roles
        .iter()
        .map(|role| models.binding(*role).provider)
        .filter(|provider| !keys.contains(*provider))
        .map(env_var_for)
        .collect();
    missing.sort_unstable();
    missing.dedup();

    if !missing.is_empty() {
        bail!("Missing API keys: {}", missing.join(", "));
    }
    Ok(())
}

fn build_engine(config: Arc<EngineConfig>, keys: ApiKeys) -> Result<ContentEngine> {
    let http = HttpModelClient::new(config.models.clone(), keys)?;
    let client = ResilientClient::new(http, &config.resilience);
    Ok(ContentEngine::new(
        config,
        Arc::new(client),
        Arc::new(StaticArticleIndex::empty()),
    ))
}

fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn result_json(result: &GenerationResult) -> serde_json::Value {
    let (article, error) = match &result.outcome {
        Ok(article) => (serde_json::to_value(article).ok(), None),
        Err(e) => (None, Some(e.to_string())),
    };
    serde_json::json!({
        "runId": result.run_id.to_string(),
        "success": result.is_success(),
        "error": error,
        "article": article,
        "intermediate": result.intermediate,
    })
}

async fn generate(
    env_file: &Path,
    output_dir: &Path,
    config: Arc<EngineConfig>,
    args: GenerateArgs,
) -> Result<()> {
    let input = args.into_input()?;
    let keys = ApiKeys::from_env_file(env_file)?;
    check_credentials(&config.models, &keys, &ModelRole::ALL)?;
    let engine = build_engine(config, keys)?;

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("Interrupt received, stopping after the current stage");
        handler_token.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;

    info!(author = %input.author, "Starting article generation");
    let result = engine.generate(input, &LogProgress, &cancel).await;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let json = serde_json::to_string_pretty(&result_json(&result))?;
    let result_path = write_file(output_dir, "result.json", &json)?;
    info!(path = %result_path.display(), "Full result saved");

    let article = match &result.outcome {
        Ok(article) => article,
        Err(e) => bail!("Generation failed: {}", e),
    };

    let article_path = write_file(output_dir, "article.md", &article.content)?;
    info!(path = %article_path.display(), "Article body saved");

    println!("\n--- TITLE ---\n{}", article.title);
    println!("\n--- EXCERPT ---\n{}", article.excerpt);
    println!(
        "\nScore: {:.1} ({}) | {} words | {} min read",
        article.score.total, article.score.rating, article.word_count, article.read_time
    );
    println!(
        "\n--- SCORE BREAKDOWN ---\n{}",
        serde_json::to_string_pretty(&article.score.breakdown)?
    );
    println!("\n--- SUGGESTIONS ---");
    for (i, suggestion) in article.score.suggestions.iter().enumerate() {
        println!("{}. {}", i + 1, suggestion);
    }
    Ok(())
}

async fn score(
    env_file: &Path,
    output_dir: &Path,
    config: Arc<EngineConfig>,
    title: &str,
    file: &Path,
) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let keys = ApiKeys::from_env_file(env_file)?;
    check_credentials(&config.models, &keys, &[ModelRole::Optimizer])?;
    let engine = build_engine(config, keys)?;

    let scored = engine.analyze(title, &content).await?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let path = write_file(
        output_dir,
        "score.json",
        &serde_json::to_string_pretty(&scored)?,
    )?;
    info!(path = %path.display(), "Score saved");

    println!("Score: {:.1} ({})", scored.weighted_score, scored.rating);
    for improvement in &scored.prioritized_improvements {
        println!("{}. {}", improvement.priority, improvement.action);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let config = Arc::new(config);

    match cli.command {
        Command::Generate(args) => generate(&cli.env_file, &cli.output_dir, config, args).await,
        Command::Score { title, file } => {
            score(&cli.env_file, &cli.output_dir, config, &title, &file).await
        }
    }
}
