use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use llamasum_common::{logger, AppConfig, LlamasumError};
use llamasum_llm::{OllamaClient, PromptMode};
use llamasum_pipeline::{CancellationToken, DeliveryStrategy, Pipeline, PipelineOutput, PipelineRequest};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "llamasum")]
#[command(about = "Summarize text, articles and YouTube videos with a local Ollama model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Five key bullet points followed by a 500 word essay
    Summary(RunArgs),

    /// An opinionated Twitter response
    Tweet(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Text, article URL or YouTube URL ("-" or omitted reads stdin)
    input: Option<String>,

    /// Custom instruction replacing the built-in one
    #[arg(short, long)]
    prompt: Option<String>,

    /// Chat model name
    #[arg(long)]
    model: Option<String>,

    /// Maximum tokens per chunk
    #[arg(long)]
    max_tokens: Option<usize>,

    /// How chunk prompts are sent to the model
    #[arg(long, value_enum, default_value_t = Strategy::Combined)]
    strategy: Strategy,

    /// Ollama base URL
    #[arg(long)]
    ollama_url: Option<String>,

    /// Do not check for (and pull) the model before running
    #[arg(long)]
    skip_model_check: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// All chunk prompts in one message
    Combined,
    /// One request per chunk
    PerChunk,
}

impl From<Strategy> for DeliveryStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Combined => DeliveryStrategy::Combined,
            Strategy::PerChunk => DeliveryStrategy::PerChunk,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load environment variables from .env at project root
    load_dotenv_from_project_root();

    let (mode, args) = match cli.command {
        Commands::Summary(args) => (PromptMode::Summary, args),
        Commands::Tweet(args) => (PromptMode::Tweet, args),
    };

    if let Err(e) = run(mode, args).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<LlamasumError>()
            .map(LlamasumError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(mode: PromptMode, args: RunArgs) -> Result<()> {
    let config = load_config(&args)?;

    logger::init_logging(config.log_dir.as_deref(), &config.log_level)?;

    let input = read_input(args.input.as_deref()).await?;

    let backend = Arc::new(OllamaClient::new(
        config.ollama_base_url.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?);

    if !args.skip_model_check {
        backend.ensure_model(&config.llm_model).await?;
    }

    let pipeline = Arc::new(
        Pipeline::from_config(&config, backend)?.with_strategy(args.strategy.into()),
    );

    let mut request = PipelineRequest::new(input, mode);
    if let Some(prompt) = args.prompt {
        request = request.with_instruction(prompt);
    }

    tracing::info!("Running {} with model {}", mode, config.llm_model);
    let output = run_cancellable(pipeline, request).await?;

    print_output(&output, args.json)
}

/// Apply command line overrides on top of the environment
fn load_config(args: &RunArgs) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;

    if let Some(model) = &args.model {
        config.llm_model = model.clone();
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_chunk_tokens = max_tokens;
    }
    if let Some(url) = &args.ollama_url {
        config.ollama_base_url = url.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        Some(text) if text != "-" => Ok(text.to_string()),
        _ => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read input from stdin")?;
            Ok(buffer)
        }
    }
}

/// Run the pipeline off the main task so Ctrl-C can cancel it
async fn run_cancellable(pipeline: Arc<Pipeline>, request: PipelineRequest) -> Result<PipelineOutput> {
    let cancel = CancellationToken::new();

    let token = cancel.clone();
    let mut task = tokio::spawn(async move { pipeline.run(request, &token).await });

    let result = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, cancelling...");
            cancel.cancel();
            task.await
        }
    };

    let output = result.context("Pipeline task failed")??;
    Ok(output)
}

fn print_output(output: &PipelineOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
    } else {
        println!("{}", output.text);
    }
    Ok(())
}
