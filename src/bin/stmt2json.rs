//! CLI binary for stmt2json.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use stmt2json::pipeline::input::{extract_document_text, resolve_input};
use stmt2json::{extract_statement, ExtractionConfig};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract from a statement PDF (stdout, pretty JSON)
  stmt2json statement.pdf

  # Extract from already-extracted text
  stmt2json statement.txt -o transactions.json

  # Use a specific model
  stmt2json --model gpt-4.1-mini --provider openai statement.pdf

  # Extract from a URL
  stmt2json https://example.com/statement.pdf

  # Smaller chunks for models with tight context windows
  stmt2json --max-chars 3000 --concurrency 2 statement.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  STMT2JSON_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  STMT2JSON_MODEL         Override model ID

SETUP:
  1. Set API key:   export OPENAI_API_KEY=sk-...
  2. Extract:       stmt2json statement.pdf -o transactions.json
"#;

/// Extract structured transactions from bank statements using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "stmt2json",
    version,
    about = "Extract structured transactions from bank statements using LLMs",
    long_about = "Extract structured transaction data from bank statements (PDF or plain text, \
local files or URLs) as validated JSON. Supports OpenAI, Anthropic, Google Gemini, and any \
OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local statement file path (PDF or text) or HTTP/HTTPS URL.
    input: String,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long, env = "STMT2JSON_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID (e.g. gpt-4.1-nano, llama-3.3-70b-versatile).
    #[arg(long, env = "STMT2JSON_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(
        long,
        env = "STMT2JSON_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Maximum characters per extraction chunk.
    #[arg(long, env = "STMT2JSON_MAX_CHARS", default_value_t = 6000)]
    max_chars: usize,

    /// Number of concurrent extraction calls.
    #[arg(short, long, env = "STMT2JSON_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Max LLM output tokens per chunk.
    #[arg(long, env = "STMT2JSON_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "STMT2JSON_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Per-chunk LLM call timeout in seconds.
    #[arg(long, env = "STMT2JSON_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "STMT2JSON_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Include extraction stats alongside the statement in the output.
    #[arg(long, env = "STMT2JSON_STATS")]
    stats: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "STMT2JSON_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "STMT2JSON_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the JSON result.
    #[arg(short, long, env = "STMT2JSON_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would interleave with the spinner; keep them quiet
    // unless the user asked for verbosity.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ExtractionConfig::builder()
        .max_chars_per_chunk(cli.max_chars)
        .concurrency(cli.concurrency)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Resolve input and extract text ───────────────────────────────────
    let bytes = resolve_input(&cli.input, cli.download_timeout)
        .await
        .context("Failed to read input document")?;
    let text = extract_document_text(&bytes).context("Failed to extract document text")?;

    // ── Run extraction ───────────────────────────────────────────────────
    let spinner = if cli.quiet || cli.no_progress {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Extracting transactions from {}…", cli.input));
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    };

    let result = extract_statement(&text, &config).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let output = result.context("Extraction failed")?;

    // ── Print result ─────────────────────────────────────────────────────
    let json = if cli.stats {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string_pretty(&output.statement)
    }
    .context("Failed to serialise output")?;

    match cli.output {
        Some(ref path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !cli.quiet {
                eprintln!(
                    "{} {} transactions  {}ms  →  {}",
                    green("✔"),
                    bold(&output.statement.transactions.len().to_string()),
                    output.stats.total_duration_ms,
                    bold(&path.display().to_string()),
                );
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(json.as_bytes())
                .context("Failed to write to stdout")?;
            handle.write_all(b"\n").context("Failed to write to stdout")?;
            if !cli.quiet {
                eprintln!(
                    "{} {} transactions from {} chunk(s)  {}",
                    green("✔"),
                    bold(&output.statement.transactions.len().to_string()),
                    output.stats.chunks,
                    dim(&format!("{}ms", output.stats.total_duration_ms)),
                );
            }
        }
    }

    Ok(())
}
