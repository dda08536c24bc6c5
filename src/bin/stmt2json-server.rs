//! HTTP server binary for stmt2json.
//!
//! Binds the upload API and serves until interrupted. The LLM provider is
//! resolved once at startup; a misconfigured provider fails fast here
//! rather than on the first request.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::net::SocketAddr;
use stmt2json::server::AppState;
use stmt2json::ExtractionConfig;
use tracing_subscriber::EnvFilter;

/// Serve the statement-extraction upload API.
#[derive(Parser, Debug)]
#[command(
    name = "stmt2json-server",
    version,
    about = "HTTP API for extracting structured transactions from bank statements"
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "STMT2JSON_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "STMT2JSON_PORT", default_value_t = 8000)]
    port: u16,

    /// LLM model ID.
    #[arg(long, env = "STMT2JSON_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(long, env = "STMT2JSON_PROVIDER")]
    provider: Option<String>,

    /// Maximum characters per extraction chunk.
    #[arg(long, env = "STMT2JSON_MAX_CHARS", default_value_t = 6000)]
    max_chars: usize,

    /// Maximum upload size in bytes.
    #[arg(long, env = "STMT2JSON_MAX_UPLOAD", default_value_t = 16 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Number of concurrent extraction calls per request.
    #[arg(long, env = "STMT2JSON_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Per-chunk LLM call timeout in seconds.
    #[arg(long, env = "STMT2JSON_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let mut builder = ExtractionConfig::builder()
        .max_chars_per_chunk(cli.max_chars)
        .max_upload_bytes(cli.max_upload_bytes)
        .concurrency(cli.concurrency)
        .api_timeout_secs(cli.api_timeout);
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    let state = AppState::from_config(config)
        .await
        .context("Failed to initialise LLM provider")?;

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .context("Invalid host/port")?;

    stmt2json::server::serve(addr, state)
        .await
        .context("Server failed")?;

    Ok(())
}
