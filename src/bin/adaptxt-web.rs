//! Web UI binary for adaptxt.

use adaptxt::cli::{init_tracing, EngineArgs};
use adaptxt::server::{router, DEFAULT_MAX_UPLOAD_MB};
use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;

/// Serve the adaptxt upload page and JSON API.
#[derive(Parser, Debug)]
#[command(name = "adaptxt-web", version, about = "Serve the adaptxt web UI")]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "ADAPTXT_ADDR", default_value = "127.0.0.1:8501")]
    addr: SocketAddr,

    /// Largest accepted request body, in megabytes.
    #[arg(long, env = "ADAPTXT_MAX_UPLOAD_MB", default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    max_upload_mb: usize,

    #[command(flatten)]
    engine: EngineArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ADAPTXT_VERBOSE")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, env = "ADAPTXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet, false);

    let config = cli.engine.builder().build().context("Invalid configuration")?;
    let app = router(config, cli.max_upload_mb * 1024 * 1024);

    let listener = tokio::net::TcpListener::bind(cli.addr)
        .await
        .with_context(|| format!("Failed to bind {}", cli.addr))?;
    info!("Listening on http://{}", cli.addr);
    println!("Listening on http://{}", cli.addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
