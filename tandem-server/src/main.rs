use anyhow::{Context, Result};
use clap::Parser;
use tandem_server::{AppState, ServerConfig, serve};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    let filter = EnvFilter::try_new(&config.log).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Signaling server listening on ws://{}/ws", addr);

    serve(listener, AppState::new())
        .await
        .context("signaling server stopped")?;

    Ok(())
}
