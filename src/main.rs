use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use token_registry::{api, cli, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cfg = config::load()?;
    init_tracing(cfg.json_logs);

    let args = cli::Cli::parse();
    if let Some(cli::Commands::Serve { port, storage_root }) = args.command {
        if let Some(port) = port {
            cfg.port = port;
        }
        if let Some(root) = storage_root {
            cfg.storage_root = root;
        }
    }

    let result = run_server(cfg).await;
    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "token_registry=debug,tower_http=debug".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_server(cfg: config::Config) -> anyhow::Result<()> {
    let port = cfg.port;
    let state = Arc::new(AppState::new(cfg));

    tracing::info!(
        storage_root = %state.images.root().display(),
        "Preparing image storage..."
    );
    state
        .images
        .init()
        .await
        .with_context(|| format!("failed to create {}", state.images.images_dir().display()))?;

    if state.config.prune_replaced_images {
        tracing::info!("Replaced images will be pruned on overwrite");
    }

    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Token registry listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
