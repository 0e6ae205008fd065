use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use wowapi::config::AppConfig;
use wowapi::database::{DatabaseManager, MemoryStore};
use wowapi::state::AppState;

#[derive(Parser)]
#[command(name = "wowapi")]
#[command(about = "REST API over a legacy WoWonder database")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "MySQL connection URL (overrides DATABASE_URL)")]
    database_url: Option<String>,

    #[arg(long, env = "WOWAPI_IN_MEMORY", help = "Serve from an empty in-memory store instead of MySQL")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = wowapi::config::config().clone();
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    if let Some(url) = cli.database_url {
        config.database.url = Some(url);
    }

    let default_filter = if config.api.enable_request_logging {
        "wowapi=info,tower_http=info"
    } else {
        "wowapi=info,tower_http=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!("Starting wowapi in {:?} mode", config.environment);

    let state = build_state(&config, cli.in_memory).await?;
    let app = wowapi::app(state, &config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("wowapi listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn build_state(config: &AppConfig, in_memory: bool) -> anyhow::Result<AppState> {
    let limits = config.api.page_limits();
    if in_memory {
        tracing::warn!("using in-memory store; no sessions exist until inserted");
        return Ok(AppState::in_memory(Arc::new(MemoryStore::new()), limits));
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    Ok(AppState::mysql(pool, limits))
}
