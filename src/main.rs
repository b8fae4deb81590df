use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use devconnector_api::config::{self, AppConfig};
use devconnector_api::database::{DatabaseManager, DocumentStore, MemoryStore, PgStore};
use devconnector_api::{app, is_production, AppState};

#[derive(Parser)]
#[command(name = "devconnector-api")]
#[command(about = "Developer profiles, posts and social engagement over HTTP")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT / API_PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Use the in-memory store even if DATABASE_URL is set")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and JWT_SECRET are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("devconnector_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config: AppConfig = config::config().clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting DevConnector API in {:?} mode", config.environment);

    let store = open_store(&config, args.in_memory).await?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, store).context("failed to build application state")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}

async fn open_store(config: &AppConfig, in_memory: bool) -> anyhow::Result<Arc<dyn DocumentStore>> {
    if in_memory || config.database.url.is_none() {
        if is_production!() {
            tracing::warn!("Running production without a database, data is lost on restart");
        }
        tracing::info!("Using in-memory document store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL")?;
    let store = PgStore::new(manager);
    store.migrate().await.context("failed to prepare documents table")?;

    tracing::info!("Using PostgreSQL document store");
    Ok(Arc::new(store))
}
