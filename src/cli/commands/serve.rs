use clap::Args;
use std::sync::Arc;

use crate::config::config;
use crate::database::{DatabaseManager, EntityStore, MemoryStore, PgStore};
use crate::routes::{app, AppState};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (defaults to SOFTDESK_API_PORT, PORT or 3000)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep all data in memory instead of PostgreSQL")]
    pub memory: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let settings = config();
    tracing::info!("Starting SoftDesk API in {:?} mode", settings.environment);

    let store: Arc<dyn EntityStore> = if args.memory {
        tracing::warn!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(PgStore::new(DatabaseManager::connect().await?))
    };

    let state = AppState::new(store, settings.permissions.clone());
    let service = axum::ServiceExt::<axum::extract::Request>::into_make_service(app(state));

    let port = args.port.unwrap_or(settings.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("SoftDesk API listening on http://{}", bind_addr);
    axum::serve(listener, service).await?;
    Ok(())
}
