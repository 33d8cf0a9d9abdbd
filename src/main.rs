use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use trade_journal::api::routes::{AppState, app_router};
use trade_journal::config::Config;
use trade_journal::logging::init_logging;
use trade_journal::store::{MemoryStore, PgStore, SharedStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::from_env()?;

    let store: SharedStore = match &config.database_url {
        Some(url) => Arc::new(
            PgStore::connect(url, config.db_max_connections)
                .await
                .context("failed to connect to database")?,
        ),
        None => {
            warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = AppState {
        store,
        jwt_secret: config.jwt_secret.into_bytes(),
    };

    let app = app_router(app_state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
