use backend::api::{self, AppState};
use backend::config::{ServerConfig, StoreBackend};
use backend::session::SessionHandler;
use backend::store::{DataAccess, MemoryDataAccess, SqlDataAccess};

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("backend=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn DataAccess> = match &config.store {
        StoreBackend::Memory => {
            info!("using in-memory store");
            Arc::new(MemoryDataAccess::new())
        }
        StoreBackend::Sqlite(url) => {
            info!(%url, "connecting to database");
            let store = SqlDataAccess::connect(url).await?;
            store.init_schema().await?;
            Arc::new(store)
        }
    };

    let sessions = Arc::new(SessionHandler::new(store));
    let app = api::router(AppState::new(sessions, config.outbound_buffer));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "session server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
