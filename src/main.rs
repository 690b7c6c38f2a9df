use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use clientbook::config::Config;
use clientbook::db::{CredentialStore, CustomerStore, MemoryStore, PgStore};
use clientbook::rate_limit::LOGIN_WINDOW;
use clientbook::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!("Starting clientbook");

    let (credentials, customers): (Arc<dyn CredentialStore>, Arc<dyn CustomerStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Migrations applied");

                let store = Arc::new(PgStore::new(pool));
                (store.clone() as Arc<dyn CredentialStore>, store as Arc<dyn CustomerStore>)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                (store.clone() as Arc<dyn CredentialStore>, store as Arc<dyn CustomerStore>)
            }
        };

    tracing::info!(upload_dir = %config.upload_dir.display(), "File storage ready");

    let addr = SocketAddr::new(config.host, config.port);
    let state = Arc::new(AppState::new(config, credentials, customers));

    // Prune stale login-failure windows
    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(LOGIN_WINDOW);
        loop {
            tick.tick().await;
            sweeper.auth.limiter().cleanup();
        }
    });

    let app = clientbook::build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
