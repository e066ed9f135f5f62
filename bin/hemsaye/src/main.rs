//! # Hemsaye Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::path::PathBuf;
use std::sync::Arc;

use configs::AppConfig;
use hs_api::chat::ProgressionLocks;
use hs_api::policy::Policy;
use hs_api::state::AppState;
use hs_core::SalonBus;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Feature-gated imports: the compiled-to-order plugin set.
#[cfg(feature = "db-sqlite")]
use hs_db_sqlite::SqliteStore;

#[cfg(feature = "storage-local")]
use hs_storage_local::LocalMediaStore;

#[cfg(feature = "auth-simple")]
use hs_auth_simple::PlainCredentialGate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = AppConfig::load()?;

    // 1. Record store
    #[cfg(feature = "db-sqlite")]
    let store = Arc::new(SqliteStore::connect(&cfg.database_url).await?);

    // 2. Media store
    let uploads_dir = PathBuf::from(&cfg.uploads_dir);
    tokio::fs::create_dir_all(&uploads_dir).await?;
    #[cfg(feature = "storage-local")]
    let media = LocalMediaStore::new(
        uploads_dir.clone(),
        format!("{}/uploads", cfg.public_base_url),
    );

    // 3. Credential gate
    #[cfg(feature = "auth-simple")]
    let gate = PlainCredentialGate;

    // 4. Shared state: one SQLite pool behind all five record ports.
    let address = cfg.socket_addr();
    let state = Arc::new(AppState {
        users: store.clone(),
        messages: store.clone(),
        theories: store.clone(),
        archives: store.clone(),
        settings: store,
        media: Arc::new(media),
        gate: Arc::new(gate),
        bus: SalonBus::new(cfg.bus_capacity),
        progression: ProgressionLocks::default(),
        policy: Policy::new(cfg.founder),
        founder_password: cfg.founder_password,
        xp_per_message: cfg.xp_per_message,
        uploads_dir,
    });

    // 5. Base accounts, then the full HTTP surface
    hs_api::seed::boot(&state).await?;
    let app = hs_api::router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "hemsaye listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hemsaye stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
