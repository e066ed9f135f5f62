#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use hs_api::chat::ProgressionLocks;
use hs_api::policy::Policy;
use hs_api::state::AppState;
use hs_auth_simple::PlainCredentialGate;
use hs_core::SalonBus;
use hs_db_sqlite::SqliteStore;
use hs_storage_local::LocalMediaStore;
use secrecy::SecretString;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A full Hemsaye instance on an ephemeral port, backed by an in-memory
/// SQLite store and a temp uploads directory. Startup seeding has already
/// run when `spawn` returns.
pub struct TestServer {
    pub address: SocketAddr,
    pub http: reqwest::Client,
    _uploads: TempDir,
}

impl TestServer {
    pub async fn spawn() -> anyhow::Result<Self> {
        let store = Arc::new(SqliteStore::in_memory().await?);
        let uploads = tempfile::tempdir()?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;

        let media = LocalMediaStore::new(
            uploads.path().to_path_buf(),
            format!("http://{address}/uploads"),
        );

        let state = Arc::new(AppState {
            users: store.clone(),
            messages: store.clone(),
            theories: store.clone(),
            archives: store.clone(),
            settings: store,
            media: Arc::new(media),
            gate: Arc::new(PlainCredentialGate),
            bus: SalonBus::new(64),
            progression: ProgressionLocks::default(),
            policy: Policy::new("Excer"),
            founder_password: SecretString::from("Kabus99qwer."),
            xp_per_message: 10,
            uploads_dir: uploads.path().to_path_buf(),
        });

        hs_api::seed::boot(&state).await?;

        let app = hs_api::router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self {
            address,
            http: reqwest::Client::new(),
            _uploads: uploads,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.address)
    }
}
