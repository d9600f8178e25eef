#![allow(dead_code)]

use std::time::Duration;

use daybook_api::{AuthResponse, RegisterRequest};
use daybook_api_client::{ApiClient, RetryConfig};
use daybook_server::storage::{self, Db};
use daybook_server::{build_router, AppConfig, AppState};
use tempfile::TempDir;
use uuid::Uuid;

pub const PASSWORD: &str = "testpass99";

/// A running server over a throwaway data directory.
pub struct TestServer {
    pub base_url: String,
    pub db: Db,
    _dir: TempDir,
}

/// Defaults suitable for tests: cheap password hashing.
pub fn test_config() -> AppConfig {
    AppConfig {
        password_iterations: 1_000,
        ..AppConfig::default()
    }
}

pub async fn spawn() -> TestServer {
    spawn_with(test_config()).await
}

pub async fn spawn_with(config: AppConfig) -> TestServer {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = storage::init_db(dir.path()).expect("init db");
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        db,
        _dir: dir,
    }
}

impl TestServer {
    /// Build a full API URL from a path like `/health`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Unauthenticated client without retries.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(10))
            .expect("client")
            .with_retry(RetryConfig::none())
    }

    /// Register a fresh user and return a client holding its session token.
    pub async fn register_user(&self) -> (ApiClient, AuthResponse) {
        let short = &Uuid::new_v4().simple().to_string()[..8];
        self.register_as(&format!("user-{short}@test.local")).await
    }

    pub async fn register_as(&self, email: &str) -> (ApiClient, AuthResponse) {
        let mut client = self.client();
        let auth = client
            .register(&RegisterRequest {
                username: email.split('@').next().unwrap_or("user").to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("register");
        client.set_auth(auth.session_token.clone());
        (client, auth)
    }
}
