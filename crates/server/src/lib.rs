pub mod error;
pub mod routes;
pub mod storage;

use axum::{
    extract::FromRef,
    routing::{delete, get, post},
    Router,
};
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use daybook_api::crypto::DEFAULT_PBKDF2_ITERATIONS;
use daybook_api::deploy::{self, parse_bool_flag, parse_positive};
use daybook_api::google::GoogleConfig;
use storage::Db;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: AppConfig,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: Db, config: AppConfig) -> Self {
        Self {
            db,
            config,
            http: reqwest::Client::new(),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base_url: String,
    /// Empty disables `DELETE /api/data`.
    pub admin_key: String,
    pub registration_open: bool,
    pub session_days: i64,
    pub password_iterations: u32,
    pub cookie_secure: bool,
    pub google: Option<GoogleConfig>,
    pub web_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            admin_key: String::new(),
            registration_open: true,
            session_days: deploy::DEFAULT_SESSION_DAYS,
            password_iterations: DEFAULT_PBKDF2_ITERATIONS,
            cookie_secure: false,
            google: None,
            web_dir: None,
        }
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let google = env_non_empty(deploy::ENV_GOOGLE_CLIENT_ID).map(|client_id| {
            tracing::info!("Google sign-in enabled");
            GoogleConfig::new(client_id, env_non_empty(deploy::ENV_GOOGLE_TOKENINFO_URL))
        });

        let admin_key = std::env::var(deploy::ENV_ADMIN_KEY).unwrap_or_default();
        if admin_key.is_empty() {
            tracing::info!("{} not set, global wipe disabled", deploy::ENV_ADMIN_KEY);
        }

        let registration_open = env_non_empty(deploy::ENV_REGISTRATION)
            .map(|v| !v.trim().eq_ignore_ascii_case("closed"))
            .unwrap_or(true);

        let web_dir = std::env::var(deploy::ENV_WEB_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("web/build"));

        Self {
            base_url: env_non_empty("BASE_URL").unwrap_or(defaults.base_url),
            admin_key,
            registration_open,
            session_days: parse_positive(
                std::env::var(deploy::ENV_SESSION_DAYS).ok().as_deref(),
                defaults.session_days,
            ),
            password_iterations: parse_positive(
                std::env::var(deploy::ENV_PASSWORD_ITERATIONS).ok().as_deref(),
                defaults.password_iterations,
            ),
            cookie_secure: parse_bool_flag(
                std::env::var(deploy::ENV_COOKIE_SECURE).ok().as_deref(),
                false,
            ),
            google,
            web_dir: web_dir.exists().then_some(web_dir),
        }
    }
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for reqwest::Client {
    fn from_ref(state: &AppState) -> Self {
        state.http.clone()
    }
}

/// Seconds since the Unix epoch.
pub fn now_unix() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Health
        .route("/health", get(routes::health::health))
        // Auth
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/google", post(routes::auth::google))
        .route("/auth/me", get(routes::auth::me))
        // Tasks: `{key}` is a category for GET/POST and a task id for PATCH/DELETE
        .route(
            "/tasks/{key}",
            get(routes::tasks::list)
                .post(routes::tasks::create)
                .patch(routes::tasks::update)
                .delete(routes::tasks::remove),
        )
        // Mood
        .route("/mood", get(routes::mood::list).post(routes::mood::create))
        // Journals
        .route(
            "/gratitude",
            get(routes::entries::list_gratitude).post(routes::entries::create_gratitude),
        )
        .route("/gratitude/{id}", delete(routes::entries::delete_gratitude))
        .route(
            "/notes",
            get(routes::entries::list_notes).post(routes::entries::create_note),
        )
        .route("/notes/{id}", delete(routes::entries::delete_note))
        // Data wipes
        .route("/user/data", delete(routes::data::wipe_mine))
        .route("/data", delete(routes::data::wipe_all));

    let mut app = Router::new().nest("/api", api);

    if let Some(web_dir) = state.config.web_dir.as_ref() {
        tracing::info!("serving static files from {}", web_dir.display());
        let index_html = web_dir.join("index.html");
        app = app.fallback_service(ServeDir::new(web_dir).fallback(ServeFile::new(index_html)));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
