use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use daybook_api::deploy::ADMIN_KEY_HEADER;
use daybook_api::*;

use crate::retry::{retry_get, RetryConfig};

/// Non-2xx answer from the server, carrying the status and the server's
/// `{"error": ...}` message.
#[derive(Debug, thiserror::Error)]
#[error("HTTP {status}: {message}")]
pub struct ApiStatusError {
    pub status: u16,
    pub message: String,
}

impl ApiStatusError {
    /// Status of an `anyhow` error produced by this client, if it was an HTTP error.
    pub fn status_of(err: &anyhow::Error) -> Option<u16> {
        err.downcast_ref::<ApiStatusError>().map(|e| e.status)
    }
}

/// Typed HTTP client for the daybook API.
///
/// Authenticated methods send the stored session token as a bearer token.
/// GET requests are retried on network errors and 5xx responses.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    retry: RetryConfig,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn set_auth(&mut self, token: String) {
        self.auth_token = Some(token);
    }

    pub fn clear_auth(&mut self) {
        self.auth_token = None;
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn token_or_bail(&self) -> Result<&str> {
        self.auth_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("not logged in (run `daybook login`)"))
    }

    // ── Request plumbing ──────────────────────────────────────────────────

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let resp = retry_get(&self.client, &url, self.auth_token.as_deref(), &self.retry).await?;
        parse_response(resp).await
    }

    async fn send_json<B, T>(&self, method: reqwest::Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;
        parse_response(resp).await
    }

    async fn delete_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.token_or_bail()?;
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;
        parse_response(resp).await
    }

    async fn post_public<B: Serialize + ?Sized, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;
        parse_response(resp).await
    }

    // ── Health ────────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_json("/health").await
    }

    // ── Auth ──────────────────────────────────────────────────────────────

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse> {
        self.post_public("/auth/register", req).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse> {
        self.post_public("/auth/login", req).await
    }

    pub async fn google_login(&self, req: &GoogleLoginRequest) -> Result<AuthResponse> {
        self.post_public("/auth/google", req).await
    }

    pub async fn logout(&self) -> Result<OkResponse> {
        self.send_json(reqwest::Method::POST, "/auth/logout", &serde_json::json!({}))
            .await
    }

    pub async fn me(&self) -> Result<User> {
        self.token_or_bail()?;
        self.get_json("/auth/me").await
    }

    // ── Tasks ─────────────────────────────────────────────────────────────

    pub async fn list_tasks(&self, category: Category) -> Result<Vec<Task>> {
        self.token_or_bail()?;
        self.get_json(&format!("/tasks/{category}")).await
    }

    pub async fn create_task(&self, category: Category, req: &CreateTaskRequest) -> Result<Task> {
        self.send_json(reqwest::Method::POST, &format!("/tasks/{category}"), req)
            .await
    }

    pub async fn update_task(&self, id: i64, req: &UpdateTaskRequest) -> Result<Task> {
        self.send_json(reqwest::Method::PATCH, &format!("/tasks/{id}"), req)
            .await
    }

    pub async fn delete_task(&self, id: i64) -> Result<OkResponse> {
        self.delete_json(&format!("/tasks/{id}")).await
    }

    // ── Mood ──────────────────────────────────────────────────────────────

    pub async fn list_moods(&self) -> Result<Vec<MoodEntry>> {
        self.token_or_bail()?;
        self.get_json("/mood").await
    }

    pub async fn log_mood(&self, mood: &str) -> Result<MoodEntry> {
        let req = CreateMoodRequest {
            mood: mood.to_string(),
        };
        self.send_json(reqwest::Method::POST, "/mood", &req).await
    }

    // ── Gratitude & notes ─────────────────────────────────────────────────

    pub async fn list_gratitude(&self) -> Result<Vec<TextEntry>> {
        self.token_or_bail()?;
        self.get_json("/gratitude").await
    }

    pub async fn add_gratitude(&self, content: &str) -> Result<TextEntry> {
        let req = CreateTextEntryRequest {
            content: content.to_string(),
        };
        self.send_json(reqwest::Method::POST, "/gratitude", &req)
            .await
    }

    pub async fn delete_gratitude(&self, id: i64) -> Result<OkResponse> {
        self.delete_json(&format!("/gratitude/{id}")).await
    }

    pub async fn list_notes(&self) -> Result<Vec<TextEntry>> {
        self.token_or_bail()?;
        self.get_json("/notes").await
    }

    pub async fn add_note(&self, content: &str) -> Result<TextEntry> {
        let req = CreateTextEntryRequest {
            content: content.to_string(),
        };
        self.send_json(reqwest::Method::POST, "/notes", &req).await
    }

    pub async fn delete_note(&self, id: i64) -> Result<OkResponse> {
        self.delete_json(&format!("/notes/{id}")).await
    }

    // ── Data wipes ────────────────────────────────────────────────────────

    /// Delete every task, mood, gratitude entry and note of the current user.
    pub async fn wipe_my_data(&self) -> Result<WipeResponse> {
        self.delete_json("/user/data").await
    }

    /// Delete all content on the server. Needs the deployment's admin key,
    /// not a user session.
    pub async fn admin_wipe(&self, admin_key: &str) -> Result<WipeResponse> {
        let resp = self
            .client
            .delete(self.url("/data"))
            .header(ADMIN_KEY_HEADER, admin_key)
            .send()
            .await
            .context("request to /data failed")?;
        parse_response(resp).await
    }

    // ── Raw helpers (for integration tests / advanced usage) ──────────────

    /// Unauthenticated POST with JSON body returning the raw response.
    pub async fn post_json_raw<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }
}

/// Parse an HTTP response: return the deserialized body on 2xx,
/// or an [`ApiStatusError`] with the server's error message.
async fn parse_response<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(ApiStatusError {
            status: status.as_u16(),
            message,
        }
        .into());
    }
    Ok(resp.json().await?)
}
