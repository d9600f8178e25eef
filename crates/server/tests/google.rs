mod common;

use axum::{extract::Query, routing::get, Json, Router};
use daybook_api::google::GoogleConfig;
use daybook_api::{GoogleLoginRequest, LoginRequest};
use daybook_api_client::ApiStatusError;
use serde_json::{json, Value};
use std::collections::HashMap;

use common::{spawn, spawn_with, test_config, TestServer, PASSWORD};

const CLIENT_ID: &str = "client-123.apps.googleusercontent.com";

/// Claims the fake tokeninfo endpoint returns for each test token.
fn claims_for(token: &str) -> Value {
    let exp = (daybook_server::now_unix() + 3600).to_string();
    let mut claims = json!({
        "iss": "https://accounts.google.com",
        "aud": CLIENT_ID,
        "sub": "google-1",
        "email": "Grace@Example.com",
        "email_verified": "true",
        "name": "Grace Hopper",
        "picture": "https://example.com/grace.png",
        "exp": exp,
    });
    match token {
        "grace" => {}
        "ada" => {
            claims["sub"] = json!("google-2");
            claims["email"] = json!("ada@example.com");
            claims["name"] = json!("Ada Lovelace");
        }
        "wrong-aud" => claims["aud"] = json!("someone-else"),
        "expired" => claims["exp"] = json!("1000"),
        _ => {
            return json!({
                "error": "invalid_token",
                "error_description": "Invalid Value",
            });
        }
    }
    claims
}

async fn spawn_tokeninfo() -> String {
    let app = Router::new().route(
        "/tokeninfo",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let token = params.get("id_token").cloned().unwrap_or_default();
            Json(claims_for(&token))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/tokeninfo")
}

async fn spawn_with_google() -> TestServer {
    let mut config = test_config();
    config.google = Some(GoogleConfig::new(
        CLIENT_ID.to_string(),
        Some(spawn_tokeninfo().await),
    ));
    spawn_with(config).await
}

fn credential(token: &str) -> GoogleLoginRequest {
    GoogleLoginRequest {
        credential: token.to_string(),
    }
}

#[tokio::test]
async fn google_sign_in_creates_then_reuses_account() {
    let server = spawn_with_google().await;
    let client = server.client();

    let first = client.google_login(&credential("grace")).await.unwrap();
    assert_eq!(first.user.email, "grace@example.com");
    assert_eq!(first.user.username, "Grace Hopper");
    assert_eq!(first.user.display_name.as_deref(), Some("Grace Hopper"));
    assert_eq!(
        first.user.avatar_url.as_deref(),
        Some("https://example.com/grace.png")
    );

    let second = client.google_login(&credential("grace")).await.unwrap();
    assert_eq!(second.user.id, first.user.id);

    let mut authed = server.client();
    authed.set_auth(second.session_token);
    assert_eq!(authed.me().await.unwrap().id, first.user.id);

    // Google-only accounts have no password to log in with
    let err = client
        .login(&LoginRequest {
            email: "grace@example.com".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap_err();
    assert_eq!(ApiStatusError::status_of(&err), Some(401));
}

#[tokio::test]
async fn google_sign_in_links_existing_email_account() {
    let server = spawn_with_google().await;
    let (_, registered) = server.register_as("ada@example.com").await;

    let linked = server
        .client()
        .google_login(&credential("ada"))
        .await
        .unwrap();
    assert_eq!(linked.user.id, registered.user.id);
    assert_eq!(linked.user.username, registered.user.username);
    assert_eq!(linked.user.display_name.as_deref(), Some("Ada Lovelace"));

    // password login keeps working after linking
    let login = server
        .client()
        .login(&LoginRequest {
            email: "ada@example.com".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap();
    assert_eq!(login.user.id, registered.user.id);
}

#[tokio::test]
async fn bad_google_tokens_are_rejected() {
    let server = spawn_with_google().await;
    let client = server.client();

    for token in ["wrong-aud", "expired", "garbage"] {
        let err = client.google_login(&credential(token)).await.unwrap_err();
        assert_eq!(ApiStatusError::status_of(&err), Some(401), "{token}");
    }

    let err = client.google_login(&credential("  ")).await.unwrap_err();
    assert_eq!(ApiStatusError::status_of(&err), Some(400));

    let users: i64 = server
        .db
        .conn()
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 0);
}

#[tokio::test]
async fn google_sign_in_respects_closed_registration() {
    let mut config = test_config();
    config.registration_open = false;
    config.google = Some(GoogleConfig::new(
        CLIENT_ID.to_string(),
        Some(spawn_tokeninfo().await),
    ));
    let server = spawn_with(config).await;

    let err = server
        .client()
        .google_login(&credential("grace"))
        .await
        .unwrap_err();
    assert_eq!(ApiStatusError::status_of(&err), Some(403));
}

#[tokio::test]
async fn google_sign_in_is_404_when_unconfigured() {
    let server = spawn().await;
    let err = server
        .client()
        .google_login(&credential("grace"))
        .await
        .unwrap_err();
    assert_eq!(ApiStatusError::status_of(&err), Some(404));
}
