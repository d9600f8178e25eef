use anyhow::{Context, Result};
use dialoguer::Password;

use daybook_api::{AuthResponse, LoginRequest, RegisterRequest};

use crate::config::{load_config, save_config};

fn prompt_password(confirm: bool) -> Result<String> {
    let prompt = Password::new().with_prompt("Password");
    let prompt = if confirm {
        prompt.with_confirmation("Confirm password", "Passwords do not match")
    } else {
        prompt
    };
    prompt.interact().context("failed to read password")
}

fn remember_session(auth: &AuthResponse) -> Result<()> {
    let mut config = load_config()?;
    config.session.token = auth.session_token.clone();
    save_config(&config)?;
    println!(
        "Logged in as {} <{}> (session expires {})",
        auth.user.username, auth.user.email, auth.expires_at
    );
    Ok(())
}

pub async fn run_register(email: String, username: Option<String>) -> Result<()> {
    let config = load_config()?;
    let username = username.unwrap_or_else(|| email.split('@').next().unwrap_or("").to_string());
    let password = prompt_password(true)?;

    let auth = config
        .client()?
        .register(&RegisterRequest {
            username,
            email,
            password,
        })
        .await
        .context("registration failed")?;
    remember_session(&auth)
}

pub async fn run_login(email: String) -> Result<()> {
    let config = load_config()?;
    let password = prompt_password(false)?;

    let auth = config
        .client()?
        .login(&LoginRequest { email, password })
        .await
        .context("login failed")?;
    remember_session(&auth)
}

pub async fn run_logout() -> Result<()> {
    let mut config = load_config()?;
    if !config.is_logged_in() {
        println!("Not logged in.");
        return Ok(());
    }

    // The local token is dropped even if the server is unreachable.
    if let Err(e) = config.authed_client()?.logout().await {
        tracing::warn!("server logout failed: {e:#}");
    }
    config.session.token.clear();
    save_config(&config)?;
    println!("Logged out.");
    Ok(())
}

pub async fn run_whoami() -> Result<()> {
    let config = load_config()?;
    let user = config.authed_client()?.me().await?;
    println!("{} <{}>", user.username, user.email);
    if let Some(name) = user.display_name {
        println!("  name:    {name}");
    }
    println!("  id:      {}", user.id);
    println!("  joined:  {}", user.created_at);
    println!("  server:  {}", config.server.url);
    Ok(())
}

/// Check server health status
pub async fn run_status() -> Result<()> {
    let config = load_config()?;
    match config.client()?.health().await {
        Ok(resp) => println!(
            "Server: online (v{})  URL: {}",
            resp.version, config.server.url
        ),
        Err(e) => println!("Server: offline  URL: {}  Error: {e:#}", config.server.url),
    }
    Ok(())
}
