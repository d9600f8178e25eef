use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use daybook_api_client::ApiClient;

const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
const CONFIG_FILE_NAME: &str = "config.toml";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Session token from the last login; empty when logged out.
    #[serde(default)]
    pub token: String,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

impl CliConfig {
    pub fn is_logged_in(&self) -> bool {
        !self.session.token.trim().is_empty()
    }

    /// Client for public endpoints.
    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.server.url, REQUEST_TIMEOUT)
    }

    /// Client carrying the saved session token.
    pub fn authed_client(&self) -> Result<ApiClient> {
        if !self.is_logged_in() {
            bail!("not logged in. Run: daybook login <email>");
        }
        let mut client = self.client()?;
        client.set_auth(self.session.token.clone());
        Ok(client)
    }
}

/// Get the config directory path (~/.config/daybook/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("daybook"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Read a config file, returning defaults if it does not exist.
pub fn load_config_from(path: &Path) -> Result<CliConfig> {
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let mut config: CliConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    if config.server.url.trim().is_empty() {
        config.server.url = default_server_url();
    }
    Ok(config)
}

pub fn save_config_to(path: &Path, config: &CliConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir at {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}

pub fn load_config() -> Result<CliConfig> {
    load_config_from(&config_path()?)
}

pub fn save_config(config: &CliConfig) -> Result<()> {
    save_config_to(&config_path()?, config)
}

/// Print current config.
pub fn show_config() -> Result<()> {
    let config = load_config()?;
    let path = config_path()?;
    println!("Config file: {}", path.display());
    println!();
    println!("[server]");
    println!("  url   = {}", config.server.url);
    println!("[session]");
    println!(
        "  token = {}",
        if config.is_logged_in() {
            format!("{}...", config.session.token.chars().take(8).collect::<String>())
        } else {
            "(not logged in)".to_string()
        }
    );
    Ok(())
}

/// Point the CLI at another server. Switching servers drops the saved session.
pub fn set_server(url: &str) -> Result<()> {
    let url = normalize_server_url(url)?;
    let mut config = load_config()?;
    if config.server.url != url {
        config.session.token.clear();
    }
    config.server.url = url;
    save_config(&config)?;
    println!("Server URL set to {}", config.server.url);
    Ok(())
}

fn normalize_server_url(value: &str) -> Result<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("server URL cannot be empty");
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        bail!("server URL must start with http:// or https://");
    }
    Ok(trimmed.to_string())
}
