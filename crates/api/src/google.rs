//! Google sign-in support.
//!
//! The browser obtains an ID token from Google Identity Services and posts it
//! to `POST /api/auth/google`. The server validates it against Google's
//! `tokeninfo` endpoint and maps the claims to a [`GoogleProfile`].
//!
//! This module contains only configuration, URL building, and claim parsing.
//! The HTTP call and DB access live in the server.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

pub const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Issuers Google documents for its ID tokens.
const ACCEPTED_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Google sign-in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub tokeninfo_url: String,
}

impl GoogleConfig {
    pub fn new(client_id: String, tokeninfo_url: Option<String>) -> Self {
        Self {
            client_id,
            tokeninfo_url: tokeninfo_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOKENINFO_URL.to_string()),
        }
    }
}

/// Normalized identity extracted from a verified ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleProfile {
    pub google_id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Build the verification URL for an ID token.
pub fn build_tokeninfo_url(config: &GoogleConfig, id_token: &str) -> String {
    format!(
        "{}?id_token={}",
        config.tokeninfo_url.trim_end_matches('/'),
        urlencoding::encode(id_token)
    )
}

/// Validate tokeninfo claims and extract the profile.
///
/// `now_unix` is checked against `exp` so a cached or replayed response
/// cannot outlive the token.
pub fn extract_profile(
    config: &GoogleConfig,
    claims: &serde_json::Value,
    now_unix: u64,
) -> Result<GoogleProfile, ServiceError> {
    if let Some(err) = claims.get("error_description").or_else(|| claims.get("error")) {
        return Err(ServiceError::Unauthorized(format!(
            "Google rejected the credential: {}",
            err.as_str().unwrap_or("invalid token")
        )));
    }

    let aud = claim_str(claims, "aud")
        .ok_or_else(|| ServiceError::Unauthorized("Google token missing aud".into()))?;
    if aud != config.client_id {
        return Err(ServiceError::Unauthorized(
            "Google token was issued for a different client".into(),
        ));
    }

    if let Some(iss) = claim_str(claims, "iss") {
        if !ACCEPTED_ISSUERS.contains(&iss) {
            return Err(ServiceError::Unauthorized("unexpected Google token issuer".into()));
        }
    }

    // tokeninfo renders numbers and booleans as strings
    let exp = claim_u64(claims, "exp")
        .ok_or_else(|| ServiceError::Unauthorized("Google token missing exp".into()))?;
    if now_unix > exp {
        return Err(ServiceError::Unauthorized("Google token expired".into()));
    }

    let google_id = claim_str(claims, "sub")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Unauthorized("Google token missing sub".into()))?
        .to_string();

    let email = claim_str(claims, "email")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::BadRequest("Google account has no email".into()))?
        .trim()
        .to_lowercase();

    if !claim_bool(claims, "email_verified") {
        return Err(ServiceError::Unauthorized(
            "Google account email is not verified".into(),
        ));
    }

    Ok(GoogleProfile {
        google_id,
        email,
        name: claim_str(claims, "name").map(str::to_string),
        picture: claim_str(claims, "picture").map(str::to_string),
    })
}

/// Derive a display username from a Google profile.
pub fn username_for(profile: &GoogleProfile) -> String {
    profile
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| n.chars().take(64).collect())
        .unwrap_or_else(|| {
            profile
                .email
                .split('@')
                .next()
                .unwrap_or("user")
                .to_string()
        })
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn claim_str<'a>(claims: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    claims.get(key).and_then(|v| v.as_str())
}

fn claim_u64(claims: &serde_json::Value, key: &str) -> Option<u64> {
    match claims.get(key)? {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn claim_bool(claims: &serde_json::Value, key: &str) -> bool {
    match claims.get(key) {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s == "true",
        _ => false,
    }
}
