//! Shared business logic — framework-agnostic pure functions.
//!
//! Route handlers stay thin adapters: they validate input here, run the
//! query builders from [`crate::db`], and map [`ServiceError`] to HTTP.

use crate::{CreateTaskRequest, ServiceError, UpdateTaskRequest};

pub const MAX_TASK_CONTENT: usize = 500;
pub const MAX_ESTIMATED_TIME: usize = 32;
pub const MAX_MOOD: usize = 32;
pub const MAX_TEXT_ENTRY: usize = 10_000;
pub const MIN_PASSWORD: usize = 8;
pub const MAX_PASSWORD: usize = 128;

// ─── Account validation ─────────────────────────────────────────────────────

/// Validate and normalize an email address. Returns the lowercased, trimmed email.
pub fn validate_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    let valid_shape = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid_shape || email.len() > 254 {
        return Err(ServiceError::BadRequest("invalid email address".into()));
    }
    Ok(email)
}

/// Validate a password length.
pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD {
        return Err(ServiceError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD} characters"
        )));
    }
    if password.chars().count() > MAX_PASSWORD {
        return Err(ServiceError::BadRequest(format!(
            "password must be at most {MAX_PASSWORD} characters"
        )));
    }
    Ok(())
}

/// Validate and normalize a username. Returns the trimmed username.
pub fn validate_username(username: &str) -> Result<String, ServiceError> {
    let trimmed = username.trim().to_string();
    if trimmed.is_empty() || trimmed.chars().count() > 64 {
        return Err(ServiceError::BadRequest(
            "username must be 1-64 characters".into(),
        ));
    }
    Ok(trimmed)
}

// ─── Content validation ─────────────────────────────────────────────────────

fn non_empty_bounded(value: &str, field: &str, max: usize) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::BadRequest(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max {
        return Err(ServiceError::BadRequest(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_estimate(value: Option<&str>) -> Result<Option<String>, ServiceError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.chars().count() > MAX_ESTIMATED_TIME => Err(ServiceError::BadRequest(
            format!("estimated_time must be at most {MAX_ESTIMATED_TIME} characters"),
        )),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Validate a create request, returning a normalized copy.
pub fn validate_new_task(req: &CreateTaskRequest) -> Result<CreateTaskRequest, ServiceError> {
    Ok(CreateTaskRequest {
        content: non_empty_bounded(&req.content, "content", MAX_TASK_CONTENT)?,
        priority: req.priority,
        estimated_time: normalize_estimate(req.estimated_time.as_deref())?,
    })
}

/// Validate a patch, returning a normalized copy. Empty patches are rejected.
pub fn validate_task_patch(req: &UpdateTaskRequest) -> Result<UpdateTaskRequest, ServiceError> {
    if req.is_empty() {
        return Err(ServiceError::BadRequest("no fields to update".into()));
    }
    let content = req
        .content
        .as_deref()
        .map(|c| non_empty_bounded(c, "content", MAX_TASK_CONTENT))
        .transpose()?;
    let estimated_time = match &req.estimated_time {
        None => None,
        Some(inner) => Some(normalize_estimate(inner.as_deref())?),
    };
    Ok(UpdateTaskRequest {
        content,
        completed: req.completed,
        priority: req.priority,
        category: req.category,
        estimated_time,
    })
}

pub fn validate_mood(mood: &str) -> Result<String, ServiceError> {
    non_empty_bounded(mood, "mood", MAX_MOOD)
}

pub fn validate_text_entry(content: &str) -> Result<String, ServiceError> {
    non_empty_bounded(content, "content", MAX_TEXT_ENTRY)
}

// ─── Sessions ───────────────────────────────────────────────────────────────

/// Pre-computed session bundle: everything needed to insert the session row
/// and answer the client. The caller only performs the DB INSERT.
pub struct SessionBundle {
    /// Raw token (sent to the client).
    pub token: String,
    /// SHA-256 hash of the token (stored in DB).
    pub token_hash: String,
    /// UUID primary key for the sessions row.
    pub session_id: String,
    /// SQLite `datetime` string for the expiry.
    pub expires_at: String,
    /// Cookie `Max-Age` in seconds.
    pub max_age_secs: i64,
}

pub fn prepare_session(now_unix: u64, lifetime_days: i64) -> Result<SessionBundle, ServiceError> {
    let token = crate::crypto::generate_token()?;
    let token_hash = crate::crypto::hash_token(&token);
    let base = chrono::DateTime::from_timestamp(now_unix as i64, 0)
        .ok_or_else(|| ServiceError::Internal("invalid timestamp".into()))?;
    let lifetime = chrono::TimeDelta::try_days(lifetime_days)
        .ok_or_else(|| ServiceError::Internal("session lifetime out of range".into()))?;
    let expires_at = base
        .checked_add_signed(lifetime)
        .ok_or_else(|| ServiceError::Internal("timestamp overflow".into()))?
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    Ok(SessionBundle {
        token,
        token_hash,
        session_id: uuid::Uuid::new_v4().to_string(),
        expires_at,
        max_age_secs: lifetime.num_seconds(),
    })
}

/// Format the current time in the same shape SQLite's `datetime('now')` uses.
pub fn sqlite_now(now_unix: u64) -> String {
    chrono::DateTime::from_timestamp(now_unix as i64, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Build the `Set-Cookie` value for a session.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}",
        crate::deploy::SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Pick the session token out of a `Cookie` header value.
pub fn session_token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == crate::deploy::SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Priority;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert_eq!(validate_username("  bob  ").unwrap(), "bob");
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
        assert!(validate_username(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" Ada@Example.COM ").unwrap(), "ada@example.com");
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada@").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password(&"p".repeat(129)).is_err());
    }

    #[test]
    fn new_task_is_trimmed_and_blank_estimate_dropped() {
        let req = validate_new_task(&CreateTaskRequest {
            content: "  Buy milk ".into(),
            priority: Priority::Leverage,
            estimated_time: Some("   ".into()),
        })
        .unwrap();
        assert_eq!(req.content, "Buy milk");
        assert_eq!(req.estimated_time, None);
        assert_eq!(req.priority, Priority::Leverage);
    }

    #[test]
    fn blank_or_oversized_task_is_rejected() {
        let blank = CreateTaskRequest {
            content: " ".into(),
            priority: Priority::None,
            estimated_time: None,
        };
        assert_eq!(validate_new_task(&blank).unwrap_err().status_code(), 400);

        let huge = CreateTaskRequest {
            content: "x".repeat(MAX_TASK_CONTENT + 1),
            priority: Priority::None,
            estimated_time: None,
        };
        assert!(validate_new_task(&huge).is_err());
    }

    #[test]
    fn patch_rules() {
        assert!(validate_task_patch(&UpdateTaskRequest::default()).is_err());

        let patch = validate_task_patch(&UpdateTaskRequest {
            estimated_time: Some(Some(" ".into())),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.estimated_time, Some(None));

        let bad = UpdateTaskRequest {
            content: Some("".into()),
            ..Default::default()
        };
        assert!(validate_task_patch(&bad).is_err());
    }

    #[test]
    fn session_bundle_expiry_and_hash() {
        let bundle = prepare_session(1_700_000_000, 30).unwrap();
        assert_eq!(bundle.expires_at, "2023-12-14 22:13:20");
        assert_eq!(bundle.max_age_secs, 30 * 24 * 3600);
        assert_eq!(bundle.token_hash, crate::crypto::hash_token(&bundle.token));
    }

    #[test]
    fn absurd_session_lifetime_is_an_error() {
        let Err(err) = prepare_session(1_700_000_000, 1_000_000_000_000_000) else {
            panic!("lifetime past chrono's range must not produce a session");
        };
        assert_eq!(err.status_code(), 500);
        assert!(prepare_session(1_700_000_000, i64::MAX).is_err());
    }

    #[test]
    fn cookie_roundtrip() {
        let set = session_cookie("abc123", 60, true);
        assert!(set.starts_with("daybook_session=abc123;"));
        assert!(set.contains("HttpOnly"));
        assert!(set.ends_with("; Secure"));

        let header = "theme=dark; daybook_session=abc123; other=1";
        assert_eq!(session_token_from_cookie_header(header), Some("abc123"));
        assert_eq!(session_token_from_cookie_header("daybook_session="), None);
        assert_eq!(session_token_from_cookie_header("theme=dark"), None);
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }
}
