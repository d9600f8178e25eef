//! Deployment settings shared by the server and its tooling.

/// Directory holding the SQLite database.
pub const ENV_DATA_DIR: &str = "DAYBOOK_DATA_DIR";

/// Shared secret for `DELETE /api/data`. Empty disables the endpoint.
pub const ENV_ADMIN_KEY: &str = "DAYBOOK_ADMIN_KEY";

/// Set to `closed` to reject new registrations.
pub const ENV_REGISTRATION: &str = "DAYBOOK_REGISTRATION";

/// Session lifetime in days.
pub const ENV_SESSION_DAYS: &str = "DAYBOOK_SESSION_DAYS";

/// PBKDF2 iteration count for newly hashed passwords.
pub const ENV_PASSWORD_ITERATIONS: &str = "DAYBOOK_PASSWORD_ITERATIONS";

/// Adds the `Secure` attribute to the session cookie.
pub const ENV_COOKIE_SECURE: &str = "DAYBOOK_COOKIE_SECURE";

/// Static web build served as the fallback route.
pub const ENV_WEB_DIR: &str = "DAYBOOK_WEB_DIR";

/// OAuth client id expected in the `aud` claim of Google ID tokens.
pub const ENV_GOOGLE_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";

/// Override for the token verification endpoint (tests, proxies).
pub const ENV_GOOGLE_TOKENINFO_URL: &str = "GOOGLE_TOKENINFO_URL";

/// Header carrying the admin key.
pub const ADMIN_KEY_HEADER: &str = "X-Daybook-Admin-Key";

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "daybook_session";

pub const DEFAULT_SESSION_DAYS: i64 = 30;

/// Parse a human-friendly boolean env flag value.
///
/// Accepted truthy values:
/// - `1`
/// - `true`
/// - `yes`
/// - `on`
pub fn parse_bool_flag(raw: Option<&str>, default: bool) -> bool {
    raw.map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
    .unwrap_or(default)
}

/// Parse a positive integer setting, falling back to `default` on absence or garbage.
pub fn parse_positive<T>(raw: Option<&str>, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.and_then(|value| value.trim().parse::<T>().ok())
        .filter(|value| *value > T::default())
        .unwrap_or(default)
}
