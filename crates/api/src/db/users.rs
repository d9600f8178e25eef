//! User / auth query builders.

use sea_query::{Asterisk, Expr, Func, Query, SqliteQueryBuilder};

use super::tables::Users;
use super::Built;
use crate::crypto::PasswordHash;

/// Profile column order; must match the server's `user_from_row()`.
pub const PROFILE_COLUMNS: [Users; 6] = [
    Users::Id,
    Users::Username,
    Users::Email,
    Users::DisplayName,
    Users::AvatarUrl,
    Users::CreatedAt,
];

fn profile_select() -> sea_query::SelectStatement {
    Query::select()
        .columns(PROFILE_COLUMNS)
        .from(Users::Table)
        .to_owned()
}

// ── User lookups ───────────────────────────────────────────────────────────

/// Find user profile by id.
pub fn get_by_id(user_id: &str) -> Built {
    profile_select()
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Find user profile by email.
pub fn get_by_email(email: &str) -> Built {
    profile_select()
        .and_where(Expr::col(Users::Email).eq(email))
        .build(SqliteQueryBuilder)
}

/// Find user profile by linked Google account.
pub fn get_by_google_id(google_id: &str) -> Built {
    profile_select()
        .and_where(Expr::col(Users::GoogleId).eq(google_id))
        .build(SqliteQueryBuilder)
}

/// Find user by email for login: profile columns followed by
/// password_hash, password_salt, password_iterations.
pub fn get_by_email_for_login(email: &str) -> Built {
    profile_select()
        .columns([
            Users::PasswordHash,
            Users::PasswordSalt,
            Users::PasswordIterations,
        ])
        .and_where(Expr::col(Users::Email).eq(email))
        .build(SqliteQueryBuilder)
}

/// Check email existence.
pub fn email_exists(email: &str) -> Built {
    Query::select()
        .expr(Expr::expr(Func::count(Expr::col(Asterisk))).gt(0))
        .from(Users::Table)
        .and_where(Expr::col(Users::Email).eq(email))
        .build(SqliteQueryBuilder)
}

// ── User inserts ───────────────────────────────────────────────────────────

/// Insert user with email/password.
pub fn insert_with_password(
    id: &str,
    username: &str,
    email: &str,
    password: &PasswordHash,
) -> Built {
    Query::insert()
        .into_table(Users::Table)
        .columns([
            Users::Id,
            Users::Username,
            Users::Email,
            Users::PasswordHash,
            Users::PasswordSalt,
            Users::PasswordIterations,
        ])
        .values_panic([
            id.into(),
            username.into(),
            email.into(),
            password.hash.as_str().into(),
            password.salt.as_str().into(),
            i64::from(password.iterations).into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Insert user from Google sign-in (no password).
pub fn insert_google(
    id: &str,
    username: &str,
    email: &str,
    google_id: &str,
    display_name: Option<&str>,
    avatar_url: Option<&str>,
) -> Built {
    Query::insert()
        .into_table(Users::Table)
        .columns([
            Users::Id,
            Users::Username,
            Users::Email,
            Users::GoogleId,
            Users::DisplayName,
            Users::AvatarUrl,
        ])
        .values_panic([
            id.into(),
            username.into(),
            email.into(),
            google_id.into(),
            display_name.map(|s| s.to_string()).into(),
            avatar_url.map(|s| s.to_string()).into(),
        ])
        .build(SqliteQueryBuilder)
}

// ── User updates ───────────────────────────────────────────────────────────

/// Attach a Google identity to an existing (email-matched) account.
pub fn link_google(
    user_id: &str,
    google_id: &str,
    display_name: Option<&str>,
    avatar_url: Option<&str>,
) -> Built {
    Query::update()
        .table(Users::Table)
        .value(Users::GoogleId, google_id)
        .value(Users::DisplayName, display_name.map(|s| s.to_string()))
        .value(Users::AvatarUrl, avatar_url.map(|s| s.to_string()))
        .and_where(Expr::col(Users::Id).eq(user_id))
        .build(SqliteQueryBuilder)
}
