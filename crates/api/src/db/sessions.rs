//! Login session query builders.

use sea_query::{Expr, Query, SqliteQueryBuilder};

use super::tables::{Sessions, Users};
use super::Built;

/// Insert a session row.
pub fn insert(id: &str, user_id: &str, token_hash: &str, expires_at: &str) -> Built {
    Query::insert()
        .into_table(Sessions::Table)
        .columns([
            Sessions::Id,
            Sessions::UserId,
            Sessions::TokenHash,
            Sessions::ExpiresAt,
        ])
        .values_panic([
            id.into(),
            user_id.into(),
            token_hash.into(),
            expires_at.into(),
        ])
        .build(SqliteQueryBuilder)
}

/// Resolve a live session to its user profile (column order of
/// [`super::users::PROFILE_COLUMNS`]).
pub fn lookup_user(token_hash: &str, now: &str) -> Built {
    let mut q = Query::select();
    for col in super::users::PROFILE_COLUMNS {
        q.column((Users::Table, col));
    }
    q.from(Sessions::Table)
        .inner_join(
            Users::Table,
            Expr::col((Users::Table, Users::Id)).equals((Sessions::Table, Sessions::UserId)),
        )
        .and_where(Expr::col((Sessions::Table, Sessions::TokenHash)).eq(token_hash))
        .and_where(Expr::col((Sessions::Table, Sessions::ExpiresAt)).gt(now))
        .build(SqliteQueryBuilder)
}

/// Delete a session by token hash (logout).
pub fn delete_by_token_hash(token_hash: &str) -> Built {
    Query::delete()
        .from_table(Sessions::Table)
        .and_where(Expr::col(Sessions::TokenHash).eq(token_hash))
        .build(SqliteQueryBuilder)
}

/// Purge sessions past their expiry.
pub fn delete_expired(now: &str) -> Built {
    Query::delete()
        .from_table(Sessions::Table)
        .and_where(Expr::col(Sessions::ExpiresAt).lte(now))
        .build(SqliteQueryBuilder)
}
