//! Bulk deletes behind the wipe endpoints. Accounts and sessions survive.

use sea_query::{Alias, Expr, Query, SqliteQueryBuilder};

use super::Built;

/// Content tables in wipe order, paired with their response field.
pub const CONTENT_TABLES: [&str; 4] = ["tasks", "mood_entries", "gratitude_entries", "notes"];

/// Delete every content row of one table owned by `user_id`.
pub fn delete_for_user(table: &str, user_id: &str) -> Built {
    Query::delete()
        .from_table(Alias::new(table))
        .and_where(Expr::col(Alias::new("user_id")).eq(user_id))
        .build(SqliteQueryBuilder)
}

/// Delete every row of one content table.
pub fn delete_all(table: &str) -> Built {
    Query::delete()
        .from_table(Alias::new(table))
        .build(SqliteQueryBuilder)
}
