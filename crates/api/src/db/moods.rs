//! Mood log query builders. Mood entries are append-only.

use sea_query::{Expr, Order, Query, SqliteQueryBuilder};

use super::tables::MoodEntries;
use super::Built;

/// Column order; must match the server's `mood_from_row()`.
pub const COLUMNS: [MoodEntries; 4] = [
    MoodEntries::Id,
    MoodEntries::Mood,
    MoodEntries::CreatedAt,
    MoodEntries::UserId,
];

/// A user's mood entries, newest first.
pub fn list(user_id: &str) -> Built {
    Query::select()
        .columns(COLUMNS)
        .from(MoodEntries::Table)
        .and_where(Expr::col(MoodEntries::UserId).eq(user_id))
        .order_by(MoodEntries::CreatedAt, Order::Desc)
        .order_by(MoodEntries::Id, Order::Desc)
        .build(SqliteQueryBuilder)
}

pub fn insert(user_id: &str, mood: &str) -> Built {
    Query::insert()
        .into_table(MoodEntries::Table)
        .columns([MoodEntries::Mood, MoodEntries::UserId])
        .values_panic([mood.into(), user_id.into()])
        .returning(Query::returning().columns(COLUMNS))
        .build(SqliteQueryBuilder)
}
