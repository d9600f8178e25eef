//! Query builders for the free-text journals: gratitude entries and notes.
//! Both tables share one shape and are create/delete only.

use sea_query::{Alias, Expr, Order, Query, SqliteQueryBuilder};

use super::tables::TextEntries;
use super::Built;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Gratitude,
    Note,
}

impl EntryKind {
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Gratitude => "gratitude_entries",
            Self::Note => "notes",
        }
    }

    /// Human label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gratitude => "gratitude entry",
            Self::Note => "note",
        }
    }

    fn table(&self) -> Alias {
        Alias::new(self.table_name())
    }
}

/// Column order; must match the server's `entry_from_row()`.
pub const COLUMNS: [TextEntries; 4] = [
    TextEntries::Id,
    TextEntries::Content,
    TextEntries::CreatedAt,
    TextEntries::UserId,
];

/// A user's entries, newest first.
pub fn list(kind: EntryKind, user_id: &str) -> Built {
    Query::select()
        .columns(COLUMNS)
        .from(kind.table())
        .and_where(Expr::col(TextEntries::UserId).eq(user_id))
        .order_by(TextEntries::CreatedAt, Order::Desc)
        .order_by(TextEntries::Id, Order::Desc)
        .build(SqliteQueryBuilder)
}

pub fn insert(kind: EntryKind, user_id: &str, content: &str) -> Built {
    Query::insert()
        .into_table(kind.table())
        .columns([TextEntries::Content, TextEntries::UserId])
        .values_panic([content.into(), user_id.into()])
        .returning(Query::returning().columns(COLUMNS))
        .build(SqliteQueryBuilder)
}

/// Delete one entry owned by `user_id`.
pub fn delete(kind: EntryKind, id: i64, user_id: &str) -> Built {
    Query::delete()
        .from_table(kind.table())
        .and_where(Expr::col(TextEntries::Id).eq(id))
        .and_where(Expr::col(TextEntries::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}
