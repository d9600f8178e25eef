//! Compile-time–checked column identifiers for all tables.

use sea_query::Iden;

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    PasswordSalt,
    PasswordIterations,
    GoogleId,
    DisplayName,
    AvatarUrl,
    CreatedAt,
}

#[derive(Iden)]
pub enum Sessions {
    Table,
    Id,
    UserId,
    TokenHash,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
pub enum Tasks {
    Table,
    Id,
    Content,
    Completed,
    Priority,
    Category,
    EstimatedTime,
    CreatedAt,
    UserId,
}

#[derive(Iden)]
pub enum MoodEntries {
    Table,
    Id,
    Mood,
    CreatedAt,
    UserId,
}

/// Columns shared by `gratitude_entries` and `notes`; the table comes from
/// [`super::entries::EntryKind`].
#[derive(Iden)]
pub enum TextEntries {
    Id,
    Content,
    CreatedAt,
    UserId,
}
