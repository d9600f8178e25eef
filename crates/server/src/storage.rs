use anyhow::{Context, Result};
use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::{Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

use daybook_api::db::migrations::MIGRATIONS;
use daybook_api::db::Built;
use daybook_api::{Category, MoodEntry, Priority, Task, TextEntry, User};

pub const DB_FILE_NAME: &str = "daybook.db";

/// Shared database state
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }
}

/// Initialize the database: open connection, enable WAL, run migrations
pub fn init_db(data_dir: &Path) -> Result<Db> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    let db_path = data_dir.join(DB_FILE_NAME);
    let conn = Connection::open(&db_path).context("opening SQLite database")?;

    // Enable WAL mode for better concurrent read performance
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    run_migrations(&conn)?;

    Ok(Db {
        conn: Arc::new(Mutex::new(conn)),
    })
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !already_applied {
            conn.execute_batch(sql)
                .with_context(|| format!("running migration {name}"))?;
            conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])?;
            tracing::info!("Applied migration: {name}");
        }
    }

    Ok(())
}

// ── sea-query adapter ───────────────────────────────────────────────────────

#[allow(unreachable_patterns)]
fn to_sql_value(value: sea_query::Value) -> SqlValue {
    use sea_query::Value as V;

    fn int<T: Into<i64>>(v: Option<T>) -> SqlValue {
        v.map_or(SqlValue::Null, |n| SqlValue::Integer(n.into()))
    }

    match value {
        V::Bool(v) => int(v.map(i64::from)),
        V::TinyInt(v) => int(v),
        V::SmallInt(v) => int(v),
        V::Int(v) => int(v),
        V::BigInt(v) => int(v),
        V::TinyUnsigned(v) => int(v),
        V::SmallUnsigned(v) => int(v),
        V::Unsigned(v) => int(v),
        V::BigUnsigned(v) => int(v.map(|n| i64::try_from(n).unwrap_or(i64::MAX))),
        V::Float(v) => v.map_or(SqlValue::Null, |f| SqlValue::Real(f.into())),
        V::Double(v) => v.map_or(SqlValue::Null, SqlValue::Real),
        V::String(v) => v.map_or(SqlValue::Null, |s| SqlValue::Text(*s)),
        V::Char(v) => v.map_or(SqlValue::Null, |c| SqlValue::Text(c.to_string())),
        V::Bytes(v) => v.map_or(SqlValue::Null, |b| SqlValue::Blob(*b)),
        other => {
            tracing::warn!("unsupported SQL parameter type: {other:?}");
            SqlValue::Null
        }
    }
}

fn params(values: sea_query::Values) -> rusqlite::ParamsFromIter<Vec<SqlValue>> {
    rusqlite::params_from_iter(values.into_iter().map(to_sql_value).collect::<Vec<_>>())
}

/// Execute a built statement, returning the number of affected rows.
pub fn sq_execute(conn: &Connection, (sql, values): Built) -> rusqlite::Result<usize> {
    conn.execute(&sql, params(values))
}

/// Run a built statement that yields exactly one row.
pub fn sq_query_row<T, F>(conn: &Connection, (sql, values): Built, f: F) -> rusqlite::Result<T>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    conn.query_row(&sql, params(values), f)
}

/// Run a built statement and map every row.
pub fn sq_query_map<T, F>(conn: &Connection, (sql, values): Built, f: F) -> rusqlite::Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params(values), f)?;
    rows.collect()
}

// ── Row mappers (column order follows `daybook_api::db::*::COLUMNS`) ────────

pub fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        display_name: row.get(3)?,
        avatar_url: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let priority: i64 = row.get(3)?;
    let priority = u8::try_from(priority)
        .map_err(|e| conversion_error(3, Type::Integer, e))
        .and_then(|p| {
            Priority::try_from(p).map_err(|e| conversion_error(3, Type::Integer, e))
        })?;
    let category: String = row.get(4)?;
    let category = category
        .parse::<Category>()
        .map_err(|e| conversion_error(4, Type::Text, e))?;

    Ok(Task {
        id: row.get(0)?,
        content: row.get(1)?,
        completed: row.get(2)?,
        priority,
        category,
        estimated_time: row.get(5)?,
        created_at: row.get(6)?,
        user_id: row.get(7)?,
    })
}

pub fn mood_from_row(row: &Row<'_>) -> rusqlite::Result<MoodEntry> {
    Ok(MoodEntry {
        id: row.get(0)?,
        mood: row.get(1)?,
        created_at: row.get(2)?,
        user_id: row.get(3)?,
    })
}

pub fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<TextEntry> {
    Ok(TextEntry {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
        user_id: row.get(3)?,
    })
}

fn conversion_error<E>(idx: usize, ty: Type, e: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    rusqlite::Error::FromSqlConversionFailure(idx, ty, e.into())
}
