use axum::{extract::State, http::HeaderMap, Json};
use rusqlite::Connection;

use daybook_api::crypto::constant_time_eq;
use daybook_api::db::{self, Built};
use daybook_api::deploy::ADMIN_KEY_HEADER;
use daybook_api::WipeResponse;

use super::auth::AuthUser;
use crate::error::ApiErr;
use crate::storage::{sq_execute, Db};
use crate::AppConfig;

/// Run one delete per content table inside a single transaction.
fn wipe_tables<F>(conn: &mut Connection, build: F) -> Result<WipeResponse, ApiErr>
where
    F: Fn(&str) -> Built,
{
    let tx = conn.transaction().map_err(ApiErr::from_db("wipe begin"))?;
    let mut counts = [0u64; 4];
    for (count, table) in counts.iter_mut().zip(db::wipe::CONTENT_TABLES) {
        let deleted = sq_execute(&tx, build(table)).map_err(ApiErr::from_db("wipe"))?;
        *count = deleted as u64;
    }
    tx.commit().map_err(ApiErr::from_db("wipe commit"))?;

    let [tasks, moods, gratitude, notes] = counts;
    Ok(WipeResponse {
        tasks,
        moods,
        gratitude,
        notes,
    })
}

/// DELETE /api/user/data — remove every content row owned by the caller.
/// The account and its sessions survive.
pub async fn wipe_mine(State(db): State<Db>, user: AuthUser) -> Result<Json<WipeResponse>, ApiErr> {
    let mut conn = db.conn();
    let counts = wipe_tables(&mut conn, |table| {
        db::wipe::delete_for_user(table, user.id())
    })?;
    tracing::info!(user_id = %user.id(), ?counts, "wiped user data");
    Ok(Json(counts))
}

/// DELETE /api/data — remove all content rows. Requires the admin key header.
pub async fn wipe_all(
    State(db): State<Db>,
    State(config): State<AppConfig>,
    headers: HeaderMap,
) -> Result<Json<WipeResponse>, ApiErr> {
    if config.admin_key.is_empty() {
        return Err(ApiErr::forbidden("global wipe is disabled"));
    }
    let presented = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !constant_time_eq(presented.as_bytes(), config.admin_key.as_bytes()) {
        return Err(ApiErr::unauthorized("invalid admin key"));
    }

    let mut conn = db.conn();
    let counts = wipe_tables(&mut conn, db::wipe::delete_all)?;
    tracing::warn!(?counts, "wiped all content");
    Ok(Json(counts))
}
