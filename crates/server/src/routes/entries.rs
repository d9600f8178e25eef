//! Gratitude entries and notes: two journals with the same shape.

use axum::{extract::State, http::StatusCode, Json};

use daybook_api::db::entries::EntryKind;
use daybook_api::{db, service, CreateTextEntryRequest, OkResponse, TextEntry};

use super::auth::AuthUser;
use crate::error::{ApiErr, ApiJson, ApiPath};
use crate::storage::{entry_from_row, sq_execute, sq_query_map, sq_query_row, Db};

fn list_entries(db: &Db, kind: EntryKind, user_id: &str) -> Result<Json<Vec<TextEntry>>, ApiErr> {
    let conn = db.conn();
    let entries = sq_query_map(&conn, db::entries::list(kind, user_id), entry_from_row)
        .map_err(ApiErr::from_db(kind.table_name()))?;
    Ok(Json(entries))
}

fn create_entry(
    db: &Db,
    kind: EntryKind,
    user_id: &str,
    req: &CreateTextEntryRequest,
) -> Result<(StatusCode, Json<TextEntry>), ApiErr> {
    let content = service::validate_text_entry(&req.content)?;
    let conn = db.conn();
    let entry = sq_query_row(
        &conn,
        db::entries::insert(kind, user_id, &content),
        entry_from_row,
    )
    .map_err(ApiErr::from_db(kind.table_name()))?;
    Ok((StatusCode::CREATED, Json(entry)))
}

fn delete_entry(db: &Db, kind: EntryKind, id: i64, user_id: &str) -> Result<Json<OkResponse>, ApiErr> {
    let conn = db.conn();
    let deleted = sq_execute(&conn, db::entries::delete(kind, id, user_id))
        .map_err(ApiErr::from_db(kind.table_name()))?;
    if deleted == 0 {
        return Err(ApiErr::not_found(format!("{} not found", kind.label())));
    }
    Ok(Json(OkResponse { ok: true }))
}

pub async fn list_gratitude(
    State(db): State<Db>,
    user: AuthUser,
) -> Result<Json<Vec<TextEntry>>, ApiErr> {
    list_entries(&db, EntryKind::Gratitude, user.id())
}

pub async fn create_gratitude(
    State(db): State<Db>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateTextEntryRequest>,
) -> Result<(StatusCode, Json<TextEntry>), ApiErr> {
    create_entry(&db, EntryKind::Gratitude, user.id(), &req)
}

pub async fn delete_gratitude(
    State(db): State<Db>,
    user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<OkResponse>, ApiErr> {
    delete_entry(&db, EntryKind::Gratitude, id, user.id())
}

pub async fn list_notes(
    State(db): State<Db>,
    user: AuthUser,
) -> Result<Json<Vec<TextEntry>>, ApiErr> {
    list_entries(&db, EntryKind::Note, user.id())
}

pub async fn create_note(
    State(db): State<Db>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateTextEntryRequest>,
) -> Result<(StatusCode, Json<TextEntry>), ApiErr> {
    create_entry(&db, EntryKind::Note, user.id(), &req)
}

pub async fn delete_note(
    State(db): State<Db>,
    user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<OkResponse>, ApiErr> {
    delete_entry(&db, EntryKind::Note, id, user.id())
}
