use axum::{extract::State, http::StatusCode, Json};

use daybook_api::{db, service, CreateMoodRequest, MoodEntry};

use super::auth::AuthUser;
use crate::error::{ApiErr, ApiJson};
use crate::storage::{mood_from_row, sq_query_map, sq_query_row, Db};

/// GET /api/mood — newest first.
pub async fn list(State(db): State<Db>, user: AuthUser) -> Result<Json<Vec<MoodEntry>>, ApiErr> {
    let conn = db.conn();
    let moods = sq_query_map(&conn, db::moods::list(user.id()), mood_from_row)
        .map_err(ApiErr::from_db("list moods"))?;
    Ok(Json(moods))
}

/// POST /api/mood — append a mood entry.
pub async fn create(
    State(db): State<Db>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateMoodRequest>,
) -> Result<(StatusCode, Json<MoodEntry>), ApiErr> {
    let mood = service::validate_mood(&req.mood)?;
    let conn = db.conn();
    let entry = sq_query_row(&conn, db::moods::insert(user.id(), &mood), mood_from_row)
        .map_err(ApiErr::from_db("create mood"))?;
    Ok((StatusCode::CREATED, Json(entry)))
}
