use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rusqlite::OptionalExtension;

use daybook_api::{db, service, Category, CreateTaskRequest, OkResponse, Task, UpdateTaskRequest};

use super::auth::AuthUser;
use crate::error::{ApiErr, ApiJson};
use crate::storage::{sq_execute, sq_query_map, sq_query_row, task_from_row, Db};

fn parse_category(key: &str) -> Result<Category, ApiErr> {
    Ok(key.parse::<Category>()?)
}

fn parse_task_id(key: &str) -> Result<i64, ApiErr> {
    key.parse::<i64>()
        .map_err(|_| ApiErr::bad_request(format!("invalid task id: {key}")))
}

fn task_not_found() -> ApiErr {
    ApiErr::not_found("task not found")
}

/// GET /api/tasks/{category} — the caller's tasks in one category, oldest first.
pub async fn list(
    State(db): State<Db>,
    user: AuthUser,
    Path(key): Path<String>,
) -> Result<Json<Vec<Task>>, ApiErr> {
    let category = parse_category(&key)?;
    let conn = db.conn();
    let tasks = sq_query_map(&conn, db::tasks::list(user.id(), category), task_from_row)
        .map_err(ApiErr::from_db("list tasks"))?;
    Ok(Json(tasks))
}

/// POST /api/tasks/{category} — create a task owned by the caller.
pub async fn create(
    State(db): State<Db>,
    user: AuthUser,
    Path(key): Path<String>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiErr> {
    let category = parse_category(&key)?;
    let req = service::validate_new_task(&req)?;

    let conn = db.conn();
    let task = sq_query_row(
        &conn,
        db::tasks::insert(user.id(), category, &req),
        task_from_row,
    )
    .map_err(ApiErr::from_db("create task"))?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// PATCH /api/tasks/{id} — partial update. Missing and foreign tasks are 404.
pub async fn update(
    State(db): State<Db>,
    user: AuthUser,
    Path(key): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiErr> {
    let id = parse_task_id(&key)?;
    let patch = service::validate_task_patch(&req)?;

    let conn = db.conn();
    sq_query_row(&conn, db::tasks::update(id, user.id(), &patch), task_from_row)
        .optional()
        .map_err(ApiErr::from_db("update task"))?
        .map(Json)
        .ok_or_else(task_not_found)
}

/// DELETE /api/tasks/{id}
pub async fn remove(
    State(db): State<Db>,
    user: AuthUser,
    Path(key): Path<String>,
) -> Result<Json<OkResponse>, ApiErr> {
    let id = parse_task_id(&key)?;

    let conn = db.conn();
    let deleted = sq_execute(&conn, db::tasks::delete(id, user.id()))
        .map_err(ApiErr::from_db("delete task"))?;
    if deleted == 0 {
        return Err(task_not_found());
    }
    Ok(Json(OkResponse { ok: true }))
}
