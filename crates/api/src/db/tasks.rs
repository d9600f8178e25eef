//! Task query builders.
//!
//! Every statement is scoped by `user_id`; a row owned by someone else is
//! indistinguishable from a missing one.

use sea_query::{Expr, Order, Query, ReturningClause, SqliteQueryBuilder};

use super::tables::Tasks;
use super::Built;
use crate::{Category, CreateTaskRequest, UpdateTaskRequest};

/// Column order; must match the server's `task_from_row()`.
pub const COLUMNS: [Tasks; 8] = [
    Tasks::Id,
    Tasks::Content,
    Tasks::Completed,
    Tasks::Priority,
    Tasks::Category,
    Tasks::EstimatedTime,
    Tasks::CreatedAt,
    Tasks::UserId,
];

fn returning() -> ReturningClause {
    Query::returning().columns(COLUMNS)
}

/// List a user's tasks in one category, oldest first.
pub fn list(user_id: &str, category: Category) -> Built {
    Query::select()
        .columns(COLUMNS)
        .from(Tasks::Table)
        .and_where(Expr::col(Tasks::UserId).eq(user_id))
        .and_where(Expr::col(Tasks::Category).eq(category.as_str()))
        .order_by(Tasks::CreatedAt, Order::Asc)
        .order_by(Tasks::Id, Order::Asc)
        .build(SqliteQueryBuilder)
}

/// Insert a (validated) task and return the stored row.
pub fn insert(user_id: &str, category: Category, req: &CreateTaskRequest) -> Built {
    Query::insert()
        .into_table(Tasks::Table)
        .columns([
            Tasks::Content,
            Tasks::Completed,
            Tasks::Priority,
            Tasks::Category,
            Tasks::EstimatedTime,
            Tasks::UserId,
        ])
        .values_panic([
            req.content.as_str().into(),
            false.into(),
            i64::from(u8::from(req.priority)).into(),
            category.as_str().into(),
            req.estimated_time.clone().into(),
            user_id.into(),
        ])
        .returning(returning())
        .build(SqliteQueryBuilder)
}

/// Apply a (validated, non-empty) patch and return the updated row.
/// Yields no row when the task is missing or not owned by `user_id`.
pub fn update(id: i64, user_id: &str, patch: &UpdateTaskRequest) -> Built {
    let mut q = Query::update();
    q.table(Tasks::Table);
    if let Some(content) = &patch.content {
        q.value(Tasks::Content, content.as_str());
    }
    if let Some(completed) = patch.completed {
        q.value(Tasks::Completed, completed);
    }
    if let Some(priority) = patch.priority {
        q.value(Tasks::Priority, i64::from(u8::from(priority)));
    }
    if let Some(category) = patch.category {
        q.value(Tasks::Category, category.as_str());
    }
    if let Some(estimated_time) = &patch.estimated_time {
        q.value(Tasks::EstimatedTime, estimated_time.clone());
    }
    q.and_where(Expr::col(Tasks::Id).eq(id))
        .and_where(Expr::col(Tasks::UserId).eq(user_id))
        .returning(returning())
        .build(SqliteQueryBuilder)
}

/// Delete one task owned by `user_id`.
pub fn delete(id: i64, user_id: &str) -> Built {
    Query::delete()
        .from_table(Tasks::Table)
        .and_where(Expr::col(Tasks::Id).eq(id))
        .and_where(Expr::col(Tasks::UserId).eq(user_id))
        .build(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Priority;

    #[test]
    fn list_is_scoped_by_user_and_category() {
        let (sql, values) = list("u1", Category::Today);
        assert!(sql.contains(r#""user_id" = ?"#));
        assert!(sql.contains(r#""category" = ?"#));
        assert_eq!(values.0.len(), 2);
    }

    #[test]
    fn update_sets_only_patched_columns() {
        let patch = UpdateTaskRequest {
            completed: Some(true),
            priority: Some(Priority::Leverage),
            ..Default::default()
        };
        let (sql, values) = update(5, "u1", &patch);
        assert!(sql.contains(r#""completed" = ?"#));
        assert!(sql.contains(r#""priority" = ?"#));
        assert!(!sql.contains(r#""content" = ?"#));
        assert!(sql.contains("RETURNING"));
        // two SET values + id + user_id
        assert_eq!(values.0.len(), 4);
    }

    #[test]
    fn delete_checks_ownership() {
        let (sql, values) = delete(5, "u1");
        assert!(sql.contains(r#""user_id" = ?"#));
        assert_eq!(values.0.len(), 2);
    }
}
