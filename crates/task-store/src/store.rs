use daybook_api::{Category, CreateTaskRequest, Task, UpdateTaskRequest};
use daybook_api_client::ApiStatusError;
use tracing::warn;

use crate::backend::TaskBackend;
use crate::state::{LocalId, LocalTask, TaskMsg, TaskState};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task {id} is not in the {category} list")]
    NotFound { id: LocalId, category: Category },
    #[error("task is still being created")]
    Pending,
    #[error("nothing to update")]
    EmptyPatch,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    /// HTTP status of a failed server call, if there was one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Backend(err) => ApiStatusError::status_of(err),
            _ => None,
        }
    }
}

/// Optimistic task cache bound to a backend.
///
/// Every mutation updates the cache before the request is sent. On success
/// the entry is reconciled with the row the server returned; on failure the
/// cache is put back exactly as it was and the error is recorded in
/// [`TaskState::error`].
pub struct TaskStore<B> {
    backend: B,
    state: TaskState,
    next_temp: u64,
}

impl<B: TaskBackend> TaskStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: TaskState::default(),
            next_temp: 1,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn tasks(&self, category: Category) -> &[LocalTask] {
        self.state.tasks(category)
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Reload both categories. On failure the previous cache stays in place.
    pub async fn fetch_tasks(&mut self) -> Result<(), StoreError> {
        let loaded = tokio::try_join!(
            self.backend.list_tasks(Category::Today),
            self.backend.list_tasks(Category::Other),
        );
        match loaded {
            Ok((today, other)) => {
                self.state.apply(TaskMsg::Loaded { today, other });
                Ok(())
            }
            Err(err) => {
                warn!("task fetch failed, keeping cached lists: {err:#}");
                Err(self.fail(err))
            }
        }
    }

    pub async fn add_task(
        &mut self,
        category: Category,
        req: CreateTaskRequest,
    ) -> Result<Task, StoreError> {
        let temp = self.next_temp;
        self.next_temp += 1;
        self.state
            .apply(TaskMsg::Inserted(LocalTask::pending(temp, category, &req)));

        match self.backend.create_task(category, &req).await {
            Ok(task) => {
                self.state.apply(TaskMsg::Confirmed {
                    temp,
                    task: task.clone(),
                });
                Ok(task)
            }
            Err(err) => {
                warn!("create failed, dropping optimistic task: {err:#}");
                self.state.apply(TaskMsg::Removed {
                    id: LocalId::Pending(temp),
                    category,
                });
                Err(self.fail(err))
            }
        }
    }

    pub async fn delete_task(&mut self, id: LocalId, category: Category) -> Result<(), StoreError> {
        let (server_id, index, original) = self.lookup(id, category)?;
        self.state.apply(TaskMsg::Removed { id, category });

        match self.backend.delete_task(server_id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!("delete of task {server_id} failed, restoring it: {err:#}");
                self.state.apply(TaskMsg::Restored {
                    task: original,
                    index,
                });
                Err(self.fail(err))
            }
        }
    }

    pub async fn toggle_complete(
        &mut self,
        id: LocalId,
        category: Category,
    ) -> Result<Task, StoreError> {
        let completed = self
            .state
            .find(id, category)
            .map(|(_, task)| task.completed)
            .ok_or(StoreError::NotFound { id, category })?;
        let patch = UpdateTaskRequest {
            completed: Some(!completed),
            ..Default::default()
        };
        self.update_task(id, category, patch).await
    }

    /// Edit fields of a task, including moving it to the other category.
    pub async fn update_task(
        &mut self,
        id: LocalId,
        category: Category,
        patch: UpdateTaskRequest,
    ) -> Result<Task, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::EmptyPatch);
        }
        let (server_id, index, original) = self.lookup(id, category)?;
        let optimistic = original.patched(&patch);
        let moved_to = optimistic.category;
        self.state.apply(TaskMsg::Replaced {
            id,
            category,
            task: optimistic,
        });

        match self.backend.update_task(server_id, &patch).await {
            Ok(task) => {
                self.state.apply(TaskMsg::Replaced {
                    id,
                    category: moved_to,
                    task: LocalTask::from(task.clone()),
                });
                Ok(task)
            }
            Err(err) => {
                warn!("update of task {server_id} failed, reverting: {err:#}");
                self.state.apply(TaskMsg::Removed {
                    id,
                    category: moved_to,
                });
                self.state.apply(TaskMsg::Restored {
                    task: original,
                    index,
                });
                Err(self.fail(err))
            }
        }
    }

    /// Resolve a cached task that the server already knows about.
    fn lookup(
        &self,
        id: LocalId,
        category: Category,
    ) -> Result<(i64, usize, LocalTask), StoreError> {
        let (index, task) = self
            .state
            .find(id, category)
            .ok_or(StoreError::NotFound { id, category })?;
        match task.id {
            LocalId::Synced(server_id) => Ok((server_id, index, task.clone())),
            LocalId::Pending(_) => Err(StoreError::Pending),
        }
    }

    fn fail(&mut self, err: anyhow::Error) -> StoreError {
        self.state.apply(TaskMsg::Failed(format!("{err:#}")));
        StoreError::Backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use daybook_api::Priority;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Mutex;

    /// In-memory backend with a failure switch.
    #[derive(Default)]
    struct FakeBackend {
        rows: Mutex<Vec<Task>>,
        next_id: AtomicI64,
        failing: AtomicBool,
    }

    impl FakeBackend {
        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                bail!("backend unavailable");
            }
            Ok(())
        }

        fn row(&self, id: i64) -> Option<Task> {
            self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned()
        }
    }

    impl TaskBackend for FakeBackend {
        async fn list_tasks(&self, category: Category) -> Result<Vec<Task>> {
            self.check()?;
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.category == category)
                .cloned()
                .collect())
        }

        async fn create_task(&self, category: Category, req: &CreateTaskRequest) -> Result<Task> {
            self.check()?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let task = Task {
                id,
                content: req.content.trim().to_string(),
                completed: false,
                priority: req.priority,
                category,
                estimated_time: req.estimated_time.clone(),
                created_at: "2025-01-01 00:00:00".into(),
                user_id: "u1".into(),
            };
            self.rows.lock().unwrap().push(task.clone());
            Ok(task)
        }

        async fn update_task(&self, id: i64, patch: &UpdateTaskRequest) -> Result<Task> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let Some(task) = rows.iter_mut().find(|t| t.id == id) else {
                bail!("HTTP 404: task not found");
            };
            patch.apply_to(task);
            Ok(task.clone())
        }

        async fn delete_task(&self, id: i64) -> Result<()> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|t| t.id != id);
            if rows.len() == before {
                bail!("HTTP 404: task not found");
            }
            Ok(())
        }
    }

    fn new_task(content: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            content: content.into(),
            priority: Priority::None,
            estimated_time: None,
        }
    }

    async fn seeded() -> TaskStore<FakeBackend> {
        let mut store = TaskStore::new(FakeBackend::default());
        for content in ["one", "two", "three"] {
            store.add_task(Category::Today, new_task(content)).await.unwrap();
        }
        store.add_task(Category::Other, new_task("later")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn add_reconciles_temp_id_with_server_id() {
        let mut store = TaskStore::new(FakeBackend::default());
        let task = store
            .add_task(Category::Today, new_task("  Buy milk "))
            .await
            .unwrap();
        let today = store.tasks(Category::Today);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, LocalId::Synced(task.id));
        // reconciled with the server's normalized row
        assert_eq!(today[0].content, "Buy milk");
        assert!(store.tasks(Category::Other).is_empty());
    }

    #[tokio::test]
    async fn failed_add_rolls_back() {
        let mut store = seeded().await;
        let before = store.state().clone();
        store.backend().set_failing(true);

        let err = store
            .add_task(Category::Today, new_task("four"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(store.tasks(Category::Today), before.tasks(Category::Today));
        assert_eq!(store.error(), Some("backend unavailable"));
    }

    #[tokio::test]
    async fn failed_delete_restores_position() {
        let mut store = seeded().await;
        let before = store.state().clone();
        let middle = store.tasks(Category::Today)[1].id;
        store.backend().set_failing(true);

        store.delete_task(middle, Category::Today).await.unwrap_err();
        assert_eq!(store.tasks(Category::Today), before.tasks(Category::Today));
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn delete_removes_locally_and_remotely() {
        let mut store = seeded().await;
        let first = store.tasks(Category::Today)[0].id;
        store.delete_task(first, Category::Today).await.unwrap();
        assert_eq!(store.tasks(Category::Today).len(), 2);

        store.fetch_tasks().await.unwrap();
        assert!(store.state().find(first, Category::Today).is_none());
    }

    #[tokio::test]
    async fn toggle_twice_restores_flag() {
        let mut store = seeded().await;
        let id = store.tasks(Category::Today)[0].id;

        let once = store.toggle_complete(id, Category::Today).await.unwrap();
        assert!(once.completed);
        let twice = store.toggle_complete(id, Category::Today).await.unwrap();
        assert!(!twice.completed);
        assert!(!store.tasks(Category::Today)[0].completed);
    }

    #[tokio::test]
    async fn failed_toggle_reverts_flag() {
        let mut store = seeded().await;
        let id = store.tasks(Category::Today)[2].id;
        store.backend().set_failing(true);

        store.toggle_complete(id, Category::Today).await.unwrap_err();
        assert!(!store.tasks(Category::Today)[2].completed);
    }

    #[tokio::test]
    async fn update_moves_task_between_categories() {
        let mut store = seeded().await;
        let id = store.tasks(Category::Today)[0].id;
        let patch = UpdateTaskRequest {
            category: Some(Category::Other),
            priority: Some(Priority::Leverage),
            ..Default::default()
        };

        let task = store.update_task(id, Category::Today, patch).await.unwrap();
        assert_eq!(task.category, Category::Other);
        assert_eq!(store.tasks(Category::Today).len(), 2);
        let other = store.tasks(Category::Other);
        assert_eq!(other.last().map(|t| t.id), Some(id));
        assert_eq!(other.last().map(|t| t.priority), Some(Priority::Leverage));
    }

    #[tokio::test]
    async fn failed_update_leaves_cache_untouched() {
        let mut store = seeded().await;
        let before = store.state().clone();
        let id = store.tasks(Category::Today)[1].id;
        store.backend().set_failing(true);

        let patch = UpdateTaskRequest {
            content: Some("renamed".into()),
            category: Some(Category::Other),
            ..Default::default()
        };
        store.update_task(id, Category::Today, patch).await.unwrap_err();
        assert_eq!(store.tasks(Category::Today), before.tasks(Category::Today));
        assert_eq!(store.tasks(Category::Other), before.tasks(Category::Other));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_stale_cache() {
        let mut store = seeded().await;
        let before = store.state().clone();
        store.backend().set_failing(true);

        store.fetch_tasks().await.unwrap_err();
        assert_eq!(store.tasks(Category::Today), before.tasks(Category::Today));
        assert_eq!(store.error(), Some("backend unavailable"));

        store.backend().set_failing(false);
        store.fetch_tasks().await.unwrap();
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn unknown_and_pending_ids_are_rejected_without_a_request() {
        let mut store = seeded().await;
        store.backend().set_failing(true);

        let err = store
            .delete_task(LocalId::Synced(999), Category::Today)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        // a task living in "other" is not found under "today"
        let later = store.tasks(Category::Other)[0].id;
        let err = store.toggle_complete(later, Category::Today).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store
            .update_task(LocalId::Pending(1), Category::Today, UpdateTaskRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyPatch));

        // no backend call happened, so no error was recorded
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn pending_entries_cannot_be_mutated() {
        let mut store = seeded().await;
        let req = new_task("draft");
        store
            .state
            .apply(TaskMsg::Inserted(LocalTask::pending(42, Category::Today, &req)));

        let err = store
            .delete_task(LocalId::Pending(42), Category::Today)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Pending));
        assert!(store.backend().row(1).is_some());
    }
}
