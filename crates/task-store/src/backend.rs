use std::future::Future;

use anyhow::Result;
use daybook_api::{Category, CreateTaskRequest, Task, UpdateTaskRequest};
use daybook_api_client::ApiClient;

/// Server-side task operations the store depends on.
pub trait TaskBackend {
    fn list_tasks(&self, category: Category) -> impl Future<Output = Result<Vec<Task>>> + Send;

    fn create_task(
        &self,
        category: Category,
        req: &CreateTaskRequest,
    ) -> impl Future<Output = Result<Task>> + Send;

    fn update_task(
        &self,
        id: i64,
        patch: &UpdateTaskRequest,
    ) -> impl Future<Output = Result<Task>> + Send;

    fn delete_task(&self, id: i64) -> impl Future<Output = Result<()>> + Send;
}

impl TaskBackend for ApiClient {
    async fn list_tasks(&self, category: Category) -> Result<Vec<Task>> {
        ApiClient::list_tasks(self, category).await
    }

    async fn create_task(&self, category: Category, req: &CreateTaskRequest) -> Result<Task> {
        ApiClient::create_task(self, category, req).await
    }

    async fn update_task(&self, id: i64, patch: &UpdateTaskRequest) -> Result<Task> {
        ApiClient::update_task(self, id, patch).await
    }

    async fn delete_task(&self, id: i64) -> Result<()> {
        ApiClient::delete_task(self, id).await.map(|_| ())
    }
}
