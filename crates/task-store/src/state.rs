use std::fmt;

use daybook_api::{Category, CreateTaskRequest, Priority, Task, UpdateTaskRequest};

/// Identity of a cached task: a client-side placeholder until the server
/// assigns a real id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalId {
    Pending(u64),
    Synced(i64),
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(temp) => f.pad(&format!("pending-{temp}")),
            Self::Synced(id) => f.pad(&id.to_string()),
        }
    }
}

/// A task as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTask {
    pub id: LocalId,
    pub content: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: Category,
    pub estimated_time: Option<String>,
    /// Unknown until the server has stored the task.
    pub created_at: Option<String>,
}

impl LocalTask {
    /// Optimistic placeholder for a task being created.
    pub fn pending(temp: u64, category: Category, req: &CreateTaskRequest) -> Self {
        Self {
            id: LocalId::Pending(temp),
            content: req.content.clone(),
            completed: false,
            priority: req.priority,
            category,
            estimated_time: req.estimated_time.clone(),
            created_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.id, LocalId::Pending(_))
    }

    /// Copy with `patch` applied.
    pub fn patched(&self, patch: &UpdateTaskRequest) -> Self {
        let mut next = self.clone();
        if let Some(content) = &patch.content {
            next.content = content.clone();
        }
        if let Some(completed) = patch.completed {
            next.completed = completed;
        }
        if let Some(priority) = patch.priority {
            next.priority = priority;
        }
        if let Some(category) = patch.category {
            next.category = category;
        }
        if let Some(estimated_time) = &patch.estimated_time {
            next.estimated_time = estimated_time.clone();
        }
        next
    }
}

impl From<Task> for LocalTask {
    fn from(task: Task) -> Self {
        Self {
            id: LocalId::Synced(task.id),
            content: task.content,
            completed: task.completed,
            priority: task.priority,
            category: task.category,
            estimated_time: task.estimated_time,
            created_at: Some(task.created_at),
        }
    }
}

/// State transitions of the task cache.
#[derive(Debug, Clone)]
pub enum TaskMsg {
    /// Fresh server lists replace the cache and clear the error.
    Loaded { today: Vec<Task>, other: Vec<Task> },
    /// Record the latest failure.
    Failed(String),
    /// Append to the task's category.
    Inserted(LocalTask),
    /// The server stored the task created under `temp`.
    Confirmed { temp: u64, task: Task },
    Removed { id: LocalId, category: Category },
    /// Put a task back at `index` of its category (clamped to the list length).
    Restored { task: LocalTask, index: usize },
    /// Swap the entry `id` in `category` for `task`. If `task` moved to the
    /// other category it is appended there.
    Replaced {
        id: LocalId,
        category: Category,
        task: LocalTask,
    },
}

/// The two cached task lists plus the last error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskState {
    today: Vec<LocalTask>,
    other: Vec<LocalTask>,
    error: Option<String>,
}

impl TaskState {
    pub fn tasks(&self, category: Category) -> &[LocalTask] {
        match category {
            Category::Today => &self.today,
            Category::Other => &self.other,
        }
    }

    fn tasks_mut(&mut self, category: Category) -> &mut Vec<LocalTask> {
        match category {
            Category::Today => &mut self.today,
            Category::Other => &mut self.other,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Position and entry of `id` within `category`.
    pub fn find(&self, id: LocalId, category: Category) -> Option<(usize, &LocalTask)> {
        self.tasks(category)
            .iter()
            .enumerate()
            .find(|(_, task)| task.id == id)
    }

    pub fn apply(&mut self, msg: TaskMsg) {
        match msg {
            TaskMsg::Loaded { today, other } => {
                self.today = today.into_iter().map(LocalTask::from).collect();
                self.other = other.into_iter().map(LocalTask::from).collect();
                self.error = None;
            }
            TaskMsg::Failed(error) => self.error = Some(error),
            TaskMsg::Inserted(task) => self.tasks_mut(task.category).push(task),
            TaskMsg::Confirmed { temp, task } => {
                let synced = LocalTask::from(task);
                let list = self.tasks_mut(synced.category);
                if let Some(slot) = list.iter_mut().find(|t| t.id == LocalId::Pending(temp)) {
                    *slot = synced;
                } else if !list.iter().any(|t| t.id == synced.id) {
                    // the placeholder was dropped by a reload that predates the create
                    list.push(synced);
                }
            }
            TaskMsg::Removed { id, category } => {
                self.tasks_mut(category).retain(|task| task.id != id);
            }
            TaskMsg::Restored { task, index } => {
                let list = self.tasks_mut(task.category);
                let index = index.min(list.len());
                list.insert(index, task);
            }
            TaskMsg::Replaced { id, category, task } => {
                let list = self.tasks_mut(category);
                let Some(index) = list.iter().position(|t| t.id == id) else {
                    return;
                };
                if task.category == category {
                    list[index] = task;
                } else {
                    list.remove(index);
                    self.tasks_mut(task.category).push(task);
                }
            }
        }
    }
}
