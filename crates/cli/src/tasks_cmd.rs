use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use daybook_api::{Category, CreateTaskRequest, Priority, UpdateTaskRequest};
use daybook_api_client::ApiClient;
use daybook_task_store::{LocalTask, TaskStore};

use crate::config::load_config;

#[derive(Debug, Clone, Args)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub action: TasksAction,
}

#[derive(Debug, Clone, Subcommand)]
pub enum TasksAction {
    /// Show tasks (both lists unless one is named)
    List {
        #[arg(value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Add a task
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
        /// Put the task in the "other" list instead of "today"
        #[arg(long)]
        other: bool,
        /// Priority 0-3 (none, overhead, neutral, leverage)
        #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
        priority: u8,
        /// Free-form time estimate, e.g. "30m"
        #[arg(short, long)]
        estimate: Option<String>,
    },
    /// Toggle a task's completed flag
    Done { id: i64 },
    /// Edit task fields or move it to the other list
    Edit {
        id: i64,
        #[arg(long)]
        content: Option<String>,
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=3))]
        priority: Option<u8>,
        #[arg(short, long, conflicts_with = "clear_estimate")]
        estimate: Option<String>,
        #[arg(long)]
        clear_estimate: bool,
        /// Move to "today" or "other"
        #[arg(long = "move", value_parser = parse_category)]
        move_to: Option<Category>,
    },
    /// Delete a task
    Rm { id: i64 },
}

fn parse_category(raw: &str) -> std::result::Result<Category, String> {
    raw.parse::<Category>().map_err(|e| e.to_string())
}

fn priority(raw: u8) -> Result<Priority> {
    Priority::try_from(raw).map_err(anyhow::Error::msg)
}

pub async fn run(args: TasksArgs) -> Result<()> {
    let config = load_config()?;
    let mut store = TaskStore::new(config.authed_client()?);
    store.fetch_tasks().await?;

    match args.action {
        TasksAction::List { category } => {
            let categories = match category {
                Some(category) => vec![category],
                None => Category::ALL.to_vec(),
            };
            print_lists(&store, &categories);
        }
        TasksAction::Add {
            content,
            other,
            priority: raw_priority,
            estimate,
        } => {
            let category = if other { Category::Other } else { Category::Today };
            let req = CreateTaskRequest {
                content: content.join(" "),
                priority: priority(raw_priority)?,
                estimated_time: estimate,
            };
            let task = store.add_task(category, req).await?;
            println!("Added #{} to {category}: {}", task.id, task.content);
        }
        TasksAction::Done { id } => {
            let (local, category) = locate(&store, id)?;
            let task = store.toggle_complete(local.id, category).await?;
            let state = if task.completed { "done" } else { "not done" };
            println!("#{} marked {state}: {}", task.id, task.content);
        }
        TasksAction::Edit {
            id,
            content,
            priority: raw_priority,
            estimate,
            clear_estimate,
            move_to,
        } => {
            let patch = UpdateTaskRequest {
                content,
                completed: None,
                priority: raw_priority.map(priority).transpose()?,
                category: move_to,
                estimated_time: if clear_estimate {
                    Some(None)
                } else {
                    estimate.map(Some)
                },
            };
            if patch.is_empty() {
                bail!("nothing to change; pass --content, --priority, --estimate, --clear-estimate or --move");
            }
            let (local, category) = locate(&store, id)?;
            let task = store.update_task(local.id, category, patch).await?;
            println!("Updated #{}", task.id);
            println!("{}", format_task(&LocalTask::from(task)));
        }
        TasksAction::Rm { id } => {
            let (local, category) = locate(&store, id)?;
            store.delete_task(local.id, category).await?;
            println!("Deleted #{id}: {}", local.content);
        }
    }
    Ok(())
}

/// Find a server task id in either list.
fn locate(store: &TaskStore<ApiClient>, id: i64) -> Result<(LocalTask, Category)> {
    let wanted = daybook_task_store::LocalId::Synced(id);
    Category::ALL
        .into_iter()
        .find_map(|category| {
            store
                .state()
                .find(wanted, category)
                .map(|(_, task)| (task.clone(), category))
        })
        .ok_or_else(|| anyhow::anyhow!("no task #{id}"))
}

fn print_lists(store: &TaskStore<ApiClient>, categories: &[Category]) {
    for (i, category) in categories.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let tasks = store.tasks(*category);
        println!("{} ({})", category.as_str().to_uppercase(), tasks.len());
        if tasks.is_empty() {
            println!("  (empty)");
        }
        for task in tasks {
            println!("{}", format_task(task));
        }
    }
}

/// One list line, e.g. `  [x] #12  Buy milk  (leverage, 10m)`.
pub fn format_task(task: &LocalTask) -> String {
    let check = if task.completed { "x" } else { " " };
    let mut line = format!("  [{check}] #{:<4} {}", task.id, task.content);

    let mut tags = Vec::new();
    if task.priority != Priority::None {
        tags.push(task.priority.as_str().to_string());
    }
    if let Some(estimate) = &task.estimated_time {
        tags.push(estimate.clone());
    }
    if !tags.is_empty() {
        line.push_str(&format!("  ({})", tags.join(", ")));
    }
    line
}
