use anyhow::{bail, Result};
use clap::Subcommand;

use daybook_api::{MoodEntry, TextEntry};
use daybook_api_client::ApiClient;

use crate::config::load_config;

#[derive(Debug, Clone, Subcommand)]
pub enum MoodAction {
    /// Record how you feel right now
    Log { mood: String },
    /// Show recorded moods, newest first
    List {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum EntryAction {
    /// Add an entry
    Add {
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// Show entries, newest first
    List {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Delete an entry by id
    Rm { id: i64 },
}

/// Gratitude and notes share one shape; this picks the endpoint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Journal {
    Gratitude,
    Notes,
}

impl Journal {
    fn label(self) -> &'static str {
        match self {
            Journal::Gratitude => "gratitude",
            Journal::Notes => "note",
        }
    }

    async fn list(self, client: &ApiClient) -> Result<Vec<TextEntry>> {
        match self {
            Journal::Gratitude => client.list_gratitude().await,
            Journal::Notes => client.list_notes().await,
        }
    }

    async fn add(self, client: &ApiClient, content: &str) -> Result<TextEntry> {
        match self {
            Journal::Gratitude => client.add_gratitude(content).await,
            Journal::Notes => client.add_note(content).await,
        }
    }

    async fn delete(self, client: &ApiClient, id: i64) -> Result<()> {
        match self {
            Journal::Gratitude => client.delete_gratitude(id).await?,
            Journal::Notes => client.delete_note(id).await?,
        };
        Ok(())
    }
}

pub async fn run_mood(action: MoodAction) -> Result<()> {
    let client = load_config()?.authed_client()?;
    match action {
        MoodAction::Log { mood } => {
            let entry = client.log_mood(&mood).await?;
            println!("Logged {} at {}", entry.mood, entry.created_at);
        }
        MoodAction::List { limit } => {
            let moods = client.list_moods().await?;
            if moods.is_empty() {
                println!("No moods logged yet.");
            }
            for entry in moods.iter().take(limit) {
                println!("{}", format_mood(entry));
            }
        }
    }
    Ok(())
}

pub async fn run_entries(journal: Journal, action: EntryAction) -> Result<()> {
    let client = load_config()?.authed_client()?;
    match action {
        EntryAction::Add { content } => {
            let content = content.join(" ");
            if content.trim().is_empty() {
                bail!("{} cannot be empty", journal.label());
            }
            let entry = journal.add(&client, &content).await?;
            println!("Added {} #{}", journal.label(), entry.id);
        }
        EntryAction::List { limit } => {
            let entries = journal.list(&client).await?;
            if entries.is_empty() {
                println!("No {} entries yet.", journal.label());
            }
            for entry in entries.iter().take(limit) {
                println!("{}", format_entry(entry));
            }
        }
        EntryAction::Rm { id } => {
            journal.delete(&client, id).await?;
            println!("Deleted {} #{id}", journal.label());
        }
    }
    Ok(())
}

fn format_mood(entry: &MoodEntry) -> String {
    format!("  {}  {}", entry.created_at, entry.mood)
}

fn format_entry(entry: &TextEntry) -> String {
    format!("  #{:<4} {}  {}", entry.id, entry.created_at, entry.content)
}
