mod account;
mod config;
mod journal_cmd;
mod tasks_cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;

use journal_cmd::{EntryAction, Journal, MoodAction};
use tasks_cmd::TasksArgs;

#[derive(Parser)]
#[command(
    name = "daybook",
    version,
    about = "daybook CLI - tasks, moods, gratitude and notes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or set configuration
    Config {
        /// Set the server URL
        #[arg(long)]
        server: Option<String>,
    },

    /// Create an account and log in
    Register {
        email: String,
        /// Defaults to the part of the email before '@'
        #[arg(long)]
        username: Option<String>,
    },

    /// Log in with email and password
    Login { email: String },

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Check server health status
    Status,

    /// Manage today/other task lists
    Tasks(TasksArgs),

    /// Mood log
    Mood {
        #[command(subcommand)]
        action: MoodAction,
    },

    /// Gratitude journal
    Gratitude {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Private notes
    Notes {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Delete all of your tasks, moods, gratitude entries and notes
    Wipe {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config { server } => match server {
            Some(url) => config::set_server(&url),
            None => config::show_config(),
        },
        Commands::Register { email, username } => account::run_register(email, username).await,
        Commands::Login { email } => account::run_login(email).await,
        Commands::Logout => account::run_logout().await,
        Commands::Whoami => account::run_whoami().await,
        Commands::Status => account::run_status().await,
        Commands::Tasks(args) => tasks_cmd::run(args).await,
        Commands::Mood { action } => journal_cmd::run_mood(action).await,
        Commands::Gratitude { action } => journal_cmd::run_entries(Journal::Gratitude, action).await,
        Commands::Notes { action } => journal_cmd::run_entries(Journal::Notes, action).await,
        Commands::Wipe { yes } => run_wipe(yes).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run_wipe(yes: bool) -> Result<()> {
    let client = config::load_config()?.authed_client()?;
    if !yes
        && !Confirm::new()
            .with_prompt("Delete ALL of your tasks, moods, gratitude entries and notes?")
            .default(false)
            .interact()?
    {
        println!("Aborted.");
        return Ok(());
    }
    let wiped = client.wipe_my_data().await?;
    println!(
        "Deleted {} tasks, {} moods, {} gratitude entries, {} notes.",
        wiped.tasks, wiped.moods, wiped.gratitude, wiped.notes
    );
    Ok(())
}
