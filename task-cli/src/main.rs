use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use task_cli::config::Config;
use task_cli::{FileStorage, Filter, Status, SystemClock, TaskId, TaskStore};
use tracing_subscriber::EnvFilter;

/// Track what you need to do, what you are doing and what you have done.
#[derive(Parser, Debug)]
#[command(name = "task-cli", version)]
struct Cli {
    /// Task file to use instead of the configured one
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Add a new task
    Add { description: String },
    /// Replace the description of a task
    Update { id: TaskId, description: String },
    /// Delete a task
    Delete { id: TaskId },
    /// Mark a task as in progress
    MarkInProgress { id: TaskId },
    /// Mark a task as done
    MarkDone { id: TaskId },
    /// Mark a task as todo
    MarkTodo { id: TaskId },
    /// List tasks: all, todo, in-progress or done
    List {
        #[arg(default_value = "all")]
        filter: Filter,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let config = Config::load()?;
    init_tracing(&config.log_level);

    let path = cli.file.unwrap_or(config.file);
    let mut store = TaskStore::open(FileStorage::new(path), SystemClock)?;

    let message = match cli.command {
        Commands::Add { description } => {
            let id = store.add(&description)?;
            format!("Task added successfully (ID: {id})")
        }
        Commands::Update { id, description } => {
            store.update(id, &description)?;
            format!("Task {id} updated successfully.")
        }
        Commands::Delete { id } => {
            store.delete(id)?;
            format!("Task {id} deleted successfully.")
        }
        Commands::MarkInProgress { id } => mark(&mut store, id, Status::InProgress)?,
        Commands::MarkDone { id } => mark(&mut store, id, Status::Done)?,
        Commands::MarkTodo { id } => mark(&mut store, id, Status::Todo)?,
        Commands::List { filter } => store.list(filter).to_string(),
    };
    Ok(message)
}

fn mark(
    store: &mut TaskStore<FileStorage, SystemClock>,
    id: TaskId,
    status: Status,
) -> anyhow::Result<String> {
    store.set_status(id, status)?;
    Ok(format!("Task {id} marked as {status}."))
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .init();
}
