use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use taskd::client::TaskClient;
use taskd::config::ServerConfig;
use taskd::store::{Task, TaskStore};
use taskd::{rest, AppContext};

#[derive(Parser)]
#[command(
    name = "taskd",
    about = "taskd — task tracking service with an HTTP API and CLI client",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the YAML config file (default: ./config.yaml)
    #[arg(long, env = "TASKD_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Bind address for the HTTP listener (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TASKD_HOST")]
    host: Option<String>,

    /// HTTP listener port
    #[arg(long, env = "TASKD_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKD_LOG")]
    log: Option<String>,

    /// Data directory for the task snapshot
    #[arg(long, env = "TASKD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Server URL the client subcommands talk to
    #[arg(long, global = true, default_value = "http://localhost:8080")]
    server: String,
}

#[derive(Subcommand)]
enum Command {
    /// Start the task server (default when no subcommand given).
    ///
    /// Runs taskd in the foreground. Settings come from CLI flags, env vars,
    /// and the YAML config file, in that priority order.
    ///
    /// Examples:
    ///   taskd serve
    ///   taskd --port 9090
    ///   taskd --config /etc/taskd/config.yaml serve
    Serve,
    #[command(flatten)]
    Client(ClientCommand),
}

#[derive(Subcommand)]
enum ClientCommand {
    /// Create a new task.
    ///
    /// Examples:
    ///   taskd create deploy-v2 "Ship the next release"
    ///   taskd create deploy-v2 "Ship the next release" --priority high --due-date 2026-09-01
    Create {
        /// Task name (unique identifier)
        name: String,
        /// Task description
        description: String,
        /// Task priority
        #[arg(long)]
        priority: Option<String>,
        /// Task due date
        #[arg(long)]
        due_date: Option<String>,
    },
    /// List all tasks.
    ///
    /// Examples:
    ///   taskd list
    List,
    /// Show one task with its comments.
    ///
    /// Examples:
    ///   taskd get deploy-v2
    Get {
        /// Task name
        name: String,
    },
    /// Update a task's status.
    ///
    /// Examples:
    ///   taskd update deploy-v2 in-progress
    ///   taskd update deploy-v2 completed
    Update {
        /// Task name
        name: String,
        /// New status
        #[arg(value_parser = ["pending", "in-progress", "completed"])]
        status: String,
    },
    /// Assign a task to someone.
    ///
    /// Examples:
    ///   taskd assign deploy-v2 alice
    Assign {
        /// Task name
        name: String,
        /// Assignee name
        assignee: String,
    },
    /// Add a comment to a task.
    ///
    /// Examples:
    ///   taskd comment deploy-v2 "blocked on the staging environment"
    Comment {
        /// Task name
        name: String,
        /// Comment text
        comment: String,
    },
    /// Delete a task.
    ///
    /// Examples:
    ///   taskd delete deploy-v2
    Delete {
        /// Task name
        name: String,
    },
    /// Delete all tasks.
    ///
    /// Examples:
    ///   taskd delete-all
    DeleteAll,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        None | Some(Command::Serve) => {
            run_server(args.config, args.host, args.port, args.log, args.data_dir).await?;
        }
        Some(Command::Client(command)) => {
            if let Err(err) = run_client(command, &args.server).await {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn run_server(
    config_path: Option<std::path::PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    log: Option<String>,
    data_dir: Option<std::path::PathBuf>,
) -> Result<()> {
    let config = Arc::new(ServerConfig::new(config_path, host, port, log, data_dir)?);

    // Init once — must happen before any tracing calls.
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.as_str())
        .compact()
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "taskd starting");
    info!(
        data_dir = %config.data_dir.display(),
        host = %config.host,
        port = config.port,
        max_concurrent = config.max_concurrent,
        request_timeout = config.request_timeout,
        "config loaded"
    );

    let store = Arc::new(TaskStore::open(&config.data_dir)?);

    let ctx = Arc::new(AppContext {
        config,
        store,
        started_at: std::time::Instant::now(),
    });

    rest::start_server(ctx).await
}

async fn run_client(command: ClientCommand, server: &str) -> Result<()> {
    let client = TaskClient::new(server)?;

    match command {
        ClientCommand::Create {
            name,
            description,
            priority,
            due_date,
        } => {
            client
                .create_task(&name, &description, priority.as_deref(), due_date.as_deref())
                .await?;
            println!("Task '{name}' created successfully");
        }
        ClientCommand::List => {
            let mut tasks = client.list_tasks().await?;
            if tasks.is_empty() {
                println!("No tasks found");
                return Ok(());
            }
            tasks.sort_by(|a, b| a.name.cmp(&b.name));
            println!("Tasks:");
            println!("------");
            for task in &tasks {
                print_task(task);
            }
        }
        ClientCommand::Get { name } => {
            let task = client.get_task(&name).await?;
            print_task(&task);
        }
        ClientCommand::Update { name, status } => {
            client.update_status(&name, &status).await?;
            println!("Task '{name}' status updated to '{status}'");
        }
        ClientCommand::Assign { name, assignee } => {
            client.assign_task(&name, &assignee).await?;
            println!("Task '{name}' assigned to '{assignee}'");
        }
        ClientCommand::Comment { name, comment } => {
            client.add_comment(&name, &comment).await?;
            println!("Comment added to task '{name}'");
        }
        ClientCommand::Delete { name } => {
            client.delete_task(&name).await?;
            println!("Task '{name}' deleted successfully");
        }
        ClientCommand::DeleteAll => {
            client.delete_all().await?;
            println!("All tasks deleted successfully");
        }
    }

    Ok(())
}

fn print_task(task: &Task) {
    println!("Task: {}", task.name);
    println!("Description: {}", task.description);
    println!("Status: {}", task.status);
    println!("Priority: {}", task.priority);
    println!("Due Date: {}", task.due_date);
    if let Some(assignee) = &task.assignee {
        println!("Assignee: {assignee}");
    }
    println!("Created: {}", task.created_at.to_rfc3339());
    println!("Updated: {}", task.updated_at.to_rfc3339());
    if !task.comments.is_empty() {
        println!("Comments:");
        for comment in &task.comments {
            println!("  - {comment}");
        }
    }
    println!();
}
