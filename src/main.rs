//! Provisio CLI
//!
//! Command-line shell over the client-side stores:
//! - Inspect and edit the persisted command queue
//! - Log in, log out and show the current session
//! - Generate a default config file

use clap::{Parser, Subcommand};
use provisio::{
    generate_default_config, logging, AppContext, Config, HttpUserDirectory, LoadedConfig, User,
    UserDirectory,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "provisio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client-side state for the IT provisioning platform")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: searched in the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, e.g. http://localhost:5173/api
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Run without persistent storage
    #[arg(long, global = true)]
    pub no_storage: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or edit the command queue
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// Manage the user session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum QueueAction {
    /// Show queued commands
    List,
    /// Append a command (any JSON value)
    Push {
        /// Command as JSON, e.g. '{"action":"create_mailbox"}'
        entry: String,
    },
    /// Remove the command at a position (0-indexed)
    Remove { index: usize },
    /// Drop every queued command
    Clear,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Log in as a user
    Login {
        /// User identifier
        user_id: String,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List users known to the backend
    Users {
        #[arg(long, default_value = "0")]
        skip: u32,
        #[arg(long, default_value = "100")]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loaded = match &cli.config {
        Some(path) => LoadedConfig {
            config: Config::load_with_env(path)?,
            source: Some(path.clone()),
            skipped: Vec::new(),
        },
        None => Config::load_default(),
    };
    if let Some(url) = cli.api_url {
        loaded.config.api.base_url = url;
    }
    if cli.no_storage {
        loaded.config.storage.enabled = false;
    }

    logging::init(&loaded.config.logging)?;
    loaded.log();
    let config = loaded.config;

    match cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }

        Commands::Queue { action } => {
            let app = AppContext::from_config(&config)?;
            let queue = &app.command_queue;

            match action {
                QueueAction::List => {
                    if queue.is_empty() {
                        println!("Command queue is empty");
                    }
                    for (i, entry) in queue.snapshot().iter().enumerate() {
                        println!("{:>3}  {}", i, entry);
                    }
                }
                QueueAction::Push { entry } => {
                    let value: serde_json::Value = serde_json::from_str(&entry)
                        .map_err(|e| anyhow::anyhow!("Invalid JSON command: {}", e))?;
                    queue.push(value);
                    println!("Queued ({} pending)", queue.len());
                }
                QueueAction::Remove { index } => match queue.remove(index) {
                    Some(entry) => println!("Removed {}", entry),
                    None => {
                        eprintln!("No command at position {} ({} pending)", index, queue.len());
                        std::process::exit(1);
                    }
                },
                QueueAction::Clear => {
                    queue.clear();
                    println!("Command queue cleared");
                }
            }
        }

        Commands::Session { action } => {
            let app = AppContext::from_config(&config)?;
            app.start().await;
            let session = &app.session;

            match action {
                SessionAction::Login { user_id } => {
                    session.establish(Some(&user_id)).await;
                    match session.current() {
                        Some(user) => println!("Logged in as {}", describe(&user)),
                        None => {
                            eprintln!("Login failed for user {}", user_id);
                            std::process::exit(1);
                        }
                    }
                }
                SessionAction::Logout => {
                    session.clear();
                    println!("Logged out");
                }
                SessionAction::Whoami => match session.current() {
                    Some(user) => println!("{}", describe(&user)),
                    None => println!("Not logged in"),
                },
                SessionAction::Users { skip, limit } => {
                    let directory = HttpUserDirectory::from_config(&config.api)?;
                    let users = directory.list_users(skip, limit).await?;
                    let current = session.current().map(|u| u.id);

                    println!("{:>5}  {:<8} {:<24} {:<32} Service", "ID", "Role", "Name", "Email");
                    for user in users {
                        let marker = if Some(user.id) == current { "*" } else { " " };
                        println!(
                            "{}{:>4}  {:<8} {:<24} {:<32} {}",
                            marker,
                            user.id,
                            user.role,
                            user.full_name,
                            user.email,
                            user.service.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn describe(user: &User) -> String {
    format!(
        "{} <{}> (id {}, {})",
        user.full_name, user.email, user.id, user.role
    )
}
