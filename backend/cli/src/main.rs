mod agents_cmd;
mod app;
mod chat_cmd;
mod terminal_output;
mod validate_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use discovery_config::{load_env_file, Settings};
use discovery_logging::{default_log_dir, init_logger};

use app::{chat_client, App};

#[derive(Parser)]
#[command(name = "discovery")]
#[command(about = "Discovery: chat with AI workshop facilitation agents")]
#[command(version)]
struct Cli {
    /// Agent/page configuration file (overrides DISCOVERY_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat
    Chat {
        /// Agent to start with instead of the default page
        #[arg(short, long)]
        agent: Option<String>,
        /// Show admin-only agents
        #[arg(long)]
        admin: bool,
        /// Use a canned client instead of a model
        #[arg(long)]
        offline: bool,
        /// Name used in the welcome message
        #[arg(long, env = "USER", default_value = "there")]
        user: String,
    },
    /// Send one message to an agent and print the reply
    Ask {
        agent: String,
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
        #[arg(long)]
        offline: bool,
    },
    /// List the agents visible to a role
    Agents {
        #[arg(long)]
        admin: bool,
    },
    /// Print the system prompts of an agent
    Prompt { agent: String },
    /// Check the configuration, prompt files and backend settings
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file = load_env_file(None)?;
    let mut settings = Settings::from_env();
    if let Some(path) = cli.config {
        settings.config_path = path;
    }

    let log_dir = settings.log_dir.clone().or_else(default_log_dir);
    init_logger(log_dir.as_deref(), &settings.log_level);
    info!(config = %settings.config_path.display(), backend = settings.backend.name(), "Starting discovery");
    if let Some(path) = env_file {
        debug!(path = %path.display(), "Loaded environment file");
    }

    match cli.command {
        Commands::Chat { agent, admin, offline, user } => {
            let app = App::load(&settings, chat_client(&settings, offline)?).await?;
            chat_cmd::run(&app, agent, admin, &user).await?;
        }
        Commands::Ask { agent, message, offline } => {
            let app = App::load(&settings, chat_client(&settings, offline)?).await?;
            chat_cmd::ask(&app, &agent, &message.join(" ")).await?;
        }
        Commands::Agents { admin } => {
            let app = App::load(&settings, chat_client(&settings, true)?).await?;
            agents_cmd::list(&app, admin);
        }
        Commands::Prompt { agent } => {
            let app = App::load(&settings, chat_client(&settings, true)?).await?;
            agents_cmd::prompt(&app, &agent)?;
        }
        Commands::Validate => {
            let app = App::load(&settings, chat_client(&settings, true)?).await?;
            validate_cmd::run(&app, &settings)?;
        }
    }

    Ok(())
}
