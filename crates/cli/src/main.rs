//! ragchat CLI entry point.
//!
//! Commands:
//! - `chat`:   Interactive chat or single-message mode
//! - `search`: Show the context a query would retrieve
//! - `config`: Print the effective or default configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "ragchat",
    about = "ragchat: chat grounded in local notes and web search",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = ragchat_config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Session to read and extend
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Extra instruction appended to the system prompt
        #[arg(short, long)]
        instruction: Option<String>,

        /// Override local retrieval for this run
        #[arg(long)]
        rag: Option<bool>,

        /// Override web search for this run
        #[arg(long)]
        web: Option<bool>,
    },

    /// Print the context block retrieved for a query, without calling the model
    Search {
        /// The query to retrieve context for
        query: String,

        /// Skip web search
        #[arg(long)]
        no_web: bool,

        /// Skip local retrieval
        #[arg(long)]
        no_rag: bool,
    },

    /// Print configuration
    Config {
        /// Print the built-in defaults instead of the effective configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat {
            message,
            session,
            instruction,
            rag,
            web,
        } => {
            let options = commands::chat::ChatOptions {
                session,
                instruction,
                rag,
                web,
            };
            commands::chat::run(&cli.config, message, options).await?
        }
        Commands::Search {
            query,
            no_web,
            no_rag,
        } => commands::search::run(&cli.config, &query, !no_rag, !no_web).await?,
        Commands::Config { default } => commands::config_cmd::show(&cli.config, default)?,
    }

    Ok(())
}
