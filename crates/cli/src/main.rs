//! Docent CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive assistant session in the terminal
//! - `ask`      — One-shot question, prints the answer and exits
//! - `sessions` — List saved conversation threads

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "docent",
    about = "Docent — a conversational assistant over your documents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Resume a specific session id
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question text
        text: String,

        /// Run the turn inside a specific session id
        #[arg(short, long)]
        session: Option<String>,
    },

    /// List saved sessions
    Sessions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { session } => commands::chat::run(session).await?,
        Commands::Ask { text, session } => commands::ask::run(text, session).await?,
        Commands::Sessions => commands::sessions::run().await?,
    }

    Ok(())
}
