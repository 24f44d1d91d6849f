mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kingchat")]
#[command(author, version, about = "Chat with LeBron James through a local Ollama model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat page server
    Serve {
        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat in the terminal
    Chat {
        /// Model to start with (must be one of ollama.models)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question and print the reply
    Ask {
        /// What to ask
        prompt: String,

        /// Model to use (must be one of ollama.models)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List models installed on the Ollama server
    #[command(alias = "ls")]
    Models,

    /// Show Ollama connectivity and model availability
    Status,

    /// View or set configuration
    Config {
        /// Config key (e.g., "ollama.default_model", "generation.temperature")
        key: Option<String>,

        /// Value to set (if omitted, shows current value)
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            commands::serve::execute(host, port).await?;
        }
        Commands::Chat { model } => {
            commands::chat::execute(model.as_deref()).await?;
        }
        Commands::Ask { prompt, model } => {
            commands::ask::execute(&prompt, model.as_deref()).await?;
        }
        Commands::Models => {
            commands::models::execute().await?;
        }
        Commands::Status => {
            commands::status::execute().await?;
        }
        Commands::Config { key, value } => {
            commands::config::execute(key.as_deref(), value.as_deref()).await?;
        }
    }

    Ok(())
}
