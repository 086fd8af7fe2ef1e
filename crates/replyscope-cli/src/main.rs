mod analyze;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "replyscope-cli")]
#[command(about = "Scrape and analyze the replies to a post")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect the replies to a post and print them as JSON
    Scrape {
        /// URL of the post whose replies are collected
        #[arg(long)]
        url: String,
    },
    /// Analyze saved replies and print the analysis as JSON
    Analyze {
        /// File holding a scrape envelope or a bare array of comments
        #[arg(long)]
        input: PathBuf,
        /// Post URL to mention in the prompt (overrides the envelope's)
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = replyscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scrape { url } => scrape::run_scrape(&config, &url).await,
        Commands::Analyze { input, url } => {
            analyze::run_analyze(&config, &input, url.as_deref()).await
        }
    }
}

#[cfg(test)]
mod tests;
