mod api;
mod cli;
mod config;
mod error;
mod models;
mod services;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::PredictionService;

#[derive(Parser)]
#[command(name = "matchcast")]
#[command(about = "Football match predictions from football-data and betting odds")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Used when no subcommand is given
    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Args)]
struct ServeArgs {
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve(ServeArgs),
    /// List competitions of the top European leagues
    Competitions,
    /// List the matches of a competition
    Upcoming {
        #[arg(short, long)]
        competition: String,
    },
    /// Predict the outcome of a fixture
    Predict {
        #[arg(short, long)]
        competition: String,
        #[arg(long)]
        team_a: String,
        #[arg(long)]
        team_b: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.log_summary();
    let service = PredictionService::from_config(&config)?;

    match cli.command {
        Some(Commands::Serve(args)) => {
            tracing::info!("Starting prediction API server on port {}", args.port);
            api::serve(args.port, service).await?;
        }
        Some(Commands::Competitions) => {
            cli::show_competitions(&service).await?;
        }
        Some(Commands::Upcoming { competition }) => {
            cli::show_upcoming(&service, &competition).await?;
        }
        Some(Commands::Predict { competition, team_a, team_b }) => {
            cli::predict(&service, &competition, &team_a, &team_b).await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting prediction API server on port {}", cli.serve.port);
            api::serve(cli.serve.port, service).await?;
        }
    }

    Ok(())
}
