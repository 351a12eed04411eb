//! Laptop Price Estimator CLI
//!
//! A command-line front end for the price server: request estimates,
//! list the accepted values for each field, and check server health.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{estimate, health, options};

/// Laptop Price Estimator CLI
#[derive(Parser)]
#[command(name = "lpp")]
#[command(author, version, about = "CLI for the Laptop Price Estimator", long_about = None)]
pub struct Cli {
    /// API endpoint URL (defaults to the config file, then http://localhost:8080)
    #[arg(long, env = "LPP_API_URL")]
    pub api_url: Option<String>,

    /// Currency symbol shown before prices
    #[arg(long)]
    pub currency: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the price of a laptop configuration
    Estimate(estimate::EstimateArgs),

    /// List the accepted values for each field
    Options,

    /// Show server health and readiness
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load()?;

    // Initialize client
    let client = client::ApiClient::new(&config.resolve_api_url(cli.api_url))?;

    // Execute command
    match cli.command {
        Commands::Estimate(args) => {
            let currency = config.resolve_currency(cli.currency);
            estimate::run(&client, args, &currency, cli.format).await?;
        }
        Commands::Options => {
            options::run(&client, cli.format).await?;
        }
        Commands::Health => {
            health::run(&client, cli.format).await?;
        }
    }

    Ok(())
}
