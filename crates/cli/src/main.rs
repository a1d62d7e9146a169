//! Voyager CLI - Migrations and operational tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table in the storefront database
//! voyager-cli migrate
//!
//! # Print a user's order history from Firestore
//! voyager-cli orders meera@example.com
//!
//! # Validate a catalog file before deploying it
//! voyager-cli catalog check crates/storefront/content/catalog.json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "voyager-cli")]
#[command(author, version, about = "Voyager CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the session store table
    Migrate,
    /// Print a user's orders, newest first
    Orders {
        /// Email the orders are stored under
        email: String,
    },
    /// Catalog maintenance
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Validate a catalog file
    Check {
        /// Path to the catalog JSON
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voyager_cli=info,voyager_storefront=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Orders { email } => commands::orders::list(&email).await?,
        Commands::Catalog {
            action: CatalogAction::Check { path },
        } => commands::catalog::check(&path)?,
    }
    Ok(())
}
