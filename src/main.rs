//! Command-line interface for ecom-datagen
//!
//! See the library documentation for usage examples. Logging is controlled
//! with `RUST_LOG` and defaults to `info`.

use clap::Parser;
use ecom_datagen::commands::{run_import_products, run_populate_users, run_setup, run_simulate};
use ecom_datagen::shutdown::cancel_on_ctrl_c;
use ecom_datagen::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Setup {
            postgresql,
            event_table,
        } => {
            run_setup(postgresql, event_table).await?;
        }
        Commands::PopulateUsers {
            postgresql,
            count,
            seed,
            batch,
        } => {
            run_populate_users(postgresql, count, seed, batch).await?;
        }
        Commands::ImportProducts {
            postgresql,
            file,
            batch,
        } => {
            run_import_products(postgresql, file, batch).await?;
        }
        Commands::Simulate(args) => {
            run_simulate(args, cancel_on_ctrl_c()).await?;
        }
    }

    Ok(())
}
