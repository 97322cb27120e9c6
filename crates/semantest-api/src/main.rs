//! Semantest CLI entry point.
//!
//! Binary name: `smtest`
//!
//! Parses CLI arguments, initializes the database and the automation
//! service, then dispatches to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::patterns::PatternsCommand;
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Map verbosity to a default filter; RUST_LOG still wins.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,semantest_core=debug,semantest_infra=debug",
        _ => "trace",
    };
    semantest_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "smtest", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (DB, service)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Stats => {
            cli::stats::stats(&state, cli.json).await?;
        }

        Commands::Patterns { action } => match action {
            PatternsCommand::List { website } => {
                cli::patterns::list_patterns(&state, website.as_deref(), cli.json).await?;
            }
            PatternsCommand::Delete { id, force } => {
                cli::patterns::delete_pattern(&state, &id, force, cli.json).await?;
            }
        },

        Commands::Export { file } => {
            cli::transfer::export_patterns(&state, &file, cli.json).await?;
        }

        Commands::Import { file } => {
            cli::transfer::import_patterns(&state, &file, cli.json).await?;
        }

        Commands::Cleanup {
            max_age_days,
            dry_run,
        } => {
            cli::cleanup::cleanup(&state, max_age_days, dry_run, cli.json).await?;
        }

        Commands::Sessions { limit } => {
            cli::sessions::sessions(&state, limit, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    semantest_observe::tracing_setup::shutdown_tracing();

    Ok(())
}
