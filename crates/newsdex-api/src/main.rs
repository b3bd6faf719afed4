//! Newsdex CLI entry point.
//!
//! Binary name: `ndx`
//!
//! Parses CLI arguments, initializes tracing and application state, then
//! dispatches to the matching command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing::Instrument;

use cli::{Cli, Commands};
use newsdex_observe::attrs;
use newsdex_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "ndx", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;
    let json = cli.json;

    match cli.command {
        Commands::Ingest { files, source } => {
            cli::ingest::ingest(&state, files, source, json)
                .instrument(tracing::info_span!("newsdex", newsdex.operation = attrs::OP_INGEST))
                .await?;
        }

        Commands::Build { reuse_embeddings } => {
            cli::index::build(&state, reuse_embeddings, json)
                .instrument(tracing::info_span!("newsdex", newsdex.operation = attrs::OP_BUILD))
                .await?;
        }

        Commands::Search { query, k } => {
            cli::search::search(&state, &query, k, json)
                .instrument(tracing::info_span!("newsdex", newsdex.operation = attrs::OP_SEARCH))
                .await?;
        }

        Commands::Interactive { k } => {
            cli::search::interactive(&state, k, json)
                .instrument(tracing::info_span!("newsdex", newsdex.operation = attrs::OP_SEARCH))
                .await?;
        }

        Commands::Status => {
            cli::index::status(&state, json)
                .instrument(tracing::info_span!("newsdex", newsdex.operation = attrs::OP_STATUS))
                .await?;
        }

        // Handled before state initialization
        Commands::Completions { .. } => {}
    }

    Ok(())
}
