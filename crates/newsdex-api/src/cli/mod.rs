//! CLI command definitions and dispatch for the `ndx` binary.
//!
//! Uses clap derive macros for argument parsing. Commands are verbs over the
//! single corpus and index in the data directory (e.g., `ndx ingest`,
//! `ndx build`, `ndx search`).

pub mod index;
pub mod ingest;
pub mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Semantic search over a local news corpus.
#[derive(Parser)]
#[command(name = "ndx", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "NEWSDEX_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge fetched article batches into the corpus, skipping known headlines.
    Ingest {
        /// JSON files, each an array of articles.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Source label for articles that carry none.
        #[arg(long)]
        source: Option<String>,
    },

    /// Embed the corpus and publish a new index.
    Build {
        /// Reuse vectors from the current index for unchanged documents.
        #[arg(long)]
        reuse_embeddings: bool,
    },

    /// Find the articles most similar to a query.
    #[command(alias = "s")]
    Search {
        /// Free-text query.
        query: String,

        /// Number of results (defaults to `default_top_k` from config.toml).
        #[arg(short)]
        k: Option<usize>,
    },

    /// Run queries from a prompt until `exit`.
    Interactive {
        /// Number of results per query.
        #[arg(short)]
        k: Option<usize>,
    },

    /// Corpus and index status.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Truncate to `max` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}
