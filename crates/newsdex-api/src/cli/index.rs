//! Index commands: build a new generation, report corpus and index status.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use newsdex_core::builder::BuildOptions;
use newsdex_core::repository::document::DocumentStore;
use newsdex_core::repository::index::IndexStore;
use newsdex_types::error::IndexError;
use newsdex_types::index::IndexDescriptor;

use crate::state::AppState;

/// Embed the whole corpus and publish the result as the live index.
///
/// # Examples
///
/// ```bash
/// ndx build
/// ndx build --reuse-embeddings
/// ```
pub async fn build(state: &AppState, reuse_embeddings: bool, json: bool) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Loading embedding model...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let embedder = match state.load_embedder().await {
        Ok(embedder) => embedder,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    let mut options = BuildOptions::from(&state.config);
    options.reuse_embeddings |= reuse_embeddings;

    spinner.set_message(format!("Embedding corpus with {}...", embedder.model_name()));
    let builder = state.index_builder(embedder, options);
    let result = builder.build().await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(IndexError::EmptyCorpus) => {
            anyhow::bail!("The corpus is empty. Add articles with `ndx ingest <FILES>` first.")
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Index build failed while {}", builder.state()));
        }
    };

    if json {
        let out = serde_json::json!({
            "descriptor": report.descriptor,
            "embedded": report.embedded,
            "reused": report.reused,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} Index built", style("✓").green().bold());
    println!();
    print_descriptor(&report.descriptor);
    if report.reused > 0 {
        println!(
            "  Reused:     {} ({} embedded)",
            style(report.reused).green(),
            report.embedded
        );
    }
    println!();

    Ok(())
}

/// Show corpus size, live index descriptor, and data directory.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let corpus = state
        .documents
        .load()
        .await
        .context("Failed to read corpus")?;

    let descriptor = if state.index_store.exists().await {
        match state.index_store.load_descriptor().await {
            Ok(descriptor) => Some(descriptor),
            Err(IndexError::NotFound(_)) => None,
            Err(e) => return Err(e).context("Failed to read index descriptor"),
        }
    } else {
        None
    };

    let stale = descriptor
        .as_ref()
        .is_some_and(|d| d.document_count != corpus.len());

    if json {
        let out = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "corpus": {
                "documents": corpus.len(),
            },
            "index": descriptor,
            "stale": stale,
            "config": state.config,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} Newsdex v{}", style("◆").cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Corpus ──").dim());
    println!("  Articles:   {}", style(corpus.len()).bold());
    println!();

    println!("  {}", style("── Index ──").dim());
    match &descriptor {
        Some(descriptor) => {
            print_descriptor(descriptor);
            if stale {
                println!(
                    "  {} Corpus changed since the last build. Run {} to refresh.",
                    style("!").yellow().bold(),
                    style("ndx build").cyan()
                );
            }
        }
        None => {
            println!(
                "  {} No index yet. Run {} to create one.",
                style("i").blue().bold(),
                style("ndx build").cyan()
            );
        }
    }
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir:   {}", style(state.data_dir.display()).dim());
    println!("  Model:      {}", style(&state.config.embedding_model).dim());
    println!();

    Ok(())
}

fn print_descriptor(descriptor: &IndexDescriptor) {
    println!("  Documents:  {}", style(descriptor.document_count).bold());
    println!("  Dimension:  {}", descriptor.embedding_dim);
    println!("  Model:      {}", style(&descriptor.model_identity).cyan());
    println!("  Type:       {}", descriptor.index_type);
    println!(
        "  Built:      {}",
        style(descriptor.created_at.format("%Y-%m-%d %H:%M:%S UTC")).dim()
    );
}
