//! Ingest command: merge fetcher batches into the corpus.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use newsdex_infra::store::read_batch;
use newsdex_types::document::RawDocument;
use newsdex_types::index::UNKNOWN_SOURCE;

use super::truncate_chars;
use crate::state::AppState;

/// Longest headline shown per accepted article.
const HEADLINE_DISPLAY_CHARS: usize = 80;

/// Read every batch file, then merge them as one batch.
///
/// # Examples
///
/// ```bash
/// ndx ingest cnn.json reuters.json
/// ndx ingest daily_star.json --source "Daily Star"
/// ```
pub async fn ingest(
    state: &AppState,
    files: Vec<PathBuf>,
    source: Option<String>,
    json: bool,
) -> Result<()> {
    let mut batch = Vec::new();
    for path in &files {
        let documents = read_batch(path)
            .await
            .with_context(|| format!("Failed to read batch {}", path.display()))?;
        tracing::debug!(path = %path.display(), documents = documents.len(), "read batch");
        batch.extend(documents);
    }

    if let Some(label) = source.as_deref() {
        apply_source(&mut batch, label);
    }

    let report = state
        .ingest_service
        .ingest(batch)
        .await
        .context("Failed to update corpus")?;

    if json {
        let out = serde_json::json!({
            "fetched": report.fetched,
            "accepted": report.accepted,
            "corpus_size": report.corpus_size,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    if report.accepted.is_empty() {
        println!(
            "  {} No new articles ({} fetched, all already in the corpus).",
            style("i").blue().bold(),
            report.fetched
        );
        println!();
        return Ok(());
    }

    println!(
        "  {} {} new article{} ({} fetched)",
        style("✓").green().bold(),
        style(report.accepted.len()).bold(),
        if report.accepted.len() == 1 { "" } else { "s" },
        report.fetched
    );
    println!();
    for doc in &report.accepted {
        println!(
            "  {} {} {}",
            style(format!("[{}]", display_source(&doc.source))).cyan(),
            truncate_chars(&doc.headline, HEADLINE_DISPLAY_CHARS),
            style(format!("({})", doc.published_time)).dim()
        );
    }
    println!();
    println!(
        "  Corpus now holds {} articles. Run {} to refresh the index.",
        style(report.corpus_size).bold(),
        style("ndx build").cyan()
    );
    println!();

    Ok(())
}

/// Fill in `label` for documents without a source.
fn apply_source(batch: &mut [RawDocument], label: &str) {
    for doc in batch.iter_mut().filter(|d| d.source.trim().is_empty()) {
        doc.source = label.to_string();
    }
}

fn display_source(source: &str) -> &str {
    if source.is_empty() { UNKNOWN_SOURCE } else { source }
}
