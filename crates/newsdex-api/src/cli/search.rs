//! Search commands: one-shot query and the interactive prompt loop.

use anyhow::{Context, Result};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Input;

use newsdex_core::query::QueryEngine;
use newsdex_core::repository::index::{IndexSnapshot, IndexStore};
use newsdex_infra::config::resolve_top_k;
use newsdex_types::error::IndexError;
use newsdex_types::index::ScoredResult;

use super::truncate_chars;
use crate::state::AppState;

const HEADLINE_DISPLAY_CHARS: usize = 70;
const PREVIEW_DISPLAY_CHARS: usize = 140;

/// Word that ends an interactive session.
const EXIT_COMMAND: &str = "exit";

/// Answer one query.
///
/// # Examples
///
/// ```bash
/// ndx search "flooding in the capital"
/// ndx search "central bank rates" -k 10 --json
/// ```
pub async fn search(state: &AppState, query: &str, k: Option<usize>, json: bool) -> Result<()> {
    let (engine, snapshot) = open(state).await?;
    let k = resolve_top_k(&state.config, k);

    let results = match engine.search(&snapshot, query, k).await {
        Ok(results) => results,
        Err(IndexError::InvalidQuery) => anyhow::bail!("Query text is empty."),
        Err(e) => return Err(e).context("Search failed"),
    };

    print_results(query, &results, json)
}

/// Prompt for queries until the user types `exit`.
///
/// The index and model are loaded once for the whole session. Blank input
/// re-prompts; a failed query is reported and the loop continues.
pub async fn interactive(state: &AppState, k: Option<usize>, json: bool) -> Result<()> {
    let (engine, snapshot) = open(state).await?;
    let k = resolve_top_k(&state.config, k);

    if !json {
        println!();
        println!(
            "  {} Searching {} articles. Type {} to quit.",
            style("◆").cyan().bold(),
            style(snapshot.metadata.len()).bold(),
            style(EXIT_COMMAND).cyan()
        );
        println!();
    }

    loop {
        let input: String = Input::new()
            .with_prompt("Search")
            .allow_empty(true)
            .interact_text()?;

        let query = input.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case(EXIT_COMMAND) {
            break;
        }

        match engine.search(&snapshot, query, k).await {
            Ok(results) => print_results(query, &results, json)?,
            Err(e) => {
                tracing::warn!("query failed: {e}");
                eprintln!("  {} {e}", style("✗").red().bold());
            }
        }
    }

    Ok(())
}

/// Load the live index and an embedder for the same model.
async fn open(state: &AppState) -> Result<(QueryEngine, IndexSnapshot)> {
    let snapshot = match state.index_store.load().await {
        Ok(snapshot) => snapshot,
        Err(IndexError::NotFound(_)) => {
            anyhow::bail!("No index found. Run `ndx build` first.")
        }
        Err(e) => return Err(e).context("Failed to load index"),
    };

    let embedder = state.load_embedder().await?;
    if embedder.model_name() != snapshot.descriptor.model_identity {
        tracing::warn!(
            index_model = %snapshot.descriptor.model_identity,
            configured_model = embedder.model_name(),
            "index was built with a different model; rebuild with `ndx build`"
        );
    }

    Ok((QueryEngine::new(embedder), snapshot))
}

fn print_results(query: &str, results: &[ScoredResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    println!();
    if results.is_empty() {
        println!("  {} No results for '{}'.", style("i").blue().bold(), query);
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Article").fg(Color::White),
        Cell::new("Source").fg(Color::White),
        Cell::new("Published").fg(Color::White),
        Cell::new("Distance").fg(Color::White),
    ]);

    for result in results {
        let entry = &result.entry;
        let mut article = truncate_chars(&entry.headline, HEADLINE_DISPLAY_CHARS);
        if !entry.preview.is_empty() {
            article.push('\n');
            article.push_str(&truncate_chars(&entry.preview, PREVIEW_DISPLAY_CHARS));
        }
        if !entry.source_url.is_empty() {
            article.push('\n');
            article.push_str(&entry.source_url);
        }

        table.add_row(vec![
            Cell::new(result.rank).fg(Color::Yellow),
            Cell::new(article).fg(Color::White),
            Cell::new(&entry.source).fg(Color::Cyan),
            Cell::new(&entry.published_time).fg(Color::DarkGrey),
            Cell::new(format!("{:.4}", result.distance)).fg(Color::DarkGrey),
        ]);
    }

    println!("  Results for '{}'", style(query).cyan().bold());
    println!();
    println!("{table}");
    println!();

    Ok(())
}
