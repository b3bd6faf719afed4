//! Global configuration loader for Newsdex.
//!
//! Reads `config.toml` from the data directory (`~/.newsdex/` in production)
//! and deserializes it into [`NewsdexConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::Path;

use newsdex_types::config::NewsdexConfig;

/// Smallest result count a query may ask for.
const MIN_TOP_K: usize = 1;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`NewsdexConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> NewsdexConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return NewsdexConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return NewsdexConfig::default();
        }
    };

    match toml::from_str::<NewsdexConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            NewsdexConfig::default()
        }
    }
}

/// Resolve the number of results for a query.
///
/// Priority:
/// 1. Explicit `-k` on the command line
/// 2. `default_top_k` from `config.toml`
///
/// A floor of one result is enforced regardless of source.
pub fn resolve_top_k(config: &NewsdexConfig, requested: Option<usize>) -> usize {
    requested.unwrap_or(config.default_top_k).max(MIN_TOP_K)
}
