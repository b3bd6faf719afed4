//! Data directory layout and file helpers for Newsdex.
//!
//! Everything Newsdex persists lives under one data directory:
//!
//! ```text
//! {data_dir}/
//!   config.toml
//!   news_data.json
//!   index/
//!   models/
//! ```

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

/// File holding the ingested corpus.
pub const CORPUS_FILE: &str = "news_data.json";

/// Compute the corpus path: `{data_dir}/news_data.json`.
pub fn corpus_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CORPUS_FILE)
}

/// Compute the index root: `{data_dir}/index/`.
pub fn index_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("index")
}

/// Compute the embedding model cache: `{data_dir}/models/`.
pub fn models_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("models")
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `NEWSDEX_DATA_DIR` environment variable
/// 2. `~/.newsdex`
/// 3. `.newsdex` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NEWSDEX_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".newsdex");
    }

    PathBuf::from(".newsdex")
}

/// Write `bytes` to `path` so readers see either the old file or the new one.
///
/// The content goes to a sibling temp file which is synced and then renamed
/// over `path`. Parent directories are created as needed.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&parent).await?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(".{file_name}.{}.tmp", uuid::Uuid::now_v7().simple()));

    let result = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    result
}
