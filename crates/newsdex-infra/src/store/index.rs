//! Filesystem implementation of `IndexStore` with atomic generation swap.
//!
//! ```text
//! {root}/
//!   CURRENT                  name of the live generation
//!   gen-<uuid v7>/
//!     vectors.bin
//!     metadata.json
//!     descriptor.json
//! ```
//!
//! A save writes a complete new generation directory, then atomically
//! replaces `CURRENT`. Readers follow `CURRENT`, so they observe either the
//! old generation or the new one, never a mix. The live generation and the
//! one it replaced are kept; older ones are pruned.

use std::path::{Path, PathBuf};

use newsdex_core::index::VectorIndex;
use newsdex_core::repository::index::{IndexSnapshot, IndexStore};
use newsdex_types::error::IndexError;
use newsdex_types::index::{IndexDescriptor, IndexMetadataEntry};
use tokio::io::AsyncWriteExt;

use super::codec;
use crate::filesystem::write_atomic;

const CURRENT_FILE: &str = "CURRENT";
const GENERATION_PREFIX: &str = "gen-";
const VECTORS_FILE: &str = "vectors.bin";
const METADATA_FILE: &str = "metadata.json";
const DESCRIPTOR_FILE: &str = "descriptor.json";

/// Index store rooted at `{data_dir}/index/`.
#[derive(Debug, Clone)]
pub struct FileIndexStore {
    root: PathBuf,
}

impl FileIndexStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read only the live descriptor, without loading vectors.
    pub async fn load_descriptor(&self) -> Result<IndexDescriptor, IndexError> {
        let generation = self.current_generation().await?;
        read_json(&self.root.join(&generation).join(DESCRIPTOR_FILE)).await
    }

    /// Name of the live generation directory.
    async fn current_generation(&self) -> Result<String, IndexError> {
        let pointer = self.root.join(CURRENT_FILE);
        let content = match tokio::fs::read_to_string(&pointer).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(IndexError::NotFound(format!(
                    "no index at {}",
                    self.root.display()
                )));
            }
            Err(err) => {
                return Err(IndexError::Persistence(format!("{}: {err}", pointer.display())));
            }
        };

        let name = content.trim();
        if !is_generation_name(name) {
            return Err(IndexError::CorruptState(format!(
                "{} names invalid generation '{name}'",
                pointer.display()
            )));
        }
        Ok(name.to_string())
    }

    async fn write_generation(&self, dir: &Path, snapshot: &IndexSnapshot) -> std::io::Result<()> {
        tokio::fs::create_dir_all(dir).await?;

        let metadata = serde_json::to_vec_pretty(&snapshot.metadata).map_err(std::io::Error::other)?;
        let descriptor =
            serde_json::to_vec_pretty(&snapshot.descriptor).map_err(std::io::Error::other)?;

        write_synced(&dir.join(VECTORS_FILE), &codec::encode(&snapshot.index)).await?;
        write_synced(&dir.join(METADATA_FILE), &metadata).await?;
        write_synced(&dir.join(DESCRIPTOR_FILE), &descriptor).await?;
        Ok(())
    }

    /// Remove generations other than `keep`.
    async fn prune(&self, keep: &[&str]) -> std::io::Result<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_generation_name(&name) || keep.contains(&name.as_str()) {
                continue;
            }
            tokio::fs::remove_dir_all(entry.path()).await?;
            removed += 1;
        }
        Ok(removed)
    }
}

impl IndexStore for FileIndexStore {
    async fn save(&self, snapshot: &IndexSnapshot) -> Result<(), IndexError> {
        snapshot.validate()?;

        let previous = self.current_generation().await.ok();
        let name = format!("{GENERATION_PREFIX}{}", uuid::Uuid::now_v7().simple());
        let dir = self.root.join(&name);

        if let Err(err) = self.write_generation(&dir, snapshot).await {
            let _ = tokio::fs::remove_dir_all(&dir).await;
            return Err(IndexError::Persistence(format!("{}: {err}", dir.display())));
        }

        if let Err(err) = write_atomic(&self.root.join(CURRENT_FILE), name.as_bytes()).await {
            let _ = tokio::fs::remove_dir_all(&dir).await;
            return Err(IndexError::Persistence(format!(
                "failed to publish generation {name}: {err}"
            )));
        }

        tracing::info!(
            generation = %name,
            rows = snapshot.index.len(),
            dimension = snapshot.descriptor.embedding_dim,
            "published index generation"
        );

        let mut keep = vec![name.as_str()];
        if let Some(previous) = previous.as_deref() {
            keep.push(previous);
        }
        match self.prune(&keep).await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "pruned old index generations"),
            Err(err) => tracing::warn!("failed to prune old index generations: {err}"),
        }

        Ok(())
    }

    async fn load(&self) -> Result<IndexSnapshot, IndexError> {
        let generation = self.current_generation().await?;
        let dir = self.root.join(&generation);

        let vectors = read_artifact(&dir.join(VECTORS_FILE)).await?;
        let index = codec::decode(&vectors)?;
        let metadata: Vec<IndexMetadataEntry> = read_json(&dir.join(METADATA_FILE)).await?;
        let descriptor: IndexDescriptor = read_json(&dir.join(DESCRIPTOR_FILE)).await?;

        let snapshot = IndexSnapshot {
            index,
            metadata,
            descriptor,
        };
        snapshot.validate()?;

        tracing::debug!(generation = %generation, rows = snapshot.index.len(), "loaded index");
        Ok(snapshot)
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(self.root.join(CURRENT_FILE))
            .await
            .unwrap_or(false)
    }
}

fn is_generation_name(name: &str) -> bool {
    name.strip_prefix(GENERATION_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Read a generation file. A missing file is `NotFound`.
async fn read_artifact(path: &Path) -> Result<Vec<u8>, IndexError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(IndexError::NotFound(
            format!("missing index artifact {}", path.display()),
        )),
        Err(err) => Err(IndexError::Persistence(format!("{}: {err}", path.display()))),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, IndexError> {
    let bytes = read_artifact(path).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| IndexError::CorruptState(format!("{}: {e}", path.display())))
}
