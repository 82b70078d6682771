//! # ps-storage-local
//! photoshare/crates/ps-plugins/ps-storage-local/src/lib.rs
//! Local filesystem implementation of `BlobStore`.
//! Blobs live under event-scoped paths ("events/<slug>/<file>",
//! "frames/<file>") chosen by the caller; this plugin only maps those paths
//! onto a root directory and a public URL prefix.

use async_trait::async_trait;
use ps_core::traits::BlobStore;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

pub struct LocalBlobStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/static/uploads")
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix,
        }
    }

    /// Resolves a storage path under the root, refusing anything that could
    /// step outside it.
    fn resolve(&self, path: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(path);
        if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            anyhow::bail!("invalid storage path: {}", path);
        }
        Ok(self.root_path.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, data: Vec<u8>) -> anyhow::Result<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, &data).await?;
        log::debug!("stored {} byte(s) at {}", data.len(), target.display());
        Ok(format!("{}/{}", self.url_prefix, path))
    }

    async fn get(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let target = self.resolve(path)?;
        Ok(fs::read(&target).await?)
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let target = self.resolve(path)?;
        fs::remove_file(&target).await?;
        Ok(())
    }
}
