//! Local-disk blob store for uploaded files.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context as _, bail};

use crate::domain::repository::BlobStore;
use crate::error::ShopError;

/// URL prefix under which the upload root is served.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Stores blobs as files below `root`, served at [`UPLOADS_PREFIX`].
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    pub root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `key` below the root, refusing absolute paths and `..`.
    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            bail!("invalid blob key {key:?}");
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String, ShopError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(format!("{UPLOADS_PREFIX}/{key}"))
    }

    async fn remove(&self, key: &str) -> Result<(), ShopError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("remove {}", path.display()))
                .into()),
        }
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(UPLOADS_PREFIX)?.strip_prefix('/')
    }
}
