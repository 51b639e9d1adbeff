//! Filesystem-backed blob store.
//!
//! Serves the role the hosted blob storage played in the original system:
//! notification attachments are uploaded under `notification/{user}/{title}`
//! and the concession history log lives at a fixed JSON path. Objects are
//! plain files under a configured root and are served back over HTTP, so a
//! stored path maps to a stable download URL.

use std::path::{Path, PathBuf};

use crate::errors::AppError;

/// Blob store rooted at a local directory.
#[derive(Clone)]
pub struct BlobStore {
    root: PathBuf,
    public_url: String,
}

impl BlobStore {
    /// Open a blob store, creating the root directory if needed.
    pub async fn open(root: &Path, public_url: &str) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(root).await?;
        Ok(Self {
            root: root.to_path_buf(),
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }

    /// Root directory of the store, for serving objects over HTTP.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public download URL for an object path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/files/{}", self.public_url, path)
    }

    /// Write an object, replacing any existing content wholesale.
    pub async fn put(&self, path: &str, contents: &[u8]) -> Result<(), AppError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, contents).await?;
        Ok(())
    }

    /// Read an object. Returns `None` when the object does not exist.
    pub async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, AppError> {
        let full = self.resolve(path)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Map an object path onto the root, rejecting traversal outside it.
    fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        if path.is_empty()
            || path.starts_with('/')
            || path.split('/').any(|part| part.is_empty() || part == "." || part == "..")
        {
            return Err(AppError::BadRequest(format!("Invalid blob path: {}", path)));
        }
        Ok(self.root.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store() -> (BlobStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::open(dir.path(), "http://127.0.0.1:8080")
            .await
            .unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let (store, _dir) = store().await;
        store.put("notification/u1/report", b"hello").await.unwrap();
        let bytes = store.get("notification/u1/report").await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"hello"[..]));
    }

    #[tokio::test]
    async fn test_missing_object_is_none() {
        let (store, _dir) = store().await;
        assert!(store.get("nope/missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let (store, _dir) = store().await;
        assert!(store.get("../outside").await.is_err());
        assert!(store.put("/absolute", b"x").await.is_err());
    }

    #[tokio::test]
    async fn test_url_for() {
        let (store, _dir) = store().await;
        assert_eq!(
            store.url_for("notification/u1/title"),
            "http://127.0.0.1:8080/files/notification/u1/title"
        );
    }
}
