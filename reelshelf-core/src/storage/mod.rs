//! Named binary blobs under a logical path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Read/write/delete of blobs keyed by a relative, slash-separated name such
/// as `share-images/ada.png`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// `Ok(None)` when nothing is stored under `key`.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace whatever is stored under `key`. Last writer wins.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Returns whether a blob was removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Keys are one or more segments of `[A-Za-z0-9._-]`, none of them `.` or
/// `..`, so they can never leave the store root.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && segment.bytes().all(|b| {
                    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-')
                })
        })
}

/// Blobs stored as files beneath a root directory.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for_key(&self, key: &str) -> Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(CoreError::Storage(format!("invalid blob key: {key}")));
        }
        Ok(self.root.join(key))
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            CoreError::Storage(format!(
                "failed to create blob dir {:?}: {err}",
                self.root
            ))
        })
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for_key(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(CoreError::Storage(format!(
                "failed to read blob {:?}: {err}",
                path
            ))),
        }
    }

    /// Atomic per key: written to a temp file beside the target, then renamed
    /// over it.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for_key(key)?;
        let parent = path.parent().unwrap_or(&self.root).to_path_buf();
        tokio::fs::create_dir_all(&parent).await.map_err(|err| {
            CoreError::Storage(format!(
                "failed to create blob dir {:?}: {err}",
                parent
            ))
        })?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("blob");
        let tmp =
            parent.join(format!("{file_name}.tmp-{}", Uuid::new_v4().simple()));

        let mut file = tokio::fs::File::create(&tmp).await.map_err(|err| {
            CoreError::Storage(format!(
                "failed to create temp blob {:?}: {err}",
                tmp
            ))
        })?;
        file.write_all(bytes).await.map_err(|err| {
            CoreError::Storage(format!(
                "failed to write temp blob {:?}: {err}",
                tmp
            ))
        })?;
        file.flush().await.map_err(|err| {
            CoreError::Storage(format!(
                "failed to flush temp blob {:?}: {err}",
                tmp
            ))
        })?;
        drop(file);

        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CoreError::Storage(format!(
                "failed to move blob {:?} -> {:?}: {err}",
                tmp, path
            )));
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let path = self.path_for_key(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(CoreError::Storage(format!(
                "failed to delete blob {:?}: {err}",
                path
            ))),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryBlobStore;

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use dashmap::DashMap;

    use super::{BlobStore, is_valid_key};
    use crate::error::{CoreError, Result};

    /// In-process blob store. `fail_writes` simulates a full or read-only
    /// disk.
    #[derive(Debug, Default)]
    pub struct MemoryBlobStore {
        blobs: DashMap<String, Vec<u8>>,
        fail_writes: AtomicBool,
    }

    impl MemoryBlobStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        pub fn len(&self) -> usize {
            self.blobs.len()
        }

        pub fn is_empty(&self) -> bool {
            self.blobs.is_empty()
        }

        pub fn contains(&self, key: &str) -> bool {
            self.blobs.contains_key(key)
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.blobs.get(key).map(|entry| entry.value().clone()))
        }

        async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
            if !is_valid_key(key) {
                return Err(CoreError::Storage(format!("invalid blob key: {key}")));
            }
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(CoreError::Storage(format!(
                    "simulated write failure for {key}"
                )));
            }
            self.blobs.insert(key.to_string(), bytes.to_vec());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<bool> {
            Ok(self.blobs.remove(key).is_some())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_cannot_escape_the_root() {
        assert!(is_valid_key("share-images/ada.png"));
        assert!(!is_valid_key("../secret"));
        assert!(!is_valid_key("share-images/../../x"));
        assert!(!is_valid_key("/abs/path"));
        assert!(!is_valid_key("a//b"));
        assert!(!is_valid_key(""));
    }

    #[tokio::test]
    async fn local_store_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        assert_eq!(store.read("share-images/ada.png").await.unwrap(), None);

        store.write("share-images/ada.png", b"first").await.unwrap();
        store.write("share-images/ada.png", b"second").await.unwrap();
        assert_eq!(
            store.read("share-images/ada.png").await.unwrap().as_deref(),
            Some(&b"second"[..])
        );

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("share-images"))
            .unwrap()
            .collect();
        assert_eq!(leftovers.len(), 1);

        assert!(store.delete("share-images/ada.png").await.unwrap());
        assert!(!store.delete("share-images/ada.png").await.unwrap());
    }

    #[tokio::test]
    async fn local_store_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let err = store.write("../escape.png", b"x").await.unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
    }
}
