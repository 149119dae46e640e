//! Public blob storage for rendered thumbnails.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::error::{ThumbError, ThumbResult};

/// Stores bytes under a key and hands back a publicly readable URL.
pub trait BlobStore {
    /// Uploads `bytes` under `key`, replacing any existing object, and
    /// returns the object's public URL.
    fn put(&mut self, key: &str, bytes: &[u8], content_type: &str) -> ThumbResult<String>;

    /// Downloads the object behind a URL returned by [`BlobStore::put`].
    fn get(&self, url: &str) -> ThumbResult<Vec<u8>>;
}

fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

fn key_from_url<'a>(base: &str, url: &'a str) -> ThumbResult<&'a str> {
    url.strip_prefix(base.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| ThumbError::storage(format!("url '{url}' is not served by this store")))
}

// ============================================================================
// FsBlobStore
// ============================================================================

/// Blob store backed by a directory; the public URL is `base_url/key`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    base_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> ThumbResult<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(ThumbError::storage(format!("invalid blob key '{key}'")));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&mut self, key: &str, bytes: &[u8], content_type: &str) -> ThumbResult<String> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ThumbError::io(parent, e))?;
        }
        std::fs::write(&path, bytes).map_err(|e| ThumbError::io(&path, e))?;
        tracing::debug!(key, content_type, size = bytes.len(), "stored blob");
        Ok(join_url(&self.base_url, key))
    }

    fn get(&self, url: &str) -> ThumbResult<Vec<u8>> {
        let path = self.path_for(key_from_url(&self.base_url, url)?)?;
        std::fs::read(&path).map_err(|e| ThumbError::io(&path, e))
    }
}

// ============================================================================
// MemoryBlobStore
// ============================================================================

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-process blob store.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    base_url: String,
    objects: HashMap<String, StoredBlob>,
    fail_uploads: bool,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: HashMap::new(),
            fail_uploads: false,
        }
    }

    /// Makes every subsequent [`BlobStore::put`] fail, simulating an
    /// unreachable backend.
    pub fn set_fail_uploads(&mut self, fail: bool) {
        self.fail_uploads = fail;
    }

    pub fn object(&self, key: &str) -> Option<&StoredBlob> {
        self.objects.get(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, key: &str, bytes: &[u8], content_type: &str) -> ThumbResult<String> {
        if self.fail_uploads {
            return Err(ThumbError::storage("upload rejected by blob store"));
        }
        self.objects.insert(
            key.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(join_url(&self.base_url, key))
    }

    fn get(&self, url: &str) -> ThumbResult<Vec<u8>> {
        let key = key_from_url(&self.base_url, url)?;
        self.objects
            .get(key)
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| ThumbError::storage(format!("no blob stored at '{key}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "thumbsmith-blob-{name}-{}",
            uuid::Uuid::new_v4()
        ))
    }

    #[test]
    fn memory_put_then_get() {
        let mut store = MemoryBlobStore::new("https://cdn.test/");
        let url = store.put("thumbnails/a.png", b"png", "image/png").unwrap();
        assert_eq!(url, "https://cdn.test/thumbnails/a.png");
        assert_eq!(store.get(&url).unwrap(), b"png");
        assert_eq!(
            store.object("thumbnails/a.png").unwrap().content_type,
            "image/png"
        );
    }

    #[test]
    fn memory_rejects_foreign_urls() {
        let store = MemoryBlobStore::default();
        assert!(matches!(
            store.get("https://elsewhere/x.png"),
            Err(ThumbError::Storage(_))
        ));
    }

    #[test]
    fn memory_upload_failure() {
        let mut store = MemoryBlobStore::default();
        store.set_fail_uploads(true);
        assert!(store.put("k", b"x", "image/png").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn fs_put_then_get() {
        let root = temp_root("roundtrip");
        let mut store = FsBlobStore::new(&root, "http://localhost:8080/blobs");

        let url = store
            .put("thumbnails/abc.png", b"\x89PNG", "image/png")
            .unwrap();
        assert_eq!(url, "http://localhost:8080/blobs/thumbnails/abc.png");
        assert!(root.join("thumbnails/abc.png").is_file());
        assert_eq!(store.get(&url).unwrap(), b"\x89PNG");

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn fs_rejects_escaping_keys() {
        let mut store = FsBlobStore::new(temp_root("escape"), "http://x");
        assert!(store.put("../evil.png", b"x", "image/png").is_err());
        assert!(store.put("/abs.png", b"x", "image/png").is_err());
        assert!(store.put("", b"x", "image/png").is_err());
    }

    #[test]
    fn fs_missing_object_is_io_error() {
        let store = FsBlobStore::new(temp_root("missing"), "http://x");
        assert!(matches!(
            store.get("http://x/thumbnails/none.png"),
            Err(ThumbError::Io { .. })
        ));
    }
}
