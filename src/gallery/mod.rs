//! Saved thumbnail gallery.
//!
//! Rendered thumbnails are uploaded as PNG blobs; a short list of references
//! to them (newest first, capped) is kept in a [`ReferenceStore`]. Removing
//! a reference leaves the uploaded blob in place.
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use thumbsmith::gallery::{MemoryBlobStore, MemoryReferenceStore, ThumbnailGallery};
//! use thumbsmith::{GalleryConfig, RasterImage};
//!
//! let mut gallery = ThumbnailGallery::new(
//!     MemoryBlobStore::default(),
//!     MemoryReferenceStore::new(),
//!     GalleryConfig::default(),
//! );
//!
//! let image = RasterImage::new(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
//! let saved = gallery.save(&image, "Launch day").unwrap();
//!
//! assert_eq!(gallery.list()[0].id, saved.id);
//! gallery.delete(&saved.id).unwrap();
//! assert!(gallery.list().is_empty());
//! ```

pub mod blob;
pub mod refs;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore, StoredBlob};
pub use refs::{FileReferenceStore, MemoryReferenceStore, ReferenceStore};

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::GalleryConfig;
use crate::error::{ThumbError, ThumbResult};
use crate::raster::RasterImage;

const UNTITLED: &str = "Untitled";
const PNG_CONTENT_TYPE: &str = "image/png";

// ============================================================================
// References
// ============================================================================

/// Metadata for one saved thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedThumbnailRef {
    pub id: String,
    /// Public URL of the stored PNG.
    pub url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// What [`ThumbnailGallery::save`] hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedThumbnail {
    pub id: String,
    pub url: String,
}

/// Bounded, newest-first list of references.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentList {
    entries: VecDeque<SavedThumbnailRef>,
    capacity: usize,
}

impl RecentList {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Builds a list from newest-first entries, dropping any past capacity.
    pub fn from_entries(capacity: usize, entries: Vec<SavedThumbnailRef>) -> Self {
        let mut entries = VecDeque::from(entries);
        entries.truncate(capacity);
        Self { entries, capacity }
    }

    /// Parses a JSON array of references.
    pub fn from_json(capacity: usize, json: &str) -> ThumbResult<Self> {
        let entries: Vec<SavedThumbnailRef> = serde_json::from_str(json)?;
        Ok(Self::from_entries(capacity, entries))
    }

    /// Parses a stored value, treating absent or malformed input as empty.
    pub fn from_json_lossy(capacity: usize, json: Option<&str>) -> Self {
        let Some(json) = json else {
            return Self::new(capacity);
        };
        Self::from_json(capacity, json).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "discarding malformed thumbnail list");
            Self::new(capacity)
        })
    }

    pub fn to_json(&self) -> ThumbResult<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Adds `entry` as the newest reference. Returns entries pushed past
    /// capacity, oldest last.
    pub fn push_front(&mut self, entry: SavedThumbnailRef) -> Vec<SavedThumbnailRef> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.split_off(self.capacity).into()
        } else {
            Vec::new()
        }
    }

    /// Removes the reference with `id`, preserving the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<SavedThumbnailRef> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(index)
    }

    pub fn get(&self, id: &str) -> Option<&SavedThumbnailRef> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedThumbnailRef> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn to_vec(&self) -> Vec<SavedThumbnailRef> {
        self.entries.iter().cloned().collect()
    }
}

// ============================================================================
// ThumbnailGallery
// ============================================================================

/// Persistence gateway for saved thumbnails.
pub struct ThumbnailGallery<B, R> {
    blobs: B,
    refs: R,
    config: GalleryConfig,
}

impl<B: BlobStore, R: ReferenceStore> ThumbnailGallery<B, R> {
    pub fn new(blobs: B, refs: R, config: GalleryConfig) -> Self {
        Self {
            blobs,
            refs,
            config,
        }
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    pub fn blobs_mut(&mut self) -> &mut B {
        &mut self.blobs
    }

    pub fn refs(&self) -> &R {
        &self.refs
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    fn load(&self) -> RecentList {
        let stored = self.refs.read().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "cannot read thumbnail list");
            None
        });
        RecentList::from_json_lossy(self.config.max_entries, stored.as_deref())
    }

    fn store(&mut self, list: &RecentList, max_age: chrono::TimeDelta) -> ThumbResult<()> {
        self.refs.write(&list.to_json()?, max_age)
    }

    /// Uploads `image` as PNG and records it as the newest saved thumbnail.
    #[tracing::instrument(skip(self, image))]
    pub fn save(&mut self, image: &RasterImage, title: &str) -> ThumbResult<SavedThumbnail> {
        let png = image.to_png_bytes()?;
        self.save_png(&png, title)
    }

    /// Like [`save`](Self::save) for an already encoded PNG.
    pub fn save_png(&mut self, png: &[u8], title: &str) -> ThumbResult<SavedThumbnail> {
        let max_age = self.config.max_age()?;
        let id = Uuid::new_v4().to_string();
        let key = self.config.blob_key(&id);
        let url = self.blobs.put(&key, png, PNG_CONTENT_TYPE)?;

        let title = match title.trim() {
            "" => UNTITLED.to_string(),
            _ => title.to_string(),
        };

        let mut list = self.load();
        let evicted = list.push_front(SavedThumbnailRef {
            id: id.clone(),
            url: url.clone(),
            title,
            created_at: Utc::now(),
        });
        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "dropped oldest thumbnail references");
        }
        self.store(&list, max_age)?;

        tracing::info!(%id, %url, "saved thumbnail");
        Ok(SavedThumbnail { id, url })
    }

    /// Saved thumbnails, newest first.
    pub fn list(&self) -> Vec<SavedThumbnailRef> {
        self.load().to_vec()
    }

    pub fn get(&self, id: &str) -> Option<SavedThumbnailRef> {
        self.load().get(id).cloned()
    }

    /// Removes the reference with `id`. The uploaded blob is kept.
    ///
    /// Fails with [`ThumbError::NoSavedThumbnails`] when no list is stored
    /// and [`ThumbError::NotFound`] when the id is absent; in both cases
    /// nothing is written.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: &str) -> ThumbResult<()> {
        let max_age = self.config.max_age()?;
        let Some(stored) = self.refs.read()? else {
            return Err(ThumbError::NoSavedThumbnails);
        };
        let mut list = RecentList::from_json_lossy(self.config.max_entries, Some(&stored));
        if list.remove(id).is_none() {
            return Err(ThumbError::NotFound(id.to_string()));
        }
        self.store(&list, max_age)?;
        tracing::info!(id, remaining = list.len(), "deleted thumbnail reference");
        Ok(())
    }

    /// Public URL for sharing a saved thumbnail.
    pub fn share_url(&self, id: &str) -> Option<String> {
        self.get(id).map(|r| r.url)
    }

    /// Downloads the PNG bytes of a saved thumbnail.
    pub fn fetch(&self, id: &str) -> ThumbResult<Vec<u8>> {
        let entry = self
            .get(id)
            .ok_or_else(|| ThumbError::NotFound(id.to_string()))?;
        self.blobs.get(&entry.url)
    }

    /// File name offered when downloading a saved thumbnail.
    pub fn download_name(entry: &SavedThumbnailRef) -> String {
        let title = entry.title.trim();
        if title.is_empty() {
            "thumbnail.png".to_string()
        } else {
            format!("{title}.png")
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
