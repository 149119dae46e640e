//! Storage for the serialized reference list.
//!
//! A reference store holds one string value with an expiry, the way a
//! browser cookie does. An expired value reads as absent.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ThumbError, ThumbResult};

pub trait ReferenceStore {
    /// Returns the stored value, or `None` if nothing is stored or it expired.
    fn read(&self) -> ThumbResult<Option<String>>;

    /// Replaces the stored value; it expires `max_age` from now.
    fn write(&mut self, value: &str, max_age: Duration) -> ThumbResult<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredValue {
    value: String,
    expires_at: DateTime<Utc>,
}

impl StoredValue {
    fn new(value: &str, max_age: Duration) -> ThumbResult<Self> {
        let expires_at = Utc::now()
            .checked_add_signed(max_age)
            .ok_or_else(|| ThumbError::storage(format!("expiry {max_age} is out of range")))?;
        Ok(Self {
            value: value.to_string(),
            expires_at,
        })
    }

    fn live(self) -> Option<String> {
        (self.expires_at > Utc::now()).then_some(self.value)
    }
}

// ============================================================================
// MemoryReferenceStore
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryReferenceStore {
    stored: Option<StoredValue>,
    writes: usize,
}

impl MemoryReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `value`, valid for one day.
    pub fn with_value(value: &str) -> Self {
        Self {
            stored: StoredValue::new(value, Duration::days(1)).ok(),
            writes: 0,
        }
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Expiry of the stored value, if any.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.stored.as_ref().map(|s| s.expires_at)
    }
}

impl ReferenceStore for MemoryReferenceStore {
    fn read(&self) -> ThumbResult<Option<String>> {
        Ok(self.stored.clone().and_then(StoredValue::live))
    }

    fn write(&mut self, value: &str, max_age: Duration) -> ThumbResult<()> {
        self.stored = Some(StoredValue::new(value, max_age)?);
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// FileReferenceStore
// ============================================================================

/// Keeps the value and its expiry in a small JSON file.
#[derive(Debug, Clone)]
pub struct FileReferenceStore {
    path: PathBuf,
}

impl FileReferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReferenceStore for FileReferenceStore {
    fn read(&self) -> ThumbResult<Option<String>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ThumbError::io(&self.path, e)),
        };
        let stored: StoredValue = serde_json::from_str(&json)?;
        Ok(stored.live())
    }

    fn write(&mut self, value: &str, max_age: Duration) -> ThumbResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ThumbError::io(parent, e))?;
        }
        let json = serde_json::to_string(&StoredValue::new(value, max_age)?)?;
        std::fs::write(&self.path, json).map_err(|e| ThumbError::io(&self.path, e))
    }
}
