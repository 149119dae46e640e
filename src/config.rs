//! Application configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//!
//! ```
//! use thumbsmith::AppConfig;
//!
//! let config = AppConfig::from_json(r#"{ "gallery": { "maxEntries": 5 } }"#).unwrap();
//! assert_eq!(config.gallery.max_entries, 5);
//! assert_eq!(config.gallery.max_age_days, 30);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ThumbError, ThumbResult};
use crate::fonts::FontRegistry;

/// Upper bound for [`GalleryConfig::max_age_days`], about a century.
pub const MAX_AGE_DAYS_LIMIT: i64 = 36_500;

/// Limits and naming for the saved-thumbnail gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryConfig {
    /// Maximum number of references kept, newest first.
    pub max_entries: usize,
    /// Lifetime of the stored reference list, `0..=MAX_AGE_DAYS_LIMIT`.
    pub max_age_days: i64,
    /// Blob key prefix; blobs are stored as `{prefix}/{id}.png`.
    pub key_prefix: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            max_entries: 20,
            max_age_days: 30,
            key_prefix: "thumbnails".into(),
        }
    }
}

impl GalleryConfig {
    /// Lifetime of the reference list; out-of-range day counts are errors.
    pub fn max_age(&self) -> ThumbResult<chrono::TimeDelta> {
        if !(0..=MAX_AGE_DAYS_LIMIT).contains(&self.max_age_days) {
            return Err(ThumbError::config(format!(
                "maxAgeDays must be between 0 and {MAX_AGE_DAYS_LIMIT}, got {}",
                self.max_age_days
            )));
        }
        chrono::TimeDelta::try_days(self.max_age_days)
            .ok_or_else(|| ThumbError::config("maxAgeDays out of range"))
    }

    /// Blob key for a thumbnail id.
    pub fn blob_key(&self, id: &str) -> String {
        let prefix = self.key_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{id}.png")
        } else {
            format!("{prefix}/{id}.png")
        }
    }
}

/// Where thumbnails and their references are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Directory blobs are written under.
    pub blob_root: PathBuf,
    /// URL prefix that maps onto `blob_root`.
    pub public_base_url: String,
    /// JSON file holding the reference list.
    pub reference_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            blob_root: PathBuf::from("thumbsmith-data/blobs"),
            public_base_url: "http://localhost:8080/blobs".into(),
            reference_file: PathBuf::from("thumbsmith-data/saved-thumbnails.json"),
        }
    }
}

/// A font file registered under a custom name at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSource {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub gallery: GalleryConfig,
    pub fonts: Vec<FontSource>,
    /// Load the platform's installed fonts.
    pub system_fonts: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            gallery: GalleryConfig::default(),
            fonts: Vec::new(),
            system_fonts: true,
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> ThumbResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde accepts but the gallery cannot use.
    pub fn validate(&self) -> ThumbResult<()> {
        self.gallery.max_age()?;
        Ok(())
    }

    pub fn from_file(path: impl AsRef<Path>) -> ThumbResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ThumbError::io(path, e))?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> ThumbResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a font registry with the configured fonts.
    ///
    /// A font that fails to load is logged and skipped; text set in it falls
    /// back to the default families.
    pub fn font_registry(&self) -> FontRegistry {
        let mut registry = if self.system_fonts {
            FontRegistry::with_system_fonts()
        } else {
            FontRegistry::new()
        };

        for font in &self.fonts {
            if let Err(err) = registry.register_file(&font.name, &font.path) {
                tracing::warn!(name = %font.name, error = %err, "font not loaded");
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn camel_case_round_trip() {
        let mut config = AppConfig::default();
        config.storage.public_base_url = "https://cdn.example.com".into();
        config.fonts.push(FontSource {
            name: "Brand".into(),
            path: "fonts/brand.ttf".into(),
        });

        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"publicBaseUrl\""));
        assert!(json.contains("\"maxAgeDays\": 30"));
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn blob_keys_use_prefix() {
        let mut gallery = GalleryConfig::default();
        assert_eq!(gallery.blob_key("abc"), "thumbnails/abc.png");
        gallery.key_prefix = "/shared/".into();
        assert_eq!(gallery.blob_key("abc"), "shared/abc.png");
        gallery.key_prefix.clear();
        assert_eq!(gallery.blob_key("abc"), "abc.png");
    }

    #[test]
    fn out_of_range_max_age_is_rejected() {
        for days in [100_000_000, -1, i64::MAX] {
            let json = format!(r#"{{ "gallery": {{ "maxAgeDays": {days} }} }}"#);
            assert!(matches!(
                AppConfig::from_json(&json),
                Err(ThumbError::Config(_))
            ));
        }

        let limit = format!(r#"{{ "gallery": {{ "maxAgeDays": {MAX_AGE_DAYS_LIMIT} }} }}"#);
        let config = AppConfig::from_json(&limit).unwrap();
        assert_eq!(config.gallery.max_age().unwrap().num_days(), MAX_AGE_DAYS_LIMIT);
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            AppConfig::from_file("/no/such/thumbsmith.json"),
            Err(ThumbError::Io { .. })
        ));
    }

    #[test]
    fn missing_fonts_are_skipped() {
        let config = AppConfig {
            system_fonts: false,
            fonts: vec![FontSource {
                name: "Ghost".into(),
                path: "/no/such/font.ttf".into(),
            }],
            ..AppConfig::default()
        };
        let registry = config.font_registry();
        assert_eq!(registry.face_count(), 0);
        assert!(!registry.is_available("Ghost"));
    }
}
