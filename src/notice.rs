//! User-facing, dismissible notifications for editor and gallery outcomes.

use serde::Serialize;

use crate::error::ThumbError;
use crate::preset::TextEffectPreset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

/// A short message for the user: a title plus one sentence of detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Error,
        }
    }

    pub fn saved() -> Self {
        Self::info("Thumbnail saved", "Your thumbnail has been saved to the cloud.")
    }

    pub fn deleted() -> Self {
        Self::info(
            "Thumbnail deleted",
            "The thumbnail has been removed from your gallery.",
        )
    }

    pub fn preset_applied(preset: &TextEffectPreset) -> Self {
        Self::info(format!("Applied \"{}\" preset", preset.name), preset.description)
    }

    pub fn link_copied() -> Self {
        Self::info(
            "Link copied",
            "The shareable link has been copied to your clipboard.",
        )
    }

    /// Describes a failed operation.
    pub fn from_error(err: &ThumbError) -> Self {
        let description = match err {
            ThumbError::NoSavedThumbnails => "There are no saved thumbnails yet.".to_string(),
            ThumbError::NotFound(_) => "That thumbnail is no longer in your gallery.".to_string(),
            ThumbError::Storage(_) | ThumbError::Io { .. } => {
                format!("The thumbnail could not be stored: {err}")
            }
            ThumbError::Decode(_) => "The image could not be read.".to_string(),
            other => other.to_string(),
        };
        Self::error("Error", description)
    }

    /// Notice for the result of a save.
    pub fn for_save<T>(result: &Result<T, ThumbError>) -> Self {
        match result {
            Ok(_) => Self::saved(),
            Err(err) => Self::from_error(err),
        }
    }

    /// Notice for the result of a delete.
    pub fn for_delete(result: &Result<(), ThumbError>) -> Self {
        match result {
            Ok(()) => Self::deleted(),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::find_preset;

    #[test]
    fn outcomes_map_to_notices() {
        assert_eq!(Notice::for_save(&Ok(())), Notice::saved());
        assert_eq!(Notice::for_delete(&Ok(())), Notice::deleted());

        let failed = Notice::for_delete(&Err(ThumbError::NotFound("x".into())));
        assert!(failed.is_error());
        assert_eq!(failed.title, "Error");
    }

    #[test]
    fn storage_errors_carry_detail() {
        let notice = Notice::from_error(&ThumbError::storage("bucket offline"));
        assert!(notice.description.contains("bucket offline"));
    }

    #[test]
    fn preset_notice_names_the_preset() {
        let notice = Notice::preset_applied(find_preset("fire-text").unwrap());
        assert_eq!(notice.title, "Applied \"Fire Text\" preset");
        assert_eq!(notice.severity, Severity::Info);
    }
}
