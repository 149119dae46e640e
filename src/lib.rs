//! thumbsmith: video thumbnail compositing and a saved-thumbnail gallery
//!
//! This crate turns a photo, a title and a handful of style settings into a
//! fixed-size thumbnail: the photo is cover-fitted to the chosen aspect, a
//! gradient is blended over it, the title is wrapped and drawn with optional
//! stroke, shadow and line backgrounds, and a logo is placed on top.
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use thumbsmith::{FontRegistry, ThumbnailEditor};
//!
//! let mut editor = ThumbnailEditor::new(FontRegistry::new());
//! editor.set_background_image(RgbaImage::from_pixel(640, 360, Rgba([40, 40, 40, 255])));
//!
//! // Edit the state; the pipeline re-renders only what changed
//! editor.update(|state| {
//!     state.title = "How I Built a Rust Thumbnail Tool".into();
//!     state.gradient.opacity = 0.9;
//! });
//! editor.apply_preset("dramatic");
//!
//! let thumbnail = editor.render().unwrap();
//! assert_eq!(thumbnail.data.dimensions(), (1920, 1080));
//! ```
//!
//! # Serializable State
//!
//! [`EditState`] round-trips through JSON and can be applied to an editor
//! with the [`Configurable`] trait:
//!
//! ```
//! use thumbsmith::{Configurable, EditState, FontRegistry, ThumbnailEditor};
//!
//! let state = EditState::from_json(r#"{ "crop": "square", "title": "Hello" }"#).unwrap();
//!
//! let mut editor = ThumbnailEditor::new(FontRegistry::new());
//! editor.apply_state(&state);
//!
//! let exported = editor.export_state();
//! assert_eq!(exported.title, "Hello");
//! ```

mod assets;
mod color;
mod compositor;
mod config;
mod editor;
mod error;
mod fonts;
mod layer;
mod layout;
mod notice;
mod preset;
mod raster;
mod state;

pub mod gallery;

pub use assets::{
    AssetId, AssetLoader, AssetSlot, AssetTicket, CancellationToken, ImageAsset, LoadOutcome,
};
pub use color::Color;
pub use compositor::{render, Assets};
pub use config::{AppConfig, FontSource, GalleryConfig, StorageConfig, MAX_AGE_DAYS_LIMIT};
pub use editor::{Configurable, ThumbnailEditor};
pub use error::{ThumbError, ThumbResult};
pub use fonts::{FixedAdvance, FontRegistry, FontSpec, TextMeasurer};
pub use gallery::{RecentList, SavedThumbnail, SavedThumbnailRef, ThumbnailGallery};
pub use layer::{
    BackgroundConfig, CacheKey, CoverCrop, GradientConfig, Layer, LayerConfig, LayerEffect,
    LayerPipeline, LayerVersions, LogoConfig, LogoPlacement, RenderContext, TextConfig, VisibleRows,
};
pub use layout::{layout_title, wrap_words, TextBlock, TextLine, MAX_LINE_WIDTH_RATIO};
pub use notice::{Notice, Severity};
pub use preset::{find_preset, list_presets, PresetShadow, PresetStroke, TextEffectPreset};
pub use raster::{RasterImage, RectPx, SizePx};
pub use state::{
    BlendMode, CropAspect, EditState, FontSettings, FontWeight, GradientDirection,
    GradientSettings, LogoPosition, LogoSettings, ShadowSettings, StrokeSettings, TextAlign,
    TextBackground, TextStyle,
};
