//! Layer infrastructure for thumbnail compositing.
//!
//! The compositor is a fixed pipeline of four layers drawn in order onto one
//! canvas: background, gradient, text, logo. Each layer encapsulates a
//! configuration, an enabled state, version tracking for cache invalidation,
//! and a per-size cache of the canvas as it looks after that layer ran.
//!
//! # Architecture
//!
//! Each layer config implements [`LayerEffect`], which defines:
//! - Which upstream layers its output depends on
//! - How the layer draws itself onto the canvas in [`RenderContext`]

pub mod background;
pub mod gradient;
pub mod logo;
pub mod svg;
pub mod text;

pub use background::{BackgroundConfig, CoverCrop};
pub use gradient::GradientConfig;
pub use logo::{LogoConfig, LogoPlacement, VisibleRows};
pub use text::TextConfig;

use std::collections::HashMap;

use resvg::tiny_skia::Pixmap;

use crate::assets::ImageAsset;
use crate::error::{ThumbError, ThumbResult};
use crate::fonts::FontRegistry;
use crate::raster::{RasterImage, SizePx};
use crate::state::EditState;

// ============================================================================
// Render Context
// ============================================================================

/// Context that flows through the rendering pipeline.
pub struct RenderContext<'a> {
    /// The canvas being drawn, premultiplied RGBA.
    pub canvas: Pixmap,

    /// Canvas dimensions.
    pub size: SizePx,

    /// Fonts available to text layers.
    pub fonts: &'a FontRegistry,
}

impl<'a> RenderContext<'a> {
    /// Creates a context with a fully transparent canvas.
    pub fn new(size: SizePx, fonts: &'a FontRegistry) -> ThumbResult<Self> {
        let canvas = Pixmap::new(size.width, size.height).ok_or_else(|| {
            ThumbError::render(format!(
                "cannot allocate a {}x{} canvas",
                size.width, size.height
            ))
        })?;
        Ok(Self {
            canvas,
            size,
            fonts,
        })
    }
}

// ============================================================================
// Layer Traits
// ============================================================================

/// Trait for layer configuration types.
///
/// Implementations must detect when a configuration meaningfully differs
/// from another, which drives cache invalidation.
pub trait LayerConfig: Clone {
    /// Returns true if this config differs from another in a way that
    /// would produce different rendering output.
    fn differs_from(&self, other: &Self) -> bool;
}

/// Trait for layer configurations that know how to draw themselves.
pub trait LayerEffect: LayerConfig {
    /// Returns the dependency version for cache invalidation.
    ///
    /// Layers that depend on upstream layers should combine their versions.
    /// Root layers (no dependencies) should return `DependencyVersion::NONE`.
    fn dependencies(versions: &LayerVersions) -> DependencyVersion;

    /// Draws onto `ctx.canvas`.
    ///
    /// Asset or font problems are logged and the layer draws nothing; a
    /// layer never aborts the render.
    fn transform(&self, ctx: &mut RenderContext<'_>);
}

// ============================================================================
// Layer Dependencies
// ============================================================================

/// Represents the combined version of upstream layer dependencies.
///
/// This is used to detect when a layer's cache is stale because an
/// upstream layer has changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DependencyVersion(u64);

impl DependencyVersion {
    /// No dependencies (root layer).
    pub const NONE: Self = Self(0);

    /// Combines multiple upstream layer versions into one.
    ///
    /// Versions only ever increase, so the sum changes whenever any
    /// component changes.
    pub fn combine(versions: &[u64]) -> Self {
        Self(versions.iter().fold(0u64, |acc, v| acc.wrapping_add(*v)))
    }
}

// ============================================================================
// Layer Versions
// ============================================================================

/// Snapshot of all layer versions in the pipeline.
///
/// Passed to [`LayerEffect::dependencies`] so each layer can declare
/// which upstream layers it depends on for cache invalidation.
#[derive(Debug, Clone, Copy)]
pub struct LayerVersions {
    pub background: u64,
    pub gradient: u64,
    pub text: u64,
    pub logo: u64,
    /// Font registry generation; text output changes when fonts are added.
    pub fonts: u64,
}

// ============================================================================
// CacheKey
// ============================================================================

/// Key for cached canvases: the canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    width: u32,
    height: u32,
}

impl CacheKey {
    pub fn new(size: SizePx) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

// ============================================================================
// Generic Layer
// ============================================================================

/// A generic layer with configuration, caching, and version tracking.
///
/// The layer tracks:
/// - Optional configuration of type `C`
/// - Whether the layer is enabled (can be toggled without losing config)
/// - A version number that increments on any state change
/// - A cache of rendered canvases keyed by size
/// - The dependency version when each cache entry was stored
pub struct Layer<C: LayerConfig> {
    config: Option<C>,
    enabled: bool,
    version: u64,
    cache: HashMap<CacheKey, (Pixmap, DependencyVersion)>,
}

impl<C: LayerConfig> Default for Layer<C> {
    fn default() -> Self {
        Self {
            config: None,
            enabled: true,
            version: 0,
            cache: HashMap::new(),
        }
    }
}

impl<C: LayerConfig> Layer<C> {
    /// Returns the current configuration, if any.
    pub fn config(&self) -> Option<&C> {
        self.config.as_ref()
    }

    /// Returns true if this layer is active (has config AND is enabled).
    pub fn is_active(&self) -> bool {
        self.enabled && self.config.is_some()
    }

    pub fn has_config(&self) -> bool {
        self.config.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets whether the layer is enabled.
    ///
    /// Returns true if the enabled state changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.invalidate();
            true
        } else {
            false
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Sets the configuration. Returns true if it changed.
    ///
    /// Clears the cache and increments version if the config differs.
    pub fn set_config(&mut self, config: Option<C>) -> bool {
        let differs = match (&self.config, &config) {
            (None, None) => false,
            (Some(_), None) | (None, Some(_)) => true,
            (Some(old), Some(new)) => old.differs_from(new),
        };

        if differs {
            self.config = config;
            self.invalidate();
        }
        differs
    }

    /// Invalidates the cache and increments version.
    pub fn invalidate(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.cache.clear();
    }

    /// Number of cached canvases.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn get_cached(&self, key: CacheKey, deps: DependencyVersion) -> Option<&Pixmap> {
        self.cache
            .get(&key)
            .and_then(|(canvas, stored)| (*stored == deps).then_some(canvas))
    }

    fn store(&mut self, key: CacheKey, canvas: Pixmap, deps: DependencyVersion) {
        self.cache.insert(key, (canvas, deps));
    }
}

impl<C: LayerEffect> Layer<C> {
    /// Apply this layer to the render context, using cache if valid.
    ///
    /// If the layer is not active, the context passes through unchanged.
    pub fn apply(&mut self, ctx: &mut RenderContext<'_>, versions: &LayerVersions) {
        if !self.enabled {
            return;
        }
        let Some(config) = self.config.as_ref() else {
            return;
        };

        let key = CacheKey::new(ctx.size);
        let deps = C::dependencies(versions);

        if let Some(cached) = self.get_cached(key, deps) {
            ctx.canvas = cached.clone();
            return;
        }

        config.transform(ctx);
        self.store(key, ctx.canvas.clone(), deps);
    }
}

// ============================================================================
// Composite Layer
// ============================================================================

/// A cache-only layer for final composited images.
#[derive(Default)]
pub struct CompositeLayer {
    cache: HashMap<CacheKey, (RasterImage, DependencyVersion)>,
}

impl CompositeLayer {
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    fn get_cached(&self, key: CacheKey, deps: DependencyVersion) -> Option<&RasterImage> {
        self.cache
            .get(&key)
            .and_then(|(img, stored)| (*stored == deps).then_some(img))
    }

    fn store(&mut self, key: CacheKey, image: RasterImage, deps: DependencyVersion) {
        self.cache.insert(key, (image, deps));
    }
}

// ============================================================================
// Layer Pipeline
// ============================================================================

/// Defines the layer pipeline with explicit dependency relationships.
///
/// # Dependency Graph
///
/// ```text
/// Transparent canvas
///     │
///     ▼
/// ┌────────────┐
/// │ Background │ ◄── No dependencies (root layer)
/// └─────┬──────┘
///       ▼
/// ┌────────────┐
/// │  Gradient  │ ◄── Depends on: Background
/// └─────┬──────┘
///       ▼
/// ┌────────────┐
/// │    Text    │ ◄── Depends on: Background + Gradient + fonts
/// └─────┬──────┘
///       ▼
/// ┌────────────┐
/// │    Logo    │ ◄── Depends on: Background + Gradient + Text + fonts
/// └─────┬──────┘
///       ▼
/// ┌────────────┐
/// │ Composite  │ ◄── Depends on: every layer + fonts
/// └────────────┘
/// ```
#[derive(Default)]
pub struct LayerPipeline {
    pub background: Layer<BackgroundConfig>,
    pub gradient: Layer<GradientConfig>,
    pub text: Layer<TextConfig>,
    pub logo: Layer<LogoConfig>,
    pub composite: CompositeLayer,
}

impl LayerPipeline {
    /// Returns a snapshot of all layer versions.
    pub fn layer_versions(&self, fonts: &FontRegistry) -> LayerVersions {
        LayerVersions {
            background: self.background.version(),
            gradient: self.gradient.version(),
            text: self.text.version(),
            logo: self.logo.version(),
            fonts: fonts.generation(),
        }
    }

    /// Invalidates all caches.
    pub fn invalidate_all(&mut self) {
        self.background.invalidate();
        self.gradient.invalidate();
        self.text.invalidate();
        self.logo.invalidate();
        self.composite.invalidate();
    }

    /// Configures every layer from an editing state and its assets.
    ///
    /// Returns true if any layer changed.
    pub fn sync(
        &mut self,
        state: &EditState,
        background: Option<&ImageAsset>,
        logo: Option<&ImageAsset>,
    ) -> bool {
        let mut changed = false;

        changed |= self
            .background
            .set_config(background.cloned().map(BackgroundConfig::new));

        changed |= self
            .gradient
            .set_config(Some(GradientConfig::from_settings(&state.gradient)));
        changed |= self.gradient.set_enabled(state.gradient.enabled);

        changed |= self.text.set_config(Some(TextConfig::from_state(state)));

        changed |= self.logo.set_config(
            logo.cloned()
                .map(|asset| LogoConfig::new(asset, state.logo.position)),
        );
        changed |= self.logo.set_enabled(state.logo.enabled);

        changed
    }

    fn composite_dependencies(&self, fonts: &FontRegistry) -> DependencyVersion {
        DependencyVersion::combine(&[
            self.background.version(),
            self.gradient.version(),
            self.text.version(),
            self.logo.version(),
            fonts.generation(),
        ])
    }

    /// Renders the full pipeline onto a canvas of `size`.
    ///
    /// Checks the composite cache first, then applies each layer in order
    /// (each layer consults its own cache) and caches the result.
    #[tracing::instrument(skip(self, fonts), fields(width = size.width, height = size.height))]
    pub fn render(&mut self, size: SizePx, fonts: &FontRegistry) -> ThumbResult<RasterImage> {
        let key = CacheKey::new(size);
        let composite_deps = self.composite_dependencies(fonts);

        if let Some(cached) = self.composite.get_cached(key, composite_deps) {
            tracing::debug!("composite cache hit");
            return Ok(cached.clone());
        }

        let mut ctx = RenderContext::new(size, fonts)?;

        let versions = self.layer_versions(fonts);
        self.background.apply(&mut ctx, &versions);
        self.gradient.apply(&mut ctx, &versions);
        self.text.apply(&mut ctx, &versions);
        self.logo.apply(&mut ctx, &versions);

        let image = RasterImage::from_pixmap(&ctx.canvas)?;
        self.composite.store(key, image.clone(), composite_deps);
        Ok(image)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LogoPosition;
    use image::{Rgba, RgbaImage};

    fn solid_asset(w: u32, h: u32, rgba: [u8; 4]) -> ImageAsset {
        ImageAsset::new(RgbaImage::from_pixel(w, h, Rgba(rgba)))
    }

    fn quiet_state() -> EditState {
        let mut state = EditState::default();
        state.title.clear();
        state.gradient.enabled = false;
        state
    }

    #[test]
    fn layer_set_config_tracks_versions() {
        let mut layer: Layer<LogoConfig> = Layer::default();
        let asset = solid_asset(2, 2, [255, 0, 0, 255]);

        assert!(layer.is_enabled());
        assert!(!layer.has_config());
        assert!(!layer.is_active());
        assert_eq!(layer.version(), 0);

        assert!(layer.set_config(Some(LogoConfig::new(asset.clone(), LogoPosition::Top))));
        assert!(layer.is_active());
        assert_eq!(layer.version(), 1);

        assert!(!layer.set_config(Some(LogoConfig::new(asset.clone(), LogoPosition::Top))));
        assert_eq!(layer.version(), 1);

        assert!(layer.set_config(Some(LogoConfig::new(asset, LogoPosition::Center))));
        assert_eq!(layer.version(), 2);
    }

    #[test]
    fn layer_toggle_keeps_config() {
        let mut layer: Layer<LogoConfig> = Layer::default();
        layer.set_config(Some(LogoConfig::new(
            solid_asset(2, 2, [0, 0, 0, 255]),
            LogoPosition::Bottom,
        )));

        assert!(layer.set_enabled(false));
        assert!(layer.has_config());
        assert!(!layer.is_active());
        assert!(!layer.set_enabled(false));
        assert!(layer.set_enabled(true));
        assert!(layer.is_active());
    }

    #[test]
    fn sync_reports_changes_once() {
        let mut pipeline = LayerPipeline::default();
        let state = EditState::default();
        let bg = solid_asset(4, 4, [1, 2, 3, 255]);

        assert!(pipeline.sync(&state, Some(&bg), None));
        assert!(!pipeline.sync(&state, Some(&bg), None));

        let mut moved = state.clone();
        moved.text_y = 10.0;
        assert!(pipeline.sync(&moved, Some(&bg), None));
    }

    #[test]
    fn render_is_cached_until_a_layer_changes() {
        let fonts = FontRegistry::new();
        let mut pipeline = LayerPipeline::default();
        let state = quiet_state();
        let size = SizePx::new(64, 36);

        pipeline.sync(&state, Some(&solid_asset(8, 8, [255, 0, 0, 255])), None);
        let first = pipeline.render(size, &fonts).unwrap();
        assert_eq!(first.data.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(pipeline.background.cached_len(), 1);

        let again = pipeline.render(size, &fonts).unwrap();
        assert_eq!(first, again);

        pipeline.sync(&state, Some(&solid_asset(8, 8, [0, 0, 255, 255])), None);
        let changed = pipeline.render(size, &fonts).unwrap();
        assert_eq!(changed.data.get_pixel(10, 10).0, [0, 0, 255, 255]);
    }

    #[test]
    fn downstream_cache_invalidated_by_upstream_change() {
        let fonts = FontRegistry::new();
        let mut pipeline = LayerPipeline::default();
        let mut state = quiet_state();
        state.gradient.enabled = true;
        state.gradient.start_color = crate::color::Color::BLACK;
        state.gradient.end_color = crate::color::Color::BLACK;
        state.gradient.opacity = 1.0;
        state.gradient.blend_mode = crate::state::BlendMode::Screen;
        let size = SizePx::new(20, 20);

        pipeline.sync(&state, Some(&solid_asset(4, 4, [200, 10, 10, 255])), None);
        let first = pipeline.render(size, &fonts).unwrap();

        // Screen with black is identity, so the gradient output tracks the background.
        pipeline.sync(&state, Some(&solid_asset(4, 4, [10, 200, 10, 255])), None);
        let second = pipeline.render(size, &fonts).unwrap();

        assert_ne!(first.data.get_pixel(5, 5), second.data.get_pixel(5, 5));
        let p = second.data.get_pixel(5, 5);
        assert!(p[1] > p[0]);
    }

    #[test]
    fn render_without_layers_is_transparent() {
        let fonts = FontRegistry::new();
        let mut pipeline = LayerPipeline::default();
        pipeline.sync(&quiet_state(), None, None);

        let out = pipeline.render(SizePx::new(16, 9), &fonts).unwrap();
        assert_eq!(out.dimensions(), SizePx::new(16, 9));
        assert!(out.data.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn zero_sized_canvas_is_an_error() {
        let fonts = FontRegistry::new();
        let mut pipeline = LayerPipeline::default();
        assert!(matches!(
            pipeline.render(SizePx::new(0, 10), &fonts),
            Err(ThumbError::Render(_))
        ));
    }
}
