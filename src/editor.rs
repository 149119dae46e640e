//! Interactive thumbnail editing with cached, layered rendering.

use std::time::Duration;

use crate::assets::{AssetLoader, AssetSlot, AssetTicket, ImageAsset, LoadOutcome};
use crate::error::ThumbResult;
use crate::fonts::FontRegistry;
use crate::gallery::{BlobStore, ReferenceStore, ThumbnailGallery};
use crate::layer::LayerPipeline;
use crate::preset::{find_preset, TextEffectPreset};
use crate::raster::RasterImage;
use crate::state::EditState;

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from an [`EditState`].
pub trait Configurable {
    /// Applies a state's settings to this instance.
    fn apply_state(&mut self, state: &EditState);

    /// Exports the current settings as a state.
    fn export_state(&self) -> EditState;
}

// ============================================================================
// ThumbnailEditor
// ============================================================================

/// Editing session for one thumbnail.
///
/// `ThumbnailEditor` owns the current [`EditState`], the loaded background
/// and logo, the fonts, and a [`LayerPipeline`] whose caches survive between
/// renders. Any state change marks the editor dirty; the next render only
/// recomputes the layers that changed and those downstream of them.
///
/// # Layer Pipeline
///
/// 1. **Background** (`pipeline.background`) - The photo, cover-fitted
/// 2. **Gradient** (`pipeline.gradient`) - Linear or radial overlay with a blend mode
/// 3. **Text** (`pipeline.text`) - The wrapped, styled title
/// 4. **Logo** (`pipeline.logo`) - Scaled logo at one of nine anchors
///
/// # Example
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use thumbsmith::{FontRegistry, ThumbnailEditor};
///
/// let mut editor = ThumbnailEditor::new(FontRegistry::new());
/// editor.set_background_image(RgbaImage::from_pixel(320, 180, Rgba([12, 34, 56, 255])));
///
/// editor.update(|state| state.title = "Ten Rust Tips".into());
/// editor.apply_preset("bold-outline");
///
/// let png = editor.export_png().unwrap();
/// assert!(!png.is_empty());
/// ```
pub struct ThumbnailEditor {
    state: EditState,
    fonts: FontRegistry,
    background: Option<ImageAsset>,
    logo: Option<ImageAsset>,
    loader: AssetLoader,
    dirty: bool,

    /// The layer pipeline. Kept in sync with the state on every change.
    ///
    /// See [`LayerPipeline`] for the dependency graph.
    pub pipeline: LayerPipeline,
}

impl ThumbnailEditor {
    /// Creates an editor with the default state and no images.
    pub fn new(fonts: FontRegistry) -> Self {
        Self::with_state(EditState::default(), fonts)
    }

    pub fn with_state(state: EditState, fonts: FontRegistry) -> Self {
        let mut editor = Self {
            state,
            fonts,
            background: None,
            logo: None,
            loader: AssetLoader::new(),
            dirty: true,
            pipeline: LayerPipeline::default(),
        };
        editor.sync();
        editor
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// Mutable access for registering fonts. Every cached layer is dropped,
    /// since the registry may be replaced and its generation restart.
    pub fn fonts_mut(&mut self) -> &mut FontRegistry {
        self.pipeline.invalidate_all();
        self.dirty = true;
        &mut self.fonts
    }

    pub fn background(&self) -> Option<&ImageAsset> {
        self.background.as_ref()
    }

    pub fn logo(&self) -> Option<&ImageAsset> {
        self.logo.as_ref()
    }

    /// True when something changed since the last render.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn sync(&mut self) -> bool {
        let changed =
            self.pipeline
                .sync(&self.state, self.background.as_ref(), self.logo.as_ref());
        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Edits the state in place. Returns true if anything changed.
    pub fn update<F: FnOnce(&mut EditState)>(&mut self, edit: F) -> bool {
        let mut next = self.state.clone();
        edit(&mut next);
        if next == self.state {
            return false;
        }
        self.state = next;
        self.sync();
        self.dirty = true;
        tracing::debug!("edit state changed");
        true
    }

    /// Applies a text effect preset by id. Unknown ids change nothing.
    pub fn apply_preset(&mut self, id: &str) -> Option<&'static TextEffectPreset> {
        let preset = find_preset(id)?;
        self.update(|state| preset.apply(state));
        Some(preset)
    }

    // ------------------------------------------------------------------------
    // Assets
    // ------------------------------------------------------------------------

    fn set_asset(&mut self, slot: AssetSlot, asset: Option<ImageAsset>) {
        // A synchronous set supersedes any load in flight.
        self.loader.cancel(slot);
        match slot {
            AssetSlot::Background => self.background = asset,
            AssetSlot::Logo => self.logo = asset,
        }
        self.sync();
    }

    /// Decodes and installs a background photo.
    pub fn set_background(&mut self, bytes: &[u8]) -> ThumbResult<()> {
        let asset = ImageAsset::decode(bytes)?;
        self.set_asset(AssetSlot::Background, Some(asset));
        Ok(())
    }

    pub fn set_background_image(&mut self, image: image::RgbaImage) {
        self.set_asset(AssetSlot::Background, Some(ImageAsset::new(image)));
    }

    /// Decodes and installs a logo.
    pub fn set_logo(&mut self, bytes: &[u8]) -> ThumbResult<()> {
        let asset = ImageAsset::decode(bytes)?;
        self.set_asset(AssetSlot::Logo, Some(asset));
        Ok(())
    }

    pub fn set_logo_image(&mut self, image: image::RgbaImage) {
        self.set_asset(AssetSlot::Logo, Some(ImageAsset::new(image)));
    }

    pub fn clear_logo(&mut self) {
        self.set_asset(AssetSlot::Logo, None);
    }

    /// Starts decoding a background photo on a worker thread.
    ///
    /// The image is installed by [`poll_assets`](Self::poll_assets) unless a
    /// newer background is requested first.
    pub fn load_background(&mut self, bytes: Vec<u8>) -> AssetTicket {
        self.loader.load(AssetSlot::Background, bytes)
    }

    /// Starts decoding a logo on a worker thread.
    pub fn load_logo(&mut self, bytes: Vec<u8>) -> AssetTicket {
        self.loader.load(AssetSlot::Logo, bytes)
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_pending(AssetSlot::Background) || self.loader.is_pending(AssetSlot::Logo)
    }

    /// Installs every finished load. Stale results are dropped and failed
    /// decodes are logged; both are returned for the caller to inspect.
    pub fn poll_assets(&mut self) -> Vec<LoadOutcome> {
        let outcomes = self.loader.poll();
        self.install(&outcomes);
        outcomes
    }

    /// Blocks until pending loads finish or `timeout` elapses, installing
    /// the results.
    pub fn wait_for_assets(&mut self, timeout: Duration) -> Vec<LoadOutcome> {
        let outcomes = self.loader.wait(timeout);
        self.install(&outcomes);
        outcomes
    }

    fn install(&mut self, outcomes: &[LoadOutcome]) {
        for outcome in outcomes {
            match outcome {
                LoadOutcome::Ready { slot, asset } => {
                    tracing::debug!(?slot, "asset loaded");
                    match slot {
                        AssetSlot::Background => self.background = Some(asset.clone()),
                        AssetSlot::Logo => self.logo = Some(asset.clone()),
                    }
                }
                LoadOutcome::Failed { slot, error } => {
                    tracing::warn!(?slot, %error, "asset failed to load");
                }
                LoadOutcome::Stale { slot, generation } => {
                    tracing::debug!(?slot, generation, "dropped stale asset");
                }
            }
        }
        self.sync();
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Renders the thumbnail, reusing cached layers where possible.
    pub fn render(&mut self) -> ThumbResult<RasterImage> {
        let image = self
            .pipeline
            .render(self.state.canvas_size(), &self.fonts)?;
        self.dirty = false;
        Ok(image)
    }

    /// Renders only if something changed since the last render.
    pub fn render_if_changed(&mut self) -> ThumbResult<Option<RasterImage>> {
        if !self.dirty {
            return Ok(None);
        }
        self.render().map(Some)
    }

    /// Renders and encodes the thumbnail as PNG.
    pub fn export_png(&mut self) -> ThumbResult<Vec<u8>> {
        self.render()?.to_png_bytes()
    }

    /// Loads a saved thumbnail from `gallery` as the background.
    pub fn select_saved<B: BlobStore, R: ReferenceStore>(
        &mut self,
        gallery: &ThumbnailGallery<B, R>,
        id: &str,
    ) -> ThumbResult<()> {
        let bytes = gallery.fetch(id)?;
        self.set_background(&bytes)
    }

    /// Clears all layer caches. Useful for freeing memory.
    pub fn clear_cache(&mut self) {
        self.pipeline.invalidate_all();
        self.dirty = true;
    }
}

impl Configurable for ThumbnailEditor {
    /// Replaces the whole editing state.
    fn apply_state(&mut self, state: &EditState) {
        if *state != self.state {
            self.state = state.clone();
            self.sync();
            self.dirty = true;
        }
    }

    fn export_state(&self) -> EditState {
        self.state.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
