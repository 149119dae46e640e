//! One-shot thumbnail rendering.
//!
//! [`render`] builds a fresh [`LayerPipeline`] for every call, so identical
//! inputs always produce identical pixels. Interactive callers that render
//! repeatedly should keep a [`crate::ThumbnailEditor`], which reuses the
//! pipeline caches between renders.

use crate::assets::ImageAsset;
use crate::error::ThumbResult;
use crate::fonts::FontRegistry;
use crate::layer::LayerPipeline;
use crate::raster::RasterImage;
use crate::state::EditState;

/// The images a render draws from. Either may be absent.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    pub background: Option<ImageAsset>,
    pub logo: Option<ImageAsset>,
}

impl Assets {
    pub fn new(background: Option<ImageAsset>, logo: Option<ImageAsset>) -> Self {
        Self { background, logo }
    }

    /// Decodes a background and an optional logo from encoded bytes.
    pub fn decode(background: &[u8], logo: Option<&[u8]>) -> ThumbResult<Self> {
        Ok(Self {
            background: Some(ImageAsset::decode(background)?),
            logo: logo.map(ImageAsset::decode).transpose()?,
        })
    }
}

/// Composites a thumbnail from an editing state.
///
/// The canvas takes the crop preset's dimensions. Layers are drawn in order:
/// background photo, gradient, title text, logo. A missing background
/// leaves the canvas transparent under the other layers.
///
/// # Example
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use thumbsmith::{render, Assets, CropAspect, EditState, FontRegistry, ImageAsset};
///
/// let mut state = EditState::default();
/// state.crop = CropAspect::Square;
/// state.title.clear();
///
/// let photo = ImageAsset::new(RgbaImage::from_pixel(64, 48, Rgba([30, 60, 90, 255])));
/// let assets = Assets::new(Some(photo), None);
///
/// let thumbnail = render(&state, &assets, &FontRegistry::new()).unwrap();
/// assert_eq!(thumbnail.data.dimensions(), (1500, 1500));
/// ```
#[tracing::instrument(skip_all, fields(crop = state.crop.label()))]
pub fn render(state: &EditState, assets: &Assets, fonts: &FontRegistry) -> ThumbResult<RasterImage> {
    let mut pipeline = LayerPipeline::default();
    pipeline.sync(state, assets.background.as_ref(), assets.logo.as_ref());
    pipeline.render(state.canvas_size(), fonts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::state::{CropAspect, LogoPosition};
    use image::{Rgba, RgbaImage};

    fn photo(rgba: [u8; 4]) -> ImageAsset {
        ImageAsset::new(RgbaImage::from_pixel(40, 30, Rgba(rgba)))
    }

    fn bare_state(crop: CropAspect) -> EditState {
        let mut state = EditState::default();
        state.crop = crop;
        state.title.clear();
        state.gradient.enabled = false;
        state.logo.enabled = false;
        state
    }

    #[test]
    fn output_matches_crop_dimensions() {
        let fonts = FontRegistry::new();
        let assets = Assets::new(Some(photo([9, 9, 9, 255])), None);
        for crop in CropAspect::ALL {
            let out = render(&bare_state(crop), &assets, &fonts).unwrap();
            assert_eq!(out.dimensions(), crop.dimensions());
        }
    }

    #[test]
    fn missing_background_is_transparent() {
        let out = render(
            &bare_state(CropAspect::Portrait),
            &Assets::default(),
            &FontRegistry::new(),
        )
        .unwrap();
        assert_eq!(out.data.get_pixel(540, 675).0[3], 0);
    }

    #[test]
    fn rendering_is_deterministic() {
        let fonts = FontRegistry::new();
        let mut state = EditState::default();
        state.crop = CropAspect::Square;
        state.text_style.background.opacity = 0.6;
        let logo = ImageAsset::new(RgbaImage::from_pixel(8, 4, Rgba([250, 250, 0, 255])));
        let assets = Assets::new(Some(photo([20, 140, 60, 255])), Some(logo));

        let a = render(&state, &assets, &fonts).unwrap();
        let b = render(&state, &assets, &fonts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn transparent_gradient_leaves_background() {
        let fonts = FontRegistry::new();
        let assets = Assets::new(Some(photo([200, 100, 50, 255])), None);

        let plain = render(&bare_state(CropAspect::Square), &assets, &fonts).unwrap();

        let mut state = bare_state(CropAspect::Square);
        state.gradient.enabled = true;
        state.gradient.start_color = Color::TRANSPARENT;
        state.gradient.end_color = Color::BLACK;
        state.gradient.opacity = 0.0;
        let with_gradient = render(&state, &assets, &fonts).unwrap();

        assert_eq!(plain, with_gradient);
    }

    #[test]
    fn default_gradient_darkens_bottom() {
        let fonts = FontRegistry::new();
        let assets = Assets::new(Some(photo([200, 200, 200, 255])), None);
        let mut state = bare_state(CropAspect::Widescreen);
        state.gradient.enabled = true;

        let out = render(&state, &assets, &fonts).unwrap();
        let top = out.data.get_pixel(960, 5);
        let bottom = out.data.get_pixel(960, 1075);
        assert!(top[0] > 190);
        assert!(bottom[0] < 90);
    }

    #[test]
    fn disabled_logo_is_not_drawn() {
        let fonts = FontRegistry::new();
        let logo = ImageAsset::new(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let assets = Assets::new(None, Some(logo));

        let mut state = bare_state(CropAspect::Square);
        state.logo.position = LogoPosition::Center;
        let hidden = render(&state, &assets, &fonts).unwrap();
        assert_eq!(hidden.data.get_pixel(750, 750).0[3], 0);

        state.logo.enabled = true;
        let shown = render(&state, &assets, &fonts).unwrap();
        assert_eq!(shown.data.get_pixel(750, 750).0, [255, 0, 0, 255]);
    }

    #[test]
    fn decode_rejects_bad_background() {
        assert!(Assets::decode(b"nope", None).is_err());
    }
}
