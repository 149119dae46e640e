//! Background layer: the user's photo, cropped to cover the canvas.

use image::imageops::{self, FilterType};

use super::svg::composite_over;
use super::{DependencyVersion, LayerConfig, LayerEffect, LayerVersions, RenderContext};
use crate::assets::ImageAsset;
use crate::raster::{RectPx, SizePx};

// ============================================================================
// Cover Fit
// ============================================================================

/// The region of a source image that fills the canvas after scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverCrop {
    /// Source region, centered on both axes.
    pub source: RectPx,
    /// Scale from source pixels to canvas pixels.
    pub scale: f32,
}

impl CoverCrop {
    /// Computes the centered crop that lets `source` cover `target`.
    ///
    /// The scale is the larger of the two axis ratios, so the image covers
    /// the whole canvas and the overflow on the other axis is cut equally
    /// from both sides. Returns `None` for empty sizes.
    pub fn compute(source: SizePx, target: SizePx) -> Option<Self> {
        if source.is_empty() || target.is_empty() {
            return None;
        }

        let scale_x = target.width as f32 / source.width as f32;
        let scale_y = target.height as f32 / source.height as f32;
        let scale = scale_x.max(scale_y);

        let crop_w = ((target.width as f32 / scale).round() as u32).clamp(1, source.width);
        let crop_h = ((target.height as f32 / scale).round() as u32).clamp(1, source.height);

        Some(Self {
            source: RectPx::new(
                (source.width - crop_w) / 2,
                (source.height - crop_h) / 2,
                crop_w,
                crop_h,
            ),
            scale,
        })
    }
}

// ============================================================================
// BackgroundConfig
// ============================================================================

/// Configuration for the background layer.
#[derive(Debug, Clone)]
pub struct BackgroundConfig {
    pub asset: ImageAsset,
}

impl BackgroundConfig {
    pub fn new(asset: ImageAsset) -> Self {
        Self { asset }
    }
}

impl LayerConfig for BackgroundConfig {
    fn differs_from(&self, other: &Self) -> bool {
        self.asset.id() != other.asset.id()
    }
}

impl LayerEffect for BackgroundConfig {
    /// Background is the root layer.
    fn dependencies(_versions: &LayerVersions) -> DependencyVersion {
        DependencyVersion::NONE
    }

    fn transform(&self, ctx: &mut RenderContext<'_>) {
        let image = self.asset.image();
        let Some(crop) = CoverCrop::compute(self.asset.size(), ctx.size) else {
            return;
        };

        let region = crop.source;
        let cropped = imageops::crop_imm(image, region.x, region.y, region.width, region.height)
            .to_image();
        let scaled = imageops::resize(
            &cropped,
            ctx.size.width,
            ctx.size.height,
            FilterType::Triangle,
        );

        if let Err(err) = composite_over(&mut ctx.canvas, &scaled, 0, 0) {
            tracing::warn!(error = %err, "skipping background");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontRegistry;
    use image::{Rgba, RgbaImage};

    #[test]
    fn wide_source_is_cropped_horizontally() {
        let crop = CoverCrop::compute(SizePx::new(4000, 1000), SizePx::new(1920, 1080)).unwrap();
        assert!((crop.scale - 1.08).abs() < 1e-4);
        assert_eq!(crop.source.height, 1000);
        assert_eq!(crop.source.y, 0);
        // 1920 / 1.08
        assert_eq!(crop.source.width, 1778);
        assert_eq!(crop.source.x, (4000 - 1778) / 2);
    }

    #[test]
    fn tall_source_is_cropped_vertically() {
        let crop = CoverCrop::compute(SizePx::new(1000, 3000), SizePx::new(1080, 1080)).unwrap();
        assert!((crop.scale - 1.08).abs() < 1e-4);
        assert_eq!(crop.source.width, 1000);
        assert_eq!(crop.source.height, 1000);
        assert_eq!(crop.source.y, 1000);
    }

    #[test]
    fn matching_aspect_uses_whole_source() {
        let crop = CoverCrop::compute(SizePx::new(960, 540), SizePx::new(1920, 1080)).unwrap();
        assert_eq!(crop.source, RectPx::new(0, 0, 960, 540));
        assert_eq!(crop.scale, 2.0);
    }

    #[test]
    fn empty_sizes_have_no_crop() {
        assert!(CoverCrop::compute(SizePx::new(0, 10), SizePx::new(10, 10)).is_none());
        assert!(CoverCrop::compute(SizePx::new(10, 10), SizePx::new(10, 0)).is_none());
    }

    #[test]
    fn transform_covers_canvas_with_center_of_source() {
        // Left third red, middle third green, right third blue.
        let source = RgbaImage::from_fn(30, 10, |x, _| match x {
            0..=9 => Rgba([255, 0, 0, 255]),
            10..=19 => Rgba([0, 255, 0, 255]),
            _ => Rgba([0, 0, 255, 255]),
        });
        let config = BackgroundConfig::new(ImageAsset::new(source));
        let fonts = FontRegistry::new();
        let mut ctx = RenderContext::new(SizePx::new(20, 20), &fonts).unwrap();

        config.transform(&mut ctx);

        for (x, y) in [(0, 0), (10, 10), (19, 19)] {
            let px = ctx.canvas.pixel(x, y).unwrap();
            assert_eq!(px.alpha(), 255);
            assert!(px.green() > 200, "pixel ({x},{y}) should come from the middle");
        }
    }
}
