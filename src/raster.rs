//! Raster image types and pixel-buffer conversions.
//!
//! The compositor draws into a premultiplied `tiny_skia` pixmap; callers get
//! a straight-alpha [`RasterImage`] back.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use resvg::tiny_skia::{IntSize, Pixmap};

use crate::error::{ThumbError, ThumbResult};

/// A rectangle defined in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectPx {
    /// X offset from the left edge of the image
    pub x: u32,
    /// Y offset from the top edge of the image
    pub y: u32,
    /// Width of the rectangle
    pub width: u32,
    /// Height of the rectangle
    pub height: u32,
}

impl RectPx {
    /// Creates a new rectangle with the given position and dimensions.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A rendered or decoded RGBA image.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    /// Straight-alpha RGBA pixels.
    pub data: RgbaImage,
}

impl RasterImage {
    pub fn new(data: RgbaImage) -> Self {
        Self { data }
    }

    /// Decodes any format supported by the `image` crate.
    pub fn decode(bytes: &[u8]) -> ThumbResult<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::new(img.to_rgba8()))
    }

    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.data.width(), self.data.height())
    }

    /// Encodes the image as PNG.
    pub fn to_png_bytes(&self) -> ThumbResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.data
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }

    /// Writes the image to `path` as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ThumbResult<()> {
        let path = path.as_ref();
        let bytes = self.to_png_bytes()?;
        std::fs::write(path, bytes).map_err(|e| ThumbError::io(path, e))
    }

    pub(crate) fn from_pixmap(pixmap: &Pixmap) -> ThumbResult<Self> {
        pixmap_to_rgba_image(pixmap).map(Self::new)
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Converts a premultiplied pixmap into a straight-alpha image.
pub(crate) fn pixmap_to_rgba_image(pixmap: &Pixmap) -> ThumbResult<RgbaImage> {
    let mut raw = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.data().chunks_exact(4) {
        let (r, g, b, a) = unpremultiply(px[0], px[1], px[2], px[3]);
        raw.extend_from_slice(&[r, g, b, a]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .ok_or_else(|| ThumbError::render("pixmap buffer does not match its dimensions"))
}

/// Converts a straight-alpha image into a premultiplied pixmap.
pub(crate) fn rgba_image_to_pixmap(img: &RgbaImage) -> ThumbResult<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())
        .ok_or_else(|| ThumbError::render("cannot build a pixmap from an empty image"))?;
    let mut raw = img.as_raw().clone();
    premultiply_rgba8_in_place(&mut raw);
    Pixmap::from_vec(raw, size)
        .ok_or_else(|| ThumbError::render("image buffer does not match its dimensions"))
}

/// Unpremultiplies a premultiplied alpha pixel.
fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn rect_px_edges() {
        let rect = RectPx::new(10, 20, 100, 200);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 220);
    }

    #[test]
    fn png_encode_decode_keeps_pixels() {
        let img = RgbaImage::from_pixel(4, 3, Rgba([10, 200, 30, 255]));
        let raster = RasterImage::new(img);

        let bytes = raster.to_png_bytes().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let decoded = RasterImage::decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), SizePx::new(4, 3));
        assert_eq!(decoded.data.get_pixel(2, 1).0, [10, 200, 30, 255]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            RasterImage::decode(b"definitely not an image"),
            Err(ThumbError::Decode(_))
        ));
    }

    #[test]
    fn pixmap_conversion_handles_alpha() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 128]));
        let pixmap = rgba_image_to_pixmap(&img).unwrap();

        let px = pixmap.pixel(0, 0).unwrap();
        assert_eq!(px.alpha(), 128);
        assert!(px.red() < 200, "stored premultiplied");

        let back = pixmap_to_rgba_image(&pixmap).unwrap();
        let p = back.get_pixel(1, 1);
        assert_eq!(p[3], 128);
        assert!((p[0] as i32 - 200).abs() <= 2);
        assert!((p[1] as i32 - 100).abs() <= 2);
    }

    #[test]
    fn empty_image_has_no_pixmap() {
        assert!(rgba_image_to_pixmap(&RgbaImage::new(0, 0)).is_err());
    }
}
