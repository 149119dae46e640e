//! SVG rendering utilities using resvg/usvg.
//!
//! This module provides shared markup helpers and drawing functionality
//! used by the text and logo layers.

use std::borrow::Cow;
use std::fmt::Write as _;

use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, PixmapPaint, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::{ThumbError, ThumbResult};
use crate::fonts::FontRegistry;
use crate::raster::rgba_image_to_pixmap;

// ============================================================================
// Markup
// ============================================================================

/// Escapes text for use in SVG character data and attribute values.
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Formats a coordinate with at most two decimals.
pub fn num(value: f32) -> String {
    let mut s = String::new();
    let _ = write!(s, "{:.2}", value);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Opens an `<svg>` root element sized to the canvas.
pub fn open_svg(width: u32, height: u32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )
}

// ============================================================================
// SVG Rendering
// ============================================================================

/// Parses `svg` and draws it over `canvas` at 1:1 scale.
///
/// Text elements are shaped with the faces in `fonts`. Text whose fonts
/// cannot be resolved is skipped by the renderer.
pub fn render_svg_onto(canvas: &mut Pixmap, svg: &str, fonts: &FontRegistry) -> ThumbResult<()> {
    let opts = Options {
        fontdb: fonts.database(),
        ..Options::default()
    };
    let tree = Tree::from_str(svg, &opts)
        .map_err(|e| ThumbError::render(format!("invalid svg: {e}")))?;
    resvg::render(&tree, Transform::identity(), &mut canvas.as_mut());
    Ok(())
}

// ============================================================================
// Compositing
// ============================================================================

/// Composites a source image onto the canvas at the specified position.
///
/// Uses standard alpha blending (source over destination). Parts of the
/// source outside the canvas are clipped.
pub fn composite_over(canvas: &mut Pixmap, src: &RgbaImage, x: i32, y: i32) -> ThumbResult<()> {
    let src = rgba_image_to_pixmap(src)?;
    canvas.draw_pixmap(
        x,
        y,
        src.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const SIMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect x="0" y="0" width="5" height="10" fill="#ff0000"/></svg>"##;

    #[test]
    fn render_simple_svg() {
        let mut canvas = Pixmap::new(10, 10).unwrap();
        render_svg_onto(&mut canvas, SIMPLE_SVG, &FontRegistry::new()).unwrap();

        let left = canvas.pixel(2, 5).unwrap();
        assert_eq!((left.red(), left.alpha()), (255, 255));
        assert_eq!(canvas.pixel(8, 5).unwrap().alpha(), 0);
    }

    #[test]
    fn invalid_svg_is_render_error() {
        let mut canvas = Pixmap::new(4, 4).unwrap();
        let result = render_svg_onto(&mut canvas, "<svg", &FontRegistry::new());
        assert!(matches!(result, Err(ThumbError::Render(_))));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("plain"), "plain");
        assert!(matches!(escape_xml("plain"), Cow::Borrowed(_)));
        assert_eq!(
            escape_xml(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &apos;Jerry&apos;&lt;/b&gt;"
        );
    }

    #[test]
    fn formats_numbers_compactly() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(12.5), "12.5");
        assert_eq!(num(0.333), "0.33");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(-4.25), "-4.25");
    }

    #[test]
    fn composite_simple() {
        let mut canvas = Pixmap::new(10, 10).unwrap();
        canvas.fill(resvg::tiny_skia::Color::from_rgba8(255, 0, 0, 255));

        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        composite_over(&mut canvas, &src, 3, 3).unwrap();

        let inside = canvas.pixel(5, 5).unwrap();
        assert_eq!((inside.red(), inside.blue()), (0, 255));
        let outside = canvas.pixel(0, 0).unwrap();
        assert_eq!((outside.red(), outside.blue()), (255, 0));
    }

    #[test]
    fn composite_with_transparency() {
        let mut canvas = Pixmap::new(10, 10).unwrap();
        canvas.fill(resvg::tiny_skia::Color::from_rgba8(255, 0, 0, 255));

        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 128]));
        composite_over(&mut canvas, &src, -2, -2).unwrap();

        let pixel = canvas.pixel(0, 0).unwrap();
        assert!(pixel.red() > 0, "Should have some red");
        assert!(pixel.blue() > 0, "Should have some blue");
        assert_eq!(pixel.alpha(), 255);
    }
}
