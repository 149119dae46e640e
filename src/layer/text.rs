//! Title text layer: wrapping, stroke, drop shadow and line backgrounds.
//!
//! Lines are laid out with [`crate::layout`] and emitted as an SVG document
//! that resvg rasterizes over the canvas. Per line the order is background
//! rectangle, stroke, then fill; the drop shadow is a filter on the fill
//! element alone.

use std::fmt::Write as _;

use super::svg::{escape_xml, num, open_svg, render_svg_onto};
use super::{DependencyVersion, LayerConfig, LayerEffect, LayerVersions, RenderContext};
use crate::fonts::FontSpec;
use crate::layout::{layout_title, TextBlock};
use crate::raster::SizePx;
use crate::state::{EditState, FontSettings, TextAlign, TextStyle};

/// Padding around a line background, as a fraction of the font size.
const BACKGROUND_PADDING_RATIO: f32 = 0.2;

const SHADOW_FILTER_ID: &str = "title-shadow";

// ============================================================================
// TextConfig
// ============================================================================

/// Configuration for the title text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextConfig {
    pub title: String,
    pub font: FontSettings,
    pub style: TextStyle,
    /// Vertical center of the block, as a percentage of canvas height.
    pub text_y: f32,
}

impl TextConfig {
    pub fn from_state(state: &EditState) -> Self {
        Self {
            title: state.title.clone(),
            font: state.font.clone(),
            style: state.text_style.clone(),
            text_y: state.text_y,
        }
    }

    fn font_spec(&self) -> FontSpec<'_> {
        FontSpec {
            family: &self.font.family,
            weight: self.font.weight,
            size: self.font.size,
        }
    }

    /// Builds the SVG document drawing `block`.
    ///
    /// `families` is the CSS `font-family` value for every text element.
    pub fn markup(&self, block: &TextBlock, families: &str, size: SizePx) -> String {
        let mut svg = open_svg(size.width, size.height);
        let style = &self.style;
        let font_size = self.font.size;

        let shadow = style.shadow.enabled && !style.shadow.color.is_transparent();
        if shadow {
            let _ = write!(
                svg,
                r#"<defs><filter id="{SHADOW_FILTER_ID}" x="-50%" y="-50%" width="200%" height="200%"><feDropShadow dx="{}" dy="{}" stdDeviation="{}" flood-color="{}" flood-opacity="{}"/></filter></defs>"#,
                num(style.shadow.offset_x),
                num(style.shadow.offset_y),
                num(style.shadow.blur.max(0.0) / 2.0),
                style.shadow.color.svg_rgb(),
                num(style.shadow.color.alpha_f32()),
            );
        }

        let anchor = match block.align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        };
        let families = escape_xml(families);
        let weight = self.font.weight.to_number();

        let background = &style.background;
        let draw_background = background.opacity > 0.0;
        let pad = font_size * BACKGROUND_PADDING_RATIO;

        for line in &block.lines {
            if draw_background {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" fill-opacity="{}"/>"#,
                    num(line.left(block.align) - pad),
                    num(line.center_y - font_size / 2.0 - pad),
                    num(line.width + pad * 2.0),
                    num(font_size + pad * 2.0),
                    background.color.svg_rgb(),
                    num(background.opacity.min(1.0) * background.color.alpha_f32()),
                );
            }

            let common = format!(
                r#"x="{}" y="{}" text-anchor="{anchor}" dominant-baseline="central" font-family="{families}" font-size="{}" font-weight="{weight}" xml:space="preserve""#,
                num(line.x),
                num(line.center_y),
                num(font_size),
            );
            let text = escape_xml(&line.text);

            if style.stroke.enabled && style.stroke.width > 0.0 {
                let _ = write!(
                    svg,
                    r#"<text {common} fill="none" stroke="{}" stroke-opacity="{}" stroke-width="{}" stroke-linejoin="round">{text}</text>"#,
                    style.stroke.color.svg_rgb(),
                    num(style.stroke.color.alpha_f32()),
                    num(style.stroke.width),
                );
            }

            let filter = if shadow {
                format!(r#" filter="url(#{SHADOW_FILTER_ID})""#)
            } else {
                String::new()
            };
            let _ = write!(
                svg,
                r#"<text {common} fill="{}" fill-opacity="{}"{filter}>{text}</text>"#,
                style.color.svg_rgb(),
                num(style.color.alpha_f32()),
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

impl LayerConfig for TextConfig {
    fn differs_from(&self, other: &Self) -> bool {
        self != other
    }
}

impl LayerEffect for TextConfig {
    /// Text is drawn over the background and gradient, shaped with the
    /// registered fonts.
    fn dependencies(versions: &LayerVersions) -> DependencyVersion {
        DependencyVersion::combine(&[versions.background, versions.gradient, versions.fonts])
    }

    fn transform(&self, ctx: &mut RenderContext<'_>) {
        let spec = self.font_spec();
        let block = layout_title(
            &self.title,
            &spec,
            self.font.line_height,
            self.font.align,
            self.text_y,
            ctx.size,
            ctx.fonts,
        );
        if block.is_empty() {
            return;
        }

        tracing::trace!(lines = block.lines.len(), "drawing title");
        let svg = self.markup(&block, &ctx.fonts.family_list(&self.font.family), ctx.size);
        if let Err(err) = render_svg_onto(&mut ctx.canvas, &svg, ctx.fonts) {
            tracing::warn!(error = %err, "skipping title text");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::fonts::{FixedAdvance, FontRegistry};

    fn config(title: &str) -> TextConfig {
        let mut state = EditState::default();
        state.title = title.to_string();
        TextConfig::from_state(&state)
    }

    fn block_for(cfg: &TextConfig, size: SizePx) -> TextBlock {
        layout_title(
            &cfg.title,
            &cfg.font_spec(),
            cfg.font.line_height,
            cfg.font.align,
            cfg.text_y,
            size,
            &FixedAdvance { em: 0.5 },
        )
    }

    fn markup(cfg: &TextConfig) -> String {
        let size = SizePx::new(1920, 1080);
        cfg.markup(&block_for(cfg, size), "'Arial', sans-serif", size)
    }

    #[test]
    fn title_is_escaped() {
        let svg = markup(&config("Tips & <Tricks>"));
        assert!(svg.contains("Tips &amp; &lt;Tricks&gt;"));
        assert!(!svg.contains("<Tricks>"));
    }

    #[test]
    fn stroke_is_drawn_before_fill() {
        let mut cfg = config("Outlined");
        cfg.style.stroke.enabled = true;
        cfg.style.stroke.width = 4.0;
        let svg = markup(&cfg);

        let stroke = svg.find(r#"fill="none""#).unwrap();
        let fill = svg.find(r#"fill="rgb(255,255,255)""#).unwrap();
        assert!(stroke < fill);
        assert!(svg.contains(r#"stroke-linejoin="round""#));
        assert!(svg.contains(r#"stroke-width="4""#));
    }

    #[test]
    fn shadow_filter_only_on_fill() {
        let mut cfg = config("Shadowed");
        cfg.style.stroke.enabled = true;
        cfg.style.stroke.width = 2.0;
        cfg.style.shadow.enabled = true;
        cfg.style.shadow.blur = 10.0;
        cfg.style.shadow.offset_x = 3.0;
        let svg = markup(&cfg);

        assert!(svg.contains(r#"stdDeviation="5""#));
        assert!(svg.contains(r#"dx="3""#));
        assert_eq!(svg.matches("filter=\"url(#title-shadow)\"").count(), 1);

        let stroke_elem = svg
            .split("<text")
            .find(|e| e.contains(r#"fill="none""#))
            .unwrap();
        assert!(!stroke_elem.contains("filter="));
    }

    #[test]
    fn disabled_shadow_emits_no_filter() {
        let svg = markup(&config("Plain"));
        assert!(!svg.contains("<filter"));
        assert!(!svg.contains("filter="));
    }

    #[test]
    fn background_rect_only_with_opacity() {
        let mut cfg = config("Boxed");
        assert!(!markup(&cfg).contains("<rect"));

        cfg.style.background.opacity = 0.5;
        cfg.style.background.color = Color::rgb(10, 20, 30);
        let svg = markup(&cfg);
        assert_eq!(svg.matches("<rect").count(), 1);
        assert!(svg.contains(r#"fill="rgb(10,20,30)" fill-opacity="0.5""#));
        assert!(svg.find("<rect").unwrap() < svg.find("<text").unwrap());
    }

    #[test]
    fn one_text_element_per_line() {
        let mut cfg = config("alpha beta gamma delta");
        cfg.font.size = 400.0;
        let svg = markup(&cfg);
        let lines = block_for(&cfg, SizePx::new(1920, 1080)).lines.len();
        assert!(lines > 1);
        assert_eq!(svg.matches("<text").count(), lines);
    }

    #[test]
    fn anchors_follow_alignment() {
        let mut cfg = config("Left");
        cfg.font.align = TextAlign::Left;
        assert!(markup(&cfg).contains(r#"text-anchor="start""#));
        cfg.font.align = TextAlign::Right;
        assert!(markup(&cfg).contains(r#"text-anchor="end""#));
    }

    #[test]
    fn blank_title_draws_nothing() {
        let fonts = FontRegistry::new();
        let mut ctx = RenderContext::new(SizePx::new(40, 20), &fonts).unwrap();
        let mut cfg = config("   ");
        cfg.style.background.opacity = 1.0;
        cfg.transform(&mut ctx);
        assert!(ctx.canvas.data().iter().all(|b| *b == 0));
    }

    #[test]
    fn line_background_renders_without_fonts() {
        let fonts = FontRegistry::new();
        let mut ctx = RenderContext::new(SizePx::new(200, 100), &fonts).unwrap();
        let mut cfg = config("Hi");
        cfg.font.size = 20.0;
        cfg.text_y = 50.0;
        cfg.style.background.opacity = 1.0;
        cfg.style.background.color = Color::rgb(0, 0, 255);

        cfg.transform(&mut ctx);

        let center = ctx.canvas.pixel(100, 50).unwrap();
        assert_eq!(center.alpha(), 255);
        assert_eq!(center.blue(), 255);
        assert_eq!(ctx.canvas.pixel(2, 2).unwrap().alpha(), 0);
    }
}
