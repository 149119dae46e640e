//! Logo layer configuration and application.

use image::imageops::{self, FilterType};
use resvg::tiny_skia::{Paint, PathBuilder, Stroke, Transform};

use super::svg::composite_over;
use super::{DependencyVersion, LayerConfig, LayerEffect, LayerVersions, RenderContext};
use crate::assets::ImageAsset;
use crate::color::Color;
use crate::raster::SizePx;
use crate::state::LogoPosition;

/// Logo width as a fraction of canvas width.
const LOGO_WIDTH_RATIO: f32 = 0.2;

/// Distance from the canvas edge, as a fraction of that axis.
const EDGE_MARGIN_RATIO: f32 = 0.05;

/// Decorative rules drawn beside a bottom-centered logo.
const RULE_COLOR: Color = Color::rgb(0x3b, 0x82, 0xf6);
const RULE_WIDTH: f32 = 3.0;
const RULE_LENGTH_RATIO: f32 = 0.8;
const RULE_GAP_RATIO: f32 = 0.1;

// ============================================================================
// LogoPlacement
// ============================================================================

/// The rows of a placed logo that fall on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRows {
    /// First canvas row covered.
    pub dest_top: u32,
    pub dest_height: u32,
    /// First row of the source image that maps onto `dest_top`.
    pub src_top: u32,
    pub src_height: u32,
}

/// Where the scaled logo lands on the canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LogoPlacement {
    /// Scales `logo` to 20% of the canvas width and anchors it at `position`.
    pub fn compute(position: LogoPosition, logo: SizePx, canvas: SizePx) -> Option<Self> {
        if logo.is_empty() || canvas.is_empty() {
            return None;
        }

        let cw = canvas.width as f32;
        let ch = canvas.height as f32;
        let width = cw * LOGO_WIDTH_RATIO;
        let height = logo.height as f32 / logo.width as f32 * width;

        let start_x = cw * EDGE_MARGIN_RATIO;
        let center_x = (cw - width) / 2.0;
        let end_x = cw * (1.0 - EDGE_MARGIN_RATIO) - width;
        let start_y = ch * EDGE_MARGIN_RATIO;
        let center_y = (ch - height) / 2.0;
        let end_y = ch * (1.0 - EDGE_MARGIN_RATIO) - height;

        let (x, y) = match position {
            LogoPosition::TopLeft => (start_x, start_y),
            LogoPosition::Top => (center_x, start_y),
            LogoPosition::TopRight => (end_x, start_y),
            LogoPosition::Left => (start_x, center_y),
            LogoPosition::Center => (center_x, center_y),
            LogoPosition::Right => (end_x, center_y),
            LogoPosition::BottomLeft => (start_x, end_y),
            LogoPosition::Bottom => (center_x, end_y),
            LogoPosition::BottomRight => (end_x, end_y),
        };

        Some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Endpoints of the two rules flanking the logo at its vertical middle.
    pub fn rules(&self) -> [((f32, f32), (f32, f32)); 2] {
        let y = self.y + self.height / 2.0;
        let gap = self.width * RULE_GAP_RATIO;
        let length = self.width * RULE_LENGTH_RATIO;
        let left = self.x - gap;
        let right = self.x + self.width + gap;
        [((left, y), (left - length, y)), ((right, y), (right + length, y))]
    }

    /// Clips the scaled logo to a canvas `canvas_height` rows tall and maps
    /// the kept rows back onto a source image `source_height` rows tall.
    pub fn visible_rows(&self, canvas_height: u32, source_height: u32) -> Option<VisibleRows> {
        if source_height == 0 {
            return None;
        }
        let height = (self.height.round() as i64).max(1);
        let y = self.y.round() as i64;
        let top = y.max(0);
        let bottom = (y + height).min(i64::from(canvas_height));
        if bottom <= top {
            return None;
        }

        let scale = f64::from(source_height) / height as f64;
        let src_top = (((top - y) as f64 * scale).floor() as u32).min(source_height - 1);
        let src_bottom =
            (((bottom - y) as f64 * scale).ceil() as u32).clamp(src_top + 1, source_height);

        Some(VisibleRows {
            dest_top: top as u32,
            dest_height: (bottom - top) as u32,
            src_top,
            src_height: src_bottom - src_top,
        })
    }
}

// ============================================================================
// LogoConfig
// ============================================================================

/// Configuration for the logo, drawn on top of everything else.
#[derive(Debug, Clone)]
pub struct LogoConfig {
    pub asset: ImageAsset,
    pub position: LogoPosition,
}

impl LogoConfig {
    pub fn new(asset: ImageAsset, position: LogoPosition) -> Self {
        Self { asset, position }
    }

    fn draw_rules(&self, ctx: &mut RenderContext<'_>, placement: &LogoPlacement) {
        let mut paint = Paint::default();
        paint.set_color(RULE_COLOR.to_skia());
        paint.anti_alias = true;
        let stroke = Stroke {
            width: RULE_WIDTH,
            ..Stroke::default()
        };

        for (from, to) in placement.rules() {
            let mut pb = PathBuilder::new();
            pb.move_to(from.0, from.1);
            pb.line_to(to.0, to.1);
            if let Some(path) = pb.finish() {
                ctx.canvas
                    .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
    }
}

impl LayerConfig for LogoConfig {
    fn differs_from(&self, other: &Self) -> bool {
        self.asset.id() != other.asset.id() || self.position != other.position
    }
}

impl LayerEffect for LogoConfig {
    /// Logo sits on top of every other layer.
    fn dependencies(versions: &LayerVersions) -> DependencyVersion {
        DependencyVersion::combine(&[
            versions.background,
            versions.gradient,
            versions.text,
            versions.fonts,
        ])
    }

    fn transform(&self, ctx: &mut RenderContext<'_>) {
        let Some(placement) = LogoPlacement::compute(self.position, self.asset.size(), ctx.size)
        else {
            return;
        };

        let source = self.asset.image();
        let Some(rows) = placement.visible_rows(ctx.size.height, source.height()) else {
            tracing::debug!("logo falls outside the canvas");
            return;
        };

        let width = (placement.width.round() as u32).max(1);
        let scaled = if rows.src_top == 0 && rows.src_height == source.height() {
            imageops::resize(source, width, rows.dest_height, FilterType::Triangle)
        } else {
            let clipped =
                imageops::crop_imm(source, 0, rows.src_top, source.width(), rows.src_height)
                    .to_image();
            imageops::resize(&clipped, width, rows.dest_height, FilterType::Triangle)
        };

        let x = placement.x.round() as i32;
        let y = rows.dest_top as i32;
        if let Err(err) = composite_over(&mut ctx.canvas, &scaled, x, y) {
            tracing::warn!(error = %err, "skipping logo");
            return;
        }

        if self.position == LogoPosition::Bottom {
            self.draw_rules(ctx, &placement);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
