//! Gradient overlay layer configuration and application.

use resvg::tiny_skia::{
    self, GradientStop, LinearGradient, Paint, Point, RadialGradient, Rect, Shader, SpreadMode,
    Transform,
};

use super::{DependencyVersion, LayerConfig, LayerEffect, LayerVersions, RenderContext};
use crate::color::Color;
use crate::state::{BlendMode, GradientDirection, GradientSettings};

// ============================================================================
// GradientConfig
// ============================================================================

/// Configuration for the gradient overlay.
///
/// The gradient runs from `start_color` to `end_color`, whose alpha is
/// replaced by `opacity`. For the four axis-aligned directions, `height`
/// limits the gradient to a band of that percentage of the canvas, ending
/// at the edge the gradient points to. Diagonal and radial gradients always
/// cover the whole canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientConfig {
    pub direction: GradientDirection,
    pub start_color: Color,
    pub end_color: Color,
    /// End-stop opacity, 0.0-1.0.
    pub opacity: f32,
    /// Band size as a percentage of the canvas, 0-100.
    pub height: f32,
    pub blend_mode: BlendMode,
}

impl GradientConfig {
    pub fn from_settings(settings: &GradientSettings) -> Self {
        Self {
            direction: settings.direction,
            start_color: settings.start_color,
            end_color: settings.end_color,
            opacity: settings.opacity.clamp(0.0, 1.0),
            height: settings.height.clamp(0.0, 100.0),
            blend_mode: settings.blend_mode,
        }
    }

    /// Area covered by the gradient and the points it runs between.
    pub fn geometry(&self, width: f32, height: f32) -> Option<GradientGeometry> {
        let band = |len: f32| len * self.height / 100.0;
        let (area, start, end) = match self.direction {
            GradientDirection::ToBottom => {
                let top = height - band(height);
                (
                    Rect::from_ltrb(0.0, top, width, height)?,
                    (0.0, top),
                    (0.0, height),
                )
            }
            GradientDirection::ToTop => {
                let bottom = band(height);
                (
                    Rect::from_ltrb(0.0, 0.0, width, bottom)?,
                    (0.0, bottom),
                    (0.0, 0.0),
                )
            }
            GradientDirection::ToRight => {
                let left = width - band(width);
                (
                    Rect::from_ltrb(left, 0.0, width, height)?,
                    (left, 0.0),
                    (width, 0.0),
                )
            }
            GradientDirection::ToLeft => {
                let right = band(width);
                (
                    Rect::from_ltrb(0.0, 0.0, right, height)?,
                    (right, 0.0),
                    (0.0, 0.0),
                )
            }
            GradientDirection::ToBottomRight => {
                (full(width, height)?, (0.0, 0.0), (width, height))
            }
            GradientDirection::ToBottomLeft => {
                (full(width, height)?, (width, 0.0), (0.0, height))
            }
            GradientDirection::ToTopRight => {
                (full(width, height)?, (0.0, height), (width, 0.0))
            }
            GradientDirection::ToTopLeft => {
                (full(width, height)?, (width, height), (0.0, 0.0))
            }
            GradientDirection::Radial => {
                let center = (width / 2.0, height / 2.0);
                return Some(GradientGeometry {
                    area: full(width, height)?,
                    kind: GradientKind::Radial {
                        center: Point::from_xy(center.0, center.1),
                        radius: width.max(height) / 2.0,
                    },
                });
            }
        };

        if area.width() <= 0.0 || area.height() <= 0.0 {
            return None;
        }

        Some(GradientGeometry {
            area,
            kind: GradientKind::Linear {
                start: Point::from_xy(start.0, start.1),
                end: Point::from_xy(end.0, end.1),
            },
        })
    }

    fn stops(&self) -> Vec<GradientStop> {
        vec![
            GradientStop::new(0.0, self.start_color.to_skia()),
            GradientStop::new(1.0, self.end_color.with_opacity(self.opacity).to_skia()),
        ]
    }

    fn shader(&self, kind: GradientKind) -> Option<Shader<'static>> {
        match kind {
            GradientKind::Linear { start, end } => LinearGradient::new(
                start,
                end,
                self.stops(),
                SpreadMode::Pad,
                Transform::identity(),
            ),
            GradientKind::Radial { center, radius } => RadialGradient::new(
                center,
                center,
                radius,
                self.stops(),
                SpreadMode::Pad,
                Transform::identity(),
            ),
        }
    }
}

fn full(width: f32, height: f32) -> Option<Rect> {
    Rect::from_xywh(0.0, 0.0, width, height)
}

/// Where a gradient is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientGeometry {
    pub area: Rect,
    pub kind: GradientKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientKind {
    Linear { start: Point, end: Point },
    Radial { center: Point, radius: f32 },
}

/// Maps a blend mode onto the rasterizer's compositing operator.
pub fn skia_blend_mode(mode: BlendMode) -> tiny_skia::BlendMode {
    match mode {
        BlendMode::Normal => tiny_skia::BlendMode::SourceOver,
        BlendMode::Multiply => tiny_skia::BlendMode::Multiply,
        BlendMode::Screen => tiny_skia::BlendMode::Screen,
        BlendMode::Overlay => tiny_skia::BlendMode::Overlay,
        BlendMode::Darken => tiny_skia::BlendMode::Darken,
        BlendMode::Lighten => tiny_skia::BlendMode::Lighten,
        BlendMode::ColorDodge => tiny_skia::BlendMode::ColorDodge,
        BlendMode::ColorBurn => tiny_skia::BlendMode::ColorBurn,
        BlendMode::HardLight => tiny_skia::BlendMode::HardLight,
        BlendMode::SoftLight => tiny_skia::BlendMode::SoftLight,
        BlendMode::Difference => tiny_skia::BlendMode::Difference,
        BlendMode::Exclusion => tiny_skia::BlendMode::Exclusion,
        BlendMode::Hue => tiny_skia::BlendMode::Hue,
        BlendMode::Saturation => tiny_skia::BlendMode::Saturation,
        BlendMode::Color => tiny_skia::BlendMode::Color,
        BlendMode::Luminosity => tiny_skia::BlendMode::Luminosity,
    }
}

impl LayerConfig for GradientConfig {
    fn differs_from(&self, other: &Self) -> bool {
        self != other
    }
}

impl LayerEffect for GradientConfig {
    /// Gradient is drawn over the background.
    fn dependencies(versions: &LayerVersions) -> DependencyVersion {
        DependencyVersion::combine(&[versions.background])
    }

    fn transform(&self, ctx: &mut RenderContext<'_>) {
        let (w, h) = (ctx.size.width as f32, ctx.size.height as f32);
        // A zero-height band has no area.
        let Some(geometry) = self.geometry(w, h) else {
            return;
        };
        let Some(shader) = self.shader(geometry.kind) else {
            return;
        };

        let paint = Paint {
            shader,
            blend_mode: skia_blend_mode(self.blend_mode),
            anti_alias: false,
            ..Paint::default()
        };
        ctx.canvas
            .fill_rect(geometry.area, &paint, Transform::identity(), None);
    }
}

// ============================================================================
// Tests
// ============================================================================
