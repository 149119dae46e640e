//! Serializable editing state.
//!
//! An [`EditState`] captures every adjustable parameter of a thumbnail in a
//! JSON-friendly form. The compositor is a pure function of this state plus
//! the loaded background/logo assets.
//!
//! # Example
//!
//! ```
//! use thumbsmith::{CropAspect, EditState};
//!
//! let mut state = EditState::default();
//! state.title = "Rust in 100 Seconds".into();
//! state.crop = CropAspect::Square;
//!
//! let json = state.to_json().unwrap();
//! let restored = EditState::from_json(&json).unwrap();
//! assert_eq!(restored.crop.dimensions().width, 1500);
//! ```

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::raster::SizePx;

// ============================================================================
// Crop
// ============================================================================

/// Output aspect ratio. Each variant maps to fixed canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CropAspect {
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "4:5")]
    Portrait,
    #[serde(rename = "5:4")]
    Landscape,
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
}

impl CropAspect {
    pub const ALL: [CropAspect; 4] = [
        CropAspect::Widescreen,
        CropAspect::Square,
        CropAspect::Portrait,
        CropAspect::Landscape,
    ];

    /// The name used in saved state, e.g. `"16:9"`.
    pub fn label(self) -> &'static str {
        match self {
            CropAspect::Square => "square",
            CropAspect::Portrait => "4:5",
            CropAspect::Landscape => "5:4",
            CropAspect::Widescreen => "16:9",
        }
    }

    /// Canvas pixel dimensions for this aspect.
    pub fn dimensions(self) -> SizePx {
        match self {
            CropAspect::Square => SizePx::new(1500, 1500),
            CropAspect::Portrait => SizePx::new(1200, 1500),
            CropAspect::Landscape => SizePx::new(1500, 1200),
            CropAspect::Widescreen => SizePx::new(1920, 1080),
        }
    }
}

// ============================================================================
// Font
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    #[default]
    Bold,
}

impl FontWeight {
    /// CSS numeric weight.
    pub fn to_number(self) -> u16 {
        match self {
            FontWeight::Normal => 400,
            FontWeight::Bold => 700,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Font selection and line layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontSettings {
    /// Font size in pixels.
    pub size: f32,
    /// Family name or a name registered with the font registry.
    pub family: String,
    pub weight: FontWeight,
    pub align: TextAlign,
    /// Line spacing as a multiple of `size`.
    pub line_height: f32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            size: 48.0,
            family: "Arial".into(),
            weight: FontWeight::Bold,
            align: TextAlign::Center,
            line_height: 1.2,
        }
    }
}

// ============================================================================
// Text Style
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrokeSettings {
    pub enabled: bool,
    pub color: Color,
    pub width: f32,
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::BLACK,
            width: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowSettings {
    pub enabled: bool,
    pub color: Color,
    /// Canvas-style blur radius (twice the Gaussian standard deviation).
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::BLACK,
            blur: 5.0,
            offset_x: 2.0,
            offset_y: 2.0,
        }
    }
}

/// Backdrop drawn behind each text line. An opacity of 0 disables it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextBackground {
    pub color: Color,
    pub opacity: f32,
}

impl Default for TextBackground {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            opacity: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub color: Color,
    pub stroke: StrokeSettings,
    pub shadow: ShadowSettings,
    pub background: TextBackground,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            stroke: StrokeSettings::default(),
            shadow: ShadowSettings::default(),
            background: TextBackground::default(),
        }
    }
}

// ============================================================================
// Gradient
// ============================================================================

/// Direction a gradient runs toward. Unknown names deserialize to
/// [`GradientDirection::ToBottom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum GradientDirection {
    #[default]
    ToBottom,
    ToTop,
    ToRight,
    ToLeft,
    ToBottomRight,
    ToBottomLeft,
    ToTopRight,
    ToTopLeft,
    Radial,
}

impl GradientDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            GradientDirection::ToBottom => "bottom",
            GradientDirection::ToTop => "top",
            GradientDirection::ToRight => "right",
            GradientDirection::ToLeft => "left",
            GradientDirection::ToBottomRight => "bottomRight",
            GradientDirection::ToBottomLeft => "bottomLeft",
            GradientDirection::ToTopRight => "topRight",
            GradientDirection::ToTopLeft => "topLeft",
            GradientDirection::Radial => "radial",
        }
    }
}

impl From<&str> for GradientDirection {
    fn from(s: &str) -> Self {
        match s {
            "top" => Self::ToTop,
            "right" => Self::ToRight,
            "left" => Self::ToLeft,
            "bottomRight" => Self::ToBottomRight,
            "bottomLeft" => Self::ToBottomLeft,
            "topRight" => Self::ToTopRight,
            "topLeft" => Self::ToTopLeft,
            "radial" => Self::Radial,
            _ => Self::ToBottom,
        }
    }
}

impl From<String> for GradientDirection {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<GradientDirection> for String {
    fn from(d: GradientDirection) -> Self {
        d.as_str().to_string()
    }
}

/// Canvas composite operations usable for the gradient overlay. Unknown
/// names deserialize to [`BlendMode::Normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    pub const ALL: [BlendMode; 16] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Difference,
        BlendMode::Exclusion,
        BlendMode::Hue,
        BlendMode::Saturation,
        BlendMode::Color,
        BlendMode::Luminosity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "source-over",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }
}

impl From<&str> for BlendMode {
    fn from(s: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .unwrap_or_default()
    }
}

impl From<String> for BlendMode {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<BlendMode> for String {
    fn from(m: BlendMode) -> Self {
        m.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradientSettings {
    pub enabled: bool,
    /// Alpha applied to the end color (0.0-1.0).
    pub opacity: f32,
    /// Percent of the canvas covered along the gradient axis (1-100).
    pub height: f32,
    pub start_color: Color,
    pub end_color: Color,
    pub direction: GradientDirection,
    pub blend_mode: BlendMode,
}

impl Default for GradientSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            opacity: 0.7,
            height: 100.0,
            start_color: Color::TRANSPARENT,
            end_color: Color::BLACK,
            direction: GradientDirection::ToBottom,
            blend_mode: BlendMode::Normal,
        }
    }
}

// ============================================================================
// Logo
// ============================================================================

/// Anchor point for the logo. Unknown names deserialize to
/// [`LogoPosition::Bottom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum LogoPosition {
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    #[default]
    Bottom,
    BottomRight,
}

impl LogoPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            LogoPosition::TopLeft => "top-left",
            LogoPosition::Top => "top",
            LogoPosition::TopRight => "top-right",
            LogoPosition::Left => "left",
            LogoPosition::Center => "middle",
            LogoPosition::Right => "right",
            LogoPosition::BottomLeft => "bottom-left",
            LogoPosition::Bottom => "bottom",
            LogoPosition::BottomRight => "bottom-right",
        }
    }
}

impl From<&str> for LogoPosition {
    fn from(s: &str) -> Self {
        match s {
            "top-left" => Self::TopLeft,
            "top" => Self::Top,
            "top-right" => Self::TopRight,
            "left" => Self::Left,
            "middle" | "center" => Self::Center,
            "right" => Self::Right,
            "bottom-left" => Self::BottomLeft,
            "bottom-right" => Self::BottomRight,
            _ => Self::Bottom,
        }
    }
}

impl From<String> for LogoPosition {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<LogoPosition> for String {
    fn from(p: LogoPosition) -> Self {
        p.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoSettings {
    pub enabled: bool,
    pub position: LogoPosition,
}

impl Default for LogoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            position: LogoPosition::Bottom,
        }
    }
}

// ============================================================================
// EditState
// ============================================================================

/// Every adjustable parameter of a thumbnail.
///
/// The background and logo pixels are not part of the state; they are held
/// as loaded assets by the editor (or passed to [`render`](crate::render)).
///
/// # JSON Format
///
/// ```json
/// {
///   "crop": "16:9",
///   "title": "YOUR AWESOME VIDEO",
///   "font": { "size": 48.0, "family": "Arial", "weight": "bold",
///             "align": "center", "lineHeight": 1.2 },
///   "textY": 50.0,
///   "textStyle": { "color": "#ffffff", "stroke": { ... }, "shadow": { ... },
///                  "background": { ... } },
///   "gradient": { "enabled": true, "direction": "bottom", "blendMode": "source-over", ... },
///   "logo": { "enabled": true, "position": "bottom" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditState {
    pub crop: CropAspect,
    pub title: String,
    pub font: FontSettings,
    /// Vertical center of the text block, in percent of canvas height.
    pub text_y: f32,
    pub text_style: TextStyle,
    pub gradient: GradientSettings,
    pub logo: LogoSettings,
}

impl Default for EditState {
    fn default() -> Self {
        Self {
            crop: CropAspect::Widescreen,
            title: "YOUR AWESOME VIDEO".into(),
            font: FontSettings::default(),
            text_y: 50.0,
            text_style: TextStyle::default(),
            gradient: GradientSettings::default(),
            logo: LogoSettings::default(),
        }
    }
}

impl EditState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas dimensions selected by the crop aspect.
    pub fn canvas_size(&self) -> SizePx {
        self.crop.dimensions()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
