//! RGBA colors parsed from CSS-like strings.
//!
//! Editor documents store colors the way a web color picker produces them:
//! `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)` or
//! `transparent`. [`Color`] serializes back to `#rrggbb` when opaque and to
//! `rgba(...)` otherwise.

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::ThumbError;

/// A straight (non-premultiplied) RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns this color with its alpha replaced by `opacity` (0.0-1.0).
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: unit_to_u8(opacity),
            ..self
        }
    }

    /// Alpha as a 0.0-1.0 fraction.
    pub fn alpha_f32(&self) -> f32 {
        self.a as f32 / 255.0
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// `rgb(r,g,b)` without alpha, for SVG paint attributes.
    pub(crate) fn svg_rgb(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    pub(crate) fn to_skia(self) -> resvg::tiny_skia::Color {
        resvg::tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl FromStr for Color {
    type Err = ThumbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ThumbError::InvalidColor(s.to_string());

        if trimmed.eq_ignore_ascii_case("transparent") {
            return Ok(Self::TRANSPARENT);
        }

        if let Some(hex) = trimmed.strip_prefix('#') {
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            return match hex.len() {
                3 | 6 => {
                    let rgb: Srgb<u8> = hex.parse().map_err(|_| invalid())?;
                    Ok(Self::rgb(rgb.red, rgb.green, rgb.blue))
                }
                8 => {
                    let rgb: Srgb<u8> = hex[..6].parse().map_err(|_| invalid())?;
                    let a = u8::from_str_radix(&hex[6..], 16).map_err(|_| invalid())?;
                    Ok(Self::rgba(rgb.red, rgb.green, rgb.blue, a))
                }
                _ => Err(invalid()),
            };
        }

        let lower = trimmed.to_ascii_lowercase();
        let (args, has_alpha) = if let Some(rest) = lower.strip_prefix("rgba(") {
            (rest.strip_suffix(')').ok_or_else(invalid)?, true)
        } else if let Some(rest) = lower.strip_prefix("rgb(") {
            (rest.strip_suffix(')').ok_or_else(invalid)?, false)
        } else {
            return Err(invalid());
        };

        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(invalid());
        }

        let channel = |p: &str| -> Result<u8, ThumbError> {
            let v: f32 = p.parse().map_err(|_| invalid())?;
            Ok(v.clamp(0.0, 255.0).round() as u8)
        };
        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if has_alpha {
            let v: f32 = parts[3].parse().map_err(|_| invalid())?;
            unit_to_u8(v)
        } else {
            255
        };

        Ok(Self::rgba(r, g, b, a))
    }
}

impl TryFrom<String> for Color {
    type Error = ThumbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let alpha = (self.alpha_f32() * 1000.0).round() / 1000.0;
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!("#ffffff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#f00".parse::<Color>().unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(
            "#3b82f680".parse::<Color>().unwrap(),
            Color::rgba(0x3b, 0x82, 0xf6, 0x80)
        );
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
    }

    #[test]
    fn non_ascii_hex_is_rejected() {
        assert!("#aaaaa€".parse::<Color>().is_err());
        assert!("#€€".parse::<Color>().is_err());
        assert!("#fffff+f".parse::<Color>().is_err());
    }

    #[test]
    fn parses_functional_forms() {
        assert_eq!(
            "rgba(0,0,0,0.7)".parse::<Color>().unwrap(),
            Color::rgba(0, 0, 0, 179)
        );
        assert_eq!(
            "rgba(0, 0, 0, 0)".parse::<Color>().unwrap(),
            Color::TRANSPARENT
        );
        assert_eq!(
            "RGB(10, 20, 30)".parse::<Color>().unwrap(),
            Color::rgb(10, 20, 30)
        );
        assert!("rgb(1,2)".parse::<Color>().is_err());
        assert!("hsl(0, 0%, 0%)".parse::<Color>().is_err());
    }

    #[test]
    fn opacity_replaces_alpha() {
        let c = Color::rgb(255, 0, 0).with_opacity(0.5);
        assert_eq!(c.a, 128);
        assert_eq!(Color::WHITE.with_opacity(4.0).a, 255);
        assert!(Color::BLACK.with_opacity(0.0).is_transparent());
    }

    #[test]
    fn serializes_as_css_string() {
        let json = serde_json::to_string(&Color::rgb(0, 255, 255)).unwrap();
        assert_eq!(json, "\"#00ffff\"");

        let json = serde_json::to_string(&Color::rgba(0, 0, 0, 0)).unwrap();
        assert_eq!(json, "\"rgba(0, 0, 0, 0)\"");

        let back: Color = serde_json::from_str("\"rgba(0,0,0,0.7)\"").unwrap();
        assert_eq!(back, Color::rgba(0, 0, 0, 179));

        assert!(serde_json::from_str::<Color>("\"not a color\"").is_err());
    }
}
