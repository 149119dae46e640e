//! Built-in text effect presets.
//!
//! A preset is a fixed bundle of text color, stroke and shadow values.
//! Applying one replaces those fields wholesale; font, layout, gradient and
//! logo settings are left as they are.

use serde::Serialize;

use crate::color::Color;
use crate::state::{EditState, ShadowSettings, StrokeSettings};

/// A named text-styling bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEffectPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub font_color: Color,
    pub stroke: PresetStroke,
    pub shadow: PresetShadow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetStroke {
    pub enabled: bool,
    pub color: Color,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetShadow {
    pub enabled: bool,
    pub color: Color,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl PresetStroke {
    const NONE: Self = Self {
        enabled: false,
        color: Color::BLACK,
        width: 0.0,
    };

    const fn on(color: Color, width: f32) -> Self {
        Self {
            enabled: true,
            color,
            width,
        }
    }
}

impl PresetShadow {
    const NONE: Self = Self {
        enabled: false,
        color: Color::BLACK,
        blur: 0.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    const fn on(color: Color, blur: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            enabled: true,
            color,
            blur,
            offset_x,
            offset_y,
        }
    }
}

static PRESETS: [TextEffectPreset; 8] = [
    TextEffectPreset {
        id: "default",
        name: "Default",
        description: "Clean text with no effects",
        font_color: Color::WHITE,
        stroke: PresetStroke::NONE,
        shadow: PresetShadow::NONE,
    },
    TextEffectPreset {
        id: "bold-outline",
        name: "Bold Outline",
        description: "White text with thick black outline",
        font_color: Color::WHITE,
        stroke: PresetStroke::on(Color::BLACK, 5.0),
        shadow: PresetShadow::NONE,
    },
    TextEffectPreset {
        id: "subtle-shadow",
        name: "Subtle Shadow",
        description: "White text with soft shadow",
        font_color: Color::WHITE,
        stroke: PresetStroke::NONE,
        // rgba(0,0,0,0.7)
        shadow: PresetShadow::on(Color::rgba(0, 0, 0, 179), 5.0, 2.0, 2.0),
    },
    TextEffectPreset {
        id: "neon-glow",
        name: "Neon Glow",
        description: "Bright text with colorful glow effect",
        font_color: Color::rgb(0x00, 0xff, 0xff),
        stroke: PresetStroke::on(Color::rgb(0x00, 0x00, 0xff), 2.0),
        shadow: PresetShadow::on(Color::rgb(0x00, 0xff, 0xff), 15.0, 0.0, 0.0),
    },
    TextEffectPreset {
        id: "fire-text",
        name: "Fire Text",
        description: "Red-orange text with fiery glow",
        font_color: Color::rgb(0xff, 0x99, 0x00),
        stroke: PresetStroke::on(Color::rgb(0xff, 0x00, 0x00), 2.0),
        shadow: PresetShadow::on(Color::rgb(0xff, 0x00, 0x00), 10.0, 0.0, 0.0),
    },
    TextEffectPreset {
        id: "retro-gaming",
        name: "Retro Gaming",
        description: "Pixelated-style text effect",
        font_color: Color::rgb(0x33, 0xff, 0x33),
        stroke: PresetStroke::on(Color::rgb(0x00, 0x33, 0x00), 3.0),
        shadow: PresetShadow::on(Color::rgb(0x00, 0x33, 0x00), 1.0, 3.0, 3.0),
    },
    TextEffectPreset {
        id: "dramatic",
        name: "Dramatic",
        description: "Bold text with strong shadow",
        font_color: Color::WHITE,
        stroke: PresetStroke::on(Color::BLACK, 3.0),
        shadow: PresetShadow::on(Color::BLACK, 5.0, 5.0, 5.0),
    },
    TextEffectPreset {
        id: "comic-book",
        name: "Comic Book",
        description: "Yellow text with comic-style outline",
        font_color: Color::rgb(0xff, 0xff, 0x00),
        stroke: PresetStroke::on(Color::BLACK, 4.0),
        shadow: PresetShadow::NONE,
    },
];

/// Returns all presets in display order.
pub fn list_presets() -> &'static [TextEffectPreset] {
    &PRESETS
}

/// Looks up a preset by id.
pub fn find_preset(id: &str) -> Option<&'static TextEffectPreset> {
    PRESETS.iter().find(|p| p.id == id)
}

impl TextEffectPreset {
    /// Overwrites the text color, stroke and shadow of `state`.
    pub fn apply(&self, state: &mut EditState) {
        let style = &mut state.text_style;
        style.color = self.font_color;
        style.stroke = StrokeSettings {
            enabled: self.stroke.enabled,
            color: self.stroke.color,
            width: self.stroke.width,
        };
        style.shadow = ShadowSettings {
            enabled: self.shadow.enabled,
            color: self.shadow.color,
            blur: self.shadow.blur,
            offset_x: self.shadow.offset_x,
            offset_y: self.shadow.offset_y,
        };
    }

    /// Returns a copy of `state` with this preset applied.
    pub fn applied_to(&self, state: &EditState) -> EditState {
        let mut next = state.clone();
        self.apply(&mut next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CropAspect, LogoPosition, TextAlign};

    #[test]
    fn presets_are_ordered_and_unique() {
        let ids: Vec<_> = list_presets().iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            [
                "default",
                "bold-outline",
                "subtle-shadow",
                "neon-glow",
                "fire-text",
                "retro-gaming",
                "dramatic",
                "comic-book"
            ]
        );
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find_preset("neon-glow").unwrap().name, "Neon Glow");
        assert!(find_preset("sparkles").is_none());
    }

    #[test]
    fn apply_touches_only_text_styling() {
        let mut state = EditState::default();
        state.crop = CropAspect::Square;
        state.font.align = TextAlign::Left;
        state.font.size = 90.0;
        state.text_y = 20.0;
        state.gradient.opacity = 0.3;
        state.logo.position = LogoPosition::TopLeft;
        state.text_style.background.opacity = 0.4;

        let next = find_preset("dramatic").unwrap().applied_to(&state);

        assert_eq!(next.text_style.color, Color::WHITE);
        assert!(next.text_style.stroke.enabled);
        assert_eq!(next.text_style.stroke.width, 3.0);
        assert!(next.text_style.shadow.enabled);
        assert_eq!(next.text_style.shadow.offset_x, 5.0);

        assert_eq!(next.crop, state.crop);
        assert_eq!(next.font, state.font);
        assert_eq!(next.text_y, state.text_y);
        assert_eq!(next.gradient, state.gradient);
        assert_eq!(next.logo, state.logo);
        assert_eq!(next.text_style.background, state.text_style.background);
    }

    #[test]
    fn apply_is_wholesale() {
        let mut state = EditState::default();
        find_preset("neon-glow").unwrap().apply(&mut state);
        find_preset("default").unwrap().apply(&mut state);

        assert_eq!(state.text_style.color, Color::WHITE);
        assert!(!state.text_style.stroke.enabled);
        assert!(!state.text_style.shadow.enabled);
        assert_eq!(state.text_style.shadow.blur, 0.0);
    }
}
