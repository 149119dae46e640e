//! Font registration and text measurement.
//!
//! [`FontRegistry`] owns the font database shared with the SVG text renderer.
//! Custom font files are registered under a caller-chosen name; the name is
//! resolved to the family stored inside the font file when text is drawn.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use resvg::usvg::fontdb;

use crate::error::{ThumbError, ThumbResult};
use crate::state::FontWeight;

/// Average advance used when no font face can be resolved.
const FALLBACK_ADVANCE_EM: f32 = 0.55;

/// Families tried after the requested one, in order.
const FALLBACK_FAMILIES: [&str; 1] = ["Arial"];

/// Shared font database plus name aliases.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    db: Arc<fontdb::Database>,
    aliases: HashMap<String, String>,
    generation: u64,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    /// Creates an empty registry (no system fonts).
    pub fn new() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
            aliases: HashMap::new(),
            generation: 0,
        }
    }

    /// Creates a registry preloaded with the system's installed fonts.
    pub fn with_system_fonts() -> Self {
        let mut registry = Self::new();
        registry.load_system_fonts();
        registry
    }

    pub fn load_system_fonts(&mut self) {
        Arc::make_mut(&mut self.db).load_system_fonts();
        self.generation = self.generation.wrapping_add(1);
        tracing::debug!(faces = self.db.len(), "loaded system fonts");
    }

    /// Registers a font file under `name`.
    ///
    /// Returns `Ok(false)` when `name` is already registered.
    pub fn register(&mut self, name: &str, data: Vec<u8>) -> ThumbResult<bool> {
        if self.aliases.contains_key(name) {
            return Ok(false);
        }

        let db = Arc::make_mut(&mut self.db);
        let before: HashSet<fontdb::ID> = db.faces().map(|f| f.id).collect();
        db.load_font_data(data);

        let family = db
            .faces()
            .filter(|f| !before.contains(&f.id))
            .find_map(|f| f.families.first().map(|(family, _)| family.clone()))
            .ok_or_else(|| ThumbError::font(format!("no usable face in font '{name}'")))?;

        tracing::info!(name, family = %family, "registered font");
        self.aliases.insert(name.to_string(), family);
        self.generation = self.generation.wrapping_add(1);
        Ok(true)
    }

    /// Reads and registers a font file from disk.
    pub fn register_file(&mut self, name: &str, path: impl AsRef<Path>) -> ThumbResult<bool> {
        let path = path.as_ref();
        if self.aliases.contains_key(name) {
            return Ok(false);
        }
        let data = std::fs::read(path).map_err(|e| ThumbError::io(path, e))?;
        self.register(name, data)
    }

    /// Returns true if `name` was registered or names a family in the database.
    pub fn is_available(&self, name: &str) -> bool {
        self.aliases.contains_key(name) || self.query(name, FontWeight::Normal).is_some()
    }

    /// Maps a registered name to the family name stored in the font file.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Number of loaded font faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Changes whenever fonts are added. Used for render cache invalidation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.db)
    }

    /// CSS `font-family` list for SVG text.
    pub(crate) fn family_list(&self, name: &str) -> String {
        let mut families = vec![format!("'{}'", self.resolve(name).replace('\'', ""))];
        families.extend(FALLBACK_FAMILIES.iter().map(|f| format!("'{f}'")));
        families.push("sans-serif".into());
        families.join(", ")
    }

    fn query(&self, name: &str, weight: FontWeight) -> Option<fontdb::ID> {
        let family = self.resolve(name);
        let mut families = vec![fontdb::Family::Name(family)];
        families.extend(FALLBACK_FAMILIES.iter().map(|f| fontdb::Family::Name(*f)));
        families.push(fontdb::Family::SansSerif);

        self.db.query(&fontdb::Query {
            families: &families,
            weight: fontdb::Weight(weight.to_number()),
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })
    }

    /// Measures `text` with the face resolved for `family`/`weight`.
    fn advance_width(&self, text: &str, family: &str, weight: FontWeight, size: f32) -> Option<f32> {
        let id = self.query(family, weight)?;
        self.db
            .with_face_data(id, |data, index| {
                let face = ttf_parser::Face::parse(data, index).ok()?;
                let units_per_em = face.units_per_em() as f32;
                if units_per_em <= 0.0 {
                    return None;
                }
                let fallback = units_per_em * FALLBACK_ADVANCE_EM;
                let units: f32 = text
                    .chars()
                    .map(|ch| {
                        face.glyph_index(ch)
                            .and_then(|gid| face.glyph_hor_advance(gid))
                            .map(f32::from)
                            .unwrap_or(fallback)
                    })
                    .sum();
                Some(units * size / units_per_em)
            })
            .flatten()
    }
}

// ============================================================================
// Measurement
// ============================================================================

/// The font parameters that affect measured width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec<'a> {
    pub family: &'a str,
    pub weight: FontWeight,
    pub size: f32,
}

/// Measures the rendered width of a run of text.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec<'_>) -> f32;
}

impl TextMeasurer for FontRegistry {
    fn measure(&self, text: &str, font: &FontSpec<'_>) -> f32 {
        self.advance_width(text, font.family, font.weight, font.size)
            .unwrap_or_else(|| FixedAdvance::FALLBACK.measure(text, font))
    }
}

/// Measures every character at a fixed fraction of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvance {
    pub em: f32,
}

impl FixedAdvance {
    pub const FALLBACK: Self = Self {
        em: FALLBACK_ADVANCE_EM,
    };
}

impl TextMeasurer for FixedAdvance {
    fn measure(&self, text: &str, font: &FontSpec<'_>) -> f32 {
        text.chars().count() as f32 * self.em * font.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_falls_back_to_fixed_advance() {
        let registry = FontRegistry::new();
        let spec = FontSpec {
            family: "Nope Sans",
            weight: FontWeight::Bold,
            size: 100.0,
        };
        assert_eq!(registry.measure("abcd", &spec), 4.0 * 0.55 * 100.0);
    }

    #[test]
    fn fixed_advance_scales_with_size() {
        let m = FixedAdvance { em: 0.5 };
        let small = FontSpec {
            family: "x",
            weight: FontWeight::Normal,
            size: 10.0,
        };
        let large = FontSpec { size: 20.0, ..small };
        assert_eq!(m.measure("hello", &small), 25.0);
        assert_eq!(m.measure("hello", &large), 50.0);
    }

    #[test]
    fn invalid_font_data_is_rejected() {
        let mut registry = FontRegistry::new();
        let result = registry.register("Broken", b"not a font".to_vec());
        assert!(matches!(result, Err(ThumbError::Font(_))));
        assert_eq!(registry.resolve("Broken"), "Broken");
        assert!(!registry.is_available("Broken"));
    }

    #[test]
    fn missing_font_file_is_io_error() {
        let mut registry = FontRegistry::new();
        let result = registry.register_file("Ghost", "/definitely/not/here.ttf");
        assert!(matches!(result, Err(ThumbError::Io { .. })));
    }

    #[test]
    fn family_list_includes_fallbacks() {
        let registry = FontRegistry::new();
        assert_eq!(
            registry.family_list("Pyidaungsu"),
            "'Pyidaungsu', 'Arial', sans-serif"
        );
    }
}
