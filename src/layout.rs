//! Title text layout: greedy word wrap and vertical placement.

use crate::fonts::{FontSpec, TextMeasurer};
use crate::raster::SizePx;
use crate::state::TextAlign;

/// Fraction of the canvas width a line may occupy.
pub const MAX_LINE_WIDTH_RATIO: f32 = 0.9;

/// Horizontal margin used by left/right alignment, as a fraction of width.
const SIDE_MARGIN_RATIO: f32 = 0.05;

/// One laid-out line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    /// Measured advance width in pixels.
    pub width: f32,
    /// Horizontal anchor; its meaning depends on the alignment.
    pub x: f32,
    /// Vertical center of the line box.
    pub center_y: f32,
}

impl TextLine {
    /// Left edge of the measured text for the given alignment.
    pub fn left(&self, align: TextAlign) -> f32 {
        match align {
            TextAlign::Left => self.x,
            TextAlign::Center => self.x - self.width / 2.0,
            TextAlign::Right => self.x - self.width,
        }
    }
}

/// Wrapped text block positioned on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    /// Distance between consecutive line centers.
    pub line_spacing: f32,
    pub align: TextAlign,
}

impl TextBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Greedily wraps `title` so each line measures at most `max_width`.
///
/// Words are split on single spaces. A word that alone exceeds `max_width`
/// is placed on its own line. Returns no lines for a blank title.
pub fn wrap_words<M: TextMeasurer + ?Sized>(
    title: &str,
    font: &FontSpec<'_>,
    max_width: f32,
    measurer: &M,
) -> Vec<String> {
    if title.trim().is_empty() {
        return Vec::new();
    }

    let mut words = title.split(' ');
    let mut lines = Vec::new();
    let mut current = words.next().unwrap_or_default().to_string();

    for word in words {
        let candidate = format!("{current} {word}");
        if measurer.measure(&candidate, font) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    lines.push(current);
    lines
}

/// Wraps and positions `title` on a canvas of `canvas` size.
///
/// The block of lines is centered vertically on `text_y` percent of the
/// canvas height, with `line_height * font.size` between line centers.
pub fn layout_title<M: TextMeasurer + ?Sized>(
    title: &str,
    font: &FontSpec<'_>,
    line_height: f32,
    align: TextAlign,
    text_y: f32,
    canvas: SizePx,
    measurer: &M,
) -> TextBlock {
    let width = canvas.width as f32;
    let height = canvas.height as f32;
    let max_width = width * MAX_LINE_WIDTH_RATIO;
    let wrapped = wrap_words(title, font, max_width, measurer);

    let line_spacing = font.size * line_height;
    let total_height = line_spacing * wrapped.len() as f32;
    let top = height * text_y / 100.0 - total_height / 2.0;

    let x = match align {
        TextAlign::Left => width * SIDE_MARGIN_RATIO,
        TextAlign::Center => width / 2.0,
        TextAlign::Right => width * (1.0 - SIDE_MARGIN_RATIO),
    };

    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(i, text)| TextLine {
            width: measurer.measure(&text, font),
            text,
            x,
            center_y: top + (i as f32 + 0.5) * line_spacing,
        })
        .collect();

    TextBlock {
        lines,
        line_spacing,
        align,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FixedAdvance;
    use crate::state::FontWeight;

    const LONG_TITLE: &str = "A very long awesome video title that keeps going";

    fn spec(size: f32) -> FontSpec<'static> {
        FontSpec {
            family: "Arial",
            weight: FontWeight::Bold,
            size,
        }
    }

    #[test]
    fn blank_title_has_no_lines() {
        let m = FixedAdvance { em: 0.5 };
        assert!(wrap_words("", &spec(48.0), 100.0, &m).is_empty());
        assert!(wrap_words("   ", &spec(48.0), 100.0, &m).is_empty());
    }

    #[test]
    fn short_title_stays_on_one_line() {
        let m = FixedAdvance { em: 0.5 };
        let lines = wrap_words("YOUR AWESOME VIDEO", &spec(48.0), 1728.0, &m);
        assert_eq!(lines, ["YOUR AWESOME VIDEO"]);
    }

    #[test]
    fn long_title_wraps_on_widescreen_canvas() {
        // Full-width glyphs: one em per character.
        let m = FixedAdvance { em: 1.0 };
        let block = layout_title(
            LONG_TITLE,
            &spec(48.0),
            1.2,
            TextAlign::Center,
            50.0,
            SizePx::new(1920, 1080),
            &m,
        );
        assert!(block.lines.len() >= 2);

        let rejoined: Vec<_> = block.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(rejoined.join(" "), LONG_TITLE);
    }

    #[test]
    fn lines_never_exceed_limit_unless_single_word() {
        let m = FixedAdvance { em: 0.6 };
        let titles = [
            LONG_TITLE,
            "supercalifragilisticexpialidocious is a word",
            "a b c d e f g h i j k l m n o p q r s t u v w x y z",
            "one",
        ];
        for size in [20.0, 48.0, 80.0, 120.0] {
            let font = spec(size);
            let max_width = 600.0;
            for title in titles {
                for line in wrap_words(title, &font, max_width, &m) {
                    let width = m.measure(&line, &font);
                    assert!(
                        width <= max_width || !line.contains(' '),
                        "line '{line}' is {width}px at size {size}"
                    );
                }
            }
        }
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let m = FixedAdvance { em: 1.0 };
        let lines = wrap_words("hi enormousword ok", &spec(10.0), 50.0, &m);
        assert_eq!(lines, ["hi", "enormousword", "ok"]);
    }

    #[test]
    fn block_is_centered_on_text_y() {
        let m = FixedAdvance { em: 1.0 };
        let block = layout_title(
            "one two three",
            &spec(200.0),
            1.5,
            TextAlign::Left,
            40.0,
            SizePx::new(1000, 1000),
            &m,
        );
        assert_eq!(block.lines.len(), 3);
        assert_eq!(block.line_spacing, 300.0);

        let first = block.lines[0].center_y;
        let last = block.lines[2].center_y;
        assert!(((first + last) / 2.0 - 400.0).abs() < 1e-3);
        assert!((block.lines[0].x - 50.0).abs() < 1e-3);
    }

    #[test]
    fn alignment_anchors() {
        let m = FixedAdvance { em: 1.0 };
        let size = SizePx::new(1000, 500);
        let right = layout_title("ab", &spec(10.0), 1.0, TextAlign::Right, 50.0, size, &m);
        assert!((right.lines[0].x - 950.0).abs() < 1e-3);
        assert!((right.lines[0].left(TextAlign::Right) - 930.0).abs() < 1e-3);

        let center = layout_title("ab", &spec(10.0), 1.0, TextAlign::Center, 50.0, size, &m);
        assert_eq!(center.lines[0].x, 500.0);
        assert_eq!(center.lines[0].left(TextAlign::Center), 490.0);
    }
}
