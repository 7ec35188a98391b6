//! Text measurement for the builtin PDF fonts.
//!
//! The renderer only uses the standard 14 fonts, so no font files are
//! loaded. Widths come from an average-advance heuristic per family and
//! weight, which is close enough for cell sizing and alignment.

use crate::style::{Font, FontFamily};

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.4;

/// Ascender as a fraction of the font size.
pub const ASCENDER_FACTOR: f32 = 0.75;

/// Heuristic text metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMetrics;

impl TextMetrics {
    /// Average glyph advance as a fraction of the font size.
    fn average_advance(font: &Font) -> f32 {
        match (font.family, font.bold) {
            // Fixed pitch: every glyph is 600 units.
            (FontFamily::Courier, _) => 0.6,
            (FontFamily::TimesRoman, false) => 0.45,
            (FontFamily::TimesRoman, true) => 0.5,
            (FontFamily::Helvetica, false) => 0.5,
            (FontFamily::Helvetica, true) => 0.55,
        }
    }

    /// Width of `text` in points.
    pub fn measure(&self, text: &str, font: &Font) -> f32 {
        text.chars().count() as f32 * font.size * Self::average_advance(font)
    }

    pub fn line_height(&self, font: &Font) -> f32 {
        font.size * LINE_HEIGHT_FACTOR
    }

    /// Word-wrap `text` to `max_width` points. Embedded `\n` always starts a
    /// new line; a single word wider than the box is kept on its own line.
    pub fn wrap(&self, text: &str, font: &Font, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let words: Vec<&str> = paragraph.split_whitespace().collect();
            if words.is_empty() {
                lines.push(String::new());
                continue;
            }

            let mut current = String::new();
            for word in words {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if max_width > 0.0
                    && !current.is_empty()
                    && self.measure(&candidate, font) > max_width
                {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                } else {
                    current = candidate;
                }
            }
            lines.push(current);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_text_width() {
        let w = TextMetrics.measure("Hello", &Font::helvetica(16.0));
        // 5 chars × 16 × 0.5 = 40
        assert!((w - 40.0).abs() < 0.1);
        let bold = TextMetrics.measure("Hello", &Font::helvetica_bold(16.0));
        assert!(bold > w);
    }

    #[test]
    fn explicit_breaks_start_new_lines() {
        let lines = TextMetrics.wrap(
            "OEC Computers Australia\n/ LEVEL 1 - 168 WALKER STREET",
            &Font::helvetica_bold(14.0),
            10_000.0,
        );
        assert_eq!(
            lines,
            vec!["OEC Computers Australia", "/ LEVEL 1 - 168 WALKER STREET"]
        );
    }

    #[test]
    fn word_wrap_basic() {
        let lines = TextMetrics.wrap("Hello world foo bar", &Font::helvetica(16.0), 60.0);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(TextMetrics.wrap("", &Font::helvetica(12.0), 50.0), vec![""]);
    }
}
