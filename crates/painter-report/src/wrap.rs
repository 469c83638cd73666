//! Greedy word wrapping.

use crate::metrics::Font;

/// Breaks `text` into lines no wider than `width` points.
///
/// Words are placed greedily without hyphenation. A word wider than a whole
/// line is split at character boundaries. Newlines in `text` force a break;
/// other whitespace runs collapse to one space.
pub fn wrap_text(text: &str, font: Font, size: f32, width: f32) -> Vec<String> {
    wrap_text_hanging(text, font, size, width, width)
}

/// Like [`wrap_text`], but the first line is `first_width` wide.
///
/// Used for a value that follows a label on its first line.
pub fn wrap_text_hanging(
    text: &str,
    font: Font,
    size: f32,
    first_width: f32,
    width: f32,
) -> Vec<String> {
    let mut wrapper = Wrapper {
        font,
        size,
        first_width,
        width,
        lines: Vec::new(),
        line: String::new(),
    };

    for paragraph in text.lines() {
        for word in paragraph.split_whitespace() {
            wrapper.push_word(word);
        }
        wrapper.finish_line();
    }

    wrapper.lines
}

struct Wrapper {
    font: Font,
    size: f32,
    first_width: f32,
    width: f32,
    lines: Vec<String>,
    line: String,
}

impl Wrapper {
    fn limit(&self) -> f32 {
        if self.lines.is_empty() {
            self.first_width
        } else {
            self.width
        }
    }

    fn fits(&self, text: &str) -> bool {
        self.font.text_width(text, self.size) <= self.limit()
    }

    fn push_word(&mut self, word: &str) {
        if !self.line.is_empty() {
            let candidate = format!("{} {}", self.line, word);
            if self.fits(&candidate) {
                self.line = candidate;
                return;
            }
            self.finish_line();
        }

        if self.fits(word) {
            self.line.push_str(word);
            return;
        }

        for c in word.chars() {
            let mut candidate = self.line.clone();
            candidate.push(c);
            if !self.line.is_empty() && !self.fits(&candidate) {
                self.finish_line();
            }
            self.line.push(c);
        }
    }

    fn finish_line(&mut self) {
        if !self.line.is_empty() {
            self.lines.push(std::mem::take(&mut self.line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: f32 = 11.0;

    #[test]
    fn test_short_text_is_one_line() {
        let lines = wrap_text("The bombing of Guernica.", Font::Helvetica, SIZE, 512.0);
        assert_eq!(lines, vec!["The bombing of Guernica."]);
    }

    #[test]
    fn test_greedy_breaks_and_width_bound() {
        let text = "Picasso painted Guernica in response to the bombing of the Basque town \
            by German and Italian warplanes during the Spanish Civil War. It became a \
            universal symbol of the suffering war inflicts on civilians.";
        let width = 200.0;
        let lines = wrap_text(text, Font::Helvetica, SIZE, width);

        assert!(lines.len() > 2);
        for line in &lines {
            assert!(Font::Helvetica.text_width(line, SIZE) <= width, "{line}");
        }

        // Greedy: the next word never fits on the previous line.
        for pair in lines.windows(2) {
            let next_word = pair[1].split(' ').next().unwrap();
            let joined = format!("{} {}", pair[0], next_word);
            assert!(Font::Helvetica.text_width(&joined, SIZE) > width);
        }

        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_long_word_is_split() {
        let word = "W".repeat(40);
        let lines = wrap_text(&word, Font::Helvetica, SIZE, 100.0);

        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(Font::Helvetica.text_width(line, SIZE) <= 100.0);
        }
    }

    #[test]
    fn test_newlines_force_breaks() {
        let lines = wrap_text("First.\n\nSecond.", Font::Helvetica, SIZE, 500.0);
        assert_eq!(lines, vec!["First.", "Second."]);
    }

    #[test]
    fn test_empty_text() {
        assert!(wrap_text("", Font::Helvetica, SIZE, 500.0).is_empty());
        assert!(wrap_text("   ", Font::Helvetica, SIZE, 500.0).is_empty());
    }

    #[test]
    fn test_hanging_first_line() {
        let lines = wrap_text_hanging("aaa bbb ccc", Font::CourierBold, 10.0, 30.0, 100.0);
        // 6pt per glyph: "aaa" fits in 30, the rest fits in 100.
        assert_eq!(lines, vec!["aaa", "bbb ccc"]);
    }
}
