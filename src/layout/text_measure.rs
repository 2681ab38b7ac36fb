//! Text Measurement
//!
//! Display widths of text in terminal cells, backed by `unicode-width`:
//! - ASCII printable: 1 cell
//! - CJK / most emoji: 2 cells
//! - Control and zero-width characters: 0 cells

use unicode_width::UnicodeWidthChar;

/// Width of a single character in cells.
#[inline]
pub fn char_width(c: char) -> i32 {
    c.width().unwrap_or(0) as i32
}

/// Display width of a string in terminal cells.
pub fn string_width(s: &str) -> i32 {
    s.chars().map(char_width).sum()
}

/// Width with trailing whitespace ignored.
///
/// Gradients span visible text, not the padding after it.
pub fn trimmed_width(s: &str) -> i32 {
    string_width(s.trim_end())
}

/// Number of lines `text` occupies when wrapped at `available_width` cells.
///
/// Zero for empty text, at least one otherwise.
pub fn measure_text_height(text: &str, available_width: i32) -> i32 {
    if text.is_empty() {
        return 0;
    }
    wrap_text(text, available_width).len().max(1) as i32
}

/// Character-wrap text to `width` cells, honoring explicit newlines.
pub fn wrap_text(text: &str, width: i32) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }
    if width <= 0 {
        return text.lines().map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for c in text.chars() {
        if c == '\n' {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
            continue;
        }

        let w = char_width(c);
        if current_width + w > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(c);
        current_width += w;
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Truncate to `width` cells, ending in an ellipsis when shortened.
pub fn truncate_text(text: &str, width: i32) -> String {
    if width <= 0 {
        return String::new();
    }
    if string_width(text) <= width {
        return text.to_string();
    }

    let target = width - 1;
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = char_width(c);
        if used + w > target {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_width_ascii() {
        assert_eq!(string_width("hello"), 5);
        assert_eq!(string_width(""), 0);
        assert_eq!(string_width("a b c"), 5);
    }

    #[test]
    fn test_string_width_wide_and_control() {
        assert_eq!(string_width("日本"), 4);
        assert_eq!(string_width("a\tb"), 2);
    }

    #[test]
    fn test_trimmed_width_ignores_trailing_spaces() {
        assert_eq!(trimmed_width("hi   "), 2);
        assert_eq!(trimmed_width("  hi"), 4);
    }

    #[test]
    fn test_measure_text_height() {
        assert_eq!(measure_text_height("hello", 10), 1);
        assert_eq!(measure_text_height("hello world", 5), 3);
        assert_eq!(measure_text_height("", 10), 0);
        assert_eq!(measure_text_height("a\nb\nc", 10), 3);
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("hello world", 5);
        assert_eq!(lines, vec!["hello", " worl", "d"]);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 6), "hello…");
        assert_eq!(truncate_text("hello", 0), "");
    }
}
