//! Terminal console utilities for table and diagnostic output

use std::env;
use std::io::{self, IsTerminal};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Console output handler with color support and terminal width detection
pub struct Console {
    color_enabled: bool,
    max_width: usize,
}

impl Console {
    /// Create a new console with automatic color and terminal detection
    pub fn new() -> Self {
        Self {
            color_enabled: io::stdout().is_terminal() && env::var("NO_COLOR").is_err(),
            max_width: Self::detect_terminal_width(),
        }
    }

    /// Detect terminal width, defaulting to 100 if unavailable
    fn detect_terminal_width() -> usize {
        term_size::dimensions().map(|(w, _)| w).unwrap_or(100)
    }

    pub fn is_color_enabled(&self) -> bool {
        self.color_enabled
    }

    /// Colorize text with the specified color
    pub fn colorize(&self, text: &str, color: Color) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        let code = match color {
            Color::Red => "31",
            Color::Yellow => "33",
            Color::Blue => "34",
            Color::Green => "32",
            Color::Cyan => "36",
            Color::Dim => "2",
            Color::Bold => "1",
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    /// Maximum width for terminal output
    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// Create a console with colors disabled
    pub fn no_colors() -> Self {
        Self {
            color_enabled: false,
            max_width: Self::detect_terminal_width(),
        }
    }

    /// Create a console with a specific max width
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// ANSI color codes for terminal output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Yellow,
    Blue,
    Green,
    Cyan,
    Dim,
    Bold,
}

/// Display width of the first line of `text` in terminal columns
pub fn display_width(text: &str) -> usize {
    text.lines().next().unwrap_or("").width()
}

/// Fit the first line of `text` into exactly `width` columns: truncated
/// with `…` when too wide, right-padded with spaces otherwise.
pub fn fit(text: &str, width: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    let multiline = text.lines().nth(1).is_some();

    if first_line.width() <= width && !multiline {
        let mut out = first_line.to_string();
        out.push_str(&" ".repeat(width - first_line.width()));
        return out;
    }

    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in first_line.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_colors() {
        let console = Console::no_colors();
        assert!(!console.is_color_enabled());
        assert_eq!(console.colorize("test", Color::Red), "test");
        assert_eq!(console.colorize("test", Color::Bold), "test");
    }

    #[test]
    fn test_with_max_width() {
        let console = Console::no_colors().with_max_width(80);
        assert_eq!(console.max_width(), 80);
    }

    #[test]
    fn test_fit_pads_short_text() {
        assert_eq!(fit("abc", 5), "abc  ");
    }

    #[test]
    fn test_fit_truncates_long_text() {
        assert_eq!(fit("abcdefgh", 5), "abcd…");
    }

    #[test]
    fn test_fit_marks_multiline_text() {
        assert_eq!(fit("ab\ncd", 6), "ab…   ");
    }

    #[test]
    fn test_fit_counts_wide_characters() {
        assert_eq!(display_width("日本"), 4);
        assert_eq!(fit("日本語", 5), "日本…");
    }
}
