//! ANSI styles for terminal output
//!
//! Each style carries its own closing sequence so styles can nest: a dimmed
//! line may contain an italic function name without the inner close
//! cancelling the outer dim.

/// One ANSI style with its open and close sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub open: &'static str,
    pub close: &'static str,
}

impl Style {
    const fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }

    const PLAIN: Style = Style::new("", "");

    /// Wrap `text` in this style.
    pub fn paint(&self, text: &str) -> String {
        if self.open.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len() + self.open.len() + self.close.len());
        out.push_str(self.open);
        out.push_str(text);
        out.push_str(self.close);
        out
    }
}

/// ANSI styles used by the terminal renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colors {
    pub red: Style,
    pub yellow: Style,
    pub green: Style,
    pub cyan: Style,
    pub blue: Style,
    pub bold: Style,
    pub dim: Style,
    pub italic: Style,
    pub bg_red: Style,
}

impl Colors {
    /// Pick colored or plain styles.
    pub fn new(use_color: bool) -> Self {
        if use_color {
            Self::with_color()
        } else {
            Self::no_color()
        }
    }

    /// Get colored output (default)
    pub fn with_color() -> Self {
        Self {
            red: Style::new("\u{1b}[31m", "\u{1b}[39m"),
            yellow: Style::new("\u{1b}[33m", "\u{1b}[39m"),
            green: Style::new("\u{1b}[32m", "\u{1b}[39m"),
            cyan: Style::new("\u{1b}[36m", "\u{1b}[39m"),
            blue: Style::new("\u{1b}[34m", "\u{1b}[39m"),
            bold: Style::new("\u{1b}[1m", "\u{1b}[22m"),
            dim: Style::new("\u{1b}[2m", "\u{1b}[22m"),
            italic: Style::new("\u{1b}[3m", "\u{1b}[23m"),
            bg_red: Style::new("\u{1b}[41m", "\u{1b}[49m"),
        }
    }

    /// Get no-color output (when NO_COLOR is set)
    pub fn no_color() -> Self {
        Self {
            red: Style::PLAIN,
            yellow: Style::PLAIN,
            green: Style::PLAIN,
            cyan: Style::PLAIN,
            blue: Style::PLAIN,
            bold: Style::PLAIN,
            dim: Style::PLAIN,
            italic: Style::PLAIN,
            bg_red: Style::PLAIN,
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self::with_color()
    }
}
