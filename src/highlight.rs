//! Syntax highlighting seam.
//!
//! The renderers only pick a [`Language`] and consume the highlighter's
//! markup. [`PlainHighlighter`] is the built-in implementation: it escapes
//! the code and emits the line-number gutter without coloring tokens.

use std::path::Path;

use crate::error::Result;
use crate::text::html_escape;

/// Opening tag of the line-number gutter in highlighted HTML. The stack
/// source renderer rewrites it to renumber the gutter.
pub const LINE_NUMBERS_MARKER: &str = r#"<div class="shj-numbers">"#;

/// Highlight language selected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    JavaScript,
    Css,
    Json,
    Html,
    Rust,
    Toml,
    Plain,
}

/// Extension to language table. Anything missing is highlighted as plain text.
const LANGUAGES: &[(&str, Language)] = &[
    ("tsx", Language::TypeScript),
    ("jsx", Language::JavaScript),
    ("js", Language::JavaScript),
    ("ts", Language::TypeScript),
    ("css", Language::Css),
    ("json", Language::Json),
    ("html", Language::Html),
    ("astro", Language::TypeScript),
    ("vue", Language::TypeScript),
    ("rs", Language::Rust),
    ("toml", Language::Toml),
];

impl Language {
    /// Choose the language for a file name by its extension.
    pub fn from_file_name(file_name: &str) -> Self {
        let Some(ext) = Path::new(file_name).extension().and_then(|e| e.to_str()) else {
            return Language::Plain;
        };
        LANGUAGES
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, lang)| *lang)
            .unwrap_or(Language::Plain)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::TypeScript => "ts",
            Language::JavaScript => "js",
            Language::Css => "css",
            Language::Json => "json",
            Language::Html => "html",
            Language::Rust => "rust",
            Language::Toml => "toml",
            Language::Plain => "plain",
        }
    }
}

/// Turns a source excerpt into HTML or ANSI markup.
///
/// Implementations must be `Send + Sync`: frames are highlighted in parallel.
pub trait Highlighter: Send + Sync {
    /// HTML markup for `code`. The gutter must open with [`LINE_NUMBERS_MARKER`]
    /// and the output must keep one visual line per input line.
    fn highlight_html(&self, code: &str, language: Language) -> Result<String>;

    /// ANSI markup for `code`, one output line per input line.
    fn highlight_ansi(&self, code: &str, language: Language) -> Result<String>;
}

/// Highlighter that escapes code without coloring it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight_html(&self, code: &str, _language: Language) -> Result<String> {
        let lines = code.split('\n').count();
        let mut out = String::with_capacity(code.len() + lines * 16 + 64);
        out.push_str(r#"<div class="shj-code">"#);
        out.push_str(&html_escape(code));
        out.push_str("</div>");
        out.push_str(LINE_NUMBERS_MARKER);
        for _ in 0..lines {
            out.push_str("<div></div>");
        }
        out.push_str("</div>");
        Ok(out)
    }

    fn highlight_ansi(&self, code: &str, _language: Language) -> Result<String> {
        Ok(code.to_string())
    }
}
