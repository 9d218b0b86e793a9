//! Value formatting seam.
//!
//! Causes, raw stacks and non-primitive metadata values are deep-formatted by
//! a [`Dumper`]. [`JsonDumper`] renders `serde_json::Value` trees, collapsing
//! containers nested deeper than the requested depth.

use serde_json::Value;

use crate::error::Result;
use crate::text::{Colors, html_escape};

/// Depth used for HTML dumps when the caller does not ask for another one.
pub const DEFAULT_HTML_DEPTH: usize = 5;

const DUMPER_STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/dumper.css"));

/// Options for an HTML dump.
#[derive(Debug, Clone, Copy)]
pub struct DumpOptions<'a> {
    /// Containers nested at this level or deeper are collapsed.
    pub depth: usize,
    /// Render the dump expanded rather than collapsed.
    pub expand: bool,
    /// Nonce for any inline style or script tag the dumper emits.
    pub csp_nonce: Option<&'a str>,
}

impl Default for DumpOptions<'_> {
    fn default() -> Self {
        Self {
            depth: DEFAULT_HTML_DEPTH,
            expand: false,
            csp_nonce: None,
        }
    }
}

/// Formats arbitrary values for the HTML and terminal views.
///
/// Implementations must be `Send + Sync`.
pub trait Dumper: Send + Sync {
    fn dump_html(&self, value: &Value, options: &DumpOptions<'_>) -> Result<String>;

    fn dump_ansi(&self, value: &Value, depth: usize, colors: &Colors) -> Result<String>;

    /// Stylesheet recorded into the "global" bucket ahead of every component.
    fn html_styles(&self) -> Option<String> {
        None
    }

    /// Script recorded into the "global" bucket ahead of every component.
    fn html_script(&self) -> Option<String> {
        None
    }
}

/// Pretty printer for JSON values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDumper;

impl Dumper for JsonDumper {
    fn dump_html(&self, value: &Value, options: &DumpOptions<'_>) -> Result<String> {
        let mut body = String::new();
        write_value(&mut body, value, 0, options.depth, &Flavor::Html);

        let class = if options.expand {
            "dumper-dump dumper-expanded"
        } else {
            "dumper-dump"
        };
        Ok(format!(r#"<div class="{class}"><pre><code>{body}</code></pre></div>"#))
    }

    fn dump_ansi(&self, value: &Value, depth: usize, colors: &Colors) -> Result<String> {
        let mut out = String::new();
        write_value(&mut out, value, 0, depth, &Flavor::Ansi(colors));
        Ok(out)
    }

    fn html_styles(&self) -> Option<String> {
        Some(DUMPER_STYLES.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Key,
    String,
    Number,
    Boolean,
    Null,
    Truncated,
}

impl Token {
    fn class(self) -> &'static str {
        match self {
            Token::Key => "dumper-key",
            Token::String => "dumper-string",
            Token::Number => "dumper-number",
            Token::Boolean => "dumper-boolean",
            Token::Null => "dumper-null",
            Token::Truncated => "dumper-truncated",
        }
    }
}

enum Flavor<'a> {
    Html,
    Ansi(&'a Colors),
}

impl Flavor<'_> {
    fn token(&self, out: &mut String, kind: Token, text: &str) {
        match self {
            Flavor::Html => {
                out.push_str(&format!(
                    r#"<span class="{}">{}</span>"#,
                    kind.class(),
                    html_escape(text)
                ));
            }
            Flavor::Ansi(colors) => {
                let style = match kind {
                    Token::Key => colors.cyan,
                    Token::String => colors.green,
                    Token::Number | Token::Boolean => colors.yellow,
                    Token::Null | Token::Truncated => colors.dim,
                };
                out.push_str(&style.paint(text));
            }
        }
    }

    fn punct(&self, out: &mut String, text: &str) {
        match self {
            Flavor::Html => out.push_str(&html_escape(text)),
            Flavor::Ansi(_) => out.push_str(text),
        }
    }
}

fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

fn write_value(out: &mut String, value: &Value, level: usize, depth: usize, flavor: &Flavor<'_>) {
    match value {
        Value::Null => flavor.token(out, Token::Null, "null"),
        Value::Bool(b) => flavor.token(out, Token::Boolean, &b.to_string()),
        Value::Number(n) => flavor.token(out, Token::Number, &n.to_string()),
        Value::String(s) => flavor.token(out, Token::String, &quoted(s)),
        Value::Array(items) => {
            if items.is_empty() {
                flavor.punct(out, "[]");
            } else if level >= depth {
                flavor.token(out, Token::Truncated, "[Array]");
            } else {
                flavor.punct(out, "[\n");
                for (i, item) in items.iter().enumerate() {
                    out.push_str(&"  ".repeat(level + 1));
                    write_value(out, item, level + 1, depth, flavor);
                    if i + 1 < items.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&"  ".repeat(level));
                flavor.punct(out, "]");
            }
        }
        Value::Object(map) => {
            if map.is_empty() {
                flavor.punct(out, "{}");
            } else if level >= depth {
                flavor.token(out, Token::Truncated, "[Object]");
            } else {
                flavor.punct(out, "{\n");
                for (i, (key, item)) in map.iter().enumerate() {
                    out.push_str(&"  ".repeat(level + 1));
                    flavor.token(out, Token::Key, &quoted(key));
                    out.push_str(": ");
                    write_value(out, item, level + 1, depth, flavor);
                    if i + 1 < map.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&"  ".repeat(level));
                flavor.punct(out, "}");
            }
        }
    }
}
