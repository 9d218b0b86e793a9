//! Source excerpt of a single stack frame.
//!
//! The excerpt is a window of the file, so the gutter has to be renumbered to
//! start at the window's first line. In HTML a CSS counter is reset and an
//! overlay bar marks the error line; in the terminal the error line is drawn
//! on a red background and numbers are right-aligned per frame.

use crate::component::{Asset, Component, bundled_asset};
use crate::error::Result;
use crate::frame::{SourceLine, StackFrame};
use crate::highlight::{LINE_NUMBERS_MARKER, Language};
use crate::text::strip_ansi;

use super::ErrorStackSourceProps;

/// Rendered height of one source line, in pixels.
pub const LINE_HEIGHT_PX: usize = 24;

const GUTTER: &str = "┃";
const POINTER: &str = "❯";

#[derive(Debug)]
pub struct ErrorStackSource {
    style: Asset,
}

impl ErrorStackSource {
    pub fn new(dev_mode: bool) -> Self {
        Self {
            style: bundled_asset!("error_stack_source.css", dev_mode),
        }
    }
}

/// Source window and language of a frame that has an excerpt to show.
fn excerpt(frame: &StackFrame) -> Option<(&[SourceLine], Language)> {
    if !frame.has_source_toggle() {
        return None;
    }
    let source = frame.source.as_deref()?;
    let file_name = frame.file_name.as_deref()?;
    Some((source, Language::from_file_name(file_name)))
}

/// Position of the frame's error line inside its source window.
pub fn error_line_index(frame: &StackFrame, source: &[SourceLine]) -> Option<usize> {
    let line = frame.line_number?;
    source.iter().position(|entry| entry.line_number == line)
}

fn joined(source: &[SourceLine]) -> String {
    source
        .iter()
        .map(|line| line.chunk.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

impl<'a> Component<ErrorStackSourceProps<'a>> for ErrorStackSource {
    fn render_html(&self, props: &ErrorStackSourceProps<'a>) -> Result<String> {
        let frame = props.frame;
        let Some((source, language)) = excerpt(frame) else {
            return Ok(String::new());
        };

        let highlight = match error_line_index(frame, source) {
            Some(index) => format!(
                r#"<div class="line-highlight" style="margin-top: {}px"></div>"#,
                index * LINE_HEIGHT_PX
            ),
            None => String::new(),
        };

        let first_line = source[0].line_number;
        let code = props
            .ctx
            .highlighter
            .highlight_html(&joined(source), language)?
            .replacen(
                LINE_NUMBERS_MARKER,
                &format!(
                    r#"<div class="shj-numbers" style="counter-set: line {}">"#,
                    first_line.saturating_sub(1)
                ),
                1,
            );

        Ok(format!(
            r#"<pre><code class="shj-lang-{}">{highlight}{code}</code></pre>"#,
            language.as_str()
        ))
    }

    fn render_ansi(&self, props: &ErrorStackSourceProps<'a>) -> Result<String> {
        let frame = props.frame;
        let Some((source, language)) = excerpt(frame) else {
            return Ok(String::new());
        };
        let colors = &props.ctx.colors;

        let largest = source.iter().map(|l| l.line_number).max().unwrap_or(0);
        let width = largest.to_string().len();

        let highlighted = props
            .ctx
            .highlighter
            .highlight_ansi(&joined(source), language)?;

        let lines: Vec<String> = highlighted
            .split('\n')
            .zip(source)
            .map(|(line, entry)| {
                let number = format!("{:>width$}", entry.line_number);
                if Some(entry.line_number) == frame.line_number {
                    let marked = format!("{POINTER} {number} {GUTTER}  {}", strip_ansi(line));
                    format!(" {}", colors.bg_red.paint(&marked))
                } else {
                    format!(
                        "   {} {}  {line}",
                        colors.dim.paint(&number),
                        colors.dim.paint(GUTTER)
                    )
                }
            })
            .collect();

        Ok(format!("\n\n{}\n", lines.join("\n")))
    }

    fn style(&self) -> Option<&Asset> {
        Some(&self.style)
    }
}
