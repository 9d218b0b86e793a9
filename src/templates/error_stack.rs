//! Formatted and raw views of the stack.
//!
//! Frames are rendered in parallel and joined in their original order. The
//! source excerpt of each frame comes from the errorStackSource slot through
//! [`FrameSourceRenderer`](super::FrameSourceRenderer).

use std::path::Path;

use rayon::prelude::*;

use crate::component::{Asset, Component, bundled_asset};
use crate::dump::{DEFAULT_HTML_DEPTH, DumpOptions};
use crate::error::Result;
use crate::frame::{FrameType, StackFrame};
use crate::text::{display_path, html_escape};

use super::ErrorStackProps;

const CHEVRON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" width="24" height="24" stroke-width="2">
  <path d="M6 9l6 6l6 -6"></path>
</svg>"#;

/// Shown in place of a missing file name.
pub const UNKNOWN_FILE: &str = "<unknown>";

/// Known editors and the URL that opens a file at a line in each. `%f` is
/// the file path, `%l` the line number.
pub const EDITORS: &[(&str, &str)] = &[
    ("textmate", "txmt://open?url=file://%f&line=%l"),
    ("macvim", "mvim://open?url=file://%f&line=%l"),
    ("emacs", "emacs://open?url=file://%f&line=%l"),
    ("sublime", "subl://open?url=file://%f&line=%l"),
    ("phpstorm", "phpstorm://open?file=%f&line=%l"),
    ("atom", "atom://core/open/file?filename=%f&line=%l"),
    ("vscode", "vscode://file/%f:%l"),
];

/// Index of the frame expanded by default: the first app frame, else the
/// first module frame.
pub fn default_expanded_index(frames: &[StackFrame]) -> Option<usize> {
    frames
        .iter()
        .position(|f| f.frame_type == FrameType::App)
        .or_else(|| frames.iter().position(|f| f.frame_type == FrameType::Module))
}

/// Display text and optional editor URL for a frame's file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorLink {
    pub href: Option<String>,
    pub text: String,
}

/// Resolve the editor link of `frame`.
///
/// `ide` is looked up in [`EDITORS`]; an unknown value is used as a URL
/// template only when it contains `%f` or `%l`. Native frames and frames
/// without a file name are never linked.
pub fn editor_link(ide: &str, frame: &StackFrame, cwd: Option<&Path>) -> EditorLink {
    let Some(file_name) = frame.file_name.as_deref() else {
        return EditorLink {
            href: None,
            text: UNKNOWN_FILE.to_string(),
        };
    };
    let text = display_path(file_name, cwd).into_owned();
    if frame.is_native() {
        return EditorLink { href: None, text };
    }

    let template = EDITORS
        .iter()
        .find(|(name, _)| *name == ide)
        .map(|(_, url)| *url)
        .or_else(|| (ide.contains("%f") || ide.contains("%l")).then_some(ide));
    let Some(template) = template else {
        log::debug!("ide {ide:?} is not a known editor or URL template");
        return EditorLink { href: None, text };
    };

    let line = frame.line_number.map(|l| l.to_string()).unwrap_or_default();
    EditorLink {
        href: Some(template.replace("%f", &text).replace("%l", &line)),
        text,
    }
}

/// `line:column`, or just the line when the column is unknown.
fn line_col(frame: &StackFrame) -> Option<String> {
    let line = frame.line_number?;
    Some(match frame.column_number {
        Some(column) => format!("{line}:{column}"),
        None => line.to_string(),
    })
}

#[derive(Debug)]
pub struct ErrorStack {
    style: Asset,
    script: Asset,
}

impl ErrorStack {
    pub fn new(dev_mode: bool) -> Self {
        Self {
            style: bundled_asset!("error_stack.css", dev_mode),
            script: bundled_asset!("error_stack.js", dev_mode),
        }
    }

    fn render_location(&self, frame: &StackFrame, id: &str, props: &ErrorStackProps<'_>) -> String {
        let link = editor_link(props.ctx.ide, frame, props.ctx.cwd);
        let href = link
            .href
            .map(|href| format!(r#" href="{}""#, html_escape(&href)))
            .unwrap_or_default();
        let text = html_escape(&link.text);
        let file = format!(r#"<a{href} class="stack-frame-filepath" title="{text}">{text}</a>"#);

        let function = frame
            .function_name
            .as_deref()
            .map(|name| {
                let name = html_escape(name);
                format!(r#"<span>in <code title="{name}">{name}</code></span>"#)
            })
            .unwrap_or_default();

        let loc = line_col(frame)
            .map(|loc| format!("<span>at line <code>{loc}</code></span>"))
            .unwrap_or_default();

        if frame.has_source_toggle() {
            format!(
                r#"<button class="stack-frame-location" onclick="toggleFrameSource(event, '{id}')">
        {file} {function} {loc}
      </button>"#
            )
        } else {
            format!(
                r#"<div class="stack-frame-location">
        {file} {function} {loc}
      </div>"#
            )
        }
    }

    fn render_frame(
        &self,
        frame: &StackFrame,
        index: usize,
        expanded: Option<usize>,
        props: &ErrorStackProps<'_>,
    ) -> Result<String> {
        let id = format!("frame-{}", index + 1);
        let class = if expanded == Some(index) {
            format!("stack-frame expanded stack-frame-{}", frame.frame_type.as_str())
        } else {
            format!("stack-frame stack-frame-{}", frame.frame_type.as_str())
        };
        let label = if frame.frame_type == FrameType::App {
            r#"<span class="frame-label">In App</span>"#
        } else {
            ""
        };
        let toggle = if frame.has_source_toggle() {
            format!(
                r#"<button class="stack-frame-toggle-indicator" onclick="toggleFrameSource(event, '{id}')">
          {CHEVRON}
        </button>"#
            )
        } else {
            String::new()
        };
        let location = self.render_location(frame, &id, props);
        let source = props.sources.render_html(props.error, frame)?;

        Ok(format!(
            r#"<li class="{class}" id="{id}">
  <div class="stack-frame-contents">
    {location}
    <div class="stack-frame-extras">
      {label}
      {toggle}
    </div>
  </div>
  <div class="stack-frame-source">
    {source}
  </div>
</li>"#
        ))
    }

    fn print_frame(
        &self,
        frame: &StackFrame,
        index: usize,
        expanded: Option<usize>,
        props: &ErrorStackProps<'_>,
    ) -> Result<String> {
        let colors = &props.ctx.colors;
        let link = editor_link(props.ctx.ide, frame, props.ctx.cwd);
        let loc = match line_col(frame) {
            Some(line_col) => format!("{}:{line_col}", link.text),
            None => link.text,
        };

        if frame.is_native() {
            let function = frame
                .function_name
                .as_deref()
                .map(|name| format!("at {} ", colors.italic.paint(name)))
                .unwrap_or_default();
            return Ok(colors.dim.paint(&format!(
                " ⁃ {function}({})",
                colors.italic.paint(&loc)
            )));
        }

        let function = frame
            .function_name
            .as_deref()
            .map(|name| format!("at {name} "))
            .unwrap_or_default();
        let line = format!(" ⁃ {function}{}", colors.yellow.paint(&format!("({loc})")));

        if expanded == Some(index) {
            let snippet = props.sources.render_ansi(props.error, frame)?;
            return Ok(format!("{line}{snippet}"));
        }
        Ok(line)
    }
}

impl<'a> Component<ErrorStackProps<'a>> for ErrorStack {
    fn render_html(&self, props: &ErrorStackProps<'a>) -> Result<String> {
        let frames_list = &props.error.frames;
        let expanded = default_expanded_index(frames_list);
        let frames = frames_list
            .par_iter()
            .enumerate()
            .map(|(index, frame)| self.render_frame(frame, index, expanded, props))
            .collect::<Result<Vec<_>>>()?;

        let raw = props.ctx.dumper.dump_html(
            &props.error.raw,
            &DumpOptions {
                depth: DEFAULT_HTML_DEPTH,
                expand: true,
                csp_nonce: props.ctx.csp_nonce,
            },
        )?;

        Ok(format!(
            r#"<section>
  <div class="card">
    <div class="card-heading">
      <div>
        <h3 class="card-title">Stack Trace</h3>
      </div>
      <div>
        <div class="toggle-switch">
          <button onclick="showFormattedFrames(this)" class="active"> Pretty </button>
          <button onclick="showRawFrames(this)"> Raw </button>
        </div>
      </div>
    </div>
    <div class="card-body">
      <div id="stack-frames-formatted" class="visible">
        <ul id="stack-frames">
          {frames}
        </ul>
      </div>
      <div id="stack-frames-raw">
        {raw}
      </div>
    </div>
  </div>
</section>"#,
            frames = frames.join("\n"),
        ))
    }

    fn render_ansi(&self, props: &ErrorStackProps<'a>) -> Result<String> {
        let ctx = props.ctx;
        if let Some(depth) = ctx.raw_depth {
            let raw = ctx.dumper.dump_ansi(&props.error.raw, depth, &ctx.colors)?;
            return Ok(format!("\n\n{}\n{raw}", ctx.colors.red.paint("[RAW]")));
        }

        let frames_list = &props.error.frames;
        let expanded = default_expanded_index(frames_list);
        let frames = frames_list
            .par_iter()
            .enumerate()
            .map(|(index, frame)| self.print_frame(frame, index, expanded, props))
            .collect::<Result<Vec<_>>>()?;

        Ok(format!("\n\n{}", frames.join("\n")))
    }

    fn style(&self) -> Option<&Asset> {
        Some(&self.style)
    }

    fn script(&self) -> Option<&Asset> {
        Some(&self.script)
    }
}
