//! Metadata groups rendered as cards.

use std::borrow::Cow;

use serde_json::Value;

use crate::component::{Asset, Component, bundled_asset};
use crate::config::DEFAULT_DEPTH;
use crate::dump::{DEFAULT_HTML_DEPTH, DumpOptions};
use crate::error::Result;
use crate::metadata::{MetadataRow, Section, Sections};
use crate::text::html_escape;

use super::{ErrorMetadataProps, RenderContext};

#[derive(Debug)]
pub struct ErrorMetadata {
    style: Asset,
}

impl ErrorMetadata {
    pub fn new(dev_mode: bool) -> Self {
        Self {
            style: bundled_asset!("error_metadata.css", dev_mode),
        }
    }
}

/// Text of a primitive value as shown in a table cell.
fn primitive_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

fn format_html(row: &MetadataRow, ctx: &RenderContext<'_>) -> Result<String> {
    if row.is_verbatim() {
        return Ok(html_escape(&primitive_text(&row.value)));
    }
    ctx.dumper.dump_html(
        &row.value,
        &DumpOptions {
            depth: DEFAULT_HTML_DEPTH,
            expand: false,
            csp_nonce: ctx.csp_nonce,
        },
    )
}

fn render_rows(rows: &[MetadataRow], ctx: &RenderContext<'_>) -> Result<String> {
    let rows = rows
        .iter()
        .map(|row| {
            Ok(format!(
                r#"<tr>
          <td class="table-key">{}</td>
          <td class="table-value">{}</td>
        </tr>"#,
                html_escape(&row.key),
                format_html(row, ctx)?
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        r#"<table class="card-table">
      <tbody>
        {}
      </tbody>
    </table>"#,
        rows.join("\n")
    ))
}

fn render_section(name: &str, section: &Section, ctx: &RenderContext<'_>) -> Result<String> {
    let body = match section {
        Section::One(row) => format_html(row, ctx)?,
        Section::Many(rows) => render_rows(rows, ctx)?,
    };
    Ok(format!(
        r#"<div>
    <h4 class="card-subtitle">{}</h4>
    {body}
  </div>"#,
        html_escape(name)
    ))
}

fn render_group(name: &str, sections: &Sections, ctx: &RenderContext<'_>) -> Result<String> {
    let sections = sections
        .iter()
        .map(|(section, value)| render_section(section, value, ctx))
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        r#"<section>
  <div class="card">
    <div class="card-heading">
      <h3 class="card-title">{}</h3>
    </div>
    <div class="card-body">
      {}
    </div>
  </div>
</section>"#,
        html_escape(name),
        sections.join("\n")
    ))
}

fn print_row(row: &MetadataRow, ctx: &RenderContext<'_>) -> Result<String> {
    let value = if row.is_verbatim() {
        primitive_text(&row.value).into_owned()
    } else {
        ctx.dumper.dump_ansi(&row.value, DEFAULT_DEPTH, &ctx.colors)?
    };
    Ok(format!("\n    {}: {value}", ctx.colors.cyan.paint(&row.key)))
}

impl<'a> Component<ErrorMetadataProps<'a>> for ErrorMetadata {
    fn render_html(&self, props: &ErrorMetadataProps<'a>) -> Result<String> {
        let groups = props.metadata.to_json();
        if groups.is_empty() {
            return Ok(String::new());
        }

        let cards = groups
            .iter()
            .map(|(name, sections)| render_group(name, sections, props.ctx))
            .collect::<Result<Vec<_>>>()?;
        Ok(cards.join("\n"))
    }

    fn render_ansi(&self, props: &ErrorMetadataProps<'a>) -> Result<String> {
        let ctx = props.ctx;
        let mut out = String::new();
        for (group, sections) in props.metadata.to_json().iter() {
            out.push_str(&format!("\n\n{}", ctx.colors.bold.paint(group)));
            for (section, value) in sections.iter() {
                out.push_str(&format!("\n  {}", ctx.colors.dim.paint(section)));
                for row in value.rows() {
                    out.push_str(&print_row(row, ctx)?);
                }
            }
        }
        Ok(out)
    }

    fn style(&self) -> Option<&Asset> {
        Some(&self.style)
    }
}
