//! Error name, title, message and hint.

use crate::component::{Asset, Component, bundled_asset};
use crate::error::Result;
use crate::text::html_escape;

use super::ErrorInfoProps;

const ERROR_ICON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" aria-hidden="true" width="24" height="24" fill="none"><path stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M12 7v6m0 4.01.01-.011M12 22c5.523 0 10-4.477 10-10S17.523 2 12 2 2 6.477 2 12s4.477 10 10 10Z"/></svg>"#;

const HINT_ICON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" aria-hidden="true" width="24" height="24" fill="none"><path stroke="currentColor" stroke-linecap="round" stroke-linejoin="round" stroke-width="1.5" d="m21 2-1 1M3 2l1 1m17 13-1-1M3 16l1-1m5 3h6m-5 3h4M12 3C8 3 5.952 4.95 6 8c.023 1.487.5 2.5 1.5 3.5S9 13 9 15h6c0-2 .5-2.5 1.5-3.5h0c1-1 1.477-2.013 1.5-3.5.048-3.05-2-5-6-5Z"/></svg>"#;

#[derive(Debug)]
pub struct ErrorInfo {
    style: Asset,
}

impl ErrorInfo {
    pub fn new(dev_mode: bool) -> Self {
        Self {
            style: bundled_asset!("error_info.css", dev_mode),
        }
    }
}

impl<'a> Component<ErrorInfoProps<'a>> for ErrorInfo {
    fn render_html(&self, props: &ErrorInfoProps<'a>) -> Result<String> {
        let error = props.error;
        let hint = match &error.hint {
            Some(hint) => format!(
                r#"<div id="error-hint">
          <span>{HINT_ICON_SVG}</span>
          <span>{}</span>
        </div>"#,
                html_escape(hint)
            ),
            None => String::new(),
        };

        Ok(format!(
            r#"<section>
  <h4 id="error-name">{name}</h4>
  <h1 id="error-title">{title}</h1>
</section>
<section>
  <div class="card">
    <div class="card-body">
      <h2 id="error-message">
        <span>{ERROR_ICON_SVG}</span>
        <span>{message}</span>
      </h2>
      {hint}
    </div>
  </div>
</section>"#,
            name = html_escape(&error.name),
            title = html_escape(props.title),
            message = html_escape(&error.message),
        ))
    }

    fn render_ansi(&self, props: &ErrorInfoProps<'a>) -> Result<String> {
        let colors = &props.ctx.colors;
        let error = props.error;

        let mut out = String::new();
        if !props.title.is_empty() {
            out.push_str(&colors.bold.paint(props.title));
            out.push_str("\n\n");
        }
        out.push_str(&format!(
            " {} {}",
            colors.bg_red.paint(&format!(" {} ", error.name)),
            colors.bold.paint(&error.message)
        ));
        if let Some(hint) = &error.hint {
            out.push_str(&format!("\n\n {} {}", colors.cyan.paint("hint:"), hint));
        }
        Ok(out)
    }

    fn style(&self) -> Option<&Asset> {
        Some(&self.style)
    }
}
