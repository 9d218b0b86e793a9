//! Document shell.

use crate::component::{Asset, Component, bundled_asset};
use crate::error::Result;
use crate::text::html_escape;

use super::LayoutProps;

/// Replaced with the collected `<style>` tags.
pub const STYLES_PLACEHOLDER: &str = "<!-- STYLES -->";

/// Replaced with the collected `<script>` tags.
pub const SCRIPTS_PLACEHOLDER: &str = "<!-- SCRIPTS -->";

/// Wraps the composed slots in the HTML document, or in blank lines for the
/// terminal. Replace it to change the page structure or the color variables.
#[derive(Debug)]
pub struct Layout {
    style: Asset,
    script: Asset,
}

impl Layout {
    pub fn new(dev_mode: bool) -> Self {
        Self {
            style: bundled_asset!("layout.css", dev_mode),
            script: bundled_asset!("layout.js", dev_mode),
        }
    }
}

impl<'a> Component<LayoutProps<'a>> for Layout {
    fn render_html(&self, props: &LayoutProps<'a>) -> Result<String> {
        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{title}</title>
    {STYLES_PLACEHOLDER}
    {SCRIPTS_PLACEHOLDER}
  </head>
  <body>
    <div id="layout">
      {children}
    </div>
  </body>
</html>"#,
            title = html_escape(props.title),
            children = props.children,
        ))
    }

    fn render_ansi(&self, props: &LayoutProps<'a>) -> Result<String> {
        Ok(format!("\n{}\n", props.children))
    }

    fn style(&self) -> Option<&Asset> {
        Some(&self.style)
    }

    fn script(&self) -> Option<&Asset> {
        Some(&self.script)
    }
}
