//! Error cause, deep-formatted by the dumper.

use crate::component::{Asset, Component, bundled_asset};
use crate::dump::{DEFAULT_HTML_DEPTH, DumpOptions};
use crate::error::Result;

use super::ErrorCauseProps;

#[derive(Debug)]
pub struct ErrorCause {
    style: Asset,
}

impl ErrorCause {
    pub fn new(dev_mode: bool) -> Self {
        Self {
            style: bundled_asset!("error_cause.css", dev_mode),
        }
    }
}

impl<'a> Component<ErrorCauseProps<'a>> for ErrorCause {
    fn render_html(&self, props: &ErrorCauseProps<'a>) -> Result<String> {
        let Some(cause) = &props.error.cause else {
            return Ok(String::new());
        };
        let dumped = props.ctx.dumper.dump_html(
            cause,
            &DumpOptions {
                depth: DEFAULT_HTML_DEPTH,
                expand: false,
                csp_nonce: props.ctx.csp_nonce,
            },
        )?;

        Ok(format!(
            r#"<section>
  <div class="card">
    <div class="card-heading">
      <div>
        <h3 class="card-title">Error Cause</h3>
      </div>
    </div>
    <div class="card-body">
      <div id="error-cause">
        {dumped}
      </div>
    </div>
  </div>
</section>"#
        ))
    }

    fn render_ansi(&self, props: &ErrorCauseProps<'a>) -> Result<String> {
        let Some(cause) = &props.error.cause else {
            return Ok(String::new());
        };
        let ctx = props.ctx;
        let dumped = ctx.dumper.dump_ansi(cause, ctx.cause_depth, &ctx.colors)?;
        Ok(format!("\n\n{}\n{}", ctx.colors.red.paint("[CAUSE]"), dumped))
    }

    fn style(&self) -> Option<&Asset> {
        Some(&self.style)
    }
}
