//! Render configuration and per-call options.
//!
//! Every ambient override (editor, cause depth, raw stack dump, colors) is an
//! explicit field here. [`RenderConfig::from_env`] is the only place that
//! reads process state.

use std::env;
use std::path::PathBuf;

use crate::view::RequestInfo;

/// Depth used when a depth override is absent or not an integer.
pub const DEFAULT_DEPTH: usize = 2;

/// Editor used for deep links when none is configured.
pub const DEFAULT_EDITOR: &str = "vscode";

/// Title shown by the HTML page when the caller gives none.
pub const DEFAULT_TITLE: &str = "An error has occurred";

/// Environment variable holding the cause inspection depth.
pub const CAUSE_DEPTH_ENV: &str = "FAULTLINE_CAUSE_DEPTH";

/// Environment variable enabling the raw ANSI stack dump (value is the depth).
pub const RAW_STACK_ENV: &str = "FAULTLINE_RAW";

/// Parse a depth override, falling back to [`DEFAULT_DEPTH`].
pub fn parse_depth(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_DEPTH)
}

/// Ambient settings resolved once at the façade boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Editor id (or `%f`/`%l` URL template) used when the call gives none.
    pub editor: String,
    /// Working directory stripped from frame file names.
    pub cwd: Option<PathBuf>,
    /// Inspection depth for the ANSI cause dump.
    pub cause_depth: usize,
    /// When set, the ANSI stack is replaced by a raw dump at this depth.
    pub raw_stack: Option<usize>,
    /// Emit ANSI escape sequences.
    pub color: bool,
    /// Re-read file assets on every access instead of caching them.
    pub dev_mode: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            editor: DEFAULT_EDITOR.to_string(),
            cwd: None,
            cause_depth: DEFAULT_DEPTH,
            raw_stack: None,
            color: true,
            dev_mode: false,
        }
    }
}

impl RenderConfig {
    /// Build a config from the process environment.
    ///
    /// - `IDE`, then `EDITOR`: editor id
    /// - `FAULTLINE_CAUSE_DEPTH`: cause depth
    /// - `FAULTLINE_RAW`: enables the raw stack dump; its value is the depth
    /// - `NO_COLOR`: disables colors
    /// - current directory: path relativisation
    pub fn from_env() -> Self {
        let editor = env::var("IDE")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| env::var("EDITOR").ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        let cause_depth = parse_depth(env::var(CAUSE_DEPTH_ENV).ok().as_deref());
        let raw_stack = env::var(RAW_STACK_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| parse_depth(Some(&v)));

        Self {
            editor,
            cwd: env::current_dir().ok(),
            cause_depth,
            raw_stack,
            color: env::var_os("NO_COLOR").is_none(),
            dev_mode: false,
        }
    }

    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = editor.into();
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_cause_depth(mut self, depth: usize) -> Self {
        self.cause_depth = depth;
        self
    }

    pub fn with_raw_stack(mut self, depth: Option<usize>) -> Self {
        self.raw_stack = depth;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }
}

/// Options for [`ErrorView::to_html`](crate::view::ErrorView::to_html).
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    pub title: Option<String>,
    /// Editor id or URL template; overrides [`RenderConfig::editor`].
    pub ide: Option<String>,
    /// Frames to skip from the top, forwarded to the parser.
    pub offset: usize,
    /// Nonce stamped onto every generated style and script tag.
    pub csp_nonce: Option<String>,
    pub request: Option<RequestInfo>,
}

impl HtmlOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_ide(mut self, ide: impl Into<String>) -> Self {
        self.ide = Some(ide.into());
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_csp_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.csp_nonce = Some(nonce.into());
        self
    }

    pub fn with_request(mut self, request: RequestInfo) -> Self {
        self.request = Some(request);
        self
    }
}

/// Options for [`ErrorView::to_ansi`](crate::view::ErrorView::to_ansi).
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiOptions {
    pub offset: usize,
}

/// Options for [`ErrorView::to_json`](crate::view::ErrorView::to_json).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOptions {
    pub offset: usize,
}
