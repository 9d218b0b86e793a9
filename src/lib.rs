//! Render captured errors as interactive HTML pages and colorized terminal
//! transcripts.
//!
//! ```ignore
//! use faultline::{ErrorView, HtmlOptions, parser::CapturedError};
//!
//! let error = CapturedError::new("Cannot read config").with_hint("Run `init` first");
//! let html = ErrorView::from_env().to_html(&error, HtmlOptions::default())?;
//! ```

pub mod component;
pub mod config;
pub mod dump;
pub mod error;
pub mod frame;
pub mod highlight;
pub mod metadata;
pub mod parser;
pub mod templates;
pub mod text;
pub mod view;

pub use config::{AnsiOptions, HtmlOptions, JsonOptions, RenderConfig};
pub use error::{RenderError, Result};
pub use frame::{FrameType, ParsedError, SourceLine, StackFrame};
pub use metadata::{Metadata, MetadataRow, Section};
pub use view::{ErrorView, RequestInfo};
