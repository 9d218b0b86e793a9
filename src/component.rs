//! Render component contract and asset loading.
//!
//! Every template slot is filled by a [`Component`] that renders the same
//! props to HTML and to ANSI text. A component may also ship a stylesheet
//! and a frontend script as [`Asset`]s; the template registry collects them
//! into the document head.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::Result;

/// A pluggable renderer for one template slot.
///
/// Either rendering may be empty. Components must be `Send + Sync` because
/// stack frames are rendered in parallel.
pub trait Component<P>: Send + Sync {
    fn render_html(&self, props: &P) -> Result<String>;

    fn render_ansi(&self, props: &P) -> Result<String>;

    /// Stylesheet injected into the document head.
    fn style(&self) -> Option<&Asset> {
        None
    }

    /// Frontend script injected into the document head.
    fn script(&self) -> Option<&Asset> {
        None
    }
}

/// A style or script file owned by a component instance.
///
/// In dev mode the file is re-read from disk on every access so edits show up
/// without a rebuild. Otherwise the bundled content is used when present, and
/// a plain file is read once and cached for the lifetime of the instance.
#[derive(Debug)]
pub struct Asset {
    path: PathBuf,
    bundled: Option<&'static str>,
    dev_mode: bool,
    cache: OnceLock<String>,
}

impl Asset {
    /// An asset read from `path` on first access.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bundled: None,
            dev_mode: false,
            cache: OnceLock::new(),
        }
    }

    /// An asset compiled into the binary. `path` is its source file, used
    /// when dev mode asks for a fresh copy.
    pub fn bundled(path: impl Into<PathBuf>, content: &'static str) -> Self {
        Self {
            bundled: Some(content),
            ..Self::file(path)
        }
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Current content of the asset.
    pub fn load(&self) -> io::Result<String> {
        if self.dev_mode {
            log::debug!("re-reading asset {}", self.path.display());
            return fs::read_to_string(&self.path);
        }
        if let Some(content) = self.bundled {
            return Ok(content.to_string());
        }
        if let Some(cached) = self.cache.get() {
            return Ok(cached.clone());
        }

        log::debug!("reading asset {}", self.path.display());
        let content = fs::read_to_string(&self.path)?;
        Ok(self.cache.get_or_init(|| content).clone())
    }
}

/// Build an [`Asset`] for a file under the crate's `assets/` directory.
macro_rules! bundled_asset {
    ($file:literal, $dev_mode:expr) => {
        $crate::component::Asset::bundled(
            concat!(env!("CARGO_MANIFEST_DIR"), "/assets/", $file),
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/", $file)),
        )
        .with_dev_mode($dev_mode)
    };
}

pub(crate) use bundled_asset;
