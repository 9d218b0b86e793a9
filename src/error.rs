//! Typed error type for the rendering pipeline.
//!
//! Rendering is all-or-nothing: any failure raised while loading an asset,
//! parsing the subject error, highlighting source or dumping a value aborts
//! the whole render and reaches the caller unchanged.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while turning a captured error into HTML, ANSI or JSON.
#[derive(Debug, Error)]
pub enum RenderError {
    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------
    /// A style or script file could not be read from disk.
    #[error("failed to read {name} asset '{}': {source}", path.display())]
    AssetRead {
        /// Slot (or bucket) name the asset belongs to.
        name: String,
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // -----------------------------------------------------------------------
    // Template registry configuration
    // -----------------------------------------------------------------------
    /// An override was requested for a slot that does not exist.
    #[error("invalid template \"{0}\"")]
    UnknownSlot(String),

    /// An override's component kind does not match the slot it targets.
    #[error("template \"{slot}\" cannot be replaced by a \"{component}\" component")]
    SlotMismatch {
        /// Slot named by the caller.
        slot: &'static str,
        /// Slot the supplied component was built for.
        component: &'static str,
    },

    // -----------------------------------------------------------------------
    // External collaborators
    // -----------------------------------------------------------------------
    /// The error parser could not produce a parsed error.
    #[error("error parser failed: {0}")]
    Parse(String),

    /// A source loader could not produce the source window for a frame.
    #[error("source loader failed for '{file}': {message}")]
    SourceLoad {
        /// File the loader was asked for.
        file: String,
        /// Loader supplied failure description.
        message: String,
    },

    /// The highlighter rejected a source excerpt.
    #[error("highlighter failed: {0}")]
    Highlight(String),

    /// The dumper could not format a value.
    #[error("dumper failed: {0}")]
    Dump(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RenderError>;
