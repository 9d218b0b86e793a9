//! Text utilities shared by the HTML and ANSI renderers.

pub mod colors;
pub mod escape;

pub use colors::{Colors, Style};
pub use escape::{html_escape, strip_ansi};

use std::borrow::Cow;
use std::path::Path;

/// Format a file path for display, stripping the working directory prefix
/// when the path lives under it.
pub fn display_path<'a>(file: &'a str, cwd: Option<&Path>) -> Cow<'a, str> {
    let path = Path::new(file);
    if let Some(cwd) = cwd
        && path.is_absolute()
        && let Ok(stripped) = path.strip_prefix(cwd)
    {
        return Cow::Owned(stripped.to_string_lossy().into_owned());
    }
    Cow::Borrowed(file)
}
