//! Error parsing seam.
//!
//! An [`ErrorParser`] turns a raised error into a [`ParsedError`]. The
//! façade forwards its `use_parser`, `use_transformer` and
//! `define_source_loader` hooks through [`ParseOptions`]; what the hooks mean
//! is up to the parser. [`DefaultErrorParser`] reads [`CapturedError`] values
//! field by field and falls back to `Display`/`source()` for any other error.

use std::error::Error;
use std::fmt;

use serde_json::{Value, json};

use crate::error::{RenderError, Result};
use crate::frame::{ParsedError, SourceLine, StackFrame};

/// Runs before parsing; may substitute the error being parsed.
pub type ParserHook =
    Box<dyn Fn(&(dyn Error + 'static)) -> Option<Box<dyn Error + Send + Sync>> + Send + Sync>;

/// Runs after parsing; may rewrite the parsed error.
pub type Transformer = Box<dyn Fn(&mut ParsedError, &(dyn Error + 'static)) + Send + Sync>;

/// Supplies the source window for a frame that has none.
pub type SourceLoader = Box<dyn Fn(&StackFrame) -> Result<Option<Vec<SourceLine>>> + Send + Sync>;

/// Inputs forwarded from the façade to the parser on every call.
#[derive(Default)]
pub struct ParseOptions<'a> {
    /// Frames to drop from the top of the stack.
    pub offset: usize,
    pub source_loader: Option<&'a SourceLoader>,
    pub parsers: &'a [ParserHook],
    pub transformers: &'a [Transformer],
}

/// Converts a raised error into the structured form the renderers consume.
pub trait ErrorParser: Send + Sync {
    fn parse(&self, error: &(dyn Error + 'static), options: &ParseOptions<'_>) -> Result<ParsedError>;
}

/// An error that carries its own name, hint, cause and stack frames.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedError {
    pub name: String,
    pub message: String,
    pub hint: Option<String>,
    pub cause: Option<Value>,
    pub frames: Vec<StackFrame>,
}

impl CapturedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: "Error".to_string(),
            message: message.into(),
            hint: None,
            cause: None,
            frames: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<Value>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn with_frames(mut self, frames: impl IntoIterator<Item = StackFrame>) -> Self {
        self.frames.extend(frames);
        self
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CapturedError {}

/// Built-in parser used when the façade is not given another one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorParser;

impl DefaultErrorParser {
    fn from_error(error: &(dyn Error + 'static)) -> ParsedError {
        if let Some(captured) = error.downcast_ref::<CapturedError>() {
            let mut parsed = ParsedError::new(&captured.name, &captured.message)
                .with_frames(captured.frames.clone());
            parsed.hint = captured.hint.clone();
            parsed.cause = captured.cause.clone();
            return parsed;
        }

        let mut parsed = ParsedError::new("Error", error.to_string());
        parsed.cause = error.source().map(|source| Value::String(source.to_string()));
        parsed
    }
}

impl ErrorParser for DefaultErrorParser {
    fn parse(&self, error: &(dyn Error + 'static), options: &ParseOptions<'_>) -> Result<ParsedError> {
        let mut replaced: Option<Box<dyn Error + Send + Sync>> = None;
        for hook in options.parsers {
            let current: &(dyn Error + 'static) = match replaced.as_deref() {
                Some(err) => err,
                None => error,
            };
            if let Some(next) = hook(current) {
                replaced = Some(next);
            }
        }
        let subject: &(dyn Error + 'static) = match replaced.as_deref() {
            Some(err) => err,
            None => error,
        };

        let mut parsed = Self::from_error(subject);

        let skip = options.offset.min(parsed.frames.len());
        parsed.frames.drain(..skip);

        if let Some(loader) = options.source_loader {
            for frame in parsed
                .frames
                .iter_mut()
                .filter(|f| !f.is_native() && f.source.is_none())
                .filter(|f| f.file_name.is_some() && f.line_number.is_some())
            {
                let window = loader(frame)?;
                frame.source = window;
            }
        }

        let frames = serde_json::to_value(&parsed.frames)
            .map_err(|err| RenderError::Parse(err.to_string()))?;
        parsed.raw = json!({ "name": parsed.name, "frames": frames });

        for transformer in options.transformers {
            transformer(&mut parsed, subject);
        }

        log::trace!(
            "parsed {} with {} frame(s) (offset {})",
            parsed.name,
            parsed.frames.len(),
            skip
        );
        Ok(parsed)
    }
}
