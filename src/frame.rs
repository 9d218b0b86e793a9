//! Parsed error shape consumed by the renderers.
//!
//! These values are produced by an [`ErrorParser`](crate::parser::ErrorParser)
//! and are read-only for the rest of the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Origin of a stack frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    /// Project code.
    App,
    /// Dependency code.
    Module,
    /// Runtime internals with no resolvable source.
    Native,
}

impl FrameType {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameType::App => "app",
            FrameType::Module => "module",
            FrameType::Native => "native",
        }
    }
}

/// One line of a source window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLine {
    pub line_number: usize,
    pub chunk: String,
}

impl SourceLine {
    pub fn new(line_number: usize, chunk: impl Into<String>) -> Self {
        Self {
            line_number,
            chunk: chunk.into(),
        }
    }
}

/// One entry of the captured call stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    #[serde(rename = "type")]
    pub frame_type: FrameType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Window of lines around `line_number`, not the whole file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Vec<SourceLine>>,
}

impl StackFrame {
    pub fn new(frame_type: FrameType) -> Self {
        Self {
            frame_type,
            file_name: None,
            line_number: None,
            column_number: None,
            function_name: None,
            source: None,
        }
    }

    pub fn app() -> Self {
        Self::new(FrameType::App)
    }

    pub fn module() -> Self {
        Self::new(FrameType::Module)
    }

    pub fn native() -> Self {
        Self::new(FrameType::Native)
    }

    pub fn with_file(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line_number = Some(line);
        self.column_number = Some(column);
        self
    }

    pub fn with_function(mut self, function_name: impl Into<String>) -> Self {
        self.function_name = Some(function_name.into());
        self
    }

    pub fn with_source(mut self, source: Vec<SourceLine>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_native(&self) -> bool {
        self.frame_type == FrameType::Native
    }

    /// Whether the frame has a source excerpt to expand: not native, a
    /// non-empty window and a file name.
    pub fn has_source_toggle(&self) -> bool {
        !self.is_native()
            && self.file_name.is_some()
            && self.source.as_ref().is_some_and(|lines| !lines.is_empty())
    }
}

/// Structured error handed to the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedError {
    pub message: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Value>,
    #[serde(default)]
    pub frames: Vec<StackFrame>,
    /// Raw structured form shown by the "Raw" stack view.
    #[serde(default)]
    pub raw: Value,
}

impl ParsedError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            name: name.into(),
            hint: None,
            cause: None,
            frames: Vec::new(),
            raw: Value::Null,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<Value>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_frames(mut self, frames: Vec<StackFrame>) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = raw;
        self
    }
}
