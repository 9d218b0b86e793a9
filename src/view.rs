//! Public façade.
//!
//! [`ErrorView`] binds an [`ErrorParser`], a [`Templates`] registry and a
//! [`Metadata`] store. Each output method parses the error once and hands the
//! result to the registry.
//!
//! A view is meant for a single render: [`ErrorView::to_html`] consumes it,
//! so metadata recorded for one request cannot leak into the next.

use std::error::Error;

use serde_json::{Map, Value};

use crate::config::{AnsiOptions, DEFAULT_TITLE, HtmlOptions, JsonOptions, RenderConfig};
use crate::error::Result;
use crate::frame::{ParsedError, SourceLine, StackFrame};
use crate::metadata::{Metadata, MetadataRow, Section};
use crate::parser::{
    DefaultErrorParser, ErrorParser, ParseOptions, ParserHook, SourceLoader, Transformer,
};
use crate::templates::{RenderOptions, Templates};

/// Name of the metadata group synthesized from [`RequestInfo`].
pub const REQUEST_GROUP: &str = "Request";

/// HTTP request context shown alongside an HTML error page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub url: Option<String>,
    pub method: Option<String>,
    /// Header name and value pairs, in the order they were received.
    pub headers: Vec<(String, String)>,
}

impl RequestInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.method.is_none() && self.headers.is_empty()
    }

    /// Sections of the "Request" metadata group.
    fn sections(&self) -> Vec<(&'static str, Section)> {
        let mut sections: Vec<(&'static str, Section)> = Vec::new();
        if let Some(url) = &self.url {
            sections.push(("url", MetadataRow::new("URL", url.as_str()).into()));
        }
        if let Some(method) = &self.method {
            sections.push(("method", MetadataRow::new("Method", method.as_str()).into()));
        }
        if !self.headers.is_empty() {
            let rows = self
                .headers
                .iter()
                .map(|(name, value)| {
                    if name.eq_ignore_ascii_case("cookie") {
                        MetadataRow::new(name.as_str(), cookie_value(value))
                    } else {
                        MetadataRow::new(name.as_str(), value.as_str())
                    }
                })
                .collect();
            sections.push(("headers", Section::Many(rows)));
        }
        sections
    }
}

fn cookie_value(header: &str) -> Value {
    let map: Map<String, Value> = parse_cookie(header)
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();
    Value::Object(map)
}

/// Split a `Cookie` header into name/value pairs.
///
/// Pairs without `=` are skipped and the first occurrence of a name wins.
/// Values lose one pair of surrounding double quotes and are percent-decoded
/// when the encoding is valid.
pub fn parse_cookie(header: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for pair in header.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || pairs.iter().any(|(existing, _)| existing == name) {
            continue;
        }

        let mut value = value.trim();
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            value = &value[1..value.len() - 1];
        }
        let value = if value.contains('%') {
            percent_decode(value).unwrap_or_else(|| value.to_string())
        } else {
            value.to_string()
        };
        pairs.push((name.to_string(), value));
    }
    pairs
}

fn percent_decode(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Renders captured errors as HTML pages, terminal transcripts or JSON.
pub struct ErrorView {
    config: RenderConfig,
    parser: Box<dyn ErrorParser>,
    source_loader: Option<SourceLoader>,
    parsers: Vec<ParserHook>,
    transformers: Vec<Transformer>,
    templates: Templates,
    metadata: Metadata,
}

impl std::fmt::Debug for ErrorView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorView")
            .field("config", &self.config)
            .field("templates", &self.templates)
            .field("metadata", &self.metadata)
            .field("parsers", &self.parsers.len())
            .field("transformers", &self.transformers.len())
            .field("source_loader", &self.source_loader.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for ErrorView {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorView {
    /// A view with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    /// A view configured from the process environment.
    pub fn from_env() -> Self {
        Self::with_config(RenderConfig::from_env())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            templates: Templates::new(config.dev_mode),
            config,
            parser: Box::new(DefaultErrorParser),
            source_loader: None,
            parsers: Vec::new(),
            transformers: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Replace the error parser.
    pub fn with_parser(mut self, parser: impl ErrorParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Replace the template registry.
    pub fn with_templates(mut self, templates: Templates) -> Self {
        self.templates = templates;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut Templates {
        &mut self.templates
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Loader the parser uses for frames that arrive without a source window.
    pub fn define_source_loader<F>(&mut self, loader: F) -> &mut Self
    where
        F: Fn(&StackFrame) -> Result<Option<Vec<SourceLine>>> + Send + Sync + 'static,
    {
        self.source_loader = Some(Box::new(loader));
        self
    }

    /// Hook that may substitute the error before it is parsed.
    pub fn use_parser<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&(dyn Error + 'static)) -> Option<Box<dyn Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        self.parsers.push(Box::new(hook));
        self
    }

    /// Hook that may rewrite the parsed error.
    pub fn use_transformer<F>(&mut self, transformer: F) -> &mut Self
    where
        F: Fn(&mut ParsedError, &(dyn Error + 'static)) + Send + Sync + 'static,
    {
        self.transformers.push(Box::new(transformer));
        self
    }

    fn parse(&self, error: &(dyn Error + 'static), offset: usize) -> Result<ParsedError> {
        self.parser.parse(
            error,
            &ParseOptions {
                offset,
                source_loader: self.source_loader.as_ref(),
                parsers: &self.parsers,
                transformers: &self.transformers,
            },
        )
    }

    /// The parsed error, as produced by the parser.
    pub fn to_json(&self, error: &(dyn Error + 'static), options: JsonOptions) -> Result<ParsedError> {
        self.parse(error, options.offset)
    }

    /// Terminal transcript of the error.
    pub fn to_ansi(&self, error: &(dyn Error + 'static), options: AnsiOptions) -> Result<String> {
        let parsed = self.parse(error, options.offset)?;
        self.templates.to_ansi(
            &parsed,
            &self.metadata,
            &RenderOptions {
                title: "",
                ide: &self.config.editor,
                csp_nonce: None,
                config: &self.config,
            },
        )
    }

    /// Full HTML document for the error.
    ///
    /// Request context, when given, is recorded as the "Request" metadata
    /// group before the error is parsed.
    pub fn to_html(mut self, error: &(dyn Error + 'static), options: HtmlOptions) -> Result<String> {
        if let Some(request) = options.request.as_ref().filter(|r| !r.is_empty()) {
            self.metadata.group(REQUEST_GROUP, request.sections());
        }

        let parsed = self.parse(error, options.offset)?;
        let render = RenderOptions {
            title: options.title.as_deref().unwrap_or(DEFAULT_TITLE),
            ide: options.ide.as_deref().unwrap_or(&self.config.editor),
            csp_nonce: options.csp_nonce.as_deref(),
            config: &self.config,
        };
        self.templates.to_html(&parsed, &self.metadata, &render)
    }
}
