//! Template registry.
//!
//! [`Templates`] owns one component per slot and composes them into a full
//! HTML document or terminal transcript:
//!
//! ```text
//! layout
//!   header
//!   errorInfo
//!   errorStack -> errorStackSource (per frame, in parallel)
//!   errorCause
//!   errorMetadata
//! ```
//!
//! The first time a slot renders to HTML its style and script assets are
//! recorded into ordered buckets keyed by the slot name. Once the document is
//! assembled the `<!-- STYLES -->` and `<!-- SCRIPTS -->` placeholders are
//! replaced with one tag per bucket.

pub mod error_cause;
pub mod error_info;
pub mod error_metadata;
pub mod error_stack;
pub mod error_stack_source;
pub mod header;
pub mod layout;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::component::{Asset, Component};
use crate::config::RenderConfig;
use crate::dump::{Dumper, JsonDumper};
use crate::error::{RenderError, Result};
use crate::frame::{ParsedError, StackFrame};
use crate::highlight::{Highlighter, PlainHighlighter};
use crate::metadata::Metadata;
use crate::text::{Colors, html_escape};

pub use error_cause::ErrorCause;
pub use error_info::ErrorInfo;
pub use error_metadata::ErrorMetadata;
pub use error_stack::{EDITORS, ErrorStack, default_expanded_index, editor_link};
pub use error_stack_source::ErrorStackSource;
pub use header::Header;
pub use layout::{Layout, SCRIPTS_PLACEHOLDER, STYLES_PLACEHOLDER};

/// Bucket seeded with the dumper's own styles and script.
pub const GLOBAL_BUCKET: &str = "global";

/// Bucket holding caller supplied CSS. Always rendered last.
pub const INJECTED_BUCKET: &str = "injected";

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// The fixed set of overridable template slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Layout,
    Header,
    ErrorInfo,
    ErrorStack,
    ErrorStackSource,
    ErrorCause,
    ErrorMetadata,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::Layout,
        Slot::Header,
        Slot::ErrorInfo,
        Slot::ErrorStack,
        Slot::ErrorStackSource,
        Slot::ErrorCause,
        Slot::ErrorMetadata,
    ];

    /// Slot name, also used as its asset bucket key.
    pub fn name(self) -> &'static str {
        match self {
            Slot::Layout => "layout",
            Slot::Header => "header",
            Slot::ErrorInfo => "errorInfo",
            Slot::ErrorStack => "errorStack",
            Slot::ErrorStackSource => "errorStackSource",
            Slot::ErrorCause => "errorCause",
            Slot::ErrorMetadata => "errorMetadata",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Slot {
    type Err = RenderError;

    fn from_str(name: &str) -> Result<Self> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.name() == name)
            .ok_or_else(|| RenderError::UnknownSlot(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// Per-render settings shared by every slot.
pub struct RenderContext<'a> {
    /// Editor id or `%f`/`%l` URL template used for frame links.
    pub ide: &'a str,
    /// Working directory stripped from displayed file names.
    pub cwd: Option<&'a Path>,
    pub csp_nonce: Option<&'a str>,
    pub colors: Colors,
    pub dumper: &'a dyn Dumper,
    pub highlighter: &'a dyn Highlighter,
    /// When set, the ANSI stack is a raw dump at this depth.
    pub raw_depth: Option<usize>,
    pub cause_depth: usize,
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("ide", &self.ide)
            .field("cwd", &self.cwd)
            .field("csp_nonce", &self.csp_nonce)
            .field("raw_depth", &self.raw_depth)
            .field("cause_depth", &self.cause_depth)
            .finish_non_exhaustive()
    }
}

pub struct LayoutProps<'a> {
    pub ctx: &'a RenderContext<'a>,
    pub title: &'a str,
    /// Already assembled output of the other slots.
    pub children: String,
}

pub struct HeaderProps<'a> {
    pub ctx: &'a RenderContext<'a>,
}

pub struct ErrorInfoProps<'a> {
    pub ctx: &'a RenderContext<'a>,
    pub title: &'a str,
    pub error: &'a ParsedError,
}

pub struct ErrorStackProps<'a> {
    pub ctx: &'a RenderContext<'a>,
    pub error: &'a ParsedError,
    /// Renders the source excerpt of one frame through the errorStackSource slot.
    pub sources: &'a dyn FrameSourceRenderer,
}

pub struct ErrorStackSourceProps<'a> {
    pub ctx: &'a RenderContext<'a>,
    pub error: &'a ParsedError,
    pub frame: &'a StackFrame,
}

pub struct ErrorCauseProps<'a> {
    pub ctx: &'a RenderContext<'a>,
    pub error: &'a ParsedError,
}

pub struct ErrorMetadataProps<'a> {
    pub ctx: &'a RenderContext<'a>,
    pub metadata: &'a Metadata,
}

/// Source excerpt renderer handed to the stack slot.
pub trait FrameSourceRenderer: Sync {
    fn render_html(&self, error: &ParsedError, frame: &StackFrame) -> Result<String>;

    fn render_ansi(&self, error: &ParsedError, frame: &StackFrame) -> Result<String>;
}

pub type LayoutComponent = Box<dyn for<'a> Component<LayoutProps<'a>>>;
pub type HeaderComponent = Box<dyn for<'a> Component<HeaderProps<'a>>>;
pub type ErrorInfoComponent = Box<dyn for<'a> Component<ErrorInfoProps<'a>>>;
pub type ErrorStackComponent = Box<dyn for<'a> Component<ErrorStackProps<'a>>>;
pub type ErrorStackSourceComponent = Box<dyn for<'a> Component<ErrorStackSourceProps<'a>>>;
pub type ErrorCauseComponent = Box<dyn for<'a> Component<ErrorCauseProps<'a>>>;
pub type ErrorMetadataComponent = Box<dyn for<'a> Component<ErrorMetadataProps<'a>>>;

/// A replacement component, tagged with the slot whose props it accepts.
pub enum SlotComponent {
    Layout(LayoutComponent),
    Header(HeaderComponent),
    ErrorInfo(ErrorInfoComponent),
    ErrorStack(ErrorStackComponent),
    ErrorStackSource(ErrorStackSourceComponent),
    ErrorCause(ErrorCauseComponent),
    ErrorMetadata(ErrorMetadataComponent),
}

impl SlotComponent {
    pub fn slot(&self) -> Slot {
        match self {
            SlotComponent::Layout(_) => Slot::Layout,
            SlotComponent::Header(_) => Slot::Header,
            SlotComponent::ErrorInfo(_) => Slot::ErrorInfo,
            SlotComponent::ErrorStack(_) => Slot::ErrorStack,
            SlotComponent::ErrorStackSource(_) => Slot::ErrorStackSource,
            SlotComponent::ErrorCause(_) => Slot::ErrorCause,
            SlotComponent::ErrorMetadata(_) => Slot::ErrorMetadata,
        }
    }
}

impl fmt::Debug for SlotComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotComponent").field(&self.slot()).finish()
    }
}

struct Slots {
    layout: LayoutComponent,
    header: HeaderComponent,
    error_info: ErrorInfoComponent,
    error_stack: ErrorStackComponent,
    error_stack_source: ErrorStackSourceComponent,
    error_cause: ErrorCauseComponent,
    error_metadata: ErrorMetadataComponent,
}

impl Slots {
    fn defaults(dev_mode: bool) -> Self {
        Self {
            layout: Box::new(Layout::new(dev_mode)),
            header: Box::new(Header::new(dev_mode)),
            error_info: Box::new(ErrorInfo::new(dev_mode)),
            error_stack: Box::new(ErrorStack::new(dev_mode)),
            error_stack_source: Box::new(ErrorStackSource::new(dev_mode)),
            error_cause: Box::new(ErrorCause::new(dev_mode)),
            error_metadata: Box::new(ErrorMetadata::new(dev_mode)),
        }
    }

    fn assets(&self, slot: Slot) -> (Option<&Asset>, Option<&Asset>) {
        match slot {
            Slot::Layout => (self.layout.style(), self.layout.script()),
            Slot::Header => (self.header.style(), self.header.script()),
            Slot::ErrorInfo => (self.error_info.style(), self.error_info.script()),
            Slot::ErrorStack => (self.error_stack.style(), self.error_stack.script()),
            Slot::ErrorStackSource => (
                self.error_stack_source.style(),
                self.error_stack_source.script(),
            ),
            Slot::ErrorCause => (self.error_cause.style(), self.error_cause.script()),
            Slot::ErrorMetadata => (self.error_metadata.style(), self.error_metadata.script()),
        }
    }
}

// ---------------------------------------------------------------------------
// Asset buckets
// ---------------------------------------------------------------------------

/// Ordered bucket name to content mapping.
///
/// Entries keep insertion order except [`INJECTED_BUCKET`], which always
/// renders last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetBucket {
    entries: Vec<(String, String)>,
}

impl AssetBucket {
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(bucket, _)| bucket == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(bucket, _)| bucket == name)
            .map(|(_, content)| content.as_str())
    }

    /// Bucket names in render order.
    pub fn names(&self) -> Vec<&str> {
        self.ordered().map(|(name, _)| name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `content` under `name` unless the name is already present.
    fn insert_once(&mut self, name: &str, content: String) {
        if !self.contains(name) {
            self.entries.push((name.to_string(), content));
        }
    }

    fn append(&mut self, name: &str, fragment: &str) {
        match self.entries.iter_mut().find(|(bucket, _)| bucket == name) {
            Some((_, content)) => {
                content.push('\n');
                content.push_str(fragment);
            }
            None => self.entries.push((name.to_string(), fragment.to_string())),
        }
    }

    fn ordered(&self) -> impl Iterator<Item = (&str, &str)> {
        let regular = self
            .entries
            .iter()
            .filter(|(name, _)| name != INJECTED_BUCKET);
        let injected = self
            .entries
            .iter()
            .filter(|(name, _)| name == INJECTED_BUCKET);
        regular
            .chain(injected)
            .map(|(name, content)| (name.as_str(), content.as_str()))
    }
}

/// ` nonce="…"` attribute, or nothing without a nonce.
pub(crate) fn nonce_attr(csp_nonce: Option<&str>) -> String {
    csp_nonce
        .map(|nonce| format!(r#" nonce="{}""#, html_escape(nonce)))
        .unwrap_or_default()
}

/// Render the style bucket as `<style>` tags, injected styles last.
fn style_tags(bucket: &AssetBucket, csp_nonce: Option<&str>) -> String {
    let nonce = nonce_attr(csp_nonce);
    let mut styles = Vec::new();
    let mut injected = String::new();
    for (name, content) in bucket.ordered() {
        let tag = format!(r#"<style id="{name}-styles"{nonce}>{content}</style>"#);
        if name == INJECTED_BUCKET {
            injected = tag;
        } else {
            styles.push(tag);
        }
    }
    format!("{}\n{}", styles.join("\n"), injected)
}

fn script_tags(bucket: &AssetBucket, csp_nonce: Option<&str>) -> String {
    let nonce = nonce_attr(csp_nonce);
    bucket
        .ordered()
        .map(|(name, content)| format!(r#"<script id="{name}-script"{nonce}>{content}</script>"#))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Default)]
struct Assets {
    styles: AssetBucket,
    scripts: AssetBucket,
}

impl Assets {
    fn record_global(&mut self, dumper: &dyn Dumper) {
        if !self.styles.contains(GLOBAL_BUCKET)
            && let Some(styles) = dumper.html_styles()
        {
            self.styles.insert_once(GLOBAL_BUCKET, styles);
        }
        if !self.scripts.contains(GLOBAL_BUCKET)
            && let Some(script) = dumper.html_script()
        {
            self.scripts.insert_once(GLOBAL_BUCKET, script);
        }
    }

    fn record(&mut self, slot: Slot, style: Option<&Asset>, script: Option<&Asset>) -> Result<()> {
        let name = slot.name();
        if !self.styles.contains(name)
            && let Some(asset) = style
        {
            self.styles.insert_once(name, load(name, asset)?);
            log::debug!("recorded {name} styles");
        }
        if !self.scripts.contains(name)
            && let Some(asset) = script
        {
            self.scripts.insert_once(name, load(name, asset)?);
            log::debug!("recorded {name} script");
        }
        Ok(())
    }
}

fn load(name: &str, asset: &Asset) -> Result<String> {
    asset.load().map_err(|source| RenderError::AssetRead {
        name: name.to_string(),
        path: asset.path().to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Per-call inputs for a render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub title: &'a str,
    pub ide: &'a str,
    pub csp_nonce: Option<&'a str>,
    pub config: &'a RenderConfig,
}

/// Stack source renderer backed by the errorStackSource slot.
struct SourceSlot<'t> {
    component: &'t dyn for<'a> Component<ErrorStackSourceProps<'a>>,
    ctx: &'t RenderContext<'t>,
    used: AtomicBool,
}

impl<'t> SourceSlot<'t> {
    fn new(
        component: &'t dyn for<'a> Component<ErrorStackSourceProps<'a>>,
        ctx: &'t RenderContext<'t>,
    ) -> Self {
        Self {
            component,
            ctx,
            used: AtomicBool::new(false),
        }
    }

    fn was_used(&self) -> bool {
        self.used.load(Ordering::Relaxed)
    }
}

impl FrameSourceRenderer for SourceSlot<'_> {
    fn render_html(&self, error: &ParsedError, frame: &StackFrame) -> Result<String> {
        self.used.store(true, Ordering::Relaxed);
        self.component.render_html(&ErrorStackSourceProps {
            ctx: self.ctx,
            error,
            frame,
        })
    }

    fn render_ansi(&self, error: &ParsedError, frame: &StackFrame) -> Result<String> {
        self.component.render_ansi(&ErrorStackSourceProps {
            ctx: self.ctx,
            error,
            frame,
        })
    }
}

/// Slot to component registry plus the style/script buckets it has collected.
///
/// ```ignore
/// let mut templates = Templates::new(false);
/// templates.inject_styles(":root { --danger-color: purple; }");
/// templates.use_named("header", SlotComponent::Header(Box::new(MyHeader)))?;
/// let html = templates.to_html(&error, &metadata, &options)?;
/// ```
pub struct Templates {
    dev_mode: bool,
    slots: Slots,
    assets: Assets,
    dumper: Box<dyn Dumper>,
    highlighter: Box<dyn Highlighter>,
}

impl fmt::Debug for Templates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Templates")
            .field("dev_mode", &self.dev_mode)
            .field("styles", &self.assets.styles.names())
            .field("scripts", &self.assets.scripts.names())
            .finish_non_exhaustive()
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Templates {
    /// Registry with the default component for every slot.
    pub fn new(dev_mode: bool) -> Self {
        Self {
            dev_mode,
            slots: Slots::defaults(dev_mode),
            assets: Assets::default(),
            dumper: Box::new(JsonDumper),
            highlighter: Box::new(PlainHighlighter),
        }
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn with_dumper(mut self, dumper: impl Dumper + 'static) -> Self {
        self.dumper = Box::new(dumper);
        self
    }

    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }

    /// Replace the component of the slot the override was built for.
    ///
    /// Assets already recorded for that slot are kept.
    pub fn use_component(&mut self, component: SlotComponent) -> &mut Self {
        match component {
            SlotComponent::Layout(c) => self.slots.layout = c,
            SlotComponent::Header(c) => self.slots.header = c,
            SlotComponent::ErrorInfo(c) => self.slots.error_info = c,
            SlotComponent::ErrorStack(c) => self.slots.error_stack = c,
            SlotComponent::ErrorStackSource(c) => self.slots.error_stack_source = c,
            SlotComponent::ErrorCause(c) => self.slots.error_cause = c,
            SlotComponent::ErrorMetadata(c) => self.slots.error_metadata = c,
        }
        self
    }

    /// Replace the component of the slot called `name`.
    pub fn use_named(&mut self, name: &str, component: SlotComponent) -> Result<&mut Self> {
        let slot: Slot = name.parse()?;
        if component.slot() != slot {
            return Err(RenderError::SlotMismatch {
                slot: slot.name(),
                component: component.slot().name(),
            });
        }
        Ok(self.use_component(component))
    }

    /// Append CSS rendered after every other style tag.
    pub fn inject_styles(&mut self, css: &str) -> &mut Self {
        self.assets.styles.append(INJECTED_BUCKET, css);
        self
    }

    /// Styles collected so far.
    pub fn styles(&self) -> &AssetBucket {
        &self.assets.styles
    }

    /// Scripts collected so far.
    pub fn scripts(&self) -> &AssetBucket {
        &self.assets.scripts
    }

    /// Render the HTML document for `error`.
    pub fn to_html(
        &mut self,
        error: &ParsedError,
        metadata: &Metadata,
        options: &RenderOptions<'_>,
    ) -> Result<String> {
        log::trace!(
            "rendering html for {} ({} frames)",
            error.name,
            error.frames.len()
        );
        let ctx = context(options, self.dumper.as_ref(), self.highlighter.as_ref());
        let slots = &self.slots;
        let assets = &mut self.assets;

        assets.record_global(ctx.dumper);
        record(assets, slots, Slot::Layout)?;

        let mut children = String::new();

        record(assets, slots, Slot::Header)?;
        children.push_str(&slots.header.render_html(&HeaderProps { ctx: &ctx })?);

        record(assets, slots, Slot::ErrorInfo)?;
        children.push_str(&slots.error_info.render_html(&ErrorInfoProps {
            ctx: &ctx,
            title: options.title,
            error,
        })?);

        record(assets, slots, Slot::ErrorStack)?;
        let sources = SourceSlot::new(slots.error_stack_source.as_ref(), &ctx);
        children.push_str(&slots.error_stack.render_html(&ErrorStackProps {
            ctx: &ctx,
            error,
            sources: &sources,
        })?);
        if sources.was_used() {
            record(assets, slots, Slot::ErrorStackSource)?;
        }

        record(assets, slots, Slot::ErrorCause)?;
        children.push_str(&slots.error_cause.render_html(&ErrorCauseProps { ctx: &ctx, error })?);

        record(assets, slots, Slot::ErrorMetadata)?;
        children.push_str(
            &slots
                .error_metadata
                .render_html(&ErrorMetadataProps { ctx: &ctx, metadata })?,
        );

        let html = slots.layout.render_html(&LayoutProps {
            ctx: &ctx,
            title: options.title,
            children,
        })?;

        let styles = style_tags(&assets.styles, ctx.csp_nonce);
        let scripts = script_tags(&assets.scripts, ctx.csp_nonce);
        Ok(html
            .replacen(STYLES_PLACEHOLDER, &styles, 1)
            .replacen(SCRIPTS_PLACEHOLDER, &scripts, 1))
    }

    /// Render the terminal transcript for `error`.
    pub fn to_ansi(
        &self,
        error: &ParsedError,
        metadata: &Metadata,
        options: &RenderOptions<'_>,
    ) -> Result<String> {
        log::trace!(
            "rendering ansi for {} ({} frames)",
            error.name,
            error.frames.len()
        );
        let ctx = context(options, self.dumper.as_ref(), self.highlighter.as_ref());
        let slots = &self.slots;

        let sources = SourceSlot::new(slots.error_stack_source.as_ref(), &ctx);
        let children = [
            slots.header.render_ansi(&HeaderProps { ctx: &ctx })?,
            slots.error_info.render_ansi(&ErrorInfoProps {
                ctx: &ctx,
                title: options.title,
                error,
            })?,
            slots.error_stack.render_ansi(&ErrorStackProps {
                ctx: &ctx,
                error,
                sources: &sources,
            })?,
            slots.error_cause.render_ansi(&ErrorCauseProps { ctx: &ctx, error })?,
            slots
                .error_metadata
                .render_ansi(&ErrorMetadataProps { ctx: &ctx, metadata })?,
        ]
        .concat();

        slots.layout.render_ansi(&LayoutProps {
            ctx: &ctx,
            title: options.title,
            children,
        })
    }
}

fn context<'a>(
    options: &RenderOptions<'a>,
    dumper: &'a dyn Dumper,
    highlighter: &'a dyn Highlighter,
) -> RenderContext<'a> {
    RenderContext {
        ide: options.ide,
        cwd: options.config.cwd.as_deref(),
        csp_nonce: options.csp_nonce,
        colors: Colors::new(options.config.color),
        dumper,
        highlighter,
        raw_depth: options.config.raw_stack,
        cause_depth: options.config.cause_depth,
    }
}

fn record(assets: &mut Assets, slots: &Slots, slot: Slot) -> Result<()> {
    let (style, script) = slots.assets(slot);
    assets.record(slot, style, script)
}
