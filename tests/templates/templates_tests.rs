mod fixtures;

use std::io::Write;

use faultline::component::{Asset, Component};
use faultline::dump::{DumpOptions, Dumper, JsonDumper};
use faultline::highlight::{Highlighter, Language};
use faultline::text::Colors;
use faultline::metadata::{Metadata, MetadataRow};
use faultline::templates::{
    HeaderProps, INJECTED_BUCKET, RenderOptions, SlotComponent, Templates,
};
use faultline::{RenderError, Result};

use fixtures::{app_frame, boom, config, options};

struct PlainHeader {
    style: Asset,
}

impl<'a> Component<HeaderProps<'a>> for PlainHeader {
    fn render_html(&self, _props: &HeaderProps<'a>) -> Result<String> {
        Ok("<header>custom header</header>".to_string())
    }

    fn render_ansi(&self, _props: &HeaderProps<'a>) -> Result<String> {
        Ok("custom header\n".to_string())
    }

    fn style(&self) -> Option<&Asset> {
        Some(&self.style)
    }
}

struct FailingHighlighter;

impl Highlighter for FailingHighlighter {
    fn highlight_html(&self, _code: &str, _language: Language) -> Result<String> {
        Err(RenderError::Highlight("grammar missing".into()))
    }

    fn highlight_ansi(&self, _code: &str, _language: Language) -> Result<String> {
        Err(RenderError::Highlight("grammar missing".into()))
    }
}

/// Fails on every value except the raw stack, unless `fail_raw` is set.
struct FailingDumper {
    fail_raw: bool,
}

impl FailingDumper {
    fn check(&self, value: &serde_json::Value) -> Result<()> {
        if self.fail_raw || value.get("frames").is_none() {
            return Err(RenderError::Dump("cannot format value".into()));
        }
        Ok(())
    }
}

impl Dumper for FailingDumper {
    fn dump_html(&self, value: &serde_json::Value, options: &DumpOptions<'_>) -> Result<String> {
        self.check(value)?;
        JsonDumper.dump_html(value, options)
    }

    fn dump_ansi(&self, value: &serde_json::Value, depth: usize, colors: &Colors) -> Result<String> {
        self.check(value)?;
        JsonDumper.dump_ansi(value, depth, colors)
    }
}

#[test]
fn message_rendered_once_without_hint_or_cause() {
    let config = config();
    let html = Templates::new(false)
        .to_html(&boom(), &Metadata::new(), &options(&config))
        .unwrap();

    assert_eq!(html.matches("boom").count(), 1);
    assert!(!html.contains(r#"id="error-hint""#));
    assert!(!html.contains(r#"id="error-cause""#));
    assert!(!html.contains(r#"class="card-subtitle""#));
    assert!(!html.contains("<!-- STYLES -->"));
    assert!(!html.contains("<!-- SCRIPTS -->"));
}

#[test]
fn hint_and_cause_are_rendered_and_escaped() {
    let config = config();
    let error = boom()
        .with_hint("check <config>")
        .with_cause(serde_json::json!({ "code": "ENOENT" }));
    let html = Templates::new(false)
        .to_html(&error, &Metadata::new(), &options(&config))
        .unwrap();

    assert!(html.contains(r#"id="error-hint""#));
    assert!(html.contains("check &lt;config&gt;"));
    assert!(html.contains(r#"id="error-cause""#));
    assert!(html.contains("ENOENT"));
}

#[test]
fn injected_styles_render_after_component_styles() {
    let config = config();
    let mut templates = Templates::new(false);
    templates.inject_styles("a { color: red }");
    templates.inject_styles("b { color: blue }");

    let html = templates
        .to_html(&boom(), &Metadata::new(), &options(&config))
        .unwrap();

    assert_eq!(
        templates.styles().names(),
        [
            "global",
            "layout",
            "header",
            "errorInfo",
            "errorStack",
            "errorCause",
            "errorMetadata",
            INJECTED_BUCKET,
        ]
    );
    assert!(html.contains(
        "<style id=\"injected-styles\">a { color: red }\nb { color: blue }</style>"
    ));
    let metadata_tag = html.find(r#"<style id="errorMetadata-styles">"#).unwrap();
    let injected_tag = html.find(r#"<style id="injected-styles">"#).unwrap();
    assert!(metadata_tag < injected_tag);
}

#[test]
fn injecting_after_a_render_still_sorts_last() {
    let config = config();
    let mut templates = Templates::new(false);
    templates
        .to_html(&boom(), &Metadata::new(), &options(&config))
        .unwrap();
    templates.inject_styles("late {}");

    let html = templates
        .to_html(&boom(), &Metadata::new(), &options(&config))
        .unwrap();
    assert_eq!(templates.styles().names().last(), Some(&INJECTED_BUCKET));
    assert!(html.trim_end().len() > html.find("late {}").unwrap());
}

#[test]
fn stack_source_assets_follow_stack_assets() {
    let config = config();
    let mut templates = Templates::new(false);
    let error = boom().with_frames(vec![app_frame()]);
    templates
        .to_html(&error, &Metadata::new(), &options(&config))
        .unwrap();

    let names = templates.styles().names();
    let stack = names.iter().position(|n| *n == "errorStack").unwrap();
    assert_eq!(names[stack + 1], "errorStackSource");
    assert_eq!(names[stack + 2], "errorCause");
    assert_eq!(templates.scripts().names(), ["layout", "header", "errorStack"]);
}

#[test]
fn assets_are_recorded_once_per_registry() {
    let config = config();
    let mut templates = Templates::new(false);
    let first = templates
        .to_html(&boom(), &Metadata::new(), &options(&config))
        .unwrap();
    let recorded = templates.styles().len();
    let second = templates
        .to_html(&boom(), &Metadata::new(), &options(&config))
        .unwrap();

    assert_eq!(templates.styles().len(), recorded);
    assert_eq!(first, second);
    assert_eq!(second.matches(r#"id="layout-styles""#).count(), 1);
}

#[test]
fn csp_nonce_is_stamped_on_every_tag() {
    let config = config();
    let render = RenderOptions {
        csp_nonce: Some("r4nd0m"),
        ..options(&config)
    };
    let html = Templates::new(false)
        .to_html(&boom(), &Metadata::new(), &render)
        .unwrap();

    let styles = html.matches("<style").count();
    let scripts = html.matches("<script").count();
    assert!(styles > 0 && scripts > 0);
    assert_eq!(
        html.matches(r#" nonce="r4nd0m""#).count(),
        styles + scripts
    );
}

#[test]
fn custom_component_replaces_slot_and_its_styles() {
    let mut css = tempfile::NamedTempFile::new().unwrap();
    write!(css, "header {{ border: 0 }}").unwrap();

    let config = config();
    let mut templates = Templates::new(false);
    templates
        .use_named(
            "header",
            SlotComponent::Header(Box::new(PlainHeader {
                style: Asset::file(css.path()),
            })),
        )
        .unwrap();
    let html = templates
        .to_html(&boom(), &Metadata::new(), &options(&config))
        .unwrap();

    assert!(html.contains("<header>custom header</header>"));
    assert!(!html.contains("toggle-theme-checkbox"));
    assert_eq!(templates.styles().get("header"), Some("header { border: 0 }"));
    assert_eq!(templates.scripts().get("header"), None);

    let ansi = templates
        .to_ansi(&boom(), &Metadata::new(), &options(&config))
        .unwrap();
    assert!(ansi.starts_with("\ncustom header\n"));
}

#[test]
fn unknown_slot_is_rejected() {
    let mut templates = Templates::new(false);
    let err = templates
        .use_named(
            "footer",
            SlotComponent::Header(Box::new(PlainHeader {
                style: Asset::file("unused.css"),
            })),
        )
        .unwrap_err();
    assert!(matches!(err, RenderError::UnknownSlot(ref name) if name == "footer"));
}

#[test]
fn missing_asset_aborts_render() {
    let dir = tempfile::tempdir().unwrap();
    let config = config();
    let mut templates = Templates::new(false);
    templates.use_component(SlotComponent::Header(Box::new(PlainHeader {
        style: Asset::file(dir.path().join("gone.css")),
    })));

    let err = templates
        .to_html(&boom(), &Metadata::new(), &options(&config))
        .unwrap_err();
    match err {
        RenderError::AssetRead { name, path, .. } => {
            assert_eq!(name, "header");
            assert!(path.ends_with("gone.css"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn highlighter_failure_aborts_render() {
    let config = config();
    let mut templates = Templates::new(false).with_highlighter(FailingHighlighter);
    let error = boom().with_frames(vec![app_frame()]);

    let err = templates
        .to_html(&error, &Metadata::new(), &options(&config))
        .unwrap_err();
    assert!(matches!(err, RenderError::Highlight(_)));
    assert!(templates
        .to_ansi(&error, &Metadata::new(), &options(&config))
        .is_err());
}

#[test]
fn metadata_row_renders_once() {
    let config = config();
    let mut metadata = Metadata::new();
    metadata.group(
        "Request",
        [("headers", vec![MetadataRow::new("host", "localhost:3000")])],
    );
    let html = Templates::new(false)
        .to_html(&boom(), &metadata, &options(&config))
        .unwrap();

    assert_eq!(html.matches(r#"<td class="table-key">"#).count(), 1);
    assert_eq!(html.matches(r#"<td class="table-key">host</td>"#).count(), 1);
    assert!(html.contains(r#"<td class="table-value">localhost:3000</td>"#));
    assert!(html.contains(r#"<h3 class="card-title">Request</h3>"#));
    assert!(html.contains(r#"<h4 class="card-subtitle">headers</h4>"#));
}

#[test]
fn nested_metadata_values_go_through_the_dumper() {
    let config = config();
    let mut metadata = Metadata::new();
    metadata.group(
        "App",
        [
            ("user", MetadataRow::new("user", serde_json::json!({ "id": 7 }))),
            ("version", MetadataRow::new("version", "1.2.0").dumped()),
        ],
    );
    let html = Templates::new(false)
        .to_html(&boom(), &metadata, &options(&config))
        .unwrap();

    assert!(html.contains(r#"<span class="dumper-key">&quot;id&quot;</span>"#));
    assert!(html.contains(r#"<span class="dumper-string">&quot;1.2.0&quot;</span>"#));
}

#[test]
fn ansi_transcript_of_expanded_frame() {
    let config = config();
    let render = RenderOptions {
        title: "",
        ..options(&config)
    };
    let error = boom().with_frames(vec![
        faultline::StackFrame::app()
            .with_file("/proj/src/a.ts")
            .with_location(2, 5)
            .with_function("main")
            .with_source(fixtures::window(1, &["let a = 1", "boom()", "done"])),
    ]);
    let out = Templates::new(false)
        .to_ansi(&error, &Metadata::new(), &render)
        .unwrap();

    insta::assert_snapshot!(out.trim(), @r"
    Error  boom

     ⁃ at main (src/a.ts:2:5)

       1 ┃  let a = 1
     ❯ 2 ┃  boom()
       3 ┃  done
    ");
}

#[test]
fn ansi_metadata_listing() {
    let config = config();
    let mut metadata = Metadata::new();
    metadata.group("Request", [("method", MetadataRow::new("Method", "GET"))]);
    let out = Templates::new(false)
        .to_ansi(&boom(), &metadata, &options(&config))
        .unwrap();

    assert!(out.ends_with("\n\nRequest\n  method\n    Method: GET\n"));
}

#[test]
fn dumper_failure_aborts_render() {
    let config = config();
    let raw = serde_json::json!({ "name": "Error", "frames": [] });
    let error = boom().with_raw(raw);
    let dumper = || FailingDumper { fail_raw: false };

    assert!(Templates::new(false)
        .with_dumper(dumper())
        .to_html(&error, &Metadata::new(), &options(&config))
        .is_ok());

    let with_cause = error.clone().with_cause(serde_json::json!({ "code": "E1" }));
    let err = Templates::new(false)
        .with_dumper(dumper())
        .to_html(&with_cause, &Metadata::new(), &options(&config))
        .unwrap_err();
    assert!(matches!(err, RenderError::Dump(_)));

    let mut metadata = Metadata::new();
    metadata.group("App", [("user", MetadataRow::new("user", serde_json::json!({ "id": 7 })))]);
    let err = Templates::new(false)
        .with_dumper(dumper())
        .to_html(&error, &metadata, &options(&config))
        .unwrap_err();
    assert!(matches!(err, RenderError::Dump(_)));

    let raw_config = config.clone().with_raw_stack(Some(2));
    let err = Templates::new(false)
        .with_dumper(FailingDumper { fail_raw: true })
        .to_ansi(&error, &Metadata::new(), &options(&raw_config))
        .unwrap_err();
    assert!(matches!(err, RenderError::Dump(ref message) if message == "cannot format value"));
}
