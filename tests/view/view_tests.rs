use std::error::Error;
use std::io;

use faultline::parser::CapturedError;
use faultline::text::strip_ansi;
use faultline::{
    AnsiOptions, ErrorView, HtmlOptions, JsonOptions, MetadataRow, ParsedError, RenderConfig,
    RequestInfo, SourceLine, StackFrame,
};

fn config() -> RenderConfig {
    RenderConfig::default().with_cwd("/proj").with_color(false)
}

fn view() -> ErrorView {
    ErrorView::with_config(config())
}

fn handler_frame() -> StackFrame {
    StackFrame::app()
        .with_file("/proj/src/a.ts")
        .with_location(10, 3)
        .with_function("handler")
        .with_source(vec![
            SourceLine::new(9, "const a = 1"),
            SourceLine::new(10, "throw new Error('boom')"),
            SourceLine::new(11, "return a"),
        ])
}

fn captured() -> CapturedError {
    CapturedError::new("boom")
        .with_name("TypeError")
        .with_hint("Check the handler")
        .with_frame(handler_frame())
}

/// Drop markup so the remaining text can be compared with a terminal transcript.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[test]
fn html_and_ansi_carry_the_same_facts() {
    let error = captured();
    let ansi = strip_ansi(&view().to_ansi(&error, AnsiOptions::default()).unwrap());
    let html = strip_tags(&view().to_html(&error, HtmlOptions::default()).unwrap());

    for fact in ["TypeError", "boom", "Check the handler", "handler", "src/a.ts"] {
        assert!(ansi.contains(fact), "ansi is missing {fact:?}");
        assert!(html.contains(fact), "html is missing {fact:?}");
    }
}

#[test]
fn request_context_becomes_a_metadata_group() {
    let request = RequestInfo::new()
        .with_url("/users?id=1")
        .with_method("POST")
        .with_header("host", "localhost:3000")
        .with_header("Cookie", "sid=abc; theme=dark");
    let html = view()
        .to_html(&captured(), HtmlOptions::default().with_request(request))
        .unwrap();

    assert!(html.contains(r#"<h3 class="card-title">Request</h3>"#));
    assert!(html.contains(r#"<h4 class="card-subtitle">url</h4>"#));
    assert!(html.contains("/users?id=1"));
    assert!(html.contains(r#"<h4 class="card-subtitle">headers</h4>"#));
    assert!(html.contains(r#"<td class="table-key">host</td>"#));
    assert!(html.contains(r#"<td class="table-value">localhost:3000</td>"#));
    assert!(html.contains(r#"<td class="table-key">Cookie</td>"#));
    assert!(html.contains(r#"<span class="dumper-key">&quot;sid&quot;</span>"#));
    assert!(html.contains(r#"<span class="dumper-string">&quot;dark&quot;</span>"#));
}

#[test]
fn request_group_merges_with_caller_metadata() {
    let mut view = view();
    view.metadata_mut().group(
        "Request",
        [("headers", MetadataRow::new("x-trace", "42"))],
    );
    let request = RequestInfo::new().with_header("host", "example.com");
    let html = view
        .to_html(&captured(), HtmlOptions::default().with_request(request))
        .unwrap();

    let trace = html.find(r#"<td class="table-key">x-trace</td>"#).unwrap();
    let host = html.find(r#"<td class="table-key">host</td>"#).unwrap();
    assert!(trace < host);
    assert_eq!(html.matches(r#"<h3 class="card-title">Request</h3>"#).count(), 1);
}

#[test]
fn metadata_is_listed_in_the_transcript() {
    let mut view = view();
    view.metadata_mut()
        .group("App", [("release", MetadataRow::new("version", "1.4.2"))]);
    let ansi = view.to_ansi(&captured(), AnsiOptions::default()).unwrap();
    assert!(ansi.contains("\n\nApp\n  release\n    version: 1.4.2"));
}

#[test]
fn title_defaults_and_is_escaped() {
    let html = view().to_html(&captured(), HtmlOptions::default()).unwrap();
    assert!(html.contains("<title>An error has occurred</title>"));

    let html = view()
        .to_html(&captured(), HtmlOptions::default().with_title("<Oops & co>"))
        .unwrap();
    assert!(html.contains("<title>&lt;Oops &amp; co&gt;</title>"));
    assert!(!html.contains("<Oops"));
}

#[test]
fn ansi_transcript_has_no_title() {
    let ansi = view().to_ansi(&captured(), AnsiOptions::default()).unwrap();
    assert!(!ansi.contains("An error has occurred"));
    assert!(ansi.contains(" TypeError  boom"));
}

#[test]
fn call_ide_beats_configured_editor() {
    let config = config().with_editor("atom");

    let html = ErrorView::with_config(config.clone())
        .to_html(&captured(), HtmlOptions::default())
        .unwrap();
    assert!(html.contains(r#"href="atom://core/open/file?filename=src/a.ts&amp;line=10""#));

    let html = ErrorView::with_config(config)
        .to_html(&captured(), HtmlOptions::default().with_ide("vscode"))
        .unwrap();
    assert!(html.contains(r#"href="vscode://file/src/a.ts:10""#));
    assert!(!html.contains("atom://"));
}

#[test]
fn custom_url_template_is_accepted() {
    let html = view()
        .to_html(
            &captured(),
            HtmlOptions::default().with_ide("idea://open?file=%f&line=%l"),
        )
        .unwrap();
    assert!(html.contains(r#"href="idea://open?file=src/a.ts&amp;line=10""#));
}

#[test]
fn csp_nonce_reaches_every_tag() {
    let html = view()
        .to_html(&captured(), HtmlOptions::default().with_csp_nonce("abc123"))
        .unwrap();
    let tags = html.matches("<style").count() + html.matches("<script").count();
    assert_eq!(html.matches(r#" nonce="abc123""#).count(), tags);
}

#[test]
fn json_drops_offset_frames() {
    let error = CapturedError::new("boom").with_frames([
        StackFrame::native().with_function("throwError"),
        handler_frame(),
        StackFrame::module()
            .with_file("/proj/node_modules/koa/index.js")
            .with_location(1, 1),
    ]);
    let parsed = view()
        .to_json(&error, JsonOptions { offset: 1 })
        .unwrap();

    assert_eq!(parsed.frames.len(), 2);
    assert_eq!(parsed.frames[0].function_name.as_deref(), Some("handler"));
    assert_eq!(parsed.raw["frames"].as_array().map(Vec::len), Some(2));
    assert_eq!(parsed.raw["name"], "Error");

    let all = view().to_json(&error, JsonOptions { offset: 10 }).unwrap();
    assert!(all.frames.is_empty());
}

#[test]
fn foreign_errors_render_through_display() {
    let error = io::Error::new(io::ErrorKind::NotFound, "config.toml not found");
    let parsed = view().to_json(&error, JsonOptions::default()).unwrap();
    assert_eq!(parsed.name, "Error");
    assert_eq!(parsed.message, "config.toml not found");

    let html = view().to_html(&error, HtmlOptions::default()).unwrap();
    assert!(html.contains("config.toml not found"));
}

#[test]
fn parser_hook_substitutes_the_error() {
    let mut view = view();
    view.use_parser(|err: &(dyn Error + 'static)| {
        err.downcast_ref::<io::Error>().map(|io_err| {
            Box::new(
                CapturedError::new(io_err.to_string())
                    .with_name("IoError")
                    .with_hint("Is the disk mounted?"),
            ) as Box<dyn Error + Send + Sync>
        })
    });

    let parsed = view
        .to_json(&io::Error::other("read failed"), JsonOptions::default())
        .unwrap();
    assert_eq!(parsed.name, "IoError");
    assert_eq!(parsed.hint.as_deref(), Some("Is the disk mounted?"));

    let untouched = view.to_json(&captured(), JsonOptions::default()).unwrap();
    assert_eq!(untouched.name, "TypeError");
}

#[test]
fn transformers_run_in_registration_order() {
    let mut view = view();
    view.use_transformer(|parsed: &mut ParsedError, _: &(dyn Error + 'static)| {
        parsed.message.push_str(" (first)");
    })
    .use_transformer(|parsed: &mut ParsedError, _: &(dyn Error + 'static)| {
        parsed.message.push_str(" (second)");
    });

    let ansi = view.to_ansi(&captured(), AnsiOptions::default()).unwrap();
    assert!(ansi.contains("boom (first) (second)"));
}

#[test]
fn source_loader_fills_missing_windows() {
    let mut view = view();
    view.define_source_loader(|frame: &StackFrame| {
        let line = frame.line_number.unwrap_or(1);
        Ok(Some(vec![SourceLine::new(line, "loaded from disk")]))
    });

    let error = CapturedError::new("boom").with_frame(
        StackFrame::app()
            .with_file("/proj/src/b.ts")
            .with_location(4, 1)
            .with_function("load"),
    );
    let ansi = view.to_ansi(&error, AnsiOptions::default()).unwrap();
    assert!(ansi.contains(" ❯ 4 ┃  loaded from disk"));
}

#[test]
fn templates_can_be_customized_through_the_view() {
    let mut view = view();
    view.templates_mut().inject_styles(".frame { outline: 0 }");
    let html = view.to_html(&captured(), HtmlOptions::default()).unwrap();
    assert!(html.contains(r#"<style id="injected-styles">.frame { outline: 0 }</style>"#));
}

#[test]
fn cookies_keep_header_order() {
    let request = RequestInfo::new().with_header("cookie", "zeta=1; alpha=2");
    let html = view()
        .to_html(&captured(), HtmlOptions::default().with_request(request))
        .unwrap();

    let zeta = html.find("&quot;zeta&quot;").unwrap();
    let alpha = html.find("&quot;alpha&quot;").unwrap();
    assert!(zeta < alpha);
}

#[test]
fn dumped_objects_keep_caller_key_order() {
    let mut view = view();
    view.metadata_mut().group(
        "App",
        [(
            "user",
            MetadataRow::new(
                "user",
                serde_json::json!({ "name": "Ada", "email": "ada@example.com", "id": 1 }),
            ),
        )],
    );
    let html = view.to_html(&captured(), HtmlOptions::default()).unwrap();

    let name = html.find("&quot;name&quot;</span>: <span class=\"dumper-string\">&quot;Ada").unwrap();
    let id = html.find("&quot;id&quot;").unwrap();
    assert!(name < id);
}
