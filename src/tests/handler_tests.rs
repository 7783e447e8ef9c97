// Handler behaviour: skip, emit, bubble and failure containment

use std::fs;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use crate::config::HandlerConfig;
use crate::contributor::{panel_fn, PanelContent};
use crate::errors::{BlueScreenError, BlueScreenResult};
use crate::factory::BlueScreenFactory;
use crate::handler::{BlueScreenHandler, FailureStage, HandleOutcome, LogHandler};
use crate::log_sink::{LogLevel, LogRecord};
use crate::renderer::Renderer;
use crate::report::Report;

struct BrokenRenderer;

impl Renderer for BrokenRenderer {
    fn render(&self, _report: &Report) -> BlueScreenResult<Vec<u8>> {
        Err(BlueScreenError::render("template missing"))
    }

    fn extension(&self) -> &str {
        "html"
    }
}

struct PanickingRenderer;

impl Renderer for PanickingRenderer {
    fn render(&self, _report: &Report) -> BlueScreenResult<Vec<u8>> {
        panic!("renderer bug")
    }

    fn extension(&self) -> &str {
        "html"
    }
}

fn handler_in(dir: &TempDir, bubble: bool) -> BlueScreenHandler {
    let config = HandlerConfig::new(dir.path().join("logs")).with_bubble(bubble);
    BlueScreenFactory::new().build(config).unwrap()
}

fn snapshot_count(handler: &BlueScreenHandler) -> usize {
    handler.writer().list_snapshots().unwrap().len()
}

#[test]
fn below_threshold_writes_nothing_and_returns_bubble() {
    let dir = TempDir::new().unwrap();
    for bubble in [false, true] {
        let handler = handler_in(&dir, bubble);
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Notice, LogLevel::Warning] {
            let record = LogRecord::new(level, "routine");
            assert_eq!(handler.process(&record), HandleOutcome::Skipped);
            assert_eq!(handler.handle(&record), bubble);
        }
        assert_eq!(snapshot_count(&handler), 0);
    }
}

#[test]
fn each_qualifying_record_creates_exactly_one_artifact() {
    let dir = TempDir::new().unwrap();
    let handler = handler_in(&dir, false);

    for (i, level) in [LogLevel::Error, LogLevel::Critical, LogLevel::Alert, LogLevel::Emergency]
        .into_iter()
        .enumerate()
    {
        assert!(!handler.handle(&LogRecord::new(level, format!("incident {i}"))));
        assert_eq!(snapshot_count(&handler), i + 1);
    }
}

#[test]
fn written_artifact_contains_message() {
    let dir = TempDir::new().unwrap();
    let handler = handler_in(&dir, true);

    let outcome = handler.process(&LogRecord::new(LogLevel::Error, "disk quota exceeded"));
    let path = match &outcome {
        HandleOutcome::Written { path, .. } => path.clone(),
        other => panic!("expected written outcome, got {other:?}"),
    };

    let html = fs::read_to_string(path).unwrap();
    assert!(html.contains("disk quota exceeded"));
}

#[test]
fn failing_panel_still_produces_artifact_with_message() {
    let dir = TempDir::new().unwrap();
    let mut factory = BlueScreenFactory::new();
    factory.register_panel(panel_fn("db", |_| Err(anyhow::anyhow!("pool exhausted"))));
    factory.register_panel(panel_fn("request", |_| {
        Ok(Some(PanelContent::new("Request", json!({ "method": "POST" }))))
    }));
    let handler = factory
        .build(HandlerConfig::new(dir.path().join("logs")))
        .unwrap();

    let outcome = handler.process(&LogRecord::new(LogLevel::Error, "checkout crashed"));
    let html = fs::read_to_string(outcome.path().unwrap()).unwrap();

    assert!(html.contains("checkout crashed"));
    assert!(html.contains("panel db failed: pool exhausted"));
    assert!(html.contains("POST"));
}

#[test]
fn render_failure_is_contained_with_fallback() {
    let dir = TempDir::new().unwrap();
    let handler = BlueScreenFactory::new()
        .with_renderer(Arc::new(BrokenRenderer))
        .build(HandlerConfig::new(dir.path().join("logs")))
        .unwrap();

    let outcome = handler.process(&LogRecord::new(LogLevel::Error, "triggering problem"));

    match &outcome {
        HandleOutcome::Contained {
            stage,
            error,
            fallback,
        } => {
            assert_eq!(*stage, FailureStage::Render);
            assert!(error.contains("template missing"));
            let text = fs::read_to_string(fallback.as_ref().unwrap()).unwrap();
            assert!(text.contains("triggering problem"));
        }
        other => panic!("expected contained outcome, got {other:?}"),
    }
    assert!(!handler.handle(&LogRecord::new(LogLevel::Error, "again")));
}

#[test]
fn renderer_panic_is_contained() {
    let dir = TempDir::new().unwrap();
    let handler = BlueScreenFactory::new()
        .with_renderer(Arc::new(PanickingRenderer))
        .build(HandlerConfig::new(dir.path().join("logs")).with_bubble(true))
        .unwrap();

    let record = LogRecord::new(LogLevel::Critical, "x");
    let outcome = handler.process(&record);

    assert!(outcome.is_contained());
    assert!(handler.handle(&record));
}

#[test]
fn write_failure_is_contained_and_bubble_returned() {
    let dir = TempDir::new().unwrap();
    let logs = dir.path().join("logs");
    let handler = BlueScreenFactory::new()
        .build(HandlerConfig::new(&logs).with_bubble(true))
        .unwrap();

    // Replace the directory with a plain file after wiring
    fs::remove_dir_all(&logs).unwrap();
    fs::write(&logs, b"in the way").unwrap();

    let record = LogRecord::new(LogLevel::Error, "cannot persist");
    match handler.process(&record) {
        HandleOutcome::Contained {
            stage, fallback, ..
        } => {
            assert_eq!(stage, FailureStage::Write);
            assert!(fallback.is_none());
        }
        other => panic!("expected contained outcome, got {other:?}"),
    }
    assert!(handler.handle(&record));
}

#[test]
fn custom_minimum_level_is_honoured() {
    let dir = TempDir::new().unwrap();
    let handler = BlueScreenFactory::new()
        .build(HandlerConfig::new(dir.path().join("logs")).with_minimum_level(LogLevel::Warning))
        .unwrap();

    assert!(handler.is_handling(LogLevel::Warning));
    assert!(!handler.is_handling(LogLevel::Notice));
    assert!(matches!(
        handler.process(&LogRecord::new(LogLevel::Warning, "slow query")),
        HandleOutcome::Written { .. }
    ));
}

struct NamelessPanel;

impl crate::contributor::Panel for NamelessPanel {
    fn name(&self) -> &str {
        panic!("name lookup failed")
    }

    fn render_panel(&self, _record: &LogRecord) -> anyhow::Result<Option<PanelContent>> {
        Ok(None)
    }
}

#[test]
fn panicking_panel_name_still_writes_full_report() {
    let dir = TempDir::new().unwrap();
    let mut factory = BlueScreenFactory::new();
    factory
        .register_panel(NamelessPanel)
        .register_panel(panel_fn("request", |_| {
            Ok(Some(PanelContent::new("Request", json!({ "ok": true }))))
        }));
    let handler = factory
        .build(HandlerConfig::new(dir.path().join("logs")))
        .unwrap();

    let outcome = handler.process(&LogRecord::new(LogLevel::Error, "nameless panel"));

    let path = match outcome {
        HandleOutcome::Written { path, .. } => path,
        other => panic!("expected written snapshot, got {other:?}"),
    };
    let html = fs::read_to_string(path).unwrap();
    assert!(html.contains("nameless panel"));
    assert!(html.contains("data-panel=\"request\""));
    assert!(html.contains("name lookup failed"));
}
