// renderer.rs
// Purpose: Turn an assembled report into the bytes written to disk

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{BlueScreenError, BlueScreenResult};
use crate::log_sink::LogRecord;
use crate::report::{InfoEntry, PanelEntry, Report};

/// Serializes a report to a display format.
pub trait Renderer: Send + Sync {
    fn render(&self, report: &Report) -> BlueScreenResult<Vec<u8>>;

    /// File extension (without the dot) for artifacts this renderer produces.
    fn extension(&self) -> &str;
}

/// Built-in output formats selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Html,
    Json,
}

impl RenderFormat {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            RenderFormat::Html => Box::new(HtmlRenderer),
            RenderFormat::Json => Box::new(JsonRenderer),
        }
    }
}

impl FromStr for RenderFormat {
    type Err = BlueScreenError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "html" => Ok(RenderFormat::Html),
            "json" => Ok(RenderFormat::Json),
            other => Err(BlueScreenError::config(format!(
                "unsupported format '{other}', expected html or json"
            ))),
        }
    }
}

/// Self-contained HTML page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, report: &Report) -> BlueScreenResult<Vec<u8>> {
        let record = &report.record;
        let mut out = String::with_capacity(4096);

        // fmt::Write into a String cannot fail
        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{level}: {title}</title>\n\
             <style>body{{font:13px/1.5 sans-serif;margin:0}}\
             #bs-error{{background:#1f4fa8;color:#fff;padding:1.5em 2em}}\
             section{{padding:1em 2em;border-bottom:1px solid #ddd}}\
             pre{{background:#f4f4f4;padding:.5em;overflow:auto}}\
             .failed{{color:#b00}}</style>\n</head>\n<body>\n",
            level = record.level,
            title = escape_html(&first_line(&record.message)),
        );

        let _ = write!(
            out,
            "<div id=\"bs-error\">\n<p>{level} &middot; {channel} &middot; {ts}</p>\n\
             <h1>{message}</h1>\n<p>report {id}</p>\n</div>\n",
            level = record.level,
            channel = escape_html(&record.channel),
            ts = record.timestamp.to_rfc3339(),
            message = escape_html(&record.message),
            id = report.id,
        );

        if !record.context.is_empty() {
            let context = serde_json::to_string_pretty(&record.context)
                .map_err(|e| BlueScreenError::serialization("record context", e))?;
            let _ = write!(
                out,
                "<section id=\"bs-context\">\n<h2>Context</h2>\n<pre>{}</pre>\n</section>\n",
                escape_html(&context)
            );
        }

        if !report.info.is_empty() {
            out.push_str("<section id=\"bs-info\">\n<h2>Info</h2>\n<ul>\n");
            for entry in &report.info {
                match entry {
                    InfoEntry::Provided { items, .. } => {
                        for item in items {
                            let _ = writeln!(
                                out,
                                "<li><b>{}</b>: {}</li>",
                                escape_html(&item.label),
                                escape_html(&item.value)
                            );
                        }
                    }
                    InfoEntry::Failed { provider, reason } => {
                        let _ = writeln!(
                            out,
                            "<li class=\"failed\">info provider {} failed: {}</li>",
                            escape_html(provider),
                            escape_html(reason)
                        );
                    }
                }
            }
            out.push_str("</ul>\n</section>\n");
        }

        for entry in &report.panels {
            match entry {
                PanelEntry::Rendered { panel, content } => {
                    let body = serde_json::to_string_pretty(&content.body)
                        .map_err(|e| BlueScreenError::serialization("panel body", e))?;
                    let _ = write!(
                        out,
                        "<section class=\"bs-panel\" data-panel=\"{}\">\n<h2>{}</h2>\n<pre>{}</pre>\n</section>\n",
                        escape_html(panel),
                        escape_html(&content.tab),
                        escape_html(&body)
                    );
                }
                PanelEntry::Failed { .. } => {
                    let _ = write!(
                        out,
                        "<section class=\"bs-panel failed\">{}</section>\n",
                        escape_html(&entry.summary())
                    );
                }
                PanelEntry::Skipped { .. } => {}
            }
        }

        out.push_str("</body>\n</html>\n");
        Ok(out.into_bytes())
    }

    fn extension(&self) -> &str {
        "html"
    }
}

/// Pretty-printed JSON of the whole report.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, report: &Report) -> BlueScreenResult<Vec<u8>> {
        serde_json::to_vec_pretty(report).map_err(|e| BlueScreenError::serialization("report", e))
    }

    fn extension(&self) -> &str {
        "json"
    }
}

/// Plain-text report with only the raw record, used when the configured
/// renderer fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackRenderer;

impl FallbackRenderer {
    pub fn render_record(&self, record: &LogRecord, reason: &str) -> Vec<u8> {
        format!(
            "level: {}\ntimestamp: {}\nchannel: {}\nrender error: {}\n\n{}\n",
            record.level,
            record.timestamp.to_rfc3339(),
            record.channel,
            reason,
            record.message
        )
        .into_bytes()
    }

    pub fn extension(&self) -> &str {
        "txt"
    }
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().to_string()
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contributor::{panel_fn, ContributorRegistry, PanelContent, StaticInfo};
    use crate::log_sink::LogLevel;
    use crate::report::assemble;
    use serde_json::json;
    use std::sync::Arc;

    fn sample_report() -> Report {
        let mut registry = ContributorRegistry::new();
        registry.register_info_provider(Arc::new(StaticInfo::new("worker pool: 8 threads")));
        registry.register_panel(Arc::new(panel_fn("request", |_| {
            Ok(Some(PanelContent::new("Request", json!({ "path": "/checkout" }))))
        })));
        registry.register_panel(Arc::new(panel_fn("db", |_| Err(anyhow::anyhow!("timeout")))));

        let record = LogRecord::new(LogLevel::Critical, "payment <failed>")
            .with_context("order_id", 42);
        assemble(&record, &registry)
    }

    #[test]
    fn html_contains_message_panels_and_failures() {
        let html = String::from_utf8(HtmlRenderer.render(&sample_report()).unwrap()).unwrap();

        assert!(html.contains("payment &lt;failed&gt;"));
        assert!(html.contains("worker pool: 8 threads"));
        assert!(html.contains("data-panel=\"request\""));
        assert!(html.contains("panel db failed: timeout"));
        assert!(html.contains("order_id"));
    }

    #[test]
    fn json_round_trips_report() {
        let report = sample_report();
        let bytes = JsonRenderer.render(&report).unwrap();
        let parsed: Report = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.id, report.id);
        assert_eq!(parsed.panels.len(), 2);
    }

    #[test]
    fn fallback_keeps_raw_message() {
        let record = LogRecord::new(LogLevel::Error, "raw message");
        let text = String::from_utf8(FallbackRenderer.render_record(&record, "boom")).unwrap();
        assert!(text.contains("raw message"));
        assert!(text.contains("render error: boom"));
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("HTML".parse::<RenderFormat>().unwrap(), RenderFormat::Html);
        assert_eq!("json".parse::<RenderFormat>().unwrap(), RenderFormat::Json);
        assert!("xml".parse::<RenderFormat>().is_err());
    }
}
