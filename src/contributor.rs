//! Diagnostic contributors and the ordered registry that holds them.
//!
//! A contributor is either an [`InfoProvider`] (label/value facts) or a
//! [`Panel`] (a named block of structured content). The registry keeps
//! every registration in order, duplicates included.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::log_sink::LogRecord;

/// One label/value fact shown in the report header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoItem {
    pub label: String,
    pub value: String,
}

impl InfoItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Named block of content contributed by a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelContent {
    pub tab: String,
    pub body: Value,
}

impl PanelContent {
    pub fn new(tab: impl Into<String>, body: impl Into<Value>) -> Self {
        Self {
            tab: tab.into(),
            body: body.into(),
        }
    }
}

/// Supplies label/value facts for a report.
pub trait InfoProvider: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn provide_info(&self, record: &LogRecord) -> anyhow::Result<Vec<InfoItem>>;
}

/// Supplies a named content block for a report.
///
/// Returning `Ok(None)` means the panel has nothing to say about this record.
pub trait Panel: Send + Sync {
    fn name(&self) -> &str;

    fn render_panel(&self, record: &LogRecord) -> anyhow::Result<Option<PanelContent>>;
}

/// Fixed text registered from configuration.
#[derive(Debug, Clone)]
pub struct StaticInfo {
    text: String,
}

impl StaticInfo {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl InfoProvider for StaticInfo {
    fn name(&self) -> &str {
        "static"
    }

    fn provide_info(&self, _record: &LogRecord) -> anyhow::Result<Vec<InfoItem>> {
        Ok(vec![InfoItem::new("info", self.text.clone())])
    }
}

type InfoFn = dyn Fn(&LogRecord) -> anyhow::Result<Vec<InfoItem>> + Send + Sync;
type PanelFn = dyn Fn(&LogRecord) -> anyhow::Result<Option<PanelContent>> + Send + Sync;

/// Info provider backed by a closure.
pub struct FnInfoProvider {
    name: String,
    func: Box<InfoFn>,
}

/// Build an info provider from a closure.
pub fn info_fn<F>(name: impl Into<String>, func: F) -> FnInfoProvider
where
    F: Fn(&LogRecord) -> anyhow::Result<Vec<InfoItem>> + Send + Sync + 'static,
{
    FnInfoProvider {
        name: name.into(),
        func: Box::new(func),
    }
}

impl InfoProvider for FnInfoProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn provide_info(&self, record: &LogRecord) -> anyhow::Result<Vec<InfoItem>> {
        (self.func)(record)
    }
}

/// Panel backed by a closure.
pub struct FnPanel {
    name: String,
    func: Box<PanelFn>,
}

/// Build a panel from a closure.
pub fn panel_fn<F>(name: impl Into<String>, func: F) -> FnPanel
where
    F: Fn(&LogRecord) -> anyhow::Result<Option<PanelContent>> + Send + Sync + 'static,
{
    FnPanel {
        name: name.into(),
        func: Box::new(func),
    }
}

impl Panel for FnPanel {
    fn name(&self) -> &str {
        &self.name
    }

    fn render_panel(&self, record: &LogRecord) -> anyhow::Result<Option<PanelContent>> {
        (self.func)(record)
    }
}

/// A registered contributor.
#[derive(Clone)]
pub enum Contributor {
    Info(Arc<dyn InfoProvider>),
    Panel(Arc<dyn Panel>),
}

impl fmt::Debug for Contributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contributor::Info(p) => f.debug_tuple("Info").field(&p.name()).finish(),
            Contributor::Panel(p) => f.debug_tuple("Panel").field(&p.name()).finish(),
        }
    }
}

/// Append-only, order-preserving list of contributors.
#[derive(Debug, Clone, Default)]
pub struct ContributorRegistry {
    contributors: Vec<Contributor>,
}

impl ContributorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_info_provider(&mut self, provider: Arc<dyn InfoProvider>) {
        self.contributors.push(Contributor::Info(provider));
    }

    pub fn register_panel(&mut self, panel: Arc<dyn Panel>) {
        self.contributors.push(Contributor::Panel(panel));
    }

    /// Info providers in registration order.
    pub fn info_providers(&self) -> impl Iterator<Item = &Arc<dyn InfoProvider>> {
        self.contributors.iter().filter_map(|c| match c {
            Contributor::Info(p) => Some(p),
            Contributor::Panel(_) => None,
        })
    }

    /// Panels in registration order.
    pub fn panels(&self) -> impl Iterator<Item = &Arc<dyn Panel>> {
        self.contributors.iter().filter_map(|c| match c {
            Contributor::Panel(p) => Some(p),
            Contributor::Info(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }
}

/// Panels addressable by name, used when configuration lists panels to
/// attach.
#[derive(Default, Clone)]
pub struct PanelCatalog {
    panels: HashMap<String, Arc<dyn Panel>>,
}

impl PanelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a panel under its own name, replacing any previous entry.
    pub fn insert(&mut self, panel: Arc<dyn Panel>) -> &mut Self {
        self.panels.insert(panel.name().to_string(), panel);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Panel>> {
        self.panels.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.panels.contains_key(name)
    }
}

impl fmt::Debug for PanelCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.panels.keys().collect();
        names.sort();
        f.debug_struct("PanelCatalog").field("panels", &names).finish()
    }
}
