//! Wiring of [`BlueScreenHandler`] from configuration.
//!
//! The factory collects contributors during startup, then `build` freezes
//! them into the handler. Nothing can be registered once the handler exists.

use std::path::Path;
use std::sync::Arc;

use crate::config::{BlueScreenSettings, HandlerConfig};
use crate::contributor::{ContributorRegistry, InfoProvider, Panel, PanelCatalog, StaticInfo};
use crate::errors::{BlueScreenError, BlueScreenResult};
use crate::handler::BlueScreenHandler;
use crate::renderer::{HtmlRenderer, Renderer};

/// Stable names other wiring code can refer to.
pub mod keys {
    /// Configuration option names.
    pub const LOG_DIRECTORY: &str = "log_directory";
    pub const BUBBLE: &str = "bubble";
    pub const LEVEL: &str = "level";
    pub const INFO_ITEMS: &str = "info_items";
    pub const PANELS: &str = "panels";
    pub const FORMAT: &str = "format";

    /// Canonical parameter names.
    pub const LOG_DIRECTORY_PARAMETER: &str = "mmf_bluescreen.log_directory";
    pub const HANDLER_BUBBLE_PARAMETER: &str = "mmf_bluescreen.handler.bubble";
    pub const HANDLER_LEVEL_PARAMETER: &str = "mmf_bluescreen.handler.level";

    /// Service identifiers.
    pub const BLUESCREEN_HANDLER_SERVICE_ID: &str = "mmf_bluescreen.handler";
    pub const BLUESCREEN_FACTORY_SERVICE_ID: &str = "mmf_bluescreen.factory";
}

/// Builder for [`BlueScreenHandler`].
pub struct BlueScreenFactory {
    registry: ContributorRegistry,
    renderer: Arc<dyn Renderer>,
}

impl Default for BlueScreenFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BlueScreenFactory {
    pub fn new() -> Self {
        Self {
            registry: ContributorRegistry::new(),
            renderer: Arc::new(HtmlRenderer),
        }
    }

    /// Factory pre-populated from settings: each `info_items` entry becomes
    /// a static info provider and each `panels` entry is looked up in
    /// `catalog`. Unknown panel names are a configuration error.
    pub fn from_settings(
        settings: &BlueScreenSettings,
        catalog: &PanelCatalog,
    ) -> BlueScreenResult<Self> {
        let mut factory = Self::new().with_renderer(Arc::from(settings.format().renderer()));

        for text in &settings.info_items {
            factory.register_info(StaticInfo::new(text.clone()));
        }
        for name in &settings.panels {
            let panel = catalog
                .get(name)
                .ok_or_else(|| BlueScreenError::unknown_panel(name.clone()))?;
            factory.register_panel_arc(panel);
        }

        Ok(factory)
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn register_info(&mut self, provider: impl InfoProvider + 'static) -> &mut Self {
        self.registry.register_info_provider(Arc::new(provider));
        self
    }

    pub fn register_panel(&mut self, panel: impl Panel + 'static) -> &mut Self {
        self.registry.register_panel(Arc::new(panel));
        self
    }

    pub fn register_panel_arc(&mut self, panel: Arc<dyn Panel>) -> &mut Self {
        self.registry.register_panel(panel);
        self
    }

    pub fn registry(&self) -> &ContributorRegistry {
        &self.registry
    }

    /// Freeze the registry and build the handler.
    pub fn build(self, config: HandlerConfig) -> BlueScreenResult<BlueScreenHandler> {
        BlueScreenHandler::new(config, self.registry, self.renderer)
    }
}

/// Resolve settings and build a handler in one step.
pub fn build_from_settings(
    settings: &BlueScreenSettings,
    logs_root: &Path,
    catalog: &PanelCatalog,
) -> BlueScreenResult<BlueScreenHandler> {
    let config = settings.resolve(logs_root)?;
    BlueScreenFactory::from_settings(settings, catalog)?.build(config)
}
