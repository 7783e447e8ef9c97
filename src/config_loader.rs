use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::config::BlueScreenSettings;
use crate::errors::BlueScreenResult;

pub const DEFAULT_CONFIG_FILE: &str = "bluescreen.toml";
pub const ENV_PREFIX: &str = "BLUESCREEN_";

/// Layered settings: built-in defaults, then the TOML file (if present),
/// then `BLUESCREEN_*` environment variables.
pub fn settings_figment(config_path: Option<&Path>) -> Figment {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    Figment::from(Serialized::defaults(BlueScreenSettings::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

pub fn load_settings(config_path: Option<&Path>) -> BlueScreenResult<BlueScreenSettings> {
    let settings: BlueScreenSettings = settings_figment(config_path).extract()?;
    Ok(settings)
}
