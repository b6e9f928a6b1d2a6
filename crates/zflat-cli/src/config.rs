//! Settings file loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use zflat_flatten::FlattenSettings;

/// Parse a TOML settings document. Missing keys keep their defaults.
pub fn parse_settings(text: &str) -> Result<FlattenSettings> {
    let settings: FlattenSettings = toml::from_str(text).context("invalid settings file")?;
    Ok(settings)
}

/// Load settings from `path`, or the defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<FlattenSettings> {
    let Some(path) = path else {
        return Ok(FlattenSettings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    parse_settings(&text).with_context(|| format!("in {}", path.display()))
}
