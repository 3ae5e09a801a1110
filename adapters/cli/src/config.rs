//! Top-level run configuration for the command-line adapter.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use synthmap_core::{RenderConfig, SceneConfig};

/// Bundled scene and render configuration.
///
/// Every field falls back to its frozen default when absent from the file,
/// so a minimal run needs no configuration at all.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct AppConfig {
    /// Scene parameters shared by every sample of the run.
    #[serde(default)]
    pub(crate) scene: SceneConfig,
    /// Render style configuration.
    #[serde(default)]
    pub(crate) render: RenderConfig,
}

/// Loads a TOML configuration file.
pub(crate) fn load_app_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}
