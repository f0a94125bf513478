//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod extract;
pub mod fields;

use std::path::Path;

use invx_core::models::config::InvxConfig;

use config::default_config_path;

/// Load the config named by `--config`, else the default file if it exists,
/// else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvxConfig> {
    if let Some(path) = config_path {
        return Ok(InvxConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        tracing::debug!("Using config file {}", default_path.display());
        Ok(InvxConfig::from_file(&default_path)?)
    } else {
        Ok(InvxConfig::default())
    }
}
