use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;

pub const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "chatpane";

/// Platform config directory for chatpane, or a temp directory when the
/// platform has none
pub fn data_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join(APP_DIR_NAME),
        None => {
            log::warn!("No config directory on this platform, using the temp directory");
            temp_data_dir()
        }
    }
}

fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(APP_DIR_NAME)
}

/// Config file to load: `explicit` as given, otherwise `<data dir>/config.json`
/// written with defaults on first run. Falls back to the temp directory when
/// the data directory is not writable.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }

    let path = data_dir().join(CONFIG_FILE_NAME);
    match ensure_default_config_at(&path) {
        Ok(()) => path,
        Err(e) => {
            log::warn!("{:#}", e);
            let fallback = temp_data_dir().join(CONFIG_FILE_NAME);
            if let Err(e) = ensure_default_config_at(&fallback) {
                log::warn!("{:#}", e);
            }
            fallback
        }
    }
}

/// Write a default config file at `path` unless one already exists
pub fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }
    let content = serde_json::to_string_pretty(&Config::default())
        .context("Failed to serialize default config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config at {}", path.display()))?;
    Ok(config)
}

/// Load the config at `path`, falling back to defaults when it is missing or invalid
pub fn load_config_or_default(path: &Path) -> Config {
    match load_config(path) {
        Ok(config) => {
            log::info!("Config loaded from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("Using default config: {:#}", e);
            Config::default()
        }
    }
}
