pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_PATHS: [&str; 2] = ["./wardrobe.toml", "~/.config/wardrobe/config.toml"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        if !path.exists() {
            // Nothing saved yet; behave like an empty settings store.
            return Ok(Config::default());
        }
        return load_config(path);
    }

    match find_existing_config() {
        Some(path) => load_config(&path),
        None => Ok(Config::default()),
    }
}

/// First default location that exists on disk.
pub fn find_existing_config() -> Option<PathBuf> {
    DEFAULT_PATHS
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.exists())
}

/// Where settings are written: the explicit path, an existing default file,
/// or the per-user config location.
pub fn settings_path(custom_path: Option<&Path>) -> PathBuf {
    if let Some(path) = custom_path {
        return path.to_path_buf();
    }
    find_existing_config()
        .unwrap_or_else(|| PathBuf::from(shellexpand::tilde(DEFAULT_PATHS[1]).as_ref()))
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.compression.max_width == 0 {
        anyhow::bail!("compression.max_width cannot be 0");
    }

    let quality = config.compression.quality;
    if !(quality > 0.0 && quality <= 1.0) {
        anyhow::bail!("compression.quality must be in (0, 1], got {}", quality);
    }

    if config.storage.recent_limit == 0 {
        anyhow::bail!("storage.recent_limit cannot be 0");
    }

    if config.storage.bucket.trim().is_empty() || config.storage.table.trim().is_empty() {
        anyhow::bail!("storage.bucket and storage.table must not be empty");
    }

    if config.credentials.supabase_url == PLACEHOLDER_SUPABASE_URL {
        tracing::debug!("Storage URL is still the placeholder; remote operations are disabled");
    }

    Ok(())
}
