//! Client configuration file.
//!
//! Read from `$CHUNKXFER_CONFIG` when set, otherwise:
//! - Linux: `~/.config/chunkxfer/client.toml`
//! - Windows: `%APPDATA%/chunkxfer/client.toml`
//!
//! A missing file means defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chunkxfer_client::ClientConfig;

const CONFIG_ENV: &str = "CHUNKXFER_CONFIG";

/// Loads the configuration, or defaults if no file exists.
pub fn load() -> anyhow::Result<ClientConfig> {
    load_from(&config_path())
}

pub fn load_from(path: &Path) -> anyhow::Result<ClientConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(ClientConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: ClientConfig =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("chunkxfer").join("client.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("chunkxfer")
            .join("client.toml")
    }
}
