use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Catalog location used when the config file does not override it.
pub const DEFAULT_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";

/// Global configuration loaded from `~/.config/mcsrv/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct McsrvConfig {
    /// URL of the version manifest (the catalog).
    pub manifest_url: String,
    /// Program used to launch the artifact (looked up on PATH when not absolute).
    pub java: String,
    /// Connect timeout for every HTTP request, in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout for every HTTP request, in seconds.
    pub transfer_timeout_secs: u64,
    /// Abort a transfer that stays below this many bytes/sec ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// How long to wait for the stdin bridge after the child exits before
    /// leaving it detached, in milliseconds.
    pub stdin_grace_ms: u64,
}

impl Default for McsrvConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            java: "java".to_string(),
            connect_timeout_secs: 30,
            transfer_timeout_secs: 3600,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            stdin_grace_ms: 100,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mcsrv")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<McsrvConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<McsrvConfig> {
    if !path.exists() {
        let default_cfg = McsrvConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: McsrvConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
