mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

const APP_DIR: &str = "motion-scope";
const CONFIG_FILE: &str = "config.toml";

/// Per-user directory holding `config.toml`. Created on first use.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .context("No per-user config directory on this platform")?
        .join(APP_DIR);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Creating {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Read the user's plot settings. A missing file yields the defaults.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let config = parse_config(&contents)
                .with_context(|| format!("Parsing {}", path.display()))?;
            info!(?path, series = config.plot.series.len(), "Loaded config");
            Ok(config)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(?path, "No config file, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("Reading {}", path.display())),
    }
}

/// Parse a TOML document. Missing sections and keys take their defaults.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    Ok(toml::from_str(contents)?)
}

/// Write the settings back to the user's config file.
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&config_path()?, config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents).with_context(|| format!("Writing {}", path.display()))?;
    info!(?path, "Saved config");
    Ok(())
}
