// src/config/loader.rs

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;

/// Environment variable overriding the config location.
pub const CONFIG_ENV: &str = "VUNAT_CONFIG";

/// On-disk encoding, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }

    fn parse(self, contents: &str) -> crate::errors::Result<ConfigFile> {
        Ok(match self {
            ConfigFormat::Toml => toml::from_str(contents)?,
            ConfigFormat::Json => serde_json::from_str(contents)?,
        })
    }

    fn render(self, cfg: &ConfigFile) -> crate::errors::Result<String> {
        let mut out = match self {
            ConfigFormat::Toml => toml::to_string_pretty(cfg)?,
            ConfigFormat::Json => serde_json::to_string_pretty(cfg)?,
        };
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }
}

/// Load a configuration file and return the raw `ConfigFile`.
///
/// This only deserializes; use [`load_and_validate`] for semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config = ConfigFormat::from_path(path)
        .parse(&contents)
        .with_context(|| format!("parsing config from {:?}", path))?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)
        .with_context(|| format!("validating config {:?}", path.as_ref()))?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file is an empty config.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(?path, "config file does not exist; using empty config");
        return Ok(ConfigFile::default());
    }
    load_and_validate(path)
}

/// Make sure the config file and its directory exist, creating an empty
/// config if needed. Returns the path.
pub fn ensure_config(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating config directory {:?}", dir))?;
    }

    if !path.exists() {
        let initial = ConfigFormat::from_path(path)
            .render(&ConfigFile::default())
            .context("rendering initial config")?;
        fs::write(path, initial)
            .with_context(|| format!("creating config file {:?}", path))?;
        info!(?path, "created empty config file");
    }

    fs::metadata(path).with_context(|| format!("checking config file {:?}", path))?;
    Ok(path.to_path_buf())
}

/// Resolve the default config path from the environment.
///
/// `$VUNAT_CONFIG`, then `$HOME/.vunat/config.toml`, then
/// `./.vunat/config.toml`.
pub fn default_config_path() -> PathBuf {
    resolve_config_path(std::env::var_os(CONFIG_ENV), std::env::var_os("HOME"))
}

fn resolve_config_path(explicit: Option<OsString>, home: Option<OsString>) -> PathBuf {
    if let Some(p) = explicit.filter(|p| !p.is_empty()) {
        return PathBuf::from(p);
    }
    let base = match home.filter(|h| !h.is_empty()) {
        Some(home) => PathBuf::from(home),
        None => PathBuf::from("."),
    };
    base.join(".vunat").join("config.toml")
}
