// src/commands/config.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::ensure_config;
use crate::launcher::Launcher;

/// `vunat config`: create the config file if missing, then open it.
pub async fn open_config(path: &Path, launcher: &dyn Launcher) -> Result<PathBuf> {
    let path = ensure_config(path).context("failed to ensure config file")?;
    launcher
        .open(&path)
        .await
        .context("failed to open config file")?;
    Ok(path)
}
