// src/config/validate.rs

use crate::config::model::ConfigFile;
use crate::errors::{Result, VunatError};

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - project names are non-empty
/// - every project has at least one group
/// - every group has a non-empty name
///
/// Blank command strings are allowed; the supervisor skips them.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    for (name, groups) in cfg.projects.iter() {
        if name.trim().is_empty() {
            return Err(VunatError::Config(
                "project names must not be empty".to_string(),
            ));
        }
        if groups.is_empty() {
            return Err(VunatError::Config(format!(
                "project '{}' must contain at least one command group",
                name
            )));
        }
        for (idx, group) in groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                return Err(VunatError::Config(format!(
                    "group #{} of project '{}' has an empty name",
                    idx + 1,
                    name
                )));
            }
        }
    }
    Ok(())
}
