// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VunatError};
use crate::project::{CommandGroup, Project, ProjectResolver};

/// Top-level configuration as read from disk.
///
/// ```toml
/// [[projects.web]]
/// name = "api"
/// path = "/home/me/src/api"
/// commands = ["cargo run"]
///
/// [[projects.web]]
/// name = "frontend"
/// path = "/home/me/src/frontend"
/// commands = ["npm run dev", "npm run watch:css"]
/// ```
///
/// The JSON form is the same shape:
/// `{"projects": {"web": [{"name": "api", "path": "...", "commands": [...]}]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Project name -> ordered command groups.
    #[serde(default)]
    pub projects: BTreeMap<String, Vec<CommandGroup>>,
}

impl ConfigFile {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn project(&self, name: &str) -> Option<Project> {
        self.projects.get(name).cloned().map(Project::from)
    }
}

impl ProjectResolver for ConfigFile {
    fn resolve(&self, name: &str) -> Result<Project> {
        self.project(name)
            .ok_or_else(|| VunatError::ProjectNotFound(name.to_string()))
    }
}
