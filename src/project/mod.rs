// src/project/mod.rs

//! Project definitions as seen by the supervisor.
//!
//! A [`Project`] is an ordered list of [`CommandGroup`]s. Group order is
//! execution order; commands inside a group are launched concurrently.
//!
//! The supervisor never reads config itself: it asks a [`ProjectResolver`]
//! for the project by name, which keeps the core testable with in-memory
//! projects.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VunatError};

/// A named set of commands sharing a working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandGroup {
    pub name: String,

    /// Directory the commands run in. Empty means the caller's current
    /// directory.
    #[serde(default, alias = "absolute_path", alias = "absolutePath")]
    pub path: PathBuf,

    #[serde(default)]
    pub commands: Vec<String>,
}

impl CommandGroup {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            commands: Vec::new(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// Working directory to hand to the process spawner, if any.
    pub fn working_dir(&self) -> Option<&PathBuf> {
        if self.path.as_os_str().is_empty() {
            None
        } else {
            Some(&self.path)
        }
    }
}

/// Ordered sequence of command groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub groups: Vec<CommandGroup>,
}

impl Project {
    pub fn new(groups: Vec<CommandGroup>) -> Self {
        Self { groups }
    }
}

impl From<Vec<CommandGroup>> for Project {
    fn from(groups: Vec<CommandGroup>) -> Self {
        Self { groups }
    }
}

/// Looks up a project definition by name.
pub trait ProjectResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Project>;
}

impl<R: ProjectResolver + ?Sized> ProjectResolver for std::sync::Arc<R> {
    fn resolve(&self, name: &str) -> Result<Project> {
        (**self).resolve(name)
    }
}

/// Split a command string into executable + arguments.
///
/// Plain whitespace splitting: no quoting, escaping, pipes or variable
/// expansion. `"echo 'a b'"` yields three tokens.
pub fn tokenize(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

/// Resolver over a fixed in-memory map, handy for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    projects: std::collections::BTreeMap<String, Project>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, name: impl Into<String>, project: Project) -> Self {
        self.projects.insert(name.into(), project);
        self
    }
}

impl ProjectResolver for StaticResolver {
    fn resolve(&self, name: &str) -> Result<Project> {
        self.projects
            .get(name)
            .cloned()
            .ok_or_else(|| VunatError::ProjectNotFound(name.to_string()))
    }
}
