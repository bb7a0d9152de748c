#![allow(dead_code)]

use std::path::PathBuf;

use vunat::config::ConfigFile;
use vunat::project::{CommandGroup, Project};

/// Builder for `Project` to simplify test setup.
#[derive(Default)]
pub struct ProjectBuilder {
    groups: Vec<CommandGroup>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: CommandGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn build(self) -> Project {
        Project::new(self.groups)
    }
}

/// Builder for `CommandGroup`.
pub struct GroupBuilder {
    group: CommandGroup,
}

impl GroupBuilder {
    /// Group that runs in the caller's current directory.
    pub fn new(name: &str) -> Self {
        Self {
            group: CommandGroup::new(name, PathBuf::new()),
        }
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.group.path = dir.into();
        self
    }

    pub fn cmd(mut self, command: &str) -> Self {
        self.group.commands.push(command.to_string());
        self
    }

    pub fn build(self) -> CommandGroup {
        self.group
    }
}

/// Builder for `ConfigFile`.
#[derive(Default)]
pub struct ConfigFileBuilder {
    config: ConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, name: &str, project: Project) -> Self {
        self.config.projects.insert(name.to_string(), project.groups);
        self
    }

    pub fn build(self) -> ConfigFile {
        self.config
    }
}
