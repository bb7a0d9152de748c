// src/commands/list.rs

use std::fmt::Write;
use std::path::Path;

use crate::config::ConfigFile;

/// Human-readable listing of every configured project.
pub fn render_list(cfg: &ConfigFile, config_path: &Path) -> String {
    if cfg.is_empty() {
        return format!(
            "No projects registered. Add projects to {}\n",
            config_path.display()
        );
    }

    let mut out = String::from("Registered projects:\n");
    for (name, groups) in &cfg.projects {
        let _ = writeln!(out, "  {name}");
        for group in groups {
            let _ = writeln!(out, "    [{}] in {}", group.name, group.path.display());
            for cmd in &group.commands {
                let _ = writeln!(out, "      → {cmd}");
            }
        }
    }
    out
}

/// `vunat list`.
pub fn print_list(cfg: &ConfigFile, config_path: &Path) {
    print!("{}", render_list(cfg, config_path));
}
