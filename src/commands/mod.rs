// src/commands/mod.rs

//! Subcommand handlers. Each takes its collaborators as arguments so it can
//! be driven from tests without touching the real config or terminal.

pub mod config;
pub mod list;
pub mod start;

pub use config::open_config;
pub use list::{print_list, render_list};
pub use start::start_project;
