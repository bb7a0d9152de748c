// src/config/mod.rs

//! Configuration loading and validation for vunat.
//!
//! Responsibilities:
//! - Define the file-backed data model (`model.rs`).
//! - Locate, create and load the config file (`loader.rs`).
//! - Validate basic invariants like non-empty projects (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    ConfigFormat, default_config_path, ensure_config, load_and_validate, load_from_path,
    load_or_default,
};
pub use model::ConfigFile;
pub use validate::validate_config;
