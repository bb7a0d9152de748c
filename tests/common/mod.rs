#![allow(dead_code)]

pub use vunat_test_utils::builders::{ConfigFileBuilder, GroupBuilder, ProjectBuilder};
pub use vunat_test_utils::{CaptureSink, init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
