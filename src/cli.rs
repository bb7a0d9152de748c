// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `vunat`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vunat",
    version,
    about = "Quick-start development projects: launch groups of commands and supervise them.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML, or JSON with a `.json` extension).
    ///
    /// Default: `$VUNAT_CONFIG`, else `~/.vunat/config.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `VUNAT_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start a project and supervise its processes until they exit or Ctrl+C.
    Start {
        /// Name of the project in the config file.
        project: String,
    },
    /// List all registered projects.
    List,
    /// Open the config file in your editor.
    Config,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_with_global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "vunat",
            "start",
            "web",
            "--config",
            "/tmp/c.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert!(matches!(args.command, Command::Start { ref project } if project == "web"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }

    #[test]
    fn start_requires_a_project() {
        assert!(CliArgs::try_parse_from(["vunat", "start"]).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(CliArgs::try_parse_from(["vunat"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
