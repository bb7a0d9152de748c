// src/lib.rs

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod launcher;
pub mod logging;
pub mod project;
pub mod supervisor;

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::{CliArgs, Command};
use crate::config::{default_config_path, load_or_default};
use crate::launcher::{EditorLauncher, Launcher, OsLauncher};
use crate::supervisor::StdioSink;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config location and loading
/// - the config-backed project resolver
/// - Ctrl-C / SIGTERM → cancellation token
/// - subcommand dispatch
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    debug!(?config_path, "using config file");

    match args.command {
        Command::Start { project } => {
            let cfg = load_or_default(&config_path)?;
            let cancel = CancellationToken::new();
            spawn_signal_listener(cancel.clone());
            commands::start_project(cfg, &project, Arc::new(StdioSink), cancel).await
        }
        Command::List => {
            let cfg = load_or_default(&config_path)?;
            commands::print_list(&cfg, &config_path);
            Ok(())
        }
        Command::Config => {
            let launcher: Box<dyn Launcher> = match EditorLauncher::from_env() {
                Some(editor) => Box::new(editor),
                None => Box::new(OsLauncher::new(false)),
            };
            commands::open_config(&config_path, launcher.as_ref()).await?;
            Ok(())
        }
    }
}

/// Cancel `token` on Ctrl-C, or SIGTERM on unix.
fn spawn_signal_listener(token: CancellationToken) {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        eprintln!("\nShutting down all processes...");
        token.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGTERM");
            None
        }
    };

    tokio::select! {
        _ = ctrl_c_or_pending() => {}
        _ = async {
            match term.as_mut() {
                Some(s) => { s.recv().await; }
                None => std::future::pending::<()>().await,
            }
        } => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    ctrl_c_or_pending().await
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn ctrl_c_or_pending() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
