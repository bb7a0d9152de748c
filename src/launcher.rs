// src/launcher.rs

//! Opening files for the user: `$EDITOR` when set, the platform opener
//! otherwise.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result, anyhow, bail};
use tokio::process::Command;
use tracing::debug;

use crate::project::tokenize;

/// Something that can open a path for the user.
pub trait Launcher: Send + Sync {
    fn open<'a>(&'a self, path: &'a Path) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Uses the desktop's default handler: `xdg-open`, `open`, or `cmd /c start`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLauncher {
    /// Wait for the opener to exit instead of returning once it started.
    pub wait: bool,
}

impl OsLauncher {
    pub fn new(wait: bool) -> Self {
        Self { wait }
    }

    fn command(path: &Path) -> Command {
        if cfg!(windows) {
            // `start` is a cmd builtin; the empty argument is the window title.
            let mut c = Command::new("cmd");
            c.arg("/c").arg("start").arg("").arg(path);
            c
        } else if cfg!(target_os = "macos") {
            let mut c = Command::new("open");
            c.arg(path);
            c
        } else {
            let mut c = Command::new("xdg-open");
            c.arg(path);
            c
        }
    }
}

impl Launcher for OsLauncher {
    fn open<'a>(&'a self, path: &'a Path) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if path.as_os_str().is_empty() {
                bail!("launcher: empty path");
            }

            let mut cmd = Self::command(path);
            if self.wait {
                let status = cmd.status().await.context("launcher: failed to run opener")?;
                if !status.success() {
                    bail!("launcher: opener exited with {status}");
                }
            } else {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .context("launcher: failed to start opener")?;
            }
            Ok(())
        })
    }
}

/// Runs the user's `$EDITOR` on the path, attached to the terminal, and
/// waits for it to exit.
#[derive(Debug, Clone)]
pub struct EditorLauncher {
    editor: String,
}

impl EditorLauncher {
    /// `None` when the value is unset or blank.
    pub fn from_value(editor: Option<String>) -> Option<Self> {
        editor
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .map(|editor| Self { editor })
    }

    pub fn from_env() -> Option<Self> {
        Self::from_value(std::env::var("EDITOR").ok())
    }
}

impl Launcher for EditorLauncher {
    fn open<'a>(&'a self, path: &'a Path) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let parts = tokenize(&self.editor);
            let (program, args) = parts
                .split_first()
                .ok_or_else(|| anyhow!("$EDITOR is empty"))?;

            debug!(editor = %self.editor, ?path, "opening with $EDITOR");
            let status = Command::new(program)
                .args(args)
                .arg(path)
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await
                .with_context(|| format!("$EDITOR command {:?} failed to run", self.editor))?;

            if !status.success() {
                bail!("$EDITOR command {:?} exited with {status}", self.editor);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_editor_is_ignored() {
        assert!(EditorLauncher::from_value(None).is_none());
        assert!(EditorLauncher::from_value(Some("  ".into())).is_none());
        assert!(EditorLauncher::from_value(Some("code --wait".into())).is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn editor_receives_path_as_last_argument() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config.toml");

        // `touch` stands in for an editor: it gets the path appended.
        let editor = EditorLauncher::from_value(Some("touch".into())).unwrap();
        editor.open(&target).await.unwrap();

        assert!(target.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_editor_is_an_error() {
        let editor = EditorLauncher::from_value(Some("false".into())).unwrap();
        let err = editor.open(Path::new("/tmp/whatever")).await.unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[tokio::test]
    async fn os_launcher_rejects_empty_path() {
        let err = OsLauncher::new(true).open(Path::new("")).await.unwrap_err();
        assert!(err.to_string().contains("empty path"));
    }
}
