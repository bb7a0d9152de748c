// src/supervisor/process.rs

//! Starting one command and supervising it until it exits or is killed.

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::errors::{Result, VunatError};
use crate::project::{CommandGroup, tokenize};
use crate::supervisor::output::{OutputSink, Stream, forward_lines, group_prefix};
use crate::supervisor::state::{ProcessId, SupervisionState, TrackedProcess};

/// Everything the per-process tasks of one run share.
#[derive(Clone)]
pub struct RunContext {
    pub state: Arc<SupervisionState>,
    /// Run-wide cancellation; every kill token is a child of it.
    pub cancel: CancellationToken,
    pub sink: Arc<dyn OutputSink>,
    /// Exit waiters, one per started process. The run is complete once it
    /// drains.
    pub exits: TaskTracker,
    /// Output forwarders. A backgrounded grandchild may keep a pipe open
    /// after its parent exited, so these only get a bounded drain.
    pub output: TaskTracker,
}

/// Start `command` for `group`.
///
/// Returns `Ok(None)` for blank commands and when the run is already
/// cancelled. On success the process is tracked, its output is wired to the
/// sink and a background task waits for its exit.
pub fn launch(ctx: &RunContext, group: &CommandGroup, command: &str) -> Result<Option<ProcessId>> {
    let parts = tokenize(command);
    let Some((program, args)) = parts.split_first() else {
        debug!(group = %group.name, "skipping blank command");
        return Ok(None);
    };

    if ctx.cancel.is_cancelled() {
        debug!(group = %group.name, command, "run cancelled; not starting command");
        return Ok(None);
    }

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = group.working_dir() {
        cmd.current_dir(dir);
    }

    let start_failure = |source: std::io::Error| VunatError::StartFailure {
        group: group.name.clone(),
        command: command.to_string(),
        source,
    };

    let mut child = cmd.spawn().map_err(start_failure)?;

    // The child is killed on drop if either pipe is missing.
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| start_failure(std::io::Error::other("stdout pipe unavailable")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| start_failure(std::io::Error::other("stderr pipe unavailable")))?;

    let pid = child.id();
    let kill = ctx.cancel.child_token();
    let id = ctx.state.next_id();

    // Track before wiring output so a fast exit cannot slip past shutdown.
    ctx.state.track(
        id,
        TrackedProcess {
            group: group.name.clone(),
            command: command.to_string(),
            pid,
            kill: kill.clone(),
        },
    );
    info!(group = %group.name, command, ?pid, "process started");

    let prefix = group_prefix(&group.name);
    ctx.output.spawn(forward_lines(stdout, Stream::Stdout, prefix.clone(), ctx.sink.clone()));
    ctx.output.spawn(forward_lines(stderr, Stream::Stderr, prefix, ctx.sink.clone()));

    ctx.exits.spawn(supervise_exit(
        ctx.clone(),
        id,
        child,
        kill,
        group.name.clone(),
        command.to_string(),
    ));

    Ok(Some(id))
}

/// Wait for the child to exit, or kill it once its token is cancelled.
///
/// An unsuccessful exit is offered as the run's first error; the winner
/// cancels the run and terminates every other tracked process.
async fn supervise_exit(
    ctx: RunContext,
    id: ProcessId,
    mut child: Child,
    kill: CancellationToken,
    group: String,
    command: String,
) {
    let waited = tokio::select! {
        status = child.wait() => status,
        _ = kill.cancelled() => {
            debug!(group = %group, command = %command, "killing process");
            if let Err(e) = child.kill().await {
                warn!(group = %group, command = %command, error = %e, "failed to kill process");
            }
            ctx.state.untrack(id);
            return;
        }
    };

    ctx.state.untrack(id);

    let (reason, code) = match waited {
        Ok(status) if status.success() => {
            info!(group = %group, command = %command, "process exited cleanly");
            return;
        }
        Ok(status) => (status.to_string(), status.code()),
        Err(e) => (format!("waiting for process failed: {e}"), None),
    };

    warn!(group = %group, command = %command, reason = %reason, "process failed");

    let err = VunatError::ProcessExitFailure {
        group,
        command,
        reason,
        code,
    };
    if ctx.state.set_first_error(err) {
        ctx.cancel.cancel();
        let signalled = ctx.state.terminate_all();
        debug!(signalled, "shut down remaining processes after failure");
    }
}
