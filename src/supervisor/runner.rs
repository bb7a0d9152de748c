// src/supervisor/runner.rs

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::errors::{Result, VunatError};
use crate::project::{CommandGroup, Project, ProjectResolver};
use crate::supervisor::group::launch_group;
use crate::supervisor::output::{OutputSink, Stream, group_prefix};
use crate::supervisor::process::RunContext;
use crate::supervisor::state::SupervisionState;

/// How long shutdown waits for killed processes to be reaped before
/// returning anyway.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to keep forwarding output once every process is gone. Pipes held
/// open by background grandchildren are abandoned after this.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs projects: groups strictly in order, commands of a group in parallel,
/// first failure or cancellation tears everything down.
pub struct Supervisor<R> {
    resolver: R,
    sink: Arc<dyn OutputSink>,
}

impl<R: ProjectResolver> Supervisor<R> {
    pub fn new(resolver: R, sink: Arc<dyn OutputSink>) -> Self {
        Self { resolver, sink }
    }

    /// Resolve `name` and run it. See [`Supervisor::start`].
    pub async fn start_by_name(&self, name: &str, cancel: CancellationToken) -> Result<()> {
        let project = self.resolver.resolve(name)?;
        self.start(&project, cancel).await
    }

    /// Run `project` until every process exits, one fails, or `cancel` fires.
    ///
    /// - `Ok(())`: all processes exited successfully.
    /// - `Err(StartFailure | ProcessExitFailure)`: the first failure of the run.
    /// - `Err(Cancelled)`: `cancel` fired before any failure was recorded.
    ///
    /// Every process started by this call has been sent a kill by the time it
    /// returns.
    pub async fn start(&self, project: &Project, cancel: CancellationToken) -> Result<()> {
        let ctx = RunContext {
            state: Arc::new(SupervisionState::new()),
            cancel: cancel.child_token(),
            sink: Arc::clone(&self.sink),
            exits: TaskTracker::new(),
            output: TaskTracker::new(),
        };

        for group in &project.groups {
            if ctx.cancel.is_cancelled() {
                debug!(group = %group.name, "run cancelled; not launching remaining groups");
                break;
            }

            self.sink.emit(
                Stream::Stdout,
                format!("{}Starting in: {}", group_prefix(&group.name), display_dir(group)),
            );
            info!(group = %group.name, commands = group.commands.len(), "launching group");

            if let Err(err) = launch_group(&ctx, group).await {
                shutdown(&ctx).await;
                return Err(err);
            }

            self.sink
                .emit(Stream::Stdout, format!("{}Started", group_prefix(&group.name)));
        }

        ctx.exits.close();
        if !ctx.cancel.is_cancelled() {
            self.sink.emit(Stream::Stdout, "All groups started.".to_string());
        }

        let completed = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => false,
            _ = ctx.exits.wait() => true,
        };

        shutdown(&ctx).await;

        // A process failure outranks the cancellation it triggered, and one
        // that raced an external cancellation is the more specific report.
        if let Some(err) = ctx.state.take_first_error() {
            return Err(err);
        }
        if completed {
            info!("all processes exited cleanly");
            Ok(())
        } else {
            info!("run cancelled");
            Err(VunatError::Cancelled)
        }
    }
}

/// Cancel the run, kill everything still tracked, give the exit waiters a
/// bounded amount of time to reap their children, then drain output briefly.
async fn shutdown(ctx: &RunContext) {
    ctx.cancel.cancel();
    let signalled = ctx.state.terminate_all();
    debug!(signalled, "shutdown: termination requests sent");

    ctx.exits.close();
    if tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, ctx.exits.wait())
        .await
        .is_err()
    {
        warn!(
            remaining = ctx.exits.len(),
            "processes still running after shutdown timeout"
        );
    }

    ctx.output.close();
    if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, ctx.output.wait())
        .await
        .is_err()
    {
        debug!(
            remaining = ctx.output.len(),
            "output streams still open after drain timeout; abandoning them"
        );
    }
}

fn display_dir(group: &CommandGroup) -> String {
    match group.working_dir() {
        Some(dir) => dir.display().to_string(),
        None => ".".to_string(),
    }
}
