// src/supervisor/group.rs

//! Group executor: launch every command of one group concurrently and wait
//! until each launch attempt has finished (started or failed), not until
//! the processes exit.

use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::errors::{Result, VunatError};
use crate::project::CommandGroup;
use crate::supervisor::process::{RunContext, launch};

/// Launch all commands of `group`.
///
/// The first start-time error is returned immediately. Launch attempts that
/// have not begun are abandoned; processes already started stay tracked and
/// are left for the supervisor's shutdown.
///
/// Returns the number of processes started.
pub async fn launch_group(ctx: &RunContext, group: &CommandGroup) -> Result<usize> {
    let mut launches = JoinSet::new();

    for command in &group.commands {
        let ctx = ctx.clone();
        let group = group.clone();
        let command = command.clone();
        // `launch` never awaits, so an abort can only land before it runs.
        launches.spawn(async move { launch(&ctx, &group, &command) });
    }

    let mut started = 0;
    while let Some(joined) = launches.join_next().await {
        let outcome = joined.map_err(|e| VunatError::StartFailure {
            group: group.name.clone(),
            command: String::from("<launch task>"),
            source: std::io::Error::other(e.to_string()),
        });

        match outcome.and_then(|r| r) {
            Ok(Some(_)) => started += 1,
            Ok(None) => {}
            Err(err) => {
                error!(group = %group.name, error = %err, "command failed to start");
                launches.abort_all();
                return Err(err);
            }
        }
    }

    debug!(group = %group.name, started, "group launch complete");
    Ok(started)
}
