// src/commands/start.rs

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::project::ProjectResolver;
use crate::supervisor::{OutputSink, Stream, Supervisor};

/// `vunat start <project>`.
///
/// A cancelled run (Ctrl-C) is a normal way to stop and returns `Ok`; start
/// and process failures are returned as errors.
pub async fn start_project<R: ProjectResolver>(
    resolver: R,
    name: &str,
    sink: Arc<dyn OutputSink>,
    cancel: CancellationToken,
) -> Result<()> {
    sink.emit(Stream::Stdout, format!("Starting project: {name}\n"));

    let supervisor = Supervisor::new(resolver, Arc::clone(&sink));
    match supervisor.start_by_name(name, cancel).await {
        Ok(()) => {
            info!(project = name, "project finished");
            Ok(())
        }
        Err(err) if err.is_cancelled() => {
            sink.emit(Stream::Stdout, "\nAll processes stopped.".to_string());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
