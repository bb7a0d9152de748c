// src/supervisor/state.rs

//! Shared bookkeeping for one supervision run.
//!
//! Concurrent tasks only ever go through three operations:
//! [`SupervisionState::track`], [`SupervisionState::terminate_all`] (snapshot
//! and clear) and [`SupervisionState::set_first_error`] (compare-and-set).
//! All of them are short critical sections on one mutex.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::VunatError;

/// Identifier handed out by [`SupervisionState::next_id`].
pub type ProcessId = u64;

/// A started process the supervisor may have to kill.
///
/// The `kill` token is observed by the task that owns the OS child; cancelling
/// it is the termination request.
#[derive(Debug, Clone)]
pub struct TrackedProcess {
    pub group: String,
    pub command: String,
    pub pid: Option<u32>,
    pub kill: CancellationToken,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: ProcessId,
    tracked: HashMap<ProcessId, TrackedProcess>,
    /// Set by the first `terminate_all`; later `track` calls kill on arrival.
    closed: bool,
    first_error: Option<VunatError>,
    /// Stays true after `first_error` has been taken by the caller.
    error_recorded: bool,
}

#[derive(Debug, Default)]
pub struct SupervisionState {
    inner: Mutex<Inner>,
}

impl SupervisionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> ProcessId {
        let mut inner = self.lock();
        inner.next_id += 1;
        inner.next_id
    }

    /// Register a freshly started process.
    ///
    /// Returns `false` if shutdown already happened; the process has then been
    /// sent its termination request and is not tracked.
    pub fn track(&self, id: ProcessId, process: TrackedProcess) -> bool {
        let mut inner = self.lock();
        if inner.closed {
            drop(inner);
            debug!(
                group = %process.group,
                command = %process.command,
                "process started after shutdown; killing immediately"
            );
            process.kill.cancel();
            return false;
        }
        inner.tracked.insert(id, process);
        true
    }

    /// Forget a process that exited on its own.
    pub fn untrack(&self, id: ProcessId) -> Option<TrackedProcess> {
        self.lock().tracked.remove(&id)
    }

    /// Take ownership of every tracked process, empty the set, and send each
    /// one a termination request.
    ///
    /// Idempotent: concurrent or repeated calls never signal the same process
    /// twice. Returns the number of processes this call signalled.
    pub fn terminate_all(&self) -> usize {
        let snapshot: Vec<TrackedProcess> = {
            let mut inner = self.lock();
            inner.closed = true;
            inner.tracked.drain().map(|(_, p)| p).collect()
        };

        for process in &snapshot {
            debug!(
                group = %process.group,
                command = %process.command,
                pid = ?process.pid,
                "sending termination request"
            );
            process.kill.cancel();
        }

        snapshot.len()
    }

    /// Record `err` as the run's error unless one was already recorded.
    ///
    /// Returns `true` if this call won.
    pub fn set_first_error(&self, err: VunatError) -> bool {
        let mut inner = self.lock();
        if inner.error_recorded {
            debug!(error = %err, "dropping error; first error already recorded");
            return false;
        }
        inner.error_recorded = true;
        inner.first_error = Some(err);
        true
    }

    pub fn take_first_error(&self) -> Option<VunatError> {
        self.lock().first_error.take()
    }

    pub fn tracked_count(&self) -> usize {
        self.lock().tracked.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the map consistent; keep going.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
