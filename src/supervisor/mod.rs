// src/supervisor/mod.rs

//! Process-group supervision.
//!
//! - [`runner`] owns the run lifecycle: groups in order, then wait for
//!   completion, the first failure, or cancellation.
//! - [`group`] launches the commands of one group concurrently.
//! - [`process`] starts a single command and supervises its exit.
//! - [`output`] forwards child output line by line with a group prefix.
//! - [`state`] is the mutex-guarded bookkeeping shared by all of the above.
//!
//! Cancellation is a `CancellationToken` tree: caller token → run token →
//! one kill token per process. Cancelling any level kills everything below.

pub mod group;
pub mod output;
pub mod process;
pub mod runner;
pub mod state;

pub use output::{OutputSink, StdioSink, Stream};
pub use runner::Supervisor;
pub use state::{SupervisionState, TrackedProcess};
