//! Replay-based command logging for the drawbench data layer.
//!
//! This crate provides:
//! - [`CommandLog`] - Append-only create/delete/update log with commit
//!   points and a redo cursor
//! - [`Replay`] - The store callbacks undo/redo replays through
//! - [`LogConfig`] - Payload cap and history limits
//!
//! Undo reverts the store to its one retained baseline snapshot and
//! replays the log prefix below the cursor; redo replays the slice
//! between two commit points. History is strictly linear: any new edit
//! truncates the recorded future.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod command;
mod log;

pub use command::{LogConfig, LogEntry, LogState, UpdatePayload, Verb};
pub use log::{CommandLog, Replay};
