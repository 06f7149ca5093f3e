//! The command log: recording, commit points, and replay-based undo/redo.

use tracing::debug;

use drawbench_foundation::{ComponentKind, EntityKind, Error, ErrorKind, Handle, Result};

use crate::command::{LogConfig, LogEntry, LogState, UpdatePayload, Verb};

/// Store callbacks the log replays through.
///
/// The log never inspects table layout; it is fully generic over entity
/// shape. `replay_create` must reproduce the store's create-with-handle,
/// `replay_delete` its remove, and `replay_update` must write the bytes
/// directly into the named column and row.
pub trait Replay {
    /// Reverts the store to its retained baseline snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the baseline cannot be restored.
    fn reset(&mut self) -> Result<()>;

    /// Re-creates an entity under its original handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the creation cannot be reproduced.
    fn replay_create(&mut self, kind: EntityKind, id: Handle) -> Result<()>;

    /// Re-removes an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be reproduced.
    fn replay_delete(&mut self, id: Handle) -> Result<()>;

    /// Re-applies one component write by column and row.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be reproduced.
    fn replay_update(
        &mut self,
        kind: EntityKind,
        component: ComponentKind,
        row: u32,
        bytes: &[u8],
    ) -> Result<()>;
}

/// Entry and payload lengths at one commit.
#[derive(Clone, Copy, Debug, Default)]
struct CommitPoint {
    entries: usize,
    payloads: usize,
}

/// Append-only command log with linear undo/redo.
///
/// Commit points bookmark undoable units of work; batching granularity is
/// entirely the caller's choice. The cursor (`redo_index`) selects how
/// many commits are currently applied; undo and redo move it without
/// mutating the recorded history, while any new recording truncates
/// everything ahead of it.
#[derive(Clone, Debug, Default)]
pub struct CommandLog {
    entries: Vec<LogEntry>,
    payloads: Vec<UpdatePayload>,
    commit_points: Vec<CommitPoint>,
    redo_index: usize,
    config: LogConfig,
}

impl CommandLog {
    /// Creates an empty log with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty log with an explicit configuration.
    #[must_use]
    pub fn with_config(config: LogConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Returns the number of recorded entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of commit points.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.commit_points.len()
    }

    /// Returns the redo cursor position, `0..=commit_count`.
    #[must_use]
    pub fn redo_index(&self) -> usize {
        self.redo_index
    }

    /// Returns the number of commits ahead of the cursor.
    #[must_use]
    pub fn pending_redo(&self) -> usize {
        self.commit_points.len() - self.redo_index
    }

    /// Returns where the cursor sits relative to the recorded history.
    #[must_use]
    pub fn state(&self) -> LogState {
        if self.redo_index == self.commit_points.len() {
            LogState::Clean
        } else if self.redo_index == 0 {
            LogState::AtOrigin
        } else {
            LogState::Dirty
        }
    }

    /// Returns true once recorded history crosses the soft entry limit.
    ///
    /// Undo cost is O(total log length), so long sessions should
    /// re-snapshot and [`CommandLog::clear`] when this trips.
    #[must_use]
    pub fn is_over_soft_limit(&self) -> bool {
        self.entries.len() > self.config.soft_entry_limit
    }

    /// Drops all recorded history and commit points.
    ///
    /// The caller must re-snapshot its baseline at the same moment;
    /// afterwards there is nothing to undo.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.payloads.clear();
        self.commit_points.clear();
        self.redo_index = 0;
        debug!("command log cleared");
    }

    /// Records an entity creation.
    ///
    /// Truncates any pending redo tail first: a new edit invalidates the
    /// recorded future.
    pub fn record_create(&mut self, id: Handle, kind: EntityKind) {
        self.truncate_redo_tail();
        self.entries.push(LogEntry {
            verb: Verb::Create,
            id,
            kind,
            payload: None,
        });
    }

    /// Records an entity removal.
    ///
    /// Truncates any pending redo tail first.
    pub fn record_delete(&mut self, id: Handle, kind: EntityKind) {
        self.truncate_redo_tail();
        self.entries.push(LogEntry {
            verb: Verb::Delete,
            id,
            kind,
            payload: None,
        });
    }

    /// Records one component write.
    ///
    /// `row` must be the entity's table row at write time. Truncates any
    /// pending redo tail first.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::PayloadTooLarge`] if `bytes` exceeds the
    /// configured cap — oversized payloads are rejected outright, never
    /// silently truncated.
    pub fn record_update(
        &mut self,
        id: Handle,
        kind: EntityKind,
        component: ComponentKind,
        row: u32,
        bytes: &[u8],
    ) -> Result<()> {
        if bytes.len() > self.config.max_payload_bytes {
            return Err(Error::new(ErrorKind::PayloadTooLarge {
                length: bytes.len(),
                max: self.config.max_payload_bytes,
            }));
        }
        self.truncate_redo_tail();

        let payload = u32::try_from(self.payloads.len())
            .map_err(|_| Error::capacity_exhausted("update payloads"))?;
        self.payloads.push(UpdatePayload {
            component,
            row,
            bytes: bytes.to_vec(),
        });
        self.entries.push(LogEntry {
            verb: Verb::Update,
            id,
            kind,
            payload: Some(payload),
        });
        Ok(())
    }

    /// Bookmarks the current log length as one undoable unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::RedoPending`] if redo history is pending. Any
    /// real edit truncates that history through `record_*`; a commit that
    /// still sees pending redo therefore recorded nothing, and silently
    /// truncating would throw away reachable history for an empty step.
    pub fn commit(&mut self) -> Result<()> {
        if self.redo_index != self.commit_points.len() {
            return Err(Error::new(ErrorKind::RedoPending {
                pending: self.pending_redo(),
            }));
        }
        self.commit_points.push(CommitPoint {
            entries: self.entries.len(),
            payloads: self.payloads.len(),
        });
        self.redo_index += 1;
        debug!(
            commits = self.commit_points.len(),
            entries = self.entries.len(),
            "committed"
        );
        Ok(())
    }

    /// Steps the cursor back one commit and rebuilds the store.
    ///
    /// Reverts the target to the baseline and replays every entry below
    /// the new cursor, in order. O(total log length) — the cost of
    /// keeping only a single snapshot. Returns `Ok(false)` at the origin.
    ///
    /// Entries recorded since the last commit belong to no undoable unit;
    /// callers must commit (or abandon) a pending batch before offering
    /// undo to the user.
    ///
    /// # Errors
    ///
    /// Propagates replay failures; the store should be considered
    /// unusable if one ever occurs.
    pub fn undo<R: Replay>(&mut self, target: &mut R) -> Result<bool> {
        if self.redo_index == 0 {
            return Ok(false);
        }
        self.redo_index -= 1;
        let end = self.prefix(self.redo_index).entries;
        debug!(cursor = self.redo_index, replayed = end, "undo");

        target.reset()?;
        self.replay_range(target, 0, end)?;
        Ok(true)
    }

    /// Steps the cursor forward one commit.
    ///
    /// The store already equals the state at the cursor, so only the
    /// entries strictly between the two commit points replay. Returns
    /// `Ok(false)` at the tip.
    ///
    /// # Errors
    ///
    /// Propagates replay failures.
    pub fn redo<R: Replay>(&mut self, target: &mut R) -> Result<bool> {
        if self.redo_index == self.commit_points.len() {
            return Ok(false);
        }
        let start = self.prefix(self.redo_index).entries;
        let end = self.prefix(self.redo_index + 1).entries;
        self.redo_index += 1;
        debug!(cursor = self.redo_index, start, end, "redo");

        self.replay_range(target, start, end)?;
        Ok(true)
    }

    // --- Private helpers ---

    /// Lengths below the `i`-th commit point (0 = empty log).
    fn prefix(&self, i: usize) -> CommitPoint {
        if i == 0 {
            CommitPoint::default()
        } else {
            self.commit_points[i - 1]
        }
    }

    /// Drops entries, payloads, and commit points ahead of the cursor.
    fn truncate_redo_tail(&mut self) {
        if self.redo_index == self.commit_points.len() {
            return;
        }
        let keep = self.prefix(self.redo_index);
        debug!(
            dropped_entries = self.entries.len() - keep.entries,
            dropped_commits = self.commit_points.len() - self.redo_index,
            "truncating redo tail"
        );
        self.entries.truncate(keep.entries);
        self.payloads.truncate(keep.payloads);
        self.commit_points.truncate(self.redo_index);
    }

    fn replay_range<R: Replay>(&self, target: &mut R, start: usize, end: usize) -> Result<()> {
        for entry in &self.entries[start..end] {
            match entry.verb {
                Verb::Create => target.replay_create(entry.kind, entry.id)?,
                Verb::Delete => target.replay_delete(entry.id)?,
                Verb::Update => {
                    let index = entry
                        .payload
                        .ok_or_else(|| Error::internal("update entry without payload"))?;
                    let payload = &self.payloads[index as usize];
                    target.replay_update(
                        entry.kind,
                        payload.component,
                        payload.row,
                        &payload.bytes,
                    )?;
                }
            }
        }
        Ok(())
    }
}
