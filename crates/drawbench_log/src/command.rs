//! Log entry, payload, and configuration types.

use drawbench_foundation::{ComponentKind, EntityKind, Handle};

/// What a log entry records.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verb {
    /// An entity was created under a specific handle.
    Create,
    /// An entity was removed.
    Delete,
    /// One component cell was overwritten.
    Update,
}

/// One recorded operation.
#[derive(Clone, Debug)]
pub struct LogEntry {
    /// The operation verb.
    pub verb: Verb,
    /// The entity the operation applied to.
    pub id: Handle,
    /// The entity's kind.
    pub kind: EntityKind,
    /// Index into the update-payload side table, for [`Verb::Update`].
    pub payload: Option<u32>,
}

/// Side-table payload for one update entry.
///
/// The row is the entity's row *at write time*; it is only meaningful
/// while replaying the whole log in order against the baseline, because
/// removals of other entities move survivors between rows.
#[derive(Clone, Debug)]
pub struct UpdatePayload {
    /// The component column that was written.
    pub component: ComponentKind,
    /// The entity's table row at write time.
    pub row: u32,
    /// The bytes that were written.
    pub bytes: Vec<u8>,
}

/// Where the cursor sits relative to the recorded commit points.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogState {
    /// Cursor at the tip: nothing to redo.
    Clean,
    /// Cursor strictly between origin and tip.
    Dirty,
    /// Cursor at the origin with history ahead of it.
    AtOrigin,
}

/// Configuration for the command log.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Hard cap on one update payload, in bytes. Oversized payloads are
    /// rejected, never silently truncated.
    pub max_payload_bytes: usize,
    /// Soft limit on total recorded entries. Crossing it flips
    /// [`crate::CommandLog::is_over_soft_limit`] so the owner can
    /// re-snapshot and clear; the log itself never drops history.
    pub soft_entry_limit: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 4096,
            soft_entry_limit: 100_000,
        }
    }
}

impl LogConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the payload cap.
    #[must_use]
    pub const fn with_max_payload_bytes(mut self, max: usize) -> Self {
        self.max_payload_bytes = max;
        self
    }

    /// Builder method to set the soft entry limit.
    #[must_use]
    pub const fn with_soft_entry_limit(mut self, limit: usize) -> Self {
        self.soft_entry_limit = limit;
        self
    }
}
