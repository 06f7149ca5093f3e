//! Editing session: store mutations that report to the command log.
//!
//! The session owns the live store, the one retained baseline snapshot,
//! and the command log. Every structural or field-level edit goes through
//! a session method so the log sees it; transient flag changes bypass the
//! log by design. Undo and redo hand the store and baseline to the log as
//! its replay target.

use std::sync::Arc;

use bytemuck::Pod;
use tracing::debug;

use drawbench_foundation::{ComponentKind, EntityKind, Error, ErrorKind, Handle, Result};
use drawbench_log::{CommandLog, LogConfig, LogState, Replay};
use drawbench_store::{RelationLink, RelationList, SchemaRegistry, SlotFlags, Store};

/// One editing session over a drawbench store.
pub struct Session {
    baseline: Store,
    store: Store,
    log: CommandLog,
}

/// The log's view of a session during replay.
struct StoreReplay<'a> {
    baseline: &'a Store,
    store: &'a mut Store,
}

impl Replay for StoreReplay<'_> {
    fn reset(&mut self) -> Result<()> {
        *self.store = self.baseline.clone();
        Ok(())
    }

    fn replay_create(&mut self, kind: EntityKind, id: Handle) -> Result<()> {
        self.store.create_with_handle(kind, id)
    }

    fn replay_delete(&mut self, id: Handle) -> Result<()> {
        self.store.remove(id)
    }

    fn replay_update(
        &mut self,
        kind: EntityKind,
        component: ComponentKind,
        row: u32,
        bytes: &[u8],
    ) -> Result<()> {
        self.store.write_row_raw(kind, component, row, bytes)
    }
}

impl Session {
    /// Creates a session over an empty store.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, LogConfig::default())
    }

    /// Creates a session over an empty store with an explicit log config.
    #[must_use]
    pub fn with_config(registry: Arc<SchemaRegistry>, config: LogConfig) -> Self {
        let store = Store::new(registry);
        Self {
            baseline: store.snapshot(),
            store,
            log: CommandLog::with_config(config),
        }
    }

    /// Creates a session over an already-populated store.
    ///
    /// The store's current state becomes the undo baseline; a loaded
    /// document starts with empty history.
    #[must_use]
    pub fn from_store(store: Store, config: LogConfig) -> Self {
        Self {
            baseline: store.snapshot(),
            store,
            log: CommandLog::with_config(config),
        }
    }

    /// Returns the live store for reads.
    ///
    /// All mutation goes through session methods so the log records it.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Returns the command log.
    #[must_use]
    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Returns where the undo cursor sits.
    #[must_use]
    pub fn log_state(&self) -> LogState {
        self.log.state()
    }

    /// Creates a new entity and records it.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unknown or index space is spent.
    pub fn create(&mut self, kind: EntityKind) -> Result<Handle> {
        let handle = self.store.create(kind)?;
        self.log.record_create(handle, kind);
        Ok(handle)
    }

    /// Removes an entity and records it.
    ///
    /// Relation list membership and pooled strings held by the entity are
    /// the caller's responsibility to unlink and release first.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn remove(&mut self, handle: Handle) -> Result<()> {
        let kind = self.store.kind_of(handle)?;
        self.store.remove(handle)?;
        self.log.record_delete(handle, kind);
        Ok(())
    }

    /// Overwrites one component from raw bytes and records it.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live, the component is not
    /// declared, the size does not match, or the bytes exceed the log's
    /// payload cap (checked before the store is touched, so store and log
    /// never diverge).
    pub fn set_raw(&mut self, handle: Handle, component: ComponentKind, bytes: &[u8]) -> Result<()> {
        self.check_payload(bytes.len())?;
        self.store.set_raw(handle, component, bytes)?;
        self.record_component(handle, component)
    }

    /// Overwrites one component with a typed value and records it.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Session::set_raw`].
    pub fn set<T: Pod>(&mut self, handle: Handle, component: ComponentKind, value: T) -> Result<()> {
        self.set_raw(handle, component, bytemuck::bytes_of(&value))
    }

    /// Appends `member` to `owner`'s relation list and records every
    /// component the splice touched.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Store::relation_append`].
    pub fn relation_append(
        &mut self,
        owner: Handle,
        member: Handle,
        list: ComponentKind,
        link: ComponentKind,
    ) -> Result<()> {
        self.check_payload(RelationList::SIZE.max(RelationLink::SIZE))?;
        let old_tail = self.store.get::<RelationList>(owner, list)?.tail;

        self.store.relation_append(owner, member, list, link)?;

        self.record_component(owner, list)?;
        self.record_component(member, link)?;
        if old_tail.is_some() {
            self.record_component(old_tail, link)?;
        }
        Ok(())
    }

    /// Unlinks `member` from `owner`'s relation list and records every
    /// component the splice touched.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Store::relation_remove`].
    pub fn relation_remove(
        &mut self,
        owner: Handle,
        member: Handle,
        list: ComponentKind,
        link: ComponentKind,
    ) -> Result<()> {
        self.check_payload(RelationList::SIZE.max(RelationLink::SIZE))?;
        let member_link = self.store.get::<RelationLink>(member, link)?;

        self.store.relation_remove(owner, member, list, link)?;

        self.record_component(owner, list)?;
        self.record_component(member, link)?;
        if member_link.prev.is_some() {
            self.record_component(member_link.prev, link)?;
        }
        if member_link.next.is_some() {
            self.record_component(member_link.next, link)?;
        }
        Ok(())
    }

    /// Replaces an entity's transient flags.
    ///
    /// Flags are session state, not document state: never recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn set_flags(&mut self, handle: Handle, flags: SlotFlags) -> Result<()> {
        self.store.set_flags(handle, flags)
    }

    /// Adds transient flags to an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn insert_flags(&mut self, handle: Handle, flags: SlotFlags) -> Result<()> {
        self.store.insert_flags(handle, flags)
    }

    /// Removes transient flags from an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn remove_flags(&mut self, handle: Handle, flags: SlotFlags) -> Result<()> {
        self.store.remove_flags(handle, flags)
    }

    /// Bookmarks everything recorded since the last commit as one
    /// undoable step.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::RedoPending`] if redo history is pending.
    pub fn commit(&mut self) -> Result<()> {
        self.log.commit()
    }

    /// Undoes one committed step. Returns `Ok(false)` at the origin.
    ///
    /// # Errors
    ///
    /// Propagates replay failures.
    pub fn undo(&mut self) -> Result<bool> {
        let Self {
            baseline,
            store,
            log,
        } = self;
        log.undo(&mut StoreReplay { baseline, store })
    }

    /// Redoes one undone step. Returns `Ok(false)` at the tip.
    ///
    /// # Errors
    ///
    /// Propagates replay failures.
    pub fn redo(&mut self) -> Result<bool> {
        let Self {
            baseline,
            store,
            log,
        } = self;
        log.redo(&mut StoreReplay { baseline, store })
    }

    /// Re-snapshots the baseline and clears the log.
    ///
    /// Undo cost is O(log length); long sessions call this periodically,
    /// explicitly trading away undo history for bounded replay time.
    /// [`CommandLog::is_over_soft_limit`] signals when it is due.
    pub fn rebaseline(&mut self) {
        debug!(
            entries = self.log.entry_count(),
            "rebaselining, undo history discarded"
        );
        self.baseline = self.store.snapshot();
        self.log.clear();
    }

    // --- Private helpers ---

    /// Reads a component's current bytes and records them as an update.
    fn record_component(&mut self, handle: Handle, component: ComponentKind) -> Result<()> {
        let kind = self.store.kind_of(handle)?;
        let row = self.store.row_of(handle)?;
        let bytes = self.store.get_raw(handle, component)?;
        self.log.record_update(handle, kind, component, row, bytes)
    }

    /// Rejects writes the log could not record, before the store mutates.
    fn check_payload(&self, length: usize) -> Result<()> {
        let max = self.log.config().max_payload_bytes;
        if length > max {
            return Err(Error::new(ErrorKind::PayloadTooLarge { length, max }));
        }
        Ok(())
    }
}
