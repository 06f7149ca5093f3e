//! The unified storage facade.
//!
//! A [`Store`] owns the directory and one column table per registered
//! entity kind. Every operation resolves handles through the directory, so
//! callers may hold handles for as long as they like and re-resolve after
//! any mutation; row indices, by contrast, are invalidated by any removal
//! of the same kind and must never be cached across one.

use std::sync::Arc;

use bytemuck::Pod;
use tracing::trace;

use drawbench_foundation::{ComponentKind, EntityKind, Error, Handle, Result};

use crate::directory::{Directory, SlotFlags};
use crate::registry::SchemaRegistry;
use crate::table::ColumnTable;

/// Generational, multi-type entity-component store.
///
/// Cloning produces a deep snapshot (the schema registry is shared
/// structurally); the undo layer keeps exactly one such baseline and
/// replays its log against it.
#[derive(Clone, Debug)]
pub struct Store {
    registry: Arc<SchemaRegistry>,
    directory: Directory,
    tables: Vec<ColumnTable>,
}

impl Store {
    /// Creates an empty store over a finished registry.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        let tables = registry
            .kinds()
            .map(|kind| ColumnTable::new(&registry.column_sizes(kind)))
            .collect();
        Self {
            registry,
            directory: Directory::new(),
            tables,
        }
    }

    /// Returns the shared schema registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Returns a deep snapshot of the current state.
    ///
    /// This is the baseline the undo layer replays against.
    #[must_use]
    pub fn snapshot(&self) -> Store {
        self.clone()
    }

    /// Returns the total number of live entities across all kinds.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.directory.live_count()
    }

    /// Returns the number of live entities of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unknown.
    pub fn count(&self, kind: EntityKind) -> Result<usize> {
        Ok(self.table(kind)?.len())
    }

    /// Creates a new entity of `kind` with zero-initialized components.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unknown or index space is spent.
    pub fn create(&mut self, kind: EntityKind) -> Result<Handle> {
        self.check_kind(kind)?;
        let handle = self.directory.allocate(kind)?;
        let row = self.tables[kind.index() as usize].push_row(handle)?;
        self.directory.set_row(handle, row)?;
        trace!(?handle, ?kind, row, "created entity");
        Ok(handle)
    }

    /// Creates a new entity of `kind` under a caller-supplied handle.
    ///
    /// Used by replay and by mirroring stores that must assign matching
    /// ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unknown, the handle is the none
    /// sentinel, or its slot is already occupied.
    pub fn create_with_handle(&mut self, kind: EntityKind, handle: Handle) -> Result<()> {
        self.check_kind(kind)?;
        self.directory.claim(handle, kind)?;
        let row = self.tables[kind.index() as usize].push_row(handle)?;
        self.directory.set_row(handle, row)?;
        trace!(?handle, ?kind, row, "created entity with explicit handle");
        Ok(())
    }

    /// Checks whether a handle names a live entity.
    #[must_use]
    pub fn has(&self, handle: Handle) -> bool {
        self.directory.has(handle)
    }

    /// Returns the owning kind of a live handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn kind_of(&self, handle: Handle) -> Result<EntityKind> {
        self.directory.kind_of(handle)
    }

    /// Returns the current table row of a live handle.
    ///
    /// The row is only valid until the next removal of the same kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn row_of(&self, handle: Handle) -> Result<u32> {
        self.directory.row_of(handle)
    }

    /// Removes a live entity, compacting its table.
    ///
    /// If the entity's row was not the last, the last row is copied
    /// byte-for-byte into its place and the moved entity's directory row
    /// is updated. O(1); invalidates any cached row of this kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn remove(&mut self, handle: Handle) -> Result<()> {
        let kind = self.directory.kind_of(handle)?;
        let row = self.directory.row_of(handle)?;

        let moved = self.tables[kind.index() as usize].swap_remove_row(row)?;
        if let Some(moved_id) = moved {
            self.directory.set_row(moved_id, row)?;
        }
        self.directory.release(handle)?;
        trace!(?handle, ?kind, row, "removed entity");
        Ok(())
    }

    /// Reads one component as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live or the component is not
    /// declared for its kind.
    pub fn get_raw(&self, handle: Handle, component: ComponentKind) -> Result<&[u8]> {
        let kind = self.directory.kind_of(handle)?;
        let row = self.directory.row_of(handle)?;
        let position = self.position(kind, component)?;
        self.tables[kind.index() as usize].get(row, position)
    }

    /// Overwrites one component from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live, the component is not
    /// declared for its kind, or the byte length does not match the
    /// declared column size.
    pub fn set_raw(&mut self, handle: Handle, component: ComponentKind, bytes: &[u8]) -> Result<()> {
        let kind = self.directory.kind_of(handle)?;
        let row = self.directory.row_of(handle)?;
        let position = self.position(kind, component)?;
        self.check_size(component, bytes.len())?;
        self.tables[kind.index() as usize].set(row, position, bytes)
    }

    /// Reads one component as a typed value.
    ///
    /// The value is copied out; columns are byte-aligned, not
    /// type-aligned.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live, the component is not
    /// declared, or `T`'s size does not match the declared column size.
    pub fn get<T: Pod>(&self, handle: Handle, component: ComponentKind) -> Result<T> {
        let bytes = self.get_raw(handle, component)?;
        if bytes.len() != size_of::<T>() {
            return Err(Error::size_mismatch(component, bytes.len(), size_of::<T>()));
        }
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// Overwrites one component with a typed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live, the component is not
    /// declared, or `T`'s size does not match the declared column size.
    pub fn set<T: Pod>(&mut self, handle: Handle, component: ComponentKind, value: T) -> Result<()> {
        self.set_raw(handle, component, bytemuck::bytes_of(&value))
    }

    /// Writes bytes directly into a column cell by kind and row.
    ///
    /// This is the replay-update primitive: it never consults the
    /// directory, because logged rows are only meaningful during an
    /// in-order replay from the baseline.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unknown, the component is not
    /// declared, the row is out of bounds, or the byte length does not
    /// match the declared column size.
    pub fn write_row_raw(
        &mut self,
        kind: EntityKind,
        component: ComponentKind,
        row: u32,
        bytes: &[u8],
    ) -> Result<()> {
        self.check_kind(kind)?;
        let position = self.position(kind, component)?;
        self.check_size(component, bytes.len())?;
        self.tables[kind.index() as usize].set(row, position, bytes)
    }

    /// Iterates live entities of one kind in current row order.
    ///
    /// Lazy and restartable. Order is unstable across removals; the
    /// `&self` borrow prevents interleaving with removals.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is unknown.
    pub fn iterate(&self, kind: EntityKind) -> Result<impl Iterator<Item = Handle> + '_> {
        Ok(self.table(kind)?.iter_ids())
    }

    /// Returns the transient flags of a live entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn flags(&self, handle: Handle) -> Result<SlotFlags> {
        self.directory.flags(handle)
    }

    /// Replaces the transient flags of a live entity.
    ///
    /// Flags live directory-side only, so this never re-encodes handles
    /// and is never recorded in the command log.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn set_flags(&mut self, handle: Handle, flags: SlotFlags) -> Result<()> {
        self.directory.set_flags(handle, flags)
    }

    /// Adds flags to a live entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn insert_flags(&mut self, handle: Handle, flags: SlotFlags) -> Result<()> {
        let current = self.directory.flags(handle)?;
        self.directory.set_flags(handle, current | flags)
    }

    /// Removes flags from a live entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn remove_flags(&mut self, handle: Handle, flags: SlotFlags) -> Result<()> {
        let current = self.directory.flags(handle)?;
        self.directory.set_flags(handle, current - flags)
    }

    // --- Private helpers ---

    pub(crate) fn table(&self, kind: EntityKind) -> Result<&ColumnTable> {
        self.tables
            .get(kind.index() as usize)
            .ok_or_else(|| Error::unknown_kind(kind))
    }

    fn check_kind(&self, kind: EntityKind) -> Result<()> {
        if (kind.index() as usize) < self.tables.len() {
            Ok(())
        } else {
            Err(Error::unknown_kind(kind))
        }
    }

    fn position(&self, kind: EntityKind, component: ComponentKind) -> Result<usize> {
        self.registry
            .position(kind, component)
            .ok_or_else(|| Error::undeclared_component(kind, component))
    }

    fn check_size(&self, component: ComponentKind, actual: usize) -> Result<()> {
        let expected = self
            .registry
            .component_size(component)
            .unwrap_or_default();
        if expected == actual {
            Ok(())
        } else {
            Err(Error::size_mismatch(component, expected, actual))
        }
    }
}
