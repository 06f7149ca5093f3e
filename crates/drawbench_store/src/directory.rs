//! Global slot directory: handle index → {generation, kind, flags, row}.
//!
//! The directory makes handles resolvable in O(1) and stale handles
//! detectable. A slot is vacant iff its generation is 0; the generation a
//! future occupant will receive is kept on the slot itself, so it stays
//! monotonic no matter how the slot is claimed (free-list pop or an exact
//! handle supplied by replay or a mirroring store).

use bitflags::bitflags;
use drawbench_foundation::{EntityKind, Error, ErrorKind, Handle, Result};

bitflags! {
    /// Transient per-entity tags kept directory-side.
    ///
    /// Flag changes never touch handles or logged state; they are editor
    /// session state, not document state.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct SlotFlags: u16 {
        /// Entity is part of the current selection.
        const SELECTED = 1 << 0;
        /// Entity is hover-highlighted.
        const HIGHLIGHTED = 1 << 1;
        /// Entity is locked against interactive edits.
        const LOCKED = 1 << 2;
    }
}

/// One directory slot.
#[derive(Clone, Debug)]
struct Slot {
    /// Generation of the current occupant; 0 = vacant.
    generation: u32,
    /// Generation the next occupant of a vacant slot receives.
    next_generation: u32,
    /// Owning entity kind (meaningful while occupied).
    kind: EntityKind,
    /// Transient tags (cleared on release).
    flags: SlotFlags,
    /// Row in the owning kind's column table (meaningful while occupied).
    row: u32,
}

impl Slot {
    const fn vacant() -> Self {
        Self {
            generation: 0,
            next_generation: 1,
            kind: EntityKind::new(0),
            flags: SlotFlags::empty(),
            row: 0,
        }
    }
}

/// Global slot → {generation, kind, row} map with a free list.
#[derive(Clone, Debug, Default)]
pub struct Directory {
    slots: Vec<Slot>,
    /// Recycled slot indices. May contain indices later claimed directly
    /// via [`Directory::claim`]; allocation skips entries whose slot is no
    /// longer vacant, so duplicates are harmless.
    free: Vec<u32>,
    live: usize,
}

impl Directory {
    /// Creates a new empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Returns the total number of slots ever allocated.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Allocates a slot for a new entity of `kind`.
    ///
    /// Pops the free list when possible, otherwise grows the slot vector.
    /// The returned handle's generation comes from the slot and is never 0.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CapacityExhausted`] when the 32-bit index
    /// space is spent.
    pub fn allocate(&mut self, kind: EntityKind) -> Result<Handle> {
        while let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            if slot.generation != 0 {
                // Stale entry: the slot was claimed directly since it was
                // freed. Skip it.
                continue;
            }
            let generation = slot.next_generation;
            slot.generation = generation;
            slot.kind = kind;
            slot.flags = SlotFlags::empty();
            slot.row = 0;
            self.live += 1;
            return Ok(Handle::new(index, generation));
        }

        let index = u32::try_from(self.slots.len())
            .map_err(|_| Error::capacity_exhausted("directory slots"))?;
        self.slots.push(Slot {
            generation: 1,
            next_generation: 1,
            kind,
            flags: SlotFlags::empty(),
            row: 0,
        });
        self.live += 1;
        Ok(Handle::new(index, 1))
    }

    /// Claims the exact slot named by `handle` for a new entity of `kind`.
    ///
    /// Used by replay and by mirroring stores that must assign matching
    /// ids. Grows the directory as needed; intermediate slots created by
    /// growth are pushed onto the free list.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NullHandle`] for the none sentinel and
    /// [`ErrorKind::SlotOccupied`] if the slot is live.
    pub fn claim(&mut self, handle: Handle, kind: EntityKind) -> Result<()> {
        if handle.is_none() {
            return Err(Error::new(ErrorKind::NullHandle));
        }

        let index = handle.index as usize;
        while self.slots.len() <= index {
            let filler = u32::try_from(self.slots.len())
                .map_err(|_| Error::capacity_exhausted("directory slots"))?;
            self.slots.push(Slot::vacant());
            if filler != handle.index {
                self.free.push(filler);
            }
        }

        let slot = &mut self.slots[index];
        if slot.generation != 0 {
            return Err(Error::slot_occupied(handle));
        }

        slot.generation = handle.generation;
        slot.kind = kind;
        slot.flags = SlotFlags::empty();
        slot.row = 0;
        // Keep future occupants strictly ahead of the claimed generation.
        if slot.next_generation <= handle.generation {
            slot.next_generation = advance(handle.generation);
        }
        self.live += 1;
        Ok(())
    }

    /// Vacates the slot of a live handle, advancing its generation.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or never allocated.
    pub fn release(&mut self, handle: Handle) -> Result<()> {
        self.validate(handle)?;
        let slot = &mut self.slots[handle.index as usize];
        slot.next_generation = advance(slot.generation);
        slot.generation = 0;
        slot.flags = SlotFlags::empty();
        self.free.push(handle.index);
        self.live -= 1;
        Ok(())
    }

    /// Checks whether a handle names a live entity.
    #[must_use]
    pub fn has(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.generation == handle.generation && s.generation != 0)
    }

    /// Validates that a handle is live.
    ///
    /// # Errors
    ///
    /// Distinguishes a never-allocated index ([`ErrorKind::HandleNotFound`])
    /// from a generation mismatch ([`ErrorKind::StaleHandle`]).
    pub fn validate(&self, handle: Handle) -> Result<()> {
        if handle.is_none() {
            return Err(Error::new(ErrorKind::NullHandle));
        }
        let Some(slot) = self.slots.get(handle.index as usize) else {
            return Err(Error::handle_not_found(handle));
        };
        if slot.generation != handle.generation {
            return Err(Error::stale_handle(handle));
        }
        Ok(())
    }

    /// Returns the owning kind of a live handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn kind_of(&self, handle: Handle) -> Result<EntityKind> {
        self.validate(handle)?;
        Ok(self.slots[handle.index as usize].kind)
    }

    /// Returns the table row of a live handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn row_of(&self, handle: Handle) -> Result<u32> {
        self.validate(handle)?;
        Ok(self.slots[handle.index as usize].row)
    }

    /// Records the table row of a live handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn set_row(&mut self, handle: Handle, row: u32) -> Result<()> {
        self.validate(handle)?;
        self.slots[handle.index as usize].row = row;
        Ok(())
    }

    /// Returns the transient flags of a live handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn flags(&self, handle: Handle) -> Result<SlotFlags> {
        self.validate(handle)?;
        Ok(self.slots[handle.index as usize].flags)
    }

    /// Replaces the transient flags of a live handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is not live.
    pub fn set_flags(&mut self, handle: Handle, flags: SlotFlags) -> Result<()> {
        self.validate(handle)?;
        self.slots[handle.index as usize].flags = flags;
        Ok(())
    }
}

/// Next generation after `generation`, skipping 0 on wraparound.
const fn advance(generation: u32) -> u32 {
    match generation.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}
