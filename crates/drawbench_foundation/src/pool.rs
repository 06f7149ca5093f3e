//! Reference-counted string interning for names and labels.
//!
//! Entities do not own their text; they hold [`StrId`]s into the pool. Each
//! acquisition must be matched by exactly one release (typically on entity
//! removal) or the string leaks. Releasing a dead id is reported as an
//! error rather than corrupting a recycled slot's count.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, ErrorKind, Result};

/// Interned string identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct StrId(pub(crate) u32);

impl StrId {
    /// Returns the raw slot index of this string.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for StrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrId({})", self.0)
    }
}

/// One pool slot: interned text plus its reference count.
#[derive(Clone, Debug, Default)]
struct PoolSlot {
    text: Option<Arc<str>>,
    count: u32,
}

/// Reference-counted interner for strings.
///
/// Acquiring the same text twice returns the same id with its count
/// incremented; the slot is recycled once the count returns to zero.
/// The pool is not thread-safe; use external synchronization if needed.
#[derive(Clone, Debug, Default)]
pub struct StringPool {
    /// Slot storage; vacant slots have `text == None`.
    slots: Vec<PoolSlot>,
    /// Map from interned text to slot index.
    lookup: HashMap<Arc<str>, u32>,
    /// Recycled slot indices.
    free: Vec<u32>,
}

impl StringPool {
    /// Creates a new empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `text`, returning its id.
    ///
    /// If the text is already pooled its reference count is incremented
    /// and the existing id returned.
    ///
    /// # Panics
    ///
    /// Panics if the number of pooled strings exceeds `u32::MAX`.
    pub fn acquire(&mut self, text: &str) -> StrId {
        if let Some(&idx) = self.lookup.get(text) {
            self.slots[idx as usize].count += 1;
            return StrId(idx);
        }

        let arc: Arc<str> = text.into();
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = PoolSlot {
                text: Some(arc.clone()),
                count: 1,
            };
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).expect("too many pooled strings");
            self.slots.push(PoolSlot {
                text: Some(arc.clone()),
                count: 1,
            });
            idx
        };

        self.lookup.insert(arc, idx);
        StrId(idx)
    }

    /// Adds one reference to an already-pooled string.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::StaleString`] if the id is not live.
    pub fn retain(&mut self, id: StrId) -> Result<()> {
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .filter(|s| s.text.is_some())
            .ok_or_else(|| Error::new(ErrorKind::StaleString(id)))?;
        slot.count += 1;
        Ok(())
    }

    /// Drops one reference, recycling the slot at zero.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::StaleString`] if the id is not live.
    pub fn release(&mut self, id: StrId) -> Result<()> {
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .filter(|s| s.text.is_some())
            .ok_or_else(|| Error::new(ErrorKind::StaleString(id)))?;

        slot.count -= 1;
        if slot.count == 0 {
            let text = slot.text.take().expect("live slot has text");
            self.lookup.remove(&text);
            self.free.push(id.0);
        }
        Ok(())
    }

    /// Resolves an id back to its text.
    #[must_use]
    pub fn resolve(&self, id: StrId) -> Option<&str> {
        self.slots
            .get(id.0 as usize)
            .and_then(|s| s.text.as_deref())
    }

    /// Returns the reference count for an id, if it is live.
    #[must_use]
    pub fn ref_count(&self, id: StrId) -> Option<u32> {
        self.slots
            .get(id.0 as usize)
            .filter(|s| s.text.is_some())
            .map(|s| s.count)
    }

    /// Returns the number of live strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Returns true if the pool holds no live strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}
