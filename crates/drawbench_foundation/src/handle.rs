//! Generational handles to stored entities.
//!
//! A handle names one live-or-formerly-live entity: a slot index plus a
//! generation counter. The owning entity kind is deliberately *not* part of
//! the handle; it lives in the store's directory so that transient tag
//! changes never force handles to be re-encoded.

use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};

/// Generational handle to one entity in the store.
///
/// The generation counter is bumped every time a slot is reused, so a handle
/// to a destroyed entity can be detected as stale instead of silently
/// resolving to the slot's new occupant. Live handles always carry a
/// non-zero generation; the all-zero value is the [`Handle::NONE`] sentinel,
/// which makes zero-initialized component columns denote "no handle".
///
/// # Layout
/// - `index`: 32-bit slot index into the directory
/// - `generation`: 32-bit generation counter (0 = none)
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Handle {
    /// Slot index into the directory.
    pub index: u32,
    /// Generation counter for stale reference detection.
    pub generation: u32,
}

impl Handle {
    /// Sentinel value representing "no entity".
    ///
    /// This is the all-zero bit pattern, so freshly zeroed component
    /// columns read back as `NONE`.
    pub const NONE: Handle = Handle {
        index: 0,
        generation: 0,
    };

    /// Creates a new handle with the given index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns true if this is the none sentinel.
    ///
    /// Any handle with generation 0 counts as none; the store never issues
    /// generation 0.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.generation == 0
    }

    /// Returns true if this handle names some entity (live or stale).
    #[must_use]
    pub const fn is_some(self) -> bool {
        self.generation != 0
    }

    /// Packs this handle into a single word.
    ///
    /// The generation occupies the high 32 bits, the index the low 32.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Unpacks a handle from its single-word form.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Handle(none)")
        } else {
            write!(f, "Handle({}v{})", self.index, self.generation)
        }
    }
}

/// The portable string form used by serialized documents: `"12v3"`.
///
/// This form is stable across row compaction because it is keyed by
/// index and generation, never by row.
impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

impl FromStr for Handle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((index, generation)) = s.split_once('v') else {
            return Err(Error::malformed_handle(s));
        };
        let index: u32 = index.parse().map_err(|_| Error::malformed_handle(s))?;
        let generation: u32 = generation.parse().map_err(|_| Error::malformed_handle(s))?;
        if generation == 0 {
            return Err(Error::malformed_handle(s));
        }
        Ok(Self { index, generation })
    }
}
