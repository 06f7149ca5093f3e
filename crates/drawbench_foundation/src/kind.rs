//! Identifiers for registered entity kinds and component kinds.
//!
//! Both are small indices handed out by the schema registry at
//! registration time and compared by identity everywhere else.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a registered entity kind (symbol, port, net, module, ...).
///
/// Entity kinds select which column table an entity lives in. The kind of a
/// live entity is recorded in the store's directory, never in the handle.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityKind(u16);

impl EntityKind {
    /// Creates an entity kind from its raw registry index.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the raw registry index of this kind.
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKind({})", self.0)
    }
}

/// Identifier of a registered component kind (position, label, link, ...).
///
/// Component kinds name one column within the tables of every entity kind
/// that declares them.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentKind(u16);

impl ComponentKind {
    /// Creates a component kind from its raw registry index.
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the raw registry index of this component kind.
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKind({})", self.0)
    }
}
