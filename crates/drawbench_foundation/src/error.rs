//! Error types for the drawbench data layer.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! The taxonomy deliberately turns what the surrounding editor once treated
//! as assertions (stale handle use, undeclared components, committing with
//! pending redo, oversized update payloads) into explicit fallible results,
//! and surfaces allocation limits as reported errors instead of aborts.

use thiserror::Error;

use crate::handle::Handle;
use crate::kind::{ComponentKind, EntityKind};
use crate::pool::StrId;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for drawbench operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about the operation that failed.
    pub context: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Creates a stale handle error (generation mismatch).
    #[must_use]
    pub fn stale_handle(handle: Handle) -> Self {
        Self::new(ErrorKind::StaleHandle(handle))
    }

    /// Creates a handle not found error (index never allocated).
    #[must_use]
    pub fn handle_not_found(handle: Handle) -> Self {
        Self::new(ErrorKind::HandleNotFound(handle))
    }

    /// Creates a slot occupied error.
    #[must_use]
    pub fn slot_occupied(handle: Handle) -> Self {
        Self::new(ErrorKind::SlotOccupied(handle))
    }

    /// Creates an unknown entity kind error.
    #[must_use]
    pub fn unknown_kind(kind: EntityKind) -> Self {
        Self::new(ErrorKind::UnknownKind(kind))
    }

    /// Creates an undeclared component error.
    #[must_use]
    pub fn undeclared_component(kind: EntityKind, component: ComponentKind) -> Self {
        Self::new(ErrorKind::UndeclaredComponent { kind, component })
    }

    /// Creates a component size mismatch error.
    #[must_use]
    pub fn size_mismatch(component: ComponentKind, expected: usize, actual: usize) -> Self {
        Self::new(ErrorKind::ComponentSizeMismatch {
            component,
            expected,
            actual,
        })
    }

    /// Creates a capacity exhausted error.
    #[must_use]
    pub fn capacity_exhausted(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::CapacityExhausted(what.into()))
    }

    /// Creates a duplicate registration error.
    #[must_use]
    pub fn duplicate_registration(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateRegistration(name.into()))
    }

    /// Creates a malformed handle string error.
    #[must_use]
    pub fn malformed_handle(text: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedHandle(text.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Handle generation no longer matches the slot (entity was removed,
    /// slot possibly reused).
    #[error("stale handle: {0:?}")]
    StaleHandle(Handle),

    /// Handle index was never allocated.
    #[error("handle not found: {0:?}")]
    HandleNotFound(Handle),

    /// The none sentinel was passed where a live handle is required.
    #[error("none handle passed to an operation requiring a live handle")]
    NullHandle,

    /// `create_with_handle` was given a handle whose slot is live.
    #[error("slot already occupied: {0:?}")]
    SlotOccupied(Handle),

    /// Entity kind was never registered.
    #[error("unknown entity kind: {0:?}")]
    UnknownKind(EntityKind),

    /// Component kind is not declared for the entity kind.
    #[error("component {component:?} not declared for {kind:?}")]
    UndeclaredComponent {
        /// The entity kind that was addressed.
        kind: EntityKind,
        /// The component kind that is not declared for it.
        component: ComponentKind,
    },

    /// Byte length does not match the declared column size.
    #[error("component {component:?} size mismatch: expected {expected} bytes, got {actual}")]
    ComponentSizeMismatch {
        /// The component kind that was addressed.
        component: ComponentKind,
        /// The declared column element size.
        expected: usize,
        /// The size actually supplied.
        actual: usize,
    },

    /// Row index is out of the table's current bounds.
    #[error("row {row} out of bounds (length {length})")]
    RowOutOfBounds {
        /// The row that was addressed.
        row: u32,
        /// The table's current length.
        length: usize,
    },

    /// The member is not linked into the owner's relation list.
    #[error("entity {member:?} is not linked under {owner:?}")]
    NotLinked {
        /// The list owner.
        owner: Handle,
        /// The entity that was expected to be a member.
        member: Handle,
    },

    /// The member is already linked into some relation list.
    #[error("entity {member:?} is already linked")]
    AlreadyLinked {
        /// The entity that already carries link pointers.
        member: Handle,
    },

    /// Update payload exceeds the configured cap.
    #[error("update payload of {length} bytes exceeds the {max} byte cap")]
    PayloadTooLarge {
        /// The payload length that was supplied.
        length: usize,
        /// The configured maximum.
        max: usize,
    },

    /// `commit` was called while redo history is pending.
    #[error("cannot commit with {pending} redo step(s) pending")]
    RedoPending {
        /// Number of commit points ahead of the cursor.
        pending: usize,
    },

    /// A growth limit was reached (index space, payload table, ...).
    #[error("capacity exhausted: {0}")]
    CapacityExhausted(String),

    /// A name or declaration was registered twice.
    #[error("duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// A string id was released more times than it was acquired.
    #[error("stale string id: {0:?}")]
    StaleString(StrId),

    /// A portable handle string failed to parse.
    #[error("malformed handle string: {0:?}")]
    MalformedHandle(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// File I/O failed.
    #[error("io error: {0}")]
    IoError(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}
