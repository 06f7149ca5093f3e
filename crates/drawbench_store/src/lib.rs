//! Entity storage for the drawbench data layer.
//!
//! This crate provides:
//! - [`SchemaRegistry`] - Per-kind component layout metadata
//! - [`Directory`] - Global slot map making handles resolvable in O(1)
//! - [`ColumnTable`] - Dense per-kind parallel component columns
//! - [`Store`] - The unified storage facade with relation list maintenance

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod directory;
mod registry;
mod relation;
mod store;
mod table;

pub use directory::{Directory, SlotFlags};
pub use registry::SchemaRegistry;
pub use relation::{RelationIter, RelationLink, RelationList};
pub use store::Store;
pub use table::ColumnTable;
