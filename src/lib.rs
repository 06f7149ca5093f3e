//! Drawbench - persistent data layer for an interactive diagram editor
//!
//! This crate re-exports all layers of the drawbench system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: drawbench_runtime    — Editing sessions, document serialization
//! Layer 2: drawbench_log        — Command log, replay-based undo/redo
//! Layer 1: drawbench_store      — Directory, column tables, relation lists
//! Layer 0: drawbench_foundation — Core types (Handle, Error, StringPool)
//! ```

pub use drawbench_foundation as foundation;
pub use drawbench_log as log;
pub use drawbench_runtime as runtime;
pub use drawbench_store as store;
