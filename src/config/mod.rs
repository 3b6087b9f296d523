//! # Configuration Constants
//!
//! This module centralizes the tunable limits of the crate. Constants that
//! depend on each other are co-located and their relationships documented so
//! a change to one is checked against the others.
//!
//! ## Dependency Graph
//!
//! ```text
//! MAX_NESTING_DEPTH (16)
//!       │
//!       └─> Bounds recursion in layout computation. A record that embeds
//!           itself (directly or through a chain) is reported as an error
//!           at this depth instead of overflowing the stack.
//!
//! INLINE_FIELDS (8)
//!       │
//!       └─> SmallVec inline capacity for per-record field vectors. Layout
//!           snapshots for records at or under this field count allocate
//!           nothing beyond the snapshot itself.
//! ```

/// Maximum depth of record-in-record embedding the layout engine will
/// resolve before reporting a cycle.
pub const MAX_NESTING_DEPTH: usize = 16;

/// Inline capacity for per-record field vectors. Records with more fields
/// than this spill to the heap; they still work, they just allocate.
pub const INLINE_FIELDS: usize = 8;
