//! # Runtime-Sized Records
//!
//! This module is the layout core: field descriptors, record declaration,
//! the layout engine, and the typed views that read and write constructed
//! records.
//!
//! ## Record Memory Layout
//!
//! A record region is a flat concatenation of its fields in declaration
//! order, no padding, no alignment:
//!
//! ```text
//! +-----------+-----------+----------------+-----------+
//! | field 0   | field 1   | field 2        | field 3   |
//! | (single)  | (option)  | (either)       | (nested)  |
//! | size s0   | s1 or 0   | size(A|B)      | inner sz  |
//! +-----------+-----------+----------------+-----------+
//! offset 0    s0          s0+s1            s0+s1+s2
//! ```
//!
//! Field sizes depend on configuration flags, so the region size of a
//! record type is a runtime quantity: toggling a flag and recomputing the
//! layout changes the size *new* instances are built with. Existing
//! instances keep the snapshot they were constructed under.
//!
//! ## Module Structure
//!
//! - `descriptor`: per-field offset/size metadata and resolved shapes
//! - `declare`: the `Record` trait, field registration, typed keys
//! - `layout`: `RecordLayout` snapshots and the offset-assignment walk
//! - `view`: `RecordRef`/`RecordMut` typed access over a record's bytes

pub mod declare;
pub mod descriptor;
pub mod layout;
pub mod view;


pub use declare::{
    EitherKey, FieldList, NestedKey, OptionKey, Record, RecordKey, SingleKey,
};
pub use descriptor::{FieldDescriptor, FieldShape};
pub use layout::RecordLayout;
pub use view::{RecordMut, RecordRef};

pub(crate) use declare::{FieldSpec, RecordSpec};
pub(crate) use layout::{compute_layout, LayoutEnv};

use smallvec::SmallVec;

/// Per-record vectors stay inline for records at or under
/// [`INLINE_FIELDS`](crate::config::INLINE_FIELDS) fields.
pub(crate) type FieldVec<T> = SmallVec<[T; crate::config::INLINE_FIELDS]>;
