//! # dynrec - Runtime-Sized Record Layouts
//!
//! `dynrec` lets a program declare record types whose byte size is not
//! fixed at compile time: individual fields can be conditionally present
//! or switch between two representations based on configuration flags
//! resolved when the layout is computed. Offsets and total size are
//! assigned on demand, and instances are constructed into exactly-sized
//! memory regions - heap-owned, caller-supplied, or carved from a bump
//! arena.
//!
//! ## Quick Start
//!
//! ```ignore
//! use dynrec::{EitherKey, FieldList, Instance, LayoutContext, Record, SingleKey};
//!
//! enum Reading {}
//!
//! struct ReadingKeys {
//!     value: EitherKey<Reading, f32, f64>,
//!     station: SingleKey<Reading, i64>,
//! }
//!
//! impl Record for Reading {
//!     const NAME: &'static str = "reading";
//!     const FIELD_COUNT: usize = 2;
//!     type Keys = ReadingKeys;
//!
//!     fn declare(fields: &mut FieldList<Self>) -> ReadingKeys {
//!         let wide = fields.flag("double_precision");
//!         ReadingKeys {
//!             value: fields.either("value", wide),
//!             station: fields.single("station"),
//!         }
//!     }
//! }
//!
//! let mut ctx = LayoutContext::new();
//! let keys = ctx.register::<Reading>();
//! ctx.recompute::<Reading>()?;              // value stored as f32: 12 bytes
//!
//! let mut inst = Instance::<Reading>::allocate(&ctx)?;
//! inst.fields_mut().set_either(keys.value, 350.0)?;
//! inst.fields_mut().set(keys.station, 7)?;
//! assert_eq!(inst.fields().get_either(keys.value)?, 350.0);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------+
//! |        Instance (owned / borrowed / arena)        |
//! +--------------------------------------------------+
//! |   RecordRef / RecordMut (typed field access)      |
//! +--------------------------------------------------+
//! |  RecordLayout snapshot (descriptors, total size)  |
//! +--------------------------------------------------+
//! |  LayoutContext (flags, registry, recomputation)   |
//! +--------------------------------------------------+
//! |     Region (bounds-checked byte storage)          |
//! +--------------------------------------------------+
//! ```
//!
//! ## Layout Lifecycle
//!
//! Flag values live in a [`LayoutContext`]; computing a layout resolves
//! each field's size against them and produces an immutable snapshot.
//! Instances capture the snapshot they were constructed under, so flag
//! changes never move the ground under a live instance. After changing a
//! flag the caller recomputes explicitly; until then the context reports
//! its layouts as stale and refuses to size new instances.
//!
//! ## Module Overview
//!
//! - [`context`]: flags, record registry, layout recomputation
//! - [`records`]: descriptors, declaration, layout snapshots, typed views
//! - [`instance`]: containers owning or borrowing record regions
//! - [`region`]: byte buffers with allocation accounting
//! - [`values`]: field value codecs and either-arm conversions
//! - [`config`]: crate-wide constants

#[macro_use]
mod macros;

pub mod config;
pub mod context;
pub mod instance;
pub mod records;
pub mod region;
pub mod values;

pub use context::{FlagId, LayoutContext};
pub use instance::{ConstructToken, Instance};
pub use records::{
    EitherKey, FieldDescriptor, FieldList, FieldShape, NestedKey, OptionKey, Record,
    RecordKey, RecordLayout, RecordMut, RecordRef, SingleKey,
};
pub use region::{Region, RegionStats};
pub use values::{Convert, FieldCodec};
