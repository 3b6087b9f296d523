//! # Layout Snapshots and the Layout Engine
//!
//! [`RecordLayout`] is the immutable result of resolving a record's field
//! list against a set of flag values: one [`FieldShape`] per declared field,
//! offsets assigned as a running sum in declaration order, and the total
//! size. Snapshots are shared by `Arc`; an instance captures the snapshot
//! it was constructed under and keeps answering through it even after the
//! context's flags change, so a recomputation can never corrupt a live
//! instance.
//!
//! ## Invariants
//!
//! For a standalone layout (adjusters all zero):
//!
//! - `shape(i).descriptor().offset == sum(shape(j).descriptor().size for j < i)`
//! - `total_size() == sum of all field sizes`
//!
//! Embedding into an outer record shifts `offset` and `offset_adjuster`
//! together, so `offset - offset_adjuster` is stable across any nesting
//! depth.

use std::any::TypeId;

use eyre::Result;

use crate::config::MAX_NESTING_DEPTH;
use crate::records::descriptor::ShapeKind;
use crate::records::{FieldDescriptor, FieldShape, FieldSpec, FieldVec, RecordSpec};
use crate::context::FlagId;

/// Immutable layout snapshot for one record type, valid for the flag values
/// it was computed under.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    pub(crate) record_name: &'static str,
    pub(crate) shapes: FieldVec<FieldShape>,
    pub(crate) total_size: usize,
    pub(crate) generation: u64,
}

impl RecordLayout {
    /// Total byte size of an instance constructed under this snapshot.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// The context generation this snapshot was computed at. Two instances
    /// can exchange data only when their generations match.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn record_name(&self) -> &'static str {
        self.record_name
    }

    pub fn field_count(&self) -> usize {
        self.shapes.len()
    }

    /// Resolved shape of the field at `slot` (declaration order).
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range; keys produced by the record's own
    /// declaration are always in range.
    pub fn shape(&self, slot: usize) -> &FieldShape {
        &self.shapes[slot]
    }

    pub fn shapes(&self) -> impl Iterator<Item = &FieldShape> {
        self.shapes.iter()
    }

    /// Current size of the field at `slot`. An absent option reports 0.
    pub fn field_size(&self, slot: usize) -> usize {
        self.shapes[slot].descriptor.size
    }

    pub(crate) fn rebase(&self, base: usize) -> RecordLayout {
        RecordLayout {
            record_name: self.record_name,
            shapes: self.shapes.iter().map(|s| s.rebase(base)).collect(),
            total_size: self.total_size,
            generation: self.generation,
        }
    }
}

/// Flag values and registered specs the engine resolves against; implemented
/// by [`LayoutContext`](crate::context::LayoutContext).
pub(crate) trait LayoutEnv {
    fn flag_value(&self, id: FlagId) -> bool;

    fn spec_for(&self, ty: TypeId) -> Option<&RecordSpec>;
}

/// Walks `spec`'s field list in declaration order, resolving each field's
/// size against current flag values and accumulating offsets. Nested record
/// fields recurse into the inner type's spec and embed the resulting layout,
/// rebased to the enclosing offset space.
///
/// Pure given the flag values: recomputing with unchanged flags yields an
/// identical snapshot.
pub(crate) fn compute_layout(
    spec: &RecordSpec,
    env: &dyn LayoutEnv,
    generation: u64,
    depth: usize,
) -> Result<RecordLayout> {
    eyre::ensure!(
        depth <= MAX_NESTING_DEPTH,
        "record `{}` exceeds the maximum nesting depth of {}",
        spec.name,
        MAX_NESTING_DEPTH,
    );

    let mut shapes = FieldVec::with_capacity(spec.fields.len());
    let mut offset = 0usize;

    for field in &spec.fields {
        let shape = match *field {
            FieldSpec::Single { name, size } => FieldShape {
                name,
                descriptor: FieldDescriptor::new(offset, size),
                kind: ShapeKind::Single,
            },
            FieldSpec::Option {
                name,
                size,
                present,
            } => {
                let present = env.flag_value(present);
                FieldShape {
                    name,
                    descriptor: FieldDescriptor::new(offset, if present { size } else { 0 }),
                    kind: ShapeKind::Option { present },
                }
            }
            FieldSpec::Either {
                name,
                first_size,
                second_size,
                second,
            } => {
                let second = env.flag_value(second);
                let size = if second { second_size } else { first_size };
                FieldShape {
                    name,
                    descriptor: FieldDescriptor::new(offset, size),
                    kind: ShapeKind::Either { second },
                }
            }
            FieldSpec::Nested {
                name,
                inner,
                inner_name,
            } => {
                let inner_spec = env.spec_for(inner).ok_or_else(|| {
                    eyre::eyre!(
                        "record `{}` embeds record type `{}`, which is not registered",
                        spec.name,
                        inner_name,
                    )
                })?;
                let inner_layout = compute_layout(inner_spec, env, generation, depth + 1)?;
                let size = inner_layout.total_size;
                FieldShape {
                    name,
                    descriptor: FieldDescriptor::new(offset, size),
                    kind: ShapeKind::Nested {
                        layout: std::sync::Arc::new(inner_layout.rebase(offset)),
                    },
                }
            }
        };

        offset += shape.descriptor.size;
        shapes.push(shape);
    }

    Ok(RecordLayout {
        record_name: spec.name,
        shapes,
        total_size: offset,
        generation,
    })
}
