//! # Field Descriptors
//!
//! A [`FieldDescriptor`] is the layout engine's output for one field: where
//! the field's bytes live and how many of them there are. Descriptors are
//! only meaningful inside the [`RecordLayout`](crate::records::RecordLayout)
//! snapshot that produced them; the next recomputation produces new ones.
//!
//! ## Offsets and the adjuster
//!
//! `offset` counts from the start of the outermost record region the
//! snapshot describes. `offset_adjuster` is the byte position of the record
//! that declares the field within that same region. For a standalone layout
//! both baselines coincide and the adjuster is zero; when a layout is
//! embedded into an enclosing record, both values are shifted by the
//! embedding base. A view sliced at the declaring record therefore finds a
//! field at `offset - offset_adjuster`, regardless of how deeply the record
//! is nested.

use std::ops::Range;
use std::sync::Arc;

use crate::records::RecordLayout;

/// Byte placement of one field within a computed layout snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Byte offset from the start of the outermost record region.
    pub offset: usize,
    /// Byte position of the declaring record within that region.
    pub offset_adjuster: usize,
    /// Current size in bytes. An absent option field reports 0.
    pub size: usize,
}

impl FieldDescriptor {
    pub(crate) fn new(offset: usize, size: usize) -> Self {
        Self {
            offset,
            offset_adjuster: 0,
            size,
        }
    }

    /// Start of the field inside a view sliced at the declaring record.
    pub fn start(&self) -> usize {
        self.offset - self.offset_adjuster
    }

    /// Byte range of the field inside a view sliced at the declaring record.
    pub fn local_range(&self) -> Range<usize> {
        self.start()..self.start() + self.size
    }

    pub(crate) fn rebase(&mut self, base: usize) {
        self.offset += base;
        self.offset_adjuster += base;
    }
}

/// Resolved state of one field in a layout snapshot: its descriptor plus
/// whichever flag outcome applied when the layout was computed.
#[derive(Debug, Clone)]
pub struct FieldShape {
    pub(crate) name: &'static str,
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) kind: ShapeKind,
}

#[derive(Debug, Clone)]
pub(crate) enum ShapeKind {
    Single,
    Option { present: bool },
    Either { second: bool },
    Nested { layout: Arc<RecordLayout> },
}

impl FieldShape {
    /// Declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Whether the field occupies bytes under the snapshot's flag values.
    /// Only an option field with its presence flag off reports false.
    pub fn is_present(&self) -> bool {
        match &self.kind {
            ShapeKind::Option { present } => *present,
            _ => true,
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match &self.kind {
            ShapeKind::Single => "single",
            ShapeKind::Option { .. } => "option",
            ShapeKind::Either { .. } => "either",
            ShapeKind::Nested { .. } => "nested record",
        }
    }

    pub(crate) fn rebase(&self, base: usize) -> FieldShape {
        let mut descriptor = self.descriptor;
        descriptor.rebase(base);
        let kind = match &self.kind {
            ShapeKind::Nested { layout } => ShapeKind::Nested {
                layout: Arc::new(layout.rebase(base)),
            },
            other => other.clone(),
        };
        FieldShape {
            name: self.name,
            descriptor,
            kind,
        }
    }
}
