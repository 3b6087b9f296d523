//! # Record Views: Typed Field Access
//!
//! [`RecordRef`] and [`RecordMut`] wrap a byte slice spanning exactly one
//! record together with the layout snapshot the record was constructed
//! under. All getters and setters resolve a typed key to its
//! [`FieldDescriptor`](crate::records::FieldDescriptor) range and
//! encode/decode through the value codec; every slice access is within the
//! snapshot's computed bounds.
//!
//! Views are handed out by [`Instance`](crate::instance::Instance); their
//! only public constructors require a
//! [`ConstructToken`](crate::instance::ConstructToken), which instance
//! construction paths alone can mint. That closes the path where a view is
//! layered over a buffer that was never sized by the layout engine.
//!
//! ## Key/kind discipline
//!
//! Keys carry their record type, so a key can only reach views of the
//! record that declared it. Kind mismatches (a `SingleKey` addressing a
//! slot declared as an option) are impossible for keys minted by a
//! deterministic `declare` and are treated as programming errors: the view
//! panics rather than reinterpreting bytes.

use std::marker::PhantomData;

use eyre::Result;

use crate::instance::ConstructToken;
use crate::records::descriptor::ShapeKind;
use crate::records::{
    EitherKey, NestedKey, OptionKey, Record, RecordKey, RecordLayout, SingleKey,
};
use crate::values::{Convert, FieldCodec};

/// Shared view of one constructed record.
pub struct RecordRef<'a, R: Record> {
    bytes: &'a [u8],
    layout: &'a RecordLayout,
    _marker: PhantomData<fn() -> R>,
}

/// Exclusive view of one constructed record.
pub struct RecordMut<'a, R: Record> {
    bytes: &'a mut [u8],
    layout: &'a RecordLayout,
    _marker: PhantomData<fn() -> R>,
}

impl<'a, R: Record> RecordRef<'a, R> {
    /// Wraps `bytes` as a record view. The token restricts callers to
    /// instance construction paths; `bytes` must span exactly one record.
    pub fn new(_token: ConstructToken, bytes: &'a [u8], layout: &'a RecordLayout) -> Result<Self> {
        eyre::ensure!(
            bytes.len() == layout.total_size,
            "record region is {} bytes but the layout of `{}` requires exactly {}",
            bytes.len(),
            layout.record_name,
            layout.total_size,
        );
        Ok(Self {
            bytes,
            layout,
            _marker: PhantomData,
        })
    }

    pub(crate) fn from_parts(bytes: &'a [u8], layout: &'a RecordLayout) -> Self {
        debug_assert_eq!(bytes.len(), layout.total_size);
        Self {
            bytes,
            layout,
            _marker: PhantomData,
        }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn layout(&self) -> &'a RecordLayout {
        self.layout
    }

    /// Current size of the field addressed by `key`; 0 for an absent option.
    pub fn field_size<K: RecordKey<Record = R>>(&self, key: K) -> usize {
        self.layout.field_size(key.slot())
    }

    pub fn get<T: FieldCodec>(&self, key: SingleKey<R, T>) -> Result<T> {
        let shape = self.layout.shape(key.slot);
        match shape.kind {
            ShapeKind::Single => T::decode_from(&self.bytes[shape.descriptor.local_range()]),
            _ => mismatch(self.layout, key.slot, "single"),
        }
    }

    /// Reads an option field. Absent fields yield the value type's default,
    /// or an error for fields declared with
    /// [`option_no_default`](crate::records::FieldList::option_no_default).
    pub fn get_opt<T: FieldCodec>(&self, key: OptionKey<R, T>) -> Result<T> {
        match self.try_get_opt(key)? {
            Some(value) => Ok(value),
            None => match key.default {
                Some(default) => Ok(default()),
                None => {
                    let shape = self.layout.shape(key.slot);
                    eyre::bail!(
                        "option field `{}` of record `{}` is absent and has no default",
                        shape.name,
                        self.layout.record_name,
                    )
                }
            },
        }
    }

    /// Reads an option field, `None` while the presence flag is off.
    pub fn try_get_opt<T: FieldCodec>(&self, key: OptionKey<R, T>) -> Result<Option<T>> {
        let shape = self.layout.shape(key.slot);
        match shape.kind {
            ShapeKind::Option { present: true } => {
                T::decode_from(&self.bytes[shape.descriptor.local_range()]).map(Some)
            }
            ShapeKind::Option { present: false } => Ok(None),
            _ => mismatch(self.layout, key.slot, "option"),
        }
    }

    /// Reads an either field as its second representation, converting when
    /// the first one is currently stored.
    pub fn get_either<A, B>(&self, key: EitherKey<R, A, B>) -> Result<B>
    where
        A: FieldCodec + Convert<B>,
        B: FieldCodec + Convert<A>,
    {
        let shape = self.layout.shape(key.slot);
        match shape.kind {
            ShapeKind::Either { second: true } => {
                B::decode_from(&self.bytes[shape.descriptor.local_range()])
            }
            ShapeKind::Either { second: false } => {
                Ok(A::decode_from(&self.bytes[shape.descriptor.local_range()])?.convert())
            }
            _ => mismatch(self.layout, key.slot, "either"),
        }
    }

    /// Reads an either field as its first representation, converting when
    /// the second one is currently stored.
    pub fn get_either_first<A, B>(&self, key: EitherKey<R, A, B>) -> Result<A>
    where
        A: FieldCodec + Convert<B>,
        B: FieldCodec + Convert<A>,
    {
        let shape = self.layout.shape(key.slot);
        match shape.kind {
            ShapeKind::Either { second: true } => {
                Ok(B::decode_from(&self.bytes[shape.descriptor.local_range()])?.convert())
            }
            ShapeKind::Either { second: false } => {
                A::decode_from(&self.bytes[shape.descriptor.local_range()])
            }
            _ => mismatch(self.layout, key.slot, "either"),
        }
    }

    /// Sub-view of an embedded record field.
    pub fn nested<Inner: Record>(&self, key: NestedKey<R, Inner>) -> RecordRef<'a, Inner> {
        let layout = self.layout;
        let bytes = self.bytes;
        let shape = layout.shape(key.slot);
        match &shape.kind {
            ShapeKind::Nested { layout: inner } => RecordRef {
                bytes: &bytes[shape.descriptor.local_range()],
                layout: inner.as_ref(),
                _marker: PhantomData,
            },
            _ => mismatch(layout, key.slot, "nested record"),
        }
    }
}

impl<'a, R: Record> RecordMut<'a, R> {
    /// Wraps `bytes` as a mutable record view. The token restricts callers
    /// to instance construction paths.
    pub fn new(
        _token: ConstructToken,
        bytes: &'a mut [u8],
        layout: &'a RecordLayout,
    ) -> Result<Self> {
        eyre::ensure!(
            bytes.len() == layout.total_size,
            "record region is {} bytes but the layout of `{}` requires exactly {}",
            bytes.len(),
            layout.record_name,
            layout.total_size,
        );
        Ok(Self {
            bytes,
            layout,
            _marker: PhantomData,
        })
    }

    pub(crate) fn from_parts(bytes: &'a mut [u8], layout: &'a RecordLayout) -> Self {
        debug_assert_eq!(bytes.len(), layout.total_size);
        Self {
            bytes,
            layout,
            _marker: PhantomData,
        }
    }

    pub fn as_ref(&self) -> RecordRef<'_, R> {
        RecordRef {
            bytes: self.bytes,
            layout: self.layout,
            _marker: PhantomData,
        }
    }

    pub fn layout(&self) -> &'a RecordLayout {
        self.layout
    }

    pub fn field_size<K: RecordKey<Record = R>>(&self, key: K) -> usize {
        self.layout.field_size(key.slot())
    }

    pub fn set<T: FieldCodec>(&mut self, key: SingleKey<R, T>, value: T) -> Result<()> {
        let layout = self.layout;
        let shape = layout.shape(key.slot);
        match shape.kind {
            ShapeKind::Single => value.encode_into(&mut self.bytes[shape.descriptor.local_range()]),
            _ => mismatch(layout, key.slot, "single"),
        }
    }

    /// Writes an option field. A no-op while the presence flag is off:
    /// absent fields occupy zero bytes and are never touched.
    pub fn set_opt<T: FieldCodec>(&mut self, key: OptionKey<R, T>, value: T) -> Result<()> {
        let layout = self.layout;
        let shape = layout.shape(key.slot);
        match shape.kind {
            ShapeKind::Option { present: true } => {
                value.encode_into(&mut self.bytes[shape.descriptor.local_range()])
            }
            ShapeKind::Option { present: false } => Ok(()),
            _ => mismatch(layout, key.slot, "option"),
        }
    }

    /// Writes an either field from its second representation, converting to
    /// the first when that is what is currently stored.
    pub fn set_either<A, B>(&mut self, key: EitherKey<R, A, B>, value: B) -> Result<()>
    where
        A: FieldCodec + Convert<B>,
        B: FieldCodec + Convert<A>,
    {
        let layout = self.layout;
        let shape = layout.shape(key.slot);
        match shape.kind {
            ShapeKind::Either { second: true } => {
                value.encode_into(&mut self.bytes[shape.descriptor.local_range()])
            }
            ShapeKind::Either { second: false } => {
                let narrowed: A = value.convert();
                narrowed.encode_into(&mut self.bytes[shape.descriptor.local_range()])
            }
            _ => mismatch(layout, key.slot, "either"),
        }
    }

    /// Writes an either field from its first representation, converting to
    /// the second when that is what is currently stored.
    pub fn set_either_first<A, B>(&mut self, key: EitherKey<R, A, B>, value: A) -> Result<()>
    where
        A: FieldCodec + Convert<B>,
        B: FieldCodec + Convert<A>,
    {
        let layout = self.layout;
        let shape = layout.shape(key.slot);
        match shape.kind {
            ShapeKind::Either { second: true } => {
                let widened: B = value.convert();
                widened.encode_into(&mut self.bytes[shape.descriptor.local_range()])
            }
            ShapeKind::Either { second: false } => {
                value.encode_into(&mut self.bytes[shape.descriptor.local_range()])
            }
            _ => mismatch(layout, key.slot, "either"),
        }
    }

    /// Mutable sub-view of an embedded record field.
    pub fn nested_mut<Inner: Record>(&mut self, key: NestedKey<R, Inner>) -> RecordMut<'_, Inner> {
        let layout = self.layout;
        let shape = layout.shape(key.slot);
        match &shape.kind {
            ShapeKind::Nested { layout: inner } => RecordMut {
                bytes: &mut self.bytes[shape.descriptor.local_range()],
                layout: inner.as_ref(),
                _marker: PhantomData,
            },
            _ => mismatch(layout, key.slot, "nested record"),
        }
    }

    /// Deep-copies the whole record viewed by `src` into this one,
    /// embedded records included. Both views must share the layout
    /// generation they were constructed under; copying across differing
    /// flag assignments is rejected rather than reinterpreting bytes.
    pub fn copy_from(&mut self, src: &RecordRef<'_, R>) -> Result<()> {
        let layout = self.layout;
        eyre::ensure!(
            layout.generation == src.layout.generation
                && layout.total_size == src.layout.total_size,
            "cannot copy record `{}`: source and destination layouts differ \
             (generation {} vs {})",
            layout.record_name,
            src.layout.generation,
            layout.generation,
        );
        self.bytes.copy_from_slice(src.bytes);
        Ok(())
    }

    /// Copies one field's bytes from `src`, which must view the same record
    /// type under the same layout generation. For a nested record key this
    /// is a deep copy of the whole embedded record.
    pub fn copy_field_from<K>(&mut self, key: K, src: &RecordRef<'_, R>) -> Result<()>
    where
        K: RecordKey<Record = R>,
    {
        let layout = self.layout;
        eyre::ensure!(
            layout.generation == src.layout.generation
                && layout.total_size == src.layout.total_size,
            "cannot copy field `{}` of record `{}`: source and destination layouts differ \
             (generation {} vs {})",
            layout.shape(key.slot()).name,
            layout.record_name,
            src.layout.generation,
            layout.generation,
        );
        let range = layout.shape(key.slot()).descriptor.local_range();
        self.bytes[range.clone()].copy_from_slice(&src.bytes[range]);
        Ok(())
    }
}

#[track_caller]
fn mismatch(layout: &RecordLayout, slot: usize, wanted: &str) -> ! {
    let shape = layout.shape(slot);
    panic!(
        "field `{}` of record `{}` is declared as a {} field, not {}",
        shape.name,
        layout.record_name,
        shape.kind_name(),
        wanted,
    );
}
