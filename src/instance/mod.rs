//! # Instance Containers
//!
//! An [`Instance`] owns or borrows the backing region of exactly one
//! constructed record and is the only way to obtain one. Construction
//! paths:
//!
//! | Path | Region | Zeroed | Released on drop |
//! |------|--------|--------|------------------|
//! | [`allocate`](Instance::allocate) | owned heap | yes | yes |
//! | [`construct_in`](Instance::construct_in) | caller slice | yes | no |
//! | [`construct_in_arena`](Instance::construct_in_arena) | bump arena | yes | no (arena scope) |
//! | [`adopt`](Instance::adopt) | caller slice | no | no |
//!
//! Every path resolves the record's current layout snapshot from the
//! context first, so the region is sized by the layout engine before any
//! field is touched, and the instance keeps that snapshot for its whole
//! life. Containers are move-only; Rust move semantics give the
//! no-double-release guarantee, and dropping an owned instance releases
//! its region exactly once.

use std::marker::PhantomData;
use std::sync::Arc;

use bumpalo::Bump;
use eyre::Result;

use crate::context::LayoutContext;
use crate::records::{Record, RecordLayout, RecordMut, RecordRef};
use crate::region::Region;

/// Capability required by record-view constructors.
///
/// Only instance construction paths can mint one, so no code outside the
/// container can layer a record view over an arbitrary buffer. The token
/// is created transiently during construction and never stored.
pub struct ConstructToken {
    _private: (),
}

impl ConstructToken {
    pub(crate) fn mint() -> Self {
        Self { _private: () }
    }
}

/// Owner (or borrower) of one constructed record.
pub struct Instance<'a, R: Record> {
    region: Region<'a>,
    layout: Arc<RecordLayout>,
    _marker: PhantomData<fn() -> R>,
}

impl<'a, R: Record> std::fmt::Debug for Instance<'a, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("region", &self.region)
            .field("layout", &self.layout)
            .finish()
    }
}

impl<R: Record> Instance<'static, R> {
    /// Heap-constructs an instance: allocates an owned region of exactly
    /// the current dynamic size, zero-filled. Fails if the context has no
    /// fresh layout for `R` or if the allocation cannot be satisfied.
    pub fn allocate(ctx: &LayoutContext) -> Result<Instance<'static, R>> {
        let layout = ctx.layout::<R>()?;
        let region = Region::alloc_zeroed(layout.total_size())?;
        Instance::seal(region, layout)
    }
}

impl<'a, R: Record> Instance<'a, R> {
    /// Constructs an instance into a caller-supplied region of at least
    /// the current dynamic size. The used prefix is zero-filled; the
    /// region is not owned, so dropping the instance releases nothing;
    /// the buffer's own scope governs deallocation.
    pub fn construct_in(ctx: &LayoutContext, buf: &'a mut [u8]) -> Result<Instance<'a, R>> {
        let layout = ctx.layout::<R>()?;
        let total = layout.total_size();
        eyre::ensure!(
            buf.len() >= total,
            "region of {} bytes is too small for record `{}` ({} bytes required)",
            buf.len(),
            layout.record_name(),
            total,
        );
        let (bytes, _) = buf.split_at_mut(total);
        bytes.fill(0);
        Instance::seal(Region::borrowed(bytes), layout)
    }

    /// Constructs an instance in a transient bump arena. Equivalent to
    /// carving a slice from the arena and calling
    /// [`construct_in`](Self::construct_in); the arena's scope governs the
    /// memory.
    pub fn construct_in_arena(ctx: &LayoutContext, arena: &'a Bump) -> Result<Instance<'a, R>> {
        let layout = ctx.layout::<R>()?;
        let bytes = arena.alloc_slice_fill_copy(layout.total_size(), 0u8);
        Instance::seal(Region::borrowed(bytes), layout)
    }

    /// Wraps an already-constructed record region without zeroing it. The
    /// caller vouches that the region was built under a layout with the
    /// same total size (same flags, same generation); only the length is
    /// checked here. The region is not owned.
    pub fn adopt(ctx: &LayoutContext, buf: &'a mut [u8]) -> Result<Instance<'a, R>> {
        let layout = ctx.layout::<R>()?;
        let total = layout.total_size();
        eyre::ensure!(
            buf.len() >= total,
            "region of {} bytes is too small for record `{}` ({} bytes required)",
            buf.len(),
            layout.record_name(),
            total,
        );
        let (bytes, _) = buf.split_at_mut(total);
        Instance::seal(Region::borrowed(bytes), layout)
    }

    /// Shared view of the record's fields.
    pub fn fields(&self) -> RecordRef<'_, R> {
        RecordRef::from_parts(self.region.bytes(), &self.layout)
    }

    /// Exclusive view of the record's fields.
    pub fn fields_mut(&mut self) -> RecordMut<'_, R> {
        RecordMut::from_parts(self.region.bytes_mut(), &self.layout)
    }

    /// The layout snapshot this instance was constructed under.
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Total byte size of the backing region. Fixed at construction;
    /// instances are never resized.
    pub fn size(&self) -> usize {
        self.layout.total_size()
    }

    pub fn is_owned(&self) -> bool {
        self.region.is_owned()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.region.bytes()
    }

    /// Deep-copies `src`'s record into this instance, embedded records
    /// included. Both instances must have been constructed under the same
    /// layout generation; copying across differing flag assignments is
    /// rejected rather than reinterpreting bytes.
    pub fn copy_from(&mut self, src: &Instance<'_, R>) -> Result<()> {
        self.fields_mut().copy_from(&src.fields())
    }

    /// Heap-allocates a new owned instance and deep-copies this record
    /// into it. Works from any region kind and stays valid even if the
    /// originating context has moved on: the copy shares this instance's
    /// snapshot.
    pub fn duplicate(&self) -> Result<Instance<'static, R>> {
        let mut region = Region::alloc_zeroed(self.layout.total_size())?;
        region.bytes_mut().copy_from_slice(self.region.bytes());
        Instance::seal(region, Arc::clone(&self.layout))
    }

    /// Final step of every construction path: mints the capability token
    /// and constructs the record's view through the token-gated path,
    /// which verifies the region/layout pairing before the instance
    /// exists.
    fn seal(region: Region<'a>, layout: Arc<RecordLayout>) -> Result<Instance<'a, R>> {
        RecordRef::<R>::new(ConstructToken::mint(), region.bytes(), &layout)?;
        Ok(Instance {
            region,
            layout,
            _marker: PhantomData,
        })
    }
}
