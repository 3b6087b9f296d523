//! # Byte Regions
//!
//! A [`Region`] is the backing memory of one constructed record: either an
//! owned heap buffer or a borrowed caller-supplied slice. Regions are
//! created exactly once per instance, never resized, and owned buffers are
//! released exactly once on drop.
//!
//! ## Accounting
//!
//! Owned allocations and releases are counted with process-wide atomics
//! ([`stats`]), so ownership discipline is observable in tests without a
//! custom global allocator: a heap construct/drop pair moves both counters
//! by one; borrowed and arena regions move neither.
//!
//! ## Allocation failure
//!
//! Heap regions are acquired through `try_reserve_exact`, so an allocation
//! the system cannot satisfy reports a recoverable error instead of
//! aborting the process.

use std::sync::atomic::{AtomicU64, Ordering};

use eyre::Result;

static OWNED_ALLOCATED: AtomicU64 = AtomicU64::new(0);
static OWNED_RELEASED: AtomicU64 = AtomicU64::new(0);

/// Owned-region allocation counters, cumulative for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionStats {
    pub owned_allocated: u64,
    pub owned_released: u64,
}

impl RegionStats {
    /// Owned regions currently alive.
    pub fn live(&self) -> u64 {
        self.owned_allocated - self.owned_released
    }
}

/// Current snapshot of the owned-region counters.
pub fn stats() -> RegionStats {
    // Release side is read first so a concurrent alloc/drop pair can never
    // make `live` underflow.
    let owned_released = OWNED_RELEASED.load(Ordering::Acquire);
    let owned_allocated = OWNED_ALLOCATED.load(Ordering::Acquire);
    RegionStats {
        owned_allocated,
        owned_released,
    }
}

#[derive(Debug)]
enum RegionInner<'a> {
    Owned(Box<[u8]>),
    Borrowed(&'a mut [u8]),
}

/// Backing memory for one constructed record.
#[derive(Debug)]
pub struct Region<'a> {
    inner: RegionInner<'a>,
}

impl Region<'static> {
    /// Allocates an owned, zero-filled region of exactly `size` bytes.
    pub fn alloc_zeroed(size: usize) -> Result<Region<'static>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(size)
            .map_err(|_| eyre::eyre!("failed to allocate {} bytes for record region", size))?;
        buf.resize(size, 0u8);
        OWNED_ALLOCATED.fetch_add(1, Ordering::AcqRel);
        Ok(Region {
            inner: RegionInner::Owned(buf.into_boxed_slice()),
        })
    }
}

impl<'a> Region<'a> {
    /// Wraps a caller-supplied slice. The caller's scope governs the
    /// memory; dropping the region releases nothing.
    pub fn borrowed(bytes: &'a mut [u8]) -> Region<'a> {
        Region {
            inner: RegionInner::Borrowed(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_owned(&self) -> bool {
        matches!(self.inner, RegionInner::Owned(_))
    }

    pub fn bytes(&self) -> &[u8] {
        match &self.inner {
            RegionInner::Owned(buf) => buf,
            RegionInner::Borrowed(buf) => buf,
        }
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.inner {
            RegionInner::Owned(buf) => buf,
            RegionInner::Borrowed(buf) => buf,
        }
    }

    /// Bounds-checked read of `len` bytes at `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.bytes()
            .get(offset..offset + len)
            .ok_or_else(|| self.out_of_bounds(offset, len))
    }

    /// Bounds-checked mutable access to `len` bytes at `offset`.
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        let total = self.len();
        match self.bytes_mut().get_mut(offset..offset + len) {
            Some(bytes) => Ok(bytes),
            None => Err(eyre::eyre!(
                "region access of {} bytes at offset {} is out of bounds for {} bytes",
                len,
                offset,
                total,
            )),
        }
    }

    fn out_of_bounds(&self, offset: usize, len: usize) -> eyre::Report {
        eyre::eyre!(
            "region access of {} bytes at offset {} is out of bounds for {} bytes",
            len,
            offset,
            self.len(),
        )
    }
}

impl Drop for Region<'_> {
    fn drop(&mut self) {
        if self.is_owned() {
            OWNED_RELEASED.fetch_add(1, Ordering::AcqRel);
        }
    }
}
