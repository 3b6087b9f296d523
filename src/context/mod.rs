//! # Layout Context
//!
//! [`LayoutContext`] owns everything a family of record types shares:
//! named boolean flags, the registry of declared record specs, and the
//! layout snapshot computed for each type. There is no process-global
//! state; callers construct a context, register record types into it, and
//! drive the flag-change workflow explicitly:
//!
//! ```text
//! set_flag(..)  ──>  recompute::<R>()  ──>  Instance::allocate(&ctx)
//!      │                                         │
//!      └── bumps the context generation          └── captures the snapshot
//! ```
//!
//! The context never recomputes behind the caller's back. Changing a flag
//! bumps a generation counter; a snapshot whose generation no longer
//! matches is *stale*, and handing it out (for construction or size
//! queries) is a retrievable error until the caller recomputes. Instances
//! constructed earlier are unaffected; they carry their own snapshot.
//!
//! ## Single-writer discipline
//!
//! A context is a plain mutable value with no interior locking. Callers
//! that share one across threads must serialize the whole
//! "flag change → recompute → construct" sequence externally; the crate's
//! contract is single-threaded.

use std::any::TypeId;
use std::sync::Arc;

use eyre::Result;
use hashbrown::HashMap;

use crate::records::{compute_layout, FieldList, LayoutEnv, Record, RecordLayout, RecordSpec};

/// Handle for a named configuration flag, valid for the context that
/// defined it. Using a handle against a different context is a programming
/// error and panics on out-of-range ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagId(pub(crate) usize);

#[derive(Debug)]
struct Flag {
    name: &'static str,
    value: bool,
}

/// Named flag storage. Flags are identified by name at declaration time,
/// so two records referencing the same name share one setting.
#[derive(Debug, Default)]
pub(crate) struct FlagTable {
    flags: Vec<Flag>,
}

impl FlagTable {
    /// Returns the existing id for `name` or defines it (initially false).
    pub(crate) fn define(&mut self, name: &'static str) -> FlagId {
        if let Some(idx) = self.flags.iter().position(|f| f.name == name) {
            return FlagId(idx);
        }
        self.flags.push(Flag { name, value: false });
        FlagId(self.flags.len() - 1)
    }

    pub(crate) fn value(&self, id: FlagId) -> bool {
        self.flags[id.0].value
    }

    /// Sets the flag, returning whether the stored value changed.
    pub(crate) fn set(&mut self, id: FlagId, value: bool) -> bool {
        let flag = &mut self.flags[id.0];
        let changed = flag.value != value;
        flag.value = value;
        changed
    }
}

#[derive(Debug)]
struct RegisteredRecord {
    spec: RecordSpec,
    layout: Option<Arc<RecordLayout>>,
}

/// Flags, record registry, and computed layout snapshots for one family of
/// record types.
#[derive(Debug, Default)]
pub struct LayoutContext {
    flags: FlagTable,
    registry: HashMap<TypeId, usize>,
    types: Vec<RegisteredRecord>,
    generation: u64,
}

impl LayoutContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up or defines a named flag. Newly defined flags start false.
    pub fn define_flag(&mut self, name: &'static str) -> FlagId {
        self.flags.define(name)
    }

    /// Current value of a flag.
    pub fn flag(&self, id: FlagId) -> bool {
        self.flags.value(id)
    }

    /// Sets a flag. An actual value change marks every computed layout in
    /// this context stale; the caller must recompute before constructing
    /// new instances of any type referencing the flag.
    pub fn set_flag(&mut self, id: FlagId, value: bool) {
        if self.flags.set(id, value) {
            self.generation += 1;
        }
    }

    /// Generation counter; bumped whenever a flag value actually changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Registers a record type: runs its declaration, stores the ordered
    /// field list, and returns the typed keys. No layout is computed yet;
    /// call [`recompute`](Self::recompute) once flags are set.
    ///
    /// # Panics
    ///
    /// Panics if `R` is already registered, if the declaration registers a
    /// number of fields different from `R::FIELD_COUNT`, or if it embeds a
    /// record type that has not been registered first. These are
    /// declaration bugs, not runtime conditions.
    pub fn register<R: Record>(&mut self) -> R::Keys {
        let type_id = TypeId::of::<R>();
        assert!(
            !self.registry.contains_key(&type_id),
            "record type `{}` is already registered in this context",
            R::NAME,
        );

        let mut list = FieldList::<R>::new(&mut self.flags, &self.registry);
        let keys = R::declare(&mut list);
        let spec = list.finish();
        assert_eq!(
            spec.fields.len(),
            R::FIELD_COUNT,
            "record type `{}` declares {} members but registered {} fields; \
             every member must be a field participating in layout",
            R::NAME,
            R::FIELD_COUNT,
            spec.fields.len(),
        );

        let idx = self.types.len();
        self.registry.insert(type_id, idx);
        self.types.push(RegisteredRecord { spec, layout: None });
        keys
    }

    /// Recomputes `R`'s layout from current flag values and stores the
    /// snapshot, returning the total size. Idempotent: unchanged flags
    /// produce an identical snapshot.
    pub fn recompute<R: Record>(&mut self) -> Result<usize> {
        let idx = self.index_of::<R>()?;
        self.recompute_index(idx)
    }

    /// Recomputes every registered type, in registration order. Embedded
    /// types register before their containers, so dependencies are always
    /// resolved first.
    pub fn recompute_all(&mut self) -> Result<()> {
        for idx in 0..self.types.len() {
            self.recompute_index(idx)?;
        }
        Ok(())
    }

    /// The current snapshot for `R`. Fails if `R` is unregistered, if no
    /// layout has been computed, or if the snapshot is stale (a flag
    /// changed after it was computed).
    pub fn layout<R: Record>(&self) -> Result<Arc<RecordLayout>> {
        let idx = self.index_of::<R>()?;
        let layout = self.types[idx].layout.as_ref().ok_or_else(|| {
            eyre::eyre!(
                "no layout computed for record `{}`; call recompute after setting flags",
                R::NAME,
            )
        })?;
        eyre::ensure!(
            layout.generation == self.generation,
            "layout for record `{}` is stale: flags changed since it was computed; \
             recompute before constructing new instances",
            R::NAME,
        );
        Ok(Arc::clone(layout))
    }

    /// Total byte size new instances of `R` would be constructed with.
    pub fn dynamic_size<R: Record>(&self) -> Result<usize> {
        Ok(self.layout::<R>()?.total_size())
    }

    fn recompute_index(&mut self, idx: usize) -> Result<usize> {
        let layout = compute_layout(&self.types[idx].spec, &*self, self.generation, 0)?;
        let total = layout.total_size();
        self.types[idx].layout = Some(Arc::new(layout));
        Ok(total)
    }

    fn index_of<R: Record>(&self) -> Result<usize> {
        self.registry
            .get(&TypeId::of::<R>())
            .copied()
            .ok_or_else(|| {
                eyre::eyre!("record type `{}` is not registered in this context", R::NAME)
            })
    }
}

impl LayoutEnv for LayoutContext {
    fn flag_value(&self, id: FlagId) -> bool {
        self.flags.value(id)
    }

    fn spec_for(&self, ty: TypeId) -> Option<&RecordSpec> {
        self.registry.get(&ty).map(|&idx| &self.types[idx].spec)
    }
}
