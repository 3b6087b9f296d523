//! # Record Declaration
//!
//! A record type is a marker type (by convention an uninhabited enum, so no
//! value of it can ever exist) implementing [`Record`]. Its `declare`
//! function registers the ordered field list on a [`FieldList`] builder and
//! returns one copyable, typed key per field. Declaration order is layout
//! order: the layout engine assigns offsets by walking the registered list
//! front to back.
//!
//! ## Usage
//!
//! ```ignore
//! enum Telemetry {}
//!
//! struct TelemetryKeys {
//!     reading: EitherKey<Telemetry, f32, f64>,
//!     station: SingleKey<Telemetry, i64>,
//! }
//!
//! impl Record for Telemetry {
//!     const NAME: &'static str = "telemetry";
//!     const FIELD_COUNT: usize = 2;
//!     type Keys = TelemetryKeys;
//!
//!     fn declare(fields: &mut FieldList<Self>) -> TelemetryKeys {
//!         let wide = fields.flag("double_precision");
//!         TelemetryKeys {
//!             reading: fields.either("reading", wide),
//!             station: fields.single("station"),
//!         }
//!     }
//! }
//! ```
//!
//! Keys carry the record type as a parameter, so using a key against a view
//! of a different record type fails to compile rather than reading the
//! wrong bytes.

use std::any::TypeId;
use std::marker::PhantomData;

use hashbrown::HashMap;

use crate::context::{FlagId, FlagTable};
use crate::records::FieldVec;
use crate::values::{Convert, FieldCodec};

/// A dynamically sized record type.
///
/// Implementors are marker types; the backing storage for an instance is
/// always a [`Region`](crate::region::Region) owned or borrowed by an
/// [`Instance`](crate::instance::Instance). Declaring the marker as an
/// uninhabited enum guarantees no free-standing value of the record type
/// can be constructed.
pub trait Record: Sized + 'static {
    const NAME: &'static str;

    /// Number of members the record declares. Registration fails fast if
    /// `declare` registers a different number of fields: every member must
    /// be a field participating in layout.
    const FIELD_COUNT: usize;

    /// The typed key struct returned by `declare`.
    type Keys;

    fn declare(fields: &mut FieldList<Self>) -> Self::Keys;
}

/// One registered field, as declared (sizes and flag references, not yet
/// resolved against flag values).
#[derive(Debug, Clone)]
pub(crate) enum FieldSpec {
    Single {
        name: &'static str,
        size: usize,
    },
    Option {
        name: &'static str,
        size: usize,
        present: FlagId,
    },
    Either {
        name: &'static str,
        first_size: usize,
        second_size: usize,
        second: FlagId,
    },
    Nested {
        name: &'static str,
        inner: TypeId,
        inner_name: &'static str,
    },
}

/// The declared shape of a record type: its ordered field list.
#[derive(Debug, Clone)]
pub(crate) struct RecordSpec {
    pub(crate) name: &'static str,
    pub(crate) fields: FieldVec<FieldSpec>,
}

/// Ordered field registration builder handed to [`Record::declare`].
pub struct FieldList<'ctx, R: Record> {
    flags: &'ctx mut FlagTable,
    registered: &'ctx HashMap<TypeId, usize>,
    fields: FieldVec<FieldSpec>,
    _marker: PhantomData<fn() -> R>,
}

impl<'ctx, R: Record> FieldList<'ctx, R> {
    pub(crate) fn new(
        flags: &'ctx mut FlagTable,
        registered: &'ctx HashMap<TypeId, usize>,
    ) -> Self {
        Self {
            flags,
            registered,
            fields: FieldVec::new(),
            _marker: PhantomData,
        }
    }

    /// Looks up or defines a named configuration flag in the enclosing
    /// context. Flags are shared by name, so two records referencing
    /// `"wide_ints"` react to the same setting.
    pub fn flag(&mut self, name: &'static str) -> FlagId {
        self.flags.define(name)
    }

    /// Registers an always-present field of `T`'s natural size.
    pub fn single<T: FieldCodec>(&mut self, name: &'static str) -> SingleKey<R, T> {
        let slot = self.push(FieldSpec::Single {
            name,
            size: T::NATURAL_SIZE,
        });
        SingleKey {
            slot,
            _marker: PhantomData,
        }
    }

    /// Registers a field that is present iff `present` is true. Reads while
    /// absent yield `T::default()`.
    pub fn option<T: FieldCodec + Default>(
        &mut self,
        name: &'static str,
        present: FlagId,
    ) -> OptionKey<R, T> {
        let slot = self.push(FieldSpec::Option {
            name,
            size: T::NATURAL_SIZE,
            present,
        });
        OptionKey {
            slot,
            default: Some(T::default),
            _marker: PhantomData,
        }
    }

    /// Registers an option field whose value type has no meaningful
    /// default. Reads while absent are a retrievable error.
    pub fn option_no_default<T: FieldCodec>(
        &mut self,
        name: &'static str,
        present: FlagId,
    ) -> OptionKey<R, T> {
        let slot = self.push(FieldSpec::Option {
            name,
            size: T::NATURAL_SIZE,
            present,
        });
        OptionKey {
            slot,
            default: None,
            _marker: PhantomData,
        }
    }

    /// Registers a field stored as `B` while `second` is true and as `A`
    /// otherwise. Reads and writes convert between the two as needed.
    pub fn either<A, B>(&mut self, name: &'static str, second: FlagId) -> EitherKey<R, A, B>
    where
        A: FieldCodec + Convert<B>,
        B: FieldCodec + Convert<A>,
    {
        let slot = self.push(FieldSpec::Either {
            name,
            first_size: A::NATURAL_SIZE,
            second_size: B::NATURAL_SIZE,
            second,
        });
        EitherKey {
            slot,
            _marker: PhantomData,
        }
    }

    /// Registers a fixed field whose value is another dynamically sized
    /// record, embedded in place. The inner record contributes its current
    /// dynamic size to the outer total.
    ///
    /// # Panics
    ///
    /// Panics if `Inner` has not been registered in the same context yet.
    /// Registering inner records first also makes self-embedding (and any
    /// registration cycle) impossible.
    pub fn nested<Inner: Record>(&mut self, name: &'static str) -> NestedKey<R, Inner> {
        assert!(
            self.registered.contains_key(&TypeId::of::<Inner>()),
            "record `{}` embeds unregistered record type `{}`; register `{}` first",
            R::NAME,
            Inner::NAME,
            Inner::NAME,
        );
        let slot = self.push(FieldSpec::Nested {
            name,
            inner: TypeId::of::<Inner>(),
            inner_name: Inner::NAME,
        });
        NestedKey {
            slot,
            _marker: PhantomData,
        }
    }

    fn push(&mut self, spec: FieldSpec) -> usize {
        let slot = self.fields.len();
        self.fields.push(spec);
        slot
    }

    pub(crate) fn finish(self) -> RecordSpec {
        RecordSpec {
            name: R::NAME,
            fields: self.fields,
        }
    }
}

/// Common surface of the four key kinds: the slot a key addresses within
/// its record's layout.
pub trait RecordKey: Copy {
    type Record: Record;

    fn slot(self) -> usize;
}

/// Key for an always-present field of type `T`.
pub struct SingleKey<R: Record, T> {
    pub(crate) slot: usize,
    _marker: PhantomData<fn() -> (R, T)>,
}

/// Key for a conditionally present field of type `T`.
pub struct OptionKey<R: Record, T> {
    pub(crate) slot: usize,
    pub(crate) default: Option<fn() -> T>,
    _marker: PhantomData<fn() -> R>,
}

/// Key for a field stored as `A` or `B` depending on a flag.
pub struct EitherKey<R: Record, A, B> {
    pub(crate) slot: usize,
    _marker: PhantomData<fn() -> (R, A, B)>,
}

/// Key for an embedded record field.
pub struct NestedKey<R: Record, Inner: Record> {
    pub(crate) slot: usize,
    _marker: PhantomData<fn() -> (R, Inner)>,
}

impl<R: Record, T> Clone for SingleKey<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<R: Record, T> Copy for SingleKey<R, T> {}

impl<R: Record, T> Clone for OptionKey<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<R: Record, T> Copy for OptionKey<R, T> {}

impl<R: Record, A, B> Clone for EitherKey<R, A, B> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<R: Record, A, B> Copy for EitherKey<R, A, B> {}

impl<R: Record, Inner: Record> Clone for NestedKey<R, Inner> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<R: Record, Inner: Record> Copy for NestedKey<R, Inner> {}

impl<R: Record, T> RecordKey for SingleKey<R, T> {
    type Record = R;

    fn slot(self) -> usize {
        self.slot
    }
}

impl<R: Record, T> RecordKey for OptionKey<R, T> {
    type Record = R;

    fn slot(self) -> usize {
        self.slot
    }
}

impl<R: Record, A, B> RecordKey for EitherKey<R, A, B> {
    type Record = R;

    fn slot(self) -> usize {
        self.slot
    }
}

impl<R: Record, Inner: Record> RecordKey for NestedKey<R, Inner> {
    type Record = R;

    fn slot(self) -> usize {
        self.slot
    }
}
