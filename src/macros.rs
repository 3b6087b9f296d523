//! # Internal Macros
//!
//! Impl-stamping macros for the value layer. `scalar_codec!` generates
//! little-endian [`FieldCodec`](crate::values::FieldCodec) impls for numeric
//! primitives; `convert_cast!` generates the two-way
//! [`Convert`](crate::values::Convert) impls an either field needs between
//! its narrow and wide representations.

/// Implements `FieldCodec` for numeric primitives with `to_le_bytes` /
/// `from_le_bytes` round-trips.
macro_rules! scalar_codec {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::values::FieldCodec for $ty {
                const NATURAL_SIZE: usize = core::mem::size_of::<$ty>();

                fn encode_into(&self, buf: &mut [u8]) -> eyre::Result<()> {
                    let bytes = self.to_le_bytes();
                    eyre::ensure!(
                        buf.len() == bytes.len(),
                        "{} expects {} bytes, got {}",
                        stringify!($ty),
                        bytes.len(),
                        buf.len()
                    );
                    buf.copy_from_slice(&bytes);
                    Ok(())
                }

                fn decode_from(buf: &[u8]) -> eyre::Result<Self> {
                    let bytes = buf.try_into().map_err(|_| {
                        eyre::eyre!(
                            "{} expects {} bytes, got {}",
                            stringify!($ty),
                            core::mem::size_of::<$ty>(),
                            buf.len()
                        )
                    })?;
                    Ok(<$ty>::from_le_bytes(bytes))
                }
            }
        )+
    };
}

/// Implements `Convert` in both directions between two numeric types using
/// `as` casts. Widening is exact; narrowing keeps `as` semantics (float
/// precision loss, integer truncation).
macro_rules! convert_cast {
    ($($narrow:ty => $wide:ty),+ $(,)?) => {
        $(
            impl $crate::values::Convert<$wide> for $narrow {
                fn convert(self) -> $wide {
                    self as $wide
                }
            }

            impl $crate::values::Convert<$narrow> for $wide {
                fn convert(self) -> $narrow {
                    self as $narrow
                }
            }
        )+
    };
}
