//! # Field Value Codecs
//!
//! Values stored in record fields implement [`FieldCodec`]: a fixed natural
//! size plus little-endian encode/decode against an exactly-sized byte
//! slice. Views hand codecs the precise sub-slice a field occupies, so a
//! codec never sees more bytes than its own and the length check doubles as
//! a bounds check.
//!
//! ## Implemented Types
//!
//! | Type | Size (bytes) |
//! |------|--------------|
//! | bool | 1 |
//! | i16 / u16 | 2 |
//! | i32 / u32 / f32 | 4 |
//! | i64 / u64 / f64 | 8 |
//! | `[u8; 6]` | 6 |
//! | `[u8; 16]` | 16 |
//!
//! The array impls cover MAC-address- and UUID-shaped opaque blobs.
//!
//! [`Convert`] supplies the conversions an either field performs between its
//! two representations. Conversions may be lossy in the narrowing direction;
//! both directions must exist for a pair to be usable in an either field.

use eyre::Result;

/// A fixed-size value storable in a record field.
///
/// `NATURAL_SIZE` is the number of bytes the value occupies in a record
/// region. Both codec methods require a slice of exactly that length.
pub trait FieldCodec: Sized {
    const NATURAL_SIZE: usize;

    fn encode_into(&self, buf: &mut [u8]) -> Result<()>;

    fn decode_from(buf: &[u8]) -> Result<Self>;
}

/// Conversion between the two representations of an either field.
pub trait Convert<T>: Sized {
    fn convert(self) -> T;
}

scalar_codec!(i16, i32, i64, u16, u32, u64, f32, f64);

convert_cast! {
    f32 => f64,
    i16 => i32,
    i32 => i64,
    u16 => u32,
    u32 => u64,
}

impl FieldCodec for bool {
    const NATURAL_SIZE: usize = 1;

    fn encode_into(&self, buf: &mut [u8]) -> Result<()> {
        eyre::ensure!(buf.len() == 1, "bool expects 1 byte, got {}", buf.len());
        buf[0] = u8::from(*self);
        Ok(())
    }

    fn decode_from(buf: &[u8]) -> Result<Self> {
        eyre::ensure!(buf.len() == 1, "bool expects 1 byte, got {}", buf.len());
        Ok(buf[0] != 0)
    }
}

impl<const N: usize> FieldCodec for [u8; N] {
    const NATURAL_SIZE: usize = N;

    fn encode_into(&self, buf: &mut [u8]) -> Result<()> {
        eyre::ensure!(
            buf.len() == N,
            "[u8; {}] expects {} bytes, got {}",
            N,
            N,
            buf.len()
        );
        buf.copy_from_slice(self);
        Ok(())
    }

    fn decode_from(buf: &[u8]) -> Result<Self> {
        buf.try_into()
            .map_err(|_| eyre::eyre!("[u8; {}] expects {} bytes, got {}", N, N, buf.len()))
    }
}
