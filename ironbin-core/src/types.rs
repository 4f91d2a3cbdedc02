//! Field-level encoding rules.
//!
//! [`BinaryField`] maps a Rust type to its [`FieldType`] and knows how to
//! move a value through the [`Encoder`] / [`Decoder`]. The supported set is
//! closed:
//!
//! | Rust type | Wire type |
//! |---|---|
//! | `String` | [`FieldType::Utf8String`] |
//! | `i32` | [`FieldType::Int32`] |
//! | `i16` | [`FieldType::Int16`] |
//! | `Option<E: BinaryEnum>` | [`FieldType::EnumOrdinal`] |
//! | `#[derive(BinarySerialize)]` structs | [`FieldType::Composite`] |
//!
//! `Vec<T>` and arrays map to [`FieldType::Unsupported`] so that a record
//! declaring them fails with [`Error::UnsupportedType`] instead of being
//! mis-encoded.

use crate::buffer::UTF8_PREFIX_LEN;
use crate::config::NestedVersioning;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::schema::{EnumDescriptor, FieldType};

/// Trait for fieldless enums encoded by ordinal.
///
/// Usually derived with `#[derive(BinaryEnum)]`. The ordinal of a variant is
/// its index in [`Self::VARIANTS`].
pub trait BinaryEnum: Copy + 'static {
    /// Enum name and variant names.
    const DESCRIPTOR: &'static EnumDescriptor;

    /// Variants in declaration order.
    const VARIANTS: &'static [Self];

    /// Returns the zero-based ordinal of this variant.
    fn ordinal(self) -> usize;

    /// Returns the variant at `ordinal`, or `None` if out of range.
    #[must_use]
    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::VARIANTS.get(ordinal).copied()
    }
}

/// Trait for types that can appear as a record field.
pub trait BinaryField: Sized {
    /// Declared wire type.
    const FIELD_TYPE: FieldType;

    /// Writes the value at the encoder's write cursor.
    ///
    /// # Errors
    /// Returns an error if the value does not fit or has no encoding rule.
    fn encode_field(&self, enc: &mut Encoder<'_>) -> Result<()>;

    /// Reads a value at the decoder's read cursor.
    ///
    /// # Errors
    /// Returns an error if the stream is short or malformed.
    fn decode_field(dec: &mut Decoder<'_>) -> Result<Self>;

    /// Reads a value at the decoder's read cursor into `self`.
    ///
    /// Composites override this to fill their fields in place, so a nested
    /// record without a default constructor can still be decoded into an
    /// existing value.
    ///
    /// # Errors
    /// Returns an error if the stream is short or malformed.
    fn decode_field_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        *self = Self::decode_field(dec)?;
        Ok(())
    }

    /// Returns the exact number of bytes [`Self::encode_field`] writes.
    fn encoded_len(&self, nested: NestedVersioning) -> usize;
}

impl BinaryField for String {
    const FIELD_TYPE: FieldType = FieldType::Utf8String;

    fn encode_field(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.buffer().write_utf8(self)
    }

    fn decode_field(dec: &mut Decoder<'_>) -> Result<Self> {
        dec.buffer().read_utf8()
    }

    fn encoded_len(&self, _nested: NestedVersioning) -> usize {
        UTF8_PREFIX_LEN + self.len()
    }
}

impl BinaryField for i32 {
    const FIELD_TYPE: FieldType = FieldType::Int32;

    fn encode_field(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.buffer().write_i32(*self)
    }

    fn decode_field(dec: &mut Decoder<'_>) -> Result<Self> {
        dec.buffer().read_i32()
    }

    fn encoded_len(&self, _nested: NestedVersioning) -> usize {
        4
    }
}

impl BinaryField for i16 {
    const FIELD_TYPE: FieldType = FieldType::Int16;

    fn encode_field(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.buffer().write_i16(*self)
    }

    fn decode_field(dec: &mut Decoder<'_>) -> Result<Self> {
        dec.buffer().read_i16()
    }

    fn encoded_len(&self, _nested: NestedVersioning) -> usize {
        2
    }
}

/// Enum fields are optional: an out-of-range ordinal decodes to `None`.
impl<E: BinaryEnum> BinaryField for Option<E> {
    const FIELD_TYPE: FieldType = FieldType::EnumOrdinal(E::DESCRIPTOR);

    fn encode_field(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.enum_ordinal(*self)
    }

    fn decode_field(dec: &mut Decoder<'_>) -> Result<Self> {
        dec.enum_ordinal::<E>()
    }

    fn encoded_len(&self, _nested: NestedVersioning) -> usize {
        2
    }
}

impl<T> BinaryField for Vec<T> {
    const FIELD_TYPE: FieldType = FieldType::Unsupported("Vec");

    fn encode_field(&self, _enc: &mut Encoder<'_>) -> Result<()> {
        Err(Error::unsupported("<sequence>", "Vec"))
    }

    fn decode_field(_dec: &mut Decoder<'_>) -> Result<Self> {
        Err(Error::unsupported("<sequence>", "Vec"))
    }

    fn encoded_len(&self, _nested: NestedVersioning) -> usize {
        0
    }
}

impl<T, const N: usize> BinaryField for [T; N] {
    const FIELD_TYPE: FieldType = FieldType::Unsupported("array");

    fn encode_field(&self, _enc: &mut Encoder<'_>) -> Result<()> {
        Err(Error::unsupported("<sequence>", "array"))
    }

    fn decode_field(_dec: &mut Decoder<'_>) -> Result<Self> {
        Err(Error::unsupported("<sequence>", "array"))
    }

    fn encoded_len(&self, _nested: NestedVersioning) -> usize {
        0
    }
}
