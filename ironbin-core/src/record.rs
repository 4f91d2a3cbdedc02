//! Record trait implemented by every serializable type.

use crate::config::NestedVersioning;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::schema::Schema;

/// Trait for record types with a static schema.
///
/// Implementations are normally generated by `#[derive(BinarySerialize)]`,
/// which emits the schema table and walks the fields in declaration order.
/// `encode_fields` and `decode_fields` must visit exactly the encoded fields
/// of [`Self::SCHEMA`], in the same order.
///
/// # Example
/// ```ignore
/// #[derive(Default, BinarySerialize)]
/// #[binary(version = 3)]
/// struct Player {
///     name: String,
///     id: i32,
///     #[binary(exclude)]
///     session: Option<SessionHandle>,
/// }
/// ```
pub trait BinarySerialize: Sized {
    /// Schema describing the encoded layout of this type.
    const SCHEMA: &'static Schema;

    /// Writes every encoded field in schema order.
    ///
    /// # Errors
    /// Returns the first error raised by a field.
    fn encode_fields(&self, enc: &mut Encoder<'_>) -> Result<()>;

    /// Reads every encoded field in schema order into `self`.
    ///
    /// # Errors
    /// Returns the first error raised by a field.
    fn decode_fields(&mut self, dec: &mut Decoder<'_>) -> Result<()>;

    /// Returns the exact size of the encoded fields, excluding this record's
    /// own version tag.
    fn fields_encoded_len(&self, nested: NestedVersioning) -> usize;

    /// Creates the instance that decoding fills in.
    ///
    /// # Errors
    /// The default implementation always fails with
    /// [`Error::Instantiation`]; types with a default value override it.
    fn instantiate() -> Result<Self> {
        Err(Error::instantiation(
            Self::SCHEMA.name,
            "type has no default constructor",
        ))
    }
}
