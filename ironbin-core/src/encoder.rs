//! Schema-driven encoding.
//!
//! This module provides the [`Encoder`], which walks a record's fields in
//! schema order and writes each one at the write cursor of a
//! [`ByteCursorBuffer`].

use crate::buffer::{ABSENT_ORDINAL, ByteCursorBuffer};
use crate::config::NestedVersioning;
use crate::error::{Error, Result};
use crate::record::BinarySerialize;
use crate::schema::{FieldDescriptor, FieldType};
use crate::types::{BinaryEnum, BinaryField};

/// Writes records into a cursor buffer.
///
/// Composite fields share the encoder and the buffer of their parent, so a
/// nested record is flattened into the parent's byte stream. Whether it gets
/// its own version tag depends on the [`NestedVersioning`] policy.
///
/// # Example
/// ```ignore
/// let mut buffer = ByteCursorBuffer::new(256);
/// let mut encoder = Encoder::new(&mut buffer, NestedVersioning::EveryLevel);
/// encoder.record(&player)?;
/// let len = encoder.position();
/// ```
#[derive(Debug)]
pub struct Encoder<'a> {
    buffer: &'a mut ByteCursorBuffer,
    nested: NestedVersioning,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder writing at the buffer's current write cursor.
    ///
    /// # Arguments
    /// * `buffer` - Buffer to write to
    /// * `nested` - Version tag policy for composite fields
    #[must_use]
    pub fn new(buffer: &'a mut ByteCursorBuffer, nested: NestedVersioning) -> Self {
        Self { buffer, nested }
    }

    /// Returns the underlying buffer.
    pub fn buffer(&mut self) -> &mut ByteCursorBuffer {
        self.buffer
    }

    /// Returns the version tag policy for composite fields.
    #[must_use]
    pub const fn nested_versioning(&self) -> NestedVersioning {
        self.nested
    }

    /// Returns the current write position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.buffer.write_cursor_position()
    }

    /// Writes a top-level record: version tag followed by its fields.
    ///
    /// # Errors
    /// Returns [`Error::Excluded`] if the type is excluded, or the first
    /// error raised by a field.
    pub fn record<T: BinarySerialize>(&mut self, value: &T) -> Result<()> {
        let schema = T::SCHEMA;
        if schema.excluded {
            return Err(Error::excluded(schema.name));
        }
        self.buffer.write_i16(schema.version)?;
        value.encode_fields(self)
    }

    /// Writes a nested record inline.
    ///
    /// Under [`NestedVersioning::EveryLevel`] the record's version tag is
    /// written first; under [`NestedVersioning::TopLevelOnly`] only the
    /// fields are.
    ///
    /// # Errors
    /// Returns [`Error::Excluded`] if the type is excluded, or the first
    /// error raised by a field.
    pub fn composite<T: BinarySerialize>(&mut self, value: &T) -> Result<()> {
        let schema = T::SCHEMA;
        if schema.excluded {
            return Err(Error::excluded(schema.name));
        }
        if self.nested == NestedVersioning::EveryLevel {
            self.buffer.write_i16(schema.version)?;
        }
        value.encode_fields(self)
    }

    /// Writes one field described by `descriptor`.
    ///
    /// Excluded fields are skipped without touching the buffer. Errors are
    /// wrapped with the field name.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedType`] if the declared type has no
    /// encoding rule, or the error raised while writing the value.
    pub fn field<F: BinaryField>(&mut self, descriptor: &FieldDescriptor, value: &F) -> Result<()> {
        if descriptor.excluded {
            return Ok(());
        }
        if let FieldType::Unsupported(type_name) = descriptor.field_type {
            return Err(Error::unsupported(descriptor.name, type_name));
        }
        let start = self.position();
        value
            .encode_field(self)
            .map_err(|e| e.in_field(descriptor.name))?;
        tracing::trace!(
            "Encoded field {} ({}) at offset {}, {} bytes",
            descriptor.name,
            descriptor.field_type,
            start,
            self.position() - start
        );
        Ok(())
    }

    /// Writes an optional enum value as its ordinal.
    ///
    /// `None` is written as [`ABSENT_ORDINAL`], which reads back as `None`.
    ///
    /// # Errors
    /// Returns [`Error::OrdinalOverflow`] or [`Error::OutOfBounds`].
    pub fn enum_ordinal<E: BinaryEnum>(&mut self, value: Option<E>) -> Result<()> {
        match value {
            Some(variant) => self.buffer.write_enum_ordinal(variant),
            None => self.buffer.write_i16(ABSENT_ORDINAL),
        }
    }
}
