//! Schema-driven decoding.
//!
//! This module provides the [`Decoder`], the mirror of
//! [`Encoder`](crate::encoder::Encoder): it validates version tags and reads
//! fields back in schema order from the read cursor of a
//! [`ByteCursorBuffer`].

use crate::buffer::{ABSENT_ORDINAL, ByteCursorBuffer, variant_for};
use crate::config::NestedVersioning;
use crate::error::{Error, Result};
use crate::record::BinarySerialize;
use crate::schema::{FieldDescriptor, FieldType, Schema};
use crate::types::{BinaryEnum, BinaryField};

/// Reads records from a cursor buffer.
#[derive(Debug)]
pub struct Decoder<'a> {
    buffer: &'a mut ByteCursorBuffer,
    nested: NestedVersioning,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder reading at the buffer's current read cursor.
    ///
    /// # Arguments
    /// * `buffer` - Buffer to read from
    /// * `nested` - Version tag policy for composite fields; must match the
    ///   policy the stream was written with
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

    /// Returns the current read position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.buffer.read_cursor_position()
    }

    /// Reads a top-level record into a freshly instantiated value.
    ///
    /// # Errors
    /// Returns [`Error::Excluded`], [`Error::VersionMismatch`],
    /// [`Error::Instantiation`] or the first error raised by a field.
    pub fn record<T: BinarySerialize>(&mut self) -> Result<T> {
        let schema = Self::accept::<T>()?;
        self.check_version(schema)?;
        let mut value = T::instantiate()?;
        value.decode_fields(self)?;
        Ok(value)
    }

    /// Reads a top-level record into an existing value.
    ///
    /// Excluded fields of `target` keep their current values. On error the
    /// target may be partially updated.
    ///
    /// # Errors
    /// Returns [`Error::Excluded`], [`Error::VersionMismatch`] or the first
    /// error raised by a field.
    pub fn record_into<T: BinarySerialize>(&mut self, target: &mut T) -> Result<()> {
        let schema = Self::accept::<T>()?;
        self.check_version(schema)?;
        target.decode_fields(self)
    }

    /// Reads a nested record, mirroring [`Encoder::composite`].
    ///
    /// [`Encoder::composite`]: crate::encoder::Encoder::composite
    ///
    /// # Errors
    /// Returns [`Error::Excluded`], [`Error::VersionMismatch`] (under
    /// [`NestedVersioning::EveryLevel`]), [`Error::Instantiation`] or the
    /// first error raised by a field.
    pub fn composite<T: BinarySerialize>(&mut self) -> Result<T> {
        let schema = Self::accept::<T>()?;
        if self.nested == NestedVersioning::EveryLevel {
            self.check_version(schema)?;
        }
        let mut value = T::instantiate()?;
        value.decode_fields(self)?;
        Ok(value)
    }

    /// Reads a nested record into an existing value.
    ///
    /// Unlike [`Self::composite`] this never calls
    /// [`BinarySerialize::instantiate`], so types without a default
    /// constructor can be decoded in place.
    ///
    /// # Errors
    /// Returns [`Error::Excluded`], [`Error::VersionMismatch`] (under
    /// [`NestedVersioning::EveryLevel`]) or the first error raised by a field.
    pub fn composite_into<T: BinarySerialize>(&mut self, target: &mut T) -> Result<()> {
        let schema = Self::accept::<T>()?;
        if self.nested == NestedVersioning::EveryLevel {
            self.check_version(schema)?;
        }
        target.decode_fields(self)
    }

    /// Reads one field described by `descriptor` into a new value.
    ///
    /// Errors are wrapped with the field name.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedType`] if the declared type has no
    /// encoding rule, which includes excluded descriptors since an excluded
    /// field has no value in the stream, or the error raised while reading
    /// the value.
    pub fn field<F: BinaryField>(&mut self, descriptor: &FieldDescriptor) -> Result<F> {
        if let FieldType::Unsupported(type_name) = descriptor.field_type {
            return Err(Error::unsupported(descriptor.name, type_name));
        }
        let start = self.position();
        let value = F::decode_field(self).map_err(|e| e.in_field(descriptor.name))?;
        self.trace_field(descriptor, start);
        Ok(value)
    }

    /// Reads one field described by `descriptor` into `target`.
    ///
    /// Mirrors [`Encoder::field`]: excluded fields are skipped and `target`
    /// keeps its current value. Errors are wrapped with the field name.
    ///
    /// [`Encoder::field`]: crate::encoder::Encoder::field
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedType`] if the declared type has no
    /// encoding rule, or the error raised while reading the value.
    pub fn field_into<F: BinaryField>(
        &mut self,
        descriptor: &FieldDescriptor,
        target: &mut F,
    ) -> Result<()> {
        if descriptor.excluded {
            return Ok(());
        }
        if let FieldType::Unsupported(type_name) = descriptor.field_type {
            return Err(Error::unsupported(descriptor.name, type_name));
        }
        let start = self.position();
        target
            .decode_field_into(self)
            .map_err(|e| e.in_field(descriptor.name))?;
        self.trace_field(descriptor, start);
        Ok(())
    }

    /// Reads an enum ordinal, yielding `None` when it has no variant.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if fewer than 2 bytes remain.
    pub fn enum_ordinal<E: BinaryEnum>(&mut self) -> Result<Option<E>> {
        let offset = self.position();
        let raw = self.buffer.read_i16()?;
        let value = variant_for::<E>(raw);
        if value.is_none() && raw != ABSENT_ORDINAL {
            tracing::warn!(
                "Unknown ordinal {} for enum {} at offset {}, decoded as absent",
                raw,
                E::DESCRIPTOR.name,
                offset
            );
        }
        Ok(value)
    }

    fn trace_field(&self, descriptor: &FieldDescriptor, start: usize) {
        tracing::trace!(
            "Decoded field {} ({}) at offset {}, {} bytes",
            descriptor.name,
            descriptor.field_type,
            start,
            self.position() - start
        );
    }

    fn accept<T: BinarySerialize>() -> Result<&'static Schema> {
        let schema = T::SCHEMA;
        if schema.excluded {
            return Err(Error::excluded(schema.name));
        }
        Ok(schema)
    }

    fn check_version(&mut self, schema: &'static Schema) -> Result<()> {
        let actual = self.buffer.read_i16()?;
        if actual != schema.version {
            tracing::warn!(
                "Version mismatch for {}: expected {}, found {}",
                schema.name,
                schema.version,
                actual
            );
            return Err(Error::VersionMismatch {
                type_name: schema.name,
                expected: schema.version,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::WriteBuffer;
    use crate::encoder::Encoder;
    use crate::error::ErrorKind;
    use crate::schema::EnumDescriptor;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Level {
        Low,
        High,
    }

    impl BinaryEnum for Level {
        const DESCRIPTOR: &'static EnumDescriptor = &EnumDescriptor {
            name: "Level",
            variants: &["Low", "High"],
        };
        const VARIANTS: &'static [Self] = &[Level::Low, Level::High];

        fn ordinal(self) -> usize {
            self as usize
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Reading {
        label: String,
        value: i16,
        level: Option<Level>,
    }

    impl BinarySerialize for Reading {
        const SCHEMA: &'static Schema = &Schema {
            name: "Reading",
            version: 3,
            excluded: false,
            fields: &[
                FieldDescriptor::new("label", FieldType::Utf8String),
                FieldDescriptor::new("value", FieldType::Int16),
                FieldDescriptor::new("level", FieldType::EnumOrdinal(Level::DESCRIPTOR)),
            ],
        };

        fn encode_fields(&self, enc: &mut Encoder<'_>) -> Result<()> {
            enc.field(&Self::SCHEMA.fields[0], &self.label)?;
            enc.field(&Self::SCHEMA.fields[1], &self.value)?;
            enc.field(&Self::SCHEMA.fields[2], &self.level)
        }

        fn decode_fields(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
            self.label = dec.field(&Self::SCHEMA.fields[0])?;
            self.value = dec.field(&Self::SCHEMA.fields[1])?;
            self.level = dec.field(&Self::SCHEMA.fields[2])?;
            Ok(())
        }

        fn fields_encoded_len(&self, nested: NestedVersioning) -> usize {
            self.label.encoded_len(nested) + 4
        }

        fn instantiate() -> Result<Self> {
            Ok(Self::default())
        }
    }

    /// Record without a constructor: relies on the trait default.
    #[derive(Debug)]
    struct Handle {
        id: i32,
    }

    impl BinarySerialize for Handle {
        const SCHEMA: &'static Schema = &Schema {
            name: "Handle",
            version: 0,
            excluded: false,
            fields: &[FieldDescriptor::new("id", FieldType::Int32)],
        };

        fn encode_fields(&self, enc: &mut Encoder<'_>) -> Result<()> {
            enc.field(&Self::SCHEMA.fields[0], &self.id)
        }

        fn decode_fields(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
            self.id = dec.field(&Self::SCHEMA.fields[0])?;
            Ok(())
        }

        fn fields_encoded_len(&self, _nested: NestedVersioning) -> usize {
            4
        }
    }

    fn encoded(reading: &Reading) -> ByteCursorBuffer {
        let mut buf = ByteCursorBuffer::new(64);
        Encoder::new(&mut buf, NestedVersioning::EveryLevel)
            .record(reading)
            .unwrap();
        buf
    }

    #[test]
    fn test_record_round_trip() {
        let reading = Reading {
            label: "temp".into(),
            value: -40,
            level: Some(Level::High),
        };
        let mut buf = encoded(&reading);
        let mut dec = Decoder::new(&mut buf, NestedVersioning::EveryLevel);
        let decoded: Reading = dec.record().unwrap();
        assert_eq!(decoded, reading);
        assert_eq!(dec.position(), 2 + 8 + 2 + 2);
    }

    #[test]
    fn test_version_mismatch() {
        let mut buf = encoded(&Reading::default());
        buf.put_i16_be(0, 4).unwrap();
        let mut dec = Decoder::new(&mut buf, NestedVersioning::EveryLevel);
        let err = dec.record::<Reading>().unwrap_err();
        assert_eq!(
            err,
            Error::VersionMismatch {
                type_name: "Reading",
                expected: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn test_record_into_existing_value() {
        let source = Reading {
            label: "a".into(),
            value: 1,
            level: None,
        };
        let mut buf = encoded(&source);
        let mut target = Reading {
            label: "stale".into(),
            value: 99,
            level: Some(Level::Low),
        };
        Decoder::new(&mut buf, NestedVersioning::EveryLevel)
            .record_into(&mut target)
            .unwrap();
        assert_eq!(target, source);
    }

    #[test]
    fn test_instantiation_error() {
        let mut buf = ByteCursorBuffer::new(8);
        Encoder::new(&mut buf, NestedVersioning::EveryLevel)
            .record(&Handle { id: 9 })
            .unwrap();
        let mut dec = Decoder::new(&mut buf, NestedVersioning::EveryLevel);
        let err = dec.record::<Handle>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Instantiation);

        let mut existing = Handle { id: 0 };
        buf.reset_read_cursor();
        Decoder::new(&mut buf, NestedVersioning::EveryLevel)
            .record_into(&mut existing)
            .unwrap();
        assert_eq!(existing.id, 9);
    }

    #[test]
    fn test_unknown_ordinal_decodes_as_absent() {
        let mut buf = encoded(&Reading {
            label: String::new(),
            value: 0,
            level: Some(Level::High),
        });
        // label prefix (4) + value (2) after the version tag
        buf.put_i16_be(2 + 4 + 2, 7).unwrap();
        let decoded: Reading = Decoder::new(&mut buf, NestedVersioning::EveryLevel)
            .record()
            .unwrap();
        assert_eq!(decoded.level, None);
    }

    #[test]
    fn test_truncated_stream() {
        let reading = Reading {
            label: "truncated".into(),
            value: 1,
            level: None,
        };
        let full = encoded(&reading);
        let mut short = ByteCursorBuffer::from_slice(&full.written()[..8]);
        let err = Decoder::new(&mut short, NestedVersioning::EveryLevel)
            .record::<Reading>()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds);
        assert_eq!(err.field_path().as_deref(), Some("label"));
    }

    #[test]
    fn test_composite_version_policy() {
        let mut buf = ByteCursorBuffer::new(16);
        Encoder::new(&mut buf, NestedVersioning::TopLevelOnly)
            .composite(&Handle { id: 4 })
            .unwrap();
        assert_eq!(buf.written(), &[0, 0, 0, 4]);

        let mut existing = Handle { id: 0 };
        let mut dec = Decoder::new(&mut buf, NestedVersioning::TopLevelOnly);
        existing.decode_fields(&mut dec).unwrap();
        assert_eq!(existing.id, 4);
    }

    #[test]
    fn test_composite_into_without_constructor() {
        let mut buf = ByteCursorBuffer::new(16);
        Encoder::new(&mut buf, NestedVersioning::EveryLevel)
            .composite(&Handle { id: 12 })
            .unwrap();

        let err = Decoder::new(&mut buf, NestedVersioning::EveryLevel)
            .composite::<Handle>()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Instantiation);

        buf.reset_read_cursor();
        let mut existing = Handle { id: 0 };
        let mut dec = Decoder::new(&mut buf, NestedVersioning::EveryLevel);
        dec.composite_into(&mut existing).unwrap();
        assert_eq!(existing.id, 12);
        assert_eq!(dec.position(), 6);
    }

    #[test]
    fn test_excluded_descriptor() {
        let descriptor = FieldDescriptor::excluded("cache", "Vec<u8>");
        let mut buf = ByteCursorBuffer::from_slice(&[0, 0, 0, 5]);
        let mut dec = Decoder::new(&mut buf, NestedVersioning::EveryLevel);

        let err = dec.field::<i32>(&descriptor).unwrap_err();
        assert_eq!(err, Error::unsupported("cache", "Vec<u8>"));

        let mut kept = 7i32;
        dec.field_into(&descriptor, &mut kept).unwrap();
        assert_eq!(kept, 7);
        assert_eq!(dec.position(), 0);

        dec.field_into(&FieldDescriptor::new("id", FieldType::Int32), &mut kept)
            .unwrap();
        assert_eq!(kept, 5);
    }
}
