//! Codec entry points.
//!
//! [`BinaryCodec`] ties the schema walk to buffer management: it validates
//! the schema, allocates or reuses a [`ByteCursorBuffer`], and runs the
//! [`Encoder`] / [`Decoder`] under one [`CodecConfig`].
//!
//! # Wire format
//! ```text
//! +0: version      (i16 BE)
//! +2: field_1      (per field type)
//!     field_2 ...
//! ```
//! Strings are an i32 BE byte count followed by UTF-8 bytes, enums an i16 BE
//! ordinal (`-1` for absent), composites `[version i16][fields]` under
//! [`NestedVersioning::EveryLevel`] or bare `[fields]` under
//! [`NestedVersioning::TopLevelOnly`].

use crate::buffer::ByteCursorBuffer;
use crate::config::{CodecBuilder, CodecConfig, NestedVersioning, VERSION_TAG_LEN};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::record::BinarySerialize;

/// Schema-driven binary serializer.
///
/// A codec holds only configuration; it is `Copy` and can be shared freely.
/// Each call works on its own buffer, so concurrent calls never share cursor
/// state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryCodec {
    config: CodecConfig,
}

impl BinaryCodec {
    /// Creates a codec with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec with the given configuration.
    #[must_use]
    pub const fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Returns a builder for a customised codec.
    #[must_use]
    pub fn builder() -> CodecBuilder {
        CodecBuilder::new()
    }

    /// Returns the codec configuration.
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Returns the version tag policy for composite fields.
    #[must_use]
    pub const fn nested_versioning(&self) -> NestedVersioning {
        self.config.nested_versioning
    }

    /// Serializes a record into a new buffer of the configured capacity.
    ///
    /// # Errors
    /// See [`Self::serialize_with_capacity`].
    pub fn serialize<T: BinarySerialize>(&self, value: &T) -> Result<ByteCursorBuffer> {
        self.serialize_with_capacity(value, self.config.buffer_capacity)
    }

    /// Serializes a record into a new buffer of `capacity` bytes.
    ///
    /// The schema is validated before the buffer is allocated.
    ///
    /// # Errors
    /// Returns [`Error::Excluded`](crate::Error::Excluded) or
    /// [`Error::UnsupportedType`](crate::Error::UnsupportedType) from schema
    /// validation, and [`Error::OutOfBounds`](crate::Error::OutOfBounds) if
    /// the record does not fit.
    pub fn serialize_with_capacity<T: BinarySerialize>(
        &self,
        value: &T,
        capacity: usize,
    ) -> Result<ByteCursorBuffer> {
        T::SCHEMA.validate()?;
        let mut buffer = ByteCursorBuffer::new(capacity);
        self.encode(value, &mut buffer)?;
        Ok(buffer)
    }

    /// Serializes a record at the write cursor of an existing buffer.
    ///
    /// Returns the number of bytes written. On error the write cursor is left
    /// wherever the failing field stopped.
    ///
    /// # Errors
    /// See [`Self::serialize_with_capacity`].
    pub fn serialize_into<T: BinarySerialize>(
        &self,
        value: &T,
        buffer: &mut ByteCursorBuffer,
    ) -> Result<usize> {
        T::SCHEMA.validate()?;
        let start = buffer.write_cursor_position();
        self.encode(value, buffer)?;
        Ok(buffer.write_cursor_position() - start)
    }

    /// Serializes a record into an exactly sized byte vector.
    ///
    /// # Errors
    /// Returns schema validation errors.
    pub fn to_vec<T: BinarySerialize>(&self, value: &T) -> Result<Vec<u8>> {
        let len = self.encoded_len(value);
        let buffer = self.serialize_with_capacity(value, len)?;
        Ok(buffer.into_bytes())
    }

    /// Returns the number of bytes `value` serializes to, version tag
    /// included.
    #[must_use]
    pub fn encoded_len<T: BinarySerialize>(&self, value: &T) -> usize {
        VERSION_TAG_LEN + value.fields_encoded_len(self.config.nested_versioning)
    }

    /// Deserializes a record starting at the buffer's read cursor.
    ///
    /// # Errors
    /// Returns [`Error::Excluded`](crate::Error::Excluded),
    /// [`Error::UnsupportedType`](crate::Error::UnsupportedType),
    /// [`Error::VersionMismatch`](crate::Error::VersionMismatch),
    /// [`Error::Instantiation`](crate::Error::Instantiation) or a field error.
    pub fn deserialize<T: BinarySerialize>(&self, buffer: &mut ByteCursorBuffer) -> Result<T> {
        T::SCHEMA.validate()?;
        let start = buffer.read_cursor_position();
        let value = Decoder::new(buffer, self.config.nested_versioning).record()?;
        tracing::debug!(
            "Deserialized {} v{}: {} bytes",
            T::SCHEMA.name,
            T::SCHEMA.version,
            buffer.read_cursor_position() - start
        );
        Ok(value)
    }

    /// Deserializes a record into an existing value.
    ///
    /// Excluded fields keep their current values.
    ///
    /// # Errors
    /// See [`Self::deserialize`]; never fails with `Instantiation`.
    pub fn deserialize_into<T: BinarySerialize>(
        &self,
        target: &mut T,
        buffer: &mut ByteCursorBuffer,
    ) -> Result<()> {
        T::SCHEMA.validate()?;
        Decoder::new(buffer, self.config.nested_versioning).record_into(target)
    }

    /// Deserializes a record from raw bytes.
    ///
    /// # Errors
    /// See [`Self::deserialize`].
    pub fn from_bytes<T: BinarySerialize>(&self, bytes: &[u8]) -> Result<T> {
        let mut buffer = ByteCursorBuffer::from_slice(bytes);
        self.deserialize(&mut buffer)
    }

    fn encode<T: BinarySerialize>(&self, value: &T, buffer: &mut ByteCursorBuffer) -> Result<()> {
        let start = buffer.write_cursor_position();
        Encoder::new(buffer, self.config.nested_versioning).record(value)?;
        tracing::debug!(
            "Serialized {} v{}: {} bytes",
            T::SCHEMA.name,
            T::SCHEMA.version,
            buffer.write_cursor_position() - start
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BufferPool, WriteBuffer};
    use crate::error::{Error, ErrorKind};
    use crate::schema::{FieldDescriptor, FieldType, Schema};
    use crate::types::BinaryField;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl BinarySerialize for Point {
        const SCHEMA: &'static Schema = &Schema {
            name: "Point",
            version: 1,
            excluded: false,
            fields: &[
                FieldDescriptor::new("x", <i32 as BinaryField>::FIELD_TYPE),
                FieldDescriptor::new("y", <i32 as BinaryField>::FIELD_TYPE),
            ],
        };

        fn encode_fields(&self, enc: &mut Encoder<'_>) -> Result<()> {
            enc.field(&Self::SCHEMA.fields[0], &self.x)?;
            enc.field(&Self::SCHEMA.fields[1], &self.y)
        }

        fn decode_fields(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
            self.x = dec.field(&Self::SCHEMA.fields[0])?;
            self.y = dec.field(&Self::SCHEMA.fields[1])?;
            Ok(())
        }

        fn fields_encoded_len(&self, nested: NestedVersioning) -> usize {
            self.x.encoded_len(nested) + self.y.encoded_len(nested)
        }

        fn instantiate() -> Result<Self> {
            Ok(Self::default())
        }
    }

    impl BinaryField for Point {
        const FIELD_TYPE: FieldType = FieldType::Composite(Self::SCHEMA);

        fn encode_field(&self, enc: &mut Encoder<'_>) -> Result<()> {
            enc.composite(self)
        }

        fn decode_field(dec: &mut Decoder<'_>) -> Result<Self> {
            dec.composite()
        }

        fn decode_field_into(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
            dec.composite_into(self)
        }

        fn encoded_len(&self, nested: NestedVersioning) -> usize {
            nested.prefix_len() + self.fields_encoded_len(nested)
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Marker {
        label: String,
        at: Point,
        note: String,
    }

    impl BinarySerialize for Marker {
        const SCHEMA: &'static Schema = &Schema {
            name: "Marker",
            version: 2,
            excluded: false,
            fields: &[
                FieldDescriptor::new("label", <String as BinaryField>::FIELD_TYPE),
                FieldDescriptor::new("at", <Point as BinaryField>::FIELD_TYPE),
                FieldDescriptor::excluded("note", "String"),
            ],
        };

        fn encode_fields(&self, enc: &mut Encoder<'_>) -> Result<()> {
            enc.field(&Self::SCHEMA.fields[0], &self.label)?;
            enc.field(&Self::SCHEMA.fields[1], &self.at)
        }

        fn decode_fields(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
            dec.field_into(&Self::SCHEMA.fields[0], &mut self.label)?;
            dec.field_into(&Self::SCHEMA.fields[1], &mut self.at)
        }

        fn fields_encoded_len(&self, nested: NestedVersioning) -> usize {
            self.label.encoded_len(nested) + self.at.encoded_len(nested)
        }

        fn instantiate() -> Result<Self> {
            Ok(Self::default())
        }
    }

    #[derive(Debug, Default)]
    struct Tagged {
        tags: Vec<String>,
    }

    impl BinarySerialize for Tagged {
        const SCHEMA: &'static Schema = &Schema {
            name: "Tagged",
            version: 0,
            excluded: false,
            fields: &[FieldDescriptor::new(
                "tags",
                <Vec<String> as BinaryField>::FIELD_TYPE,
            )],
        };

        fn encode_fields(&self, enc: &mut Encoder<'_>) -> Result<()> {
            enc.field(&Self::SCHEMA.fields[0], &self.tags)
        }

        fn decode_fields(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
            self.tags = dec.field(&Self::SCHEMA.fields[0])?;
            Ok(())
        }

        fn fields_encoded_len(&self, _nested: NestedVersioning) -> usize {
            0
        }

        fn instantiate() -> Result<Self> {
            Ok(Self::default())
        }
    }

    fn marker() -> Marker {
        Marker {
            label: "home".into(),
            at: Point { x: 3, y: -4 },
            note: "not encoded".into(),
        }
    }

    #[test]
    fn test_round_trip_every_level() {
        let codec = BinaryCodec::new();
        let mut buffer = codec.serialize(&marker()).unwrap();
        assert_eq!(buffer.capacity(), 65535);
        assert_eq!(
            buffer.written(),
            &[
                0, 2, // Marker version
                0, 0, 0, 4, b'h', b'o', b'm', b'e', // label
                0, 1, // Point version
                0, 0, 0, 3, // x
                0xFF, 0xFF, 0xFF, 0xFC, // y
            ]
        );

        let decoded: Marker = codec.deserialize(&mut buffer).unwrap();
        assert_eq!(decoded.label, "home");
        assert_eq!(decoded.at, Point { x: 3, y: -4 });
        assert_eq!(decoded.note, "");
    }

    #[test]
    fn test_round_trip_top_level_only() {
        let codec = BinaryCodec::builder()
            .nested_versioning(NestedVersioning::TopLevelOnly)
            .buffer_capacity(64)
            .build();
        let bytes = codec.to_vec(&marker()).unwrap();
        assert_eq!(bytes.len(), 2 + 8 + 8);
        assert_eq!(&bytes[10..12], &[0, 0]);

        let decoded: Marker = codec.from_bytes(&bytes).unwrap();
        assert_eq!(decoded.at, marker().at);
    }

    #[test]
    fn test_policies_must_agree() {
        let writer = BinaryCodec::new();
        let reader = BinaryCodec::builder()
            .nested_versioning(NestedVersioning::TopLevelOnly)
            .build();
        let bytes = writer.to_vec(&marker()).unwrap();
        // the nested version tag is read as the high half of `at.x`
        let decoded: Marker = reader.from_bytes(&bytes).unwrap();
        assert_eq!(decoded.label, "home");
        assert_eq!(
            decoded.at,
            Point {
                x: 0x0001_0000,
                y: 0x0003_FFFF
            }
        );

        let bytes = reader.to_vec(&marker()).unwrap();
        let err = writer.from_bytes::<Marker>(&bytes).unwrap_err();
        assert_eq!(err.field_path().as_deref(), Some("at"));
        assert_eq!(
            *err.root_cause(),
            Error::VersionMismatch {
                type_name: "Point",
                expected: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn test_nested_version_mismatch_reports_path() {
        let codec = BinaryCodec::new();
        let mut bytes = codec.to_vec(&marker()).unwrap();
        bytes.put_i16_be(10, 9).unwrap();
        let err = codec.from_bytes::<Marker>(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionMismatch);
        assert_eq!(err.field_path().as_deref(), Some("at"));
        assert!(matches!(
            err.root_cause(),
            Error::VersionMismatch {
                type_name: "Point",
                expected: 1,
                actual: 9
            }
        ));
    }

    #[test]
    fn test_top_level_version_mismatch() {
        let codec = BinaryCodec::new();
        let mut bytes = codec.to_vec(&Point { x: 1, y: 2 }).unwrap();
        bytes.put_i16_be(0, 2).unwrap();
        assert_eq!(
            codec.from_bytes::<Point>(&bytes),
            Err(Error::VersionMismatch {
                type_name: "Point",
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn test_unsupported_type_fails_before_writing() {
        let codec = BinaryCodec::new();
        let value = Tagged {
            tags: vec!["a".into()],
        };
        assert_eq!(
            codec.serialize(&value).unwrap_err(),
            Error::unsupported("tags", "Vec")
        );

        let mut buffer = ByteCursorBuffer::new(16);
        assert!(codec.serialize_into(&value, &mut buffer).is_err());
        assert_eq!(buffer.write_cursor_position(), 0);

        let mut input = ByteCursorBuffer::from_slice(&[0, 0]);
        assert!(codec.deserialize::<Tagged>(&mut input).is_err());
        assert_eq!(input.read_cursor_position(), 0);
    }

    #[test]
    fn test_encoded_len_matches_output() {
        for policy in [NestedVersioning::EveryLevel, NestedVersioning::TopLevelOnly] {
            let codec = BinaryCodec::builder().nested_versioning(policy).build();
            let value = marker();
            let buffer = codec.serialize(&value).unwrap();
            assert_eq!(codec.encoded_len(&value), buffer.write_cursor_position());
        }
    }

    #[test]
    fn test_capacity_too_small() {
        let codec = BinaryCodec::new();
        let err = codec.serialize_with_capacity(&marker(), 12).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds);
        assert_eq!(err.field_path().as_deref(), Some("at.x"));
    }

    #[test]
    fn test_sequential_records_share_buffer() {
        let codec = BinaryCodec::new();
        let mut buffer = ByteCursorBuffer::new(128);
        let first = codec.serialize_into(&Point { x: 1, y: 1 }, &mut buffer).unwrap();
        let second = codec.serialize_into(&marker(), &mut buffer).unwrap();
        assert_eq!(first, 10);
        assert_eq!(buffer.write_cursor_position(), first + second);

        let p: Point = codec.deserialize(&mut buffer).unwrap();
        let m: Marker = codec.deserialize(&mut buffer).unwrap();
        assert_eq!(p, Point { x: 1, y: 1 });
        assert_eq!(m.label, "home");
    }

    #[test]
    fn test_deserialize_into_keeps_excluded_fields() {
        let codec = BinaryCodec::new();
        let mut buffer = codec.serialize(&marker()).unwrap();
        let mut target = Marker {
            note: "kept".into(),
            ..Marker::default()
        };
        codec.deserialize_into(&mut target, &mut buffer).unwrap();
        assert_eq!(target.note, "kept");
        assert_eq!(target.label, "home");
    }

    #[test]
    fn test_pooled_buffers_across_threads() {
        let codec = BinaryCodec::new();
        let pool = BufferPool::new(4, 64);

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let pool = pool.clone();
                scope.spawn(move || {
                    let mut buffer = pool.acquire_or_new();
                    let point = Point { x: worker, y: -worker };
                    codec.serialize_into(&point, &mut buffer).unwrap();
                    let decoded: Point = codec.deserialize(&mut buffer).unwrap();
                    assert_eq!(decoded, point);
                    pool.release(buffer);
                });
            }
        });

        assert_eq!(pool.available(), 4);
    }
}
