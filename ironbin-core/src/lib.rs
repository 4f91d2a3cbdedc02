//! # IronBin Core
//!
//! Core types and traits for schema-driven binary serialization.
//!
//! This crate provides:
//! - [`ByteCursorBuffer`], a fixed-capacity byte buffer with independent
//!   read and write cursors, and big-endian primitive accessors
//! - Static [`Schema`] descriptors with version tags and field exclusion
//! - The [`Encoder`] / [`Decoder`] that walk a schema in field order
//! - [`BinaryCodec`], the configured entry point for whole records
//! - [`BufferPool`] for reusing buffers across threads
//! - Error types for encoding/decoding operations

pub mod buffer;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod record;
pub mod schema;
pub mod types;

pub use buffer::{ABSENT_ORDINAL, BufferPool, ByteCursorBuffer, ReadBuffer, WriteBuffer};
pub use codec::BinaryCodec;
pub use config::{
    CodecBuilder, CodecConfig, DEFAULT_BUFFER_CAPACITY, NestedVersioning, VERSION_TAG_LEN,
};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, ErrorKind, Result};
pub use record::BinarySerialize;
pub use schema::{EnumDescriptor, FieldDescriptor, FieldType, Schema};
pub use types::{BinaryEnum, BinaryField};
