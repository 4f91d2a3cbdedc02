//! # IronBin
//!
//! Schema-driven binary serialization for Rust.
//!
//! A record type declares its layout with `#[derive(BinarySerialize)]`; the
//! codec writes a big-endian `i16` version tag followed by every
//! non-excluded field in declaration order, and refuses to read a stream
//! whose tag does not match.
//!
//! ## Features
//!
//! - **Static schemas** - field tables are generated at compile time, no
//!   runtime reflection
//! - **Version gate** - every record carries an `i16` schema version
//! - **Exclusion** - skip individual fields or refuse whole types
//! - **Tolerant enums** - unknown ordinals decode as `None`
//! - **Composites** - nested records are flattened inline
//!
//! ## Quick Start
//!
//! ```ignore
//! use ironbin::prelude::*;
//!
//! #[derive(Debug, Clone, Copy, BinaryEnum)]
//! enum Color { Red, Green, Blue }
//!
//! #[derive(Debug, Default, BinarySerialize)]
//! #[binary(version = 3)]
//! struct Player {
//!     name: String,
//!     id: i32,
//!     kind: Option<Color>,
//! }
//!
//! let bytes = ironbin::to_vec(&Player { name: "A".into(), id: 7, kind: Some(Color::Red) })?;
//! let player: Player = ironbin::deserialize(&bytes)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Buffers, schemas, encoder/decoder, codec and errors
//! - [`prelude`] - Commonly used types, traits and derives

extern crate self as ironbin;

pub mod prelude;

/// Core types and traits for binary encoding/decoding.
pub mod core {
    pub use ironbin_core::*;
}

// Re-export commonly used items at the crate root
pub use ironbin_core::{
    ABSENT_ORDINAL, BinaryCodec, BinaryEnum, BinaryField, BinarySerialize, BufferPool,
    ByteCursorBuffer, CodecBuilder, CodecConfig, DEFAULT_BUFFER_CAPACITY, Decoder, Encoder,
    EnumDescriptor, Error, ErrorKind, FieldDescriptor, FieldType, NestedVersioning, ReadBuffer,
    Result, Schema, VERSION_TAG_LEN, WriteBuffer,
};
pub use ironbin_derive::{BinaryEnum, BinarySerialize};

/// Serializes a record into a buffer of the default capacity.
///
/// # Errors
/// See [`BinaryCodec::serialize`].
pub fn serialize<T: BinarySerialize>(value: &T) -> Result<ByteCursorBuffer> {
    BinaryCodec::new().serialize(value)
}

/// Serializes a record into an exactly sized byte vector.
///
/// # Errors
/// See [`BinaryCodec::to_vec`].
pub fn to_vec<T: BinarySerialize>(value: &T) -> Result<Vec<u8>> {
    BinaryCodec::new().to_vec(value)
}

/// Deserializes a record from raw bytes.
///
/// # Errors
/// See [`BinaryCodec::deserialize`].
pub fn deserialize<T: BinarySerialize>(bytes: &[u8]) -> Result<T> {
    BinaryCodec::new().from_bytes(bytes)
}
