//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types, traits and derive
//! macros.
//!
//! ```ignore
//! use ironbin::prelude::*;
//! ```

// Traits and their derives
pub use ironbin_core::{BinaryEnum, BinaryField, BinarySerialize};
pub use ironbin_derive::{BinaryEnum, BinarySerialize};

// Codec
pub use ironbin_core::{BinaryCodec, CodecBuilder, CodecConfig, NestedVersioning};

// Buffers
pub use ironbin_core::{BufferPool, ByteCursorBuffer};

// Errors
pub use ironbin_core::{Error, ErrorKind, Result};
