//! Static schema tables describing encodable record types.
//!
//! A [`Schema`] is an ordered, immutable description of a record's fields.
//! Schemas are `'static` constants, normally generated by
//! `#[derive(BinarySerialize)]`, and are freely shareable between threads.
//! The wire format carries no field names or tags, so declaration order is
//! the only addressing mechanism.

use crate::buffer::UTF8_PREFIX_LEN;
use crate::config::NestedVersioning;
use crate::error::{Error, Result};
use std::fmt;

/// Declared wire type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Length-prefixed UTF-8 string.
    Utf8String,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 16-bit integer.
    Int16,
    /// Zero-based enum ordinal stored as an i16.
    EnumOrdinal(&'static EnumDescriptor),
    /// Nested record encoded inline.
    Composite(&'static Schema),
    /// A declared type with no encoding rule, such as a sequence.
    ///
    /// Only legal on excluded fields; the type of an excluded field is never
    /// inspected and is recorded here by name.
    Unsupported(&'static str),
}

impl FieldType {
    /// Returns a short name for the type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Utf8String => "utf8",
            Self::Int32 => "i32",
            Self::Int16 => "i16",
            Self::EnumOrdinal(e) => e.name,
            Self::Composite(s) => s.name,
            Self::Unsupported(name) => *name,
        }
    }

    /// Returns the encoded size in bytes if it does not depend on the value.
    ///
    /// Strings, and composites containing strings, have no fixed size.
    #[must_use]
    pub fn fixed_len(&self, nested: NestedVersioning) -> Option<usize> {
        match self {
            Self::Utf8String | Self::Unsupported(_) => None,
            Self::Int32 => Some(4),
            Self::Int16 | Self::EnumOrdinal(_) => Some(2),
            Self::Composite(schema) => schema
                .fields_fixed_len(nested)
                .map(|len| len + nested.prefix_len()),
        }
    }

    /// Returns the smallest number of bytes any value of this type takes.
    #[must_use]
    pub fn min_len(&self, nested: NestedVersioning) -> usize {
        match self {
            Self::Utf8String => UTF8_PREFIX_LEN,
            Self::Int32 => 4,
            Self::Int16 | Self::EnumOrdinal(_) => 2,
            Self::Composite(schema) => nested.prefix_len() + schema.fields_min_len(nested),
            Self::Unsupported(_) => 0,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnumOrdinal(e) => write!(f, "enum {}", e.name),
            Self::Composite(s) => write!(f, "composite {}", s.name),
            Self::Unsupported(name) => write!(f, "unsupported {}", name),
            other => f.write_str(other.name()),
        }
    }
}

/// Description of one field in a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name (declared or renamed).
    pub name: &'static str,
    /// Declared wire type.
    pub field_type: FieldType,
    /// Excluded fields never touch the buffer.
    pub excluded: bool,
}

impl FieldDescriptor {
    /// Creates a descriptor for an encoded field.
    #[must_use]
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            excluded: false,
        }
    }

    /// Creates a descriptor for an encoded field declared as `type_name`.
    ///
    /// An unsupported `field_type` reports `type_name` instead of its generic
    /// family name, so errors show the full declared type such as
    /// `Vec<String>`.
    #[must_use]
    pub const fn declared(
        name: &'static str,
        field_type: FieldType,
        type_name: &'static str,
    ) -> Self {
        let field_type = match field_type {
            FieldType::Unsupported(_) => FieldType::Unsupported(type_name),
            other => other,
        };
        Self::new(name, field_type)
    }

    /// Creates a descriptor for an excluded field.
    #[must_use]
    pub const fn excluded(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            field_type: FieldType::Unsupported(type_name),
            excluded: true,
        }
    }
}

/// Ordered, immutable description of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Type name.
    pub name: &'static str,
    /// Version tag written in front of the fields.
    pub version: i16,
    /// Whole-type exclusion.
    pub excluded: bool,
    /// Fields in declaration order.
    pub fields: &'static [FieldDescriptor],
}

impl Schema {
    /// Iterates the fields that are written to and read from the buffer.
    pub fn encoded_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|f| !f.excluded)
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks that every encoded field, recursively, has an encoding rule.
    ///
    /// # Errors
    /// Returns [`Error::Excluded`] if this type, or a composite reached
    /// through an encoded field, is excluded, and [`Error::UnsupportedType`]
    /// for the first encoded field with no encoding rule. Errors from nested
    /// composites carry the field path.
    pub fn validate(&self) -> Result<()> {
        if self.excluded {
            return Err(Error::excluded(self.name));
        }
        for field in self.encoded_fields() {
            match field.field_type {
                FieldType::Utf8String
                | FieldType::Int32
                | FieldType::Int16
                | FieldType::EnumOrdinal(_) => {}
                FieldType::Composite(nested) => {
                    nested.validate().map_err(|e| e.in_field(field.name))?;
                }
                FieldType::Unsupported(type_name) => {
                    return Err(Error::unsupported(field.name, type_name));
                }
            }
        }
        Ok(())
    }

    /// Returns the encoded size of the fields if no field is variable-length.
    ///
    /// The top-level version tag is not included.
    #[must_use]
    pub fn fields_fixed_len(&self, nested: NestedVersioning) -> Option<usize> {
        self.encoded_fields()
            .map(|f| f.field_type.fixed_len(nested))
            .sum()
    }

    /// Returns the smallest encoded size of the fields.
    #[must_use]
    pub fn fields_min_len(&self, nested: NestedVersioning) -> usize {
        self.encoded_fields()
            .map(|f| f.field_type.min_len(nested))
            .sum()
    }
}

/// Description of an enum used as a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Enum type name.
    pub name: &'static str,
    /// Variant names in declaration order; the index is the ordinal.
    pub variants: &'static [&'static str],
}

impl EnumDescriptor {
    /// Returns the variant name for an ordinal.
    #[must_use]
    pub fn variant_name(&self, ordinal: usize) -> Option<&'static str> {
        self.variants.get(ordinal).copied()
    }
}
