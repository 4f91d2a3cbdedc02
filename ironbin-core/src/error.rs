//! Error types for IronBin buffer and codec operations.

use thiserror::Error;

/// Core error type for IronBin operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A buffer operation would touch bytes outside the buffer capacity.
    #[error("out of bounds: {len} bytes at offset {offset} exceed capacity {capacity}")]
    OutOfBounds {
        /// Offset of the first byte of the requested range.
        offset: usize,
        /// Length of the requested range in bytes.
        len: usize,
        /// Capacity of the buffer in bytes.
        capacity: usize,
    },

    /// The version tag in the stream does not match the target schema.
    #[error("version mismatch for '{type_name}': expected {expected}, found {actual}")]
    VersionMismatch {
        /// Name of the type being decoded.
        type_name: &'static str,
        /// Version declared by the target schema.
        expected: i16,
        /// Version read from the stream.
        actual: i16,
    },

    /// A field's declared type has no encoding rule.
    #[error("unsupported type '{type_name}' for field '{field}'")]
    UnsupportedType {
        /// Field name.
        field: &'static str,
        /// Declared type of the field.
        type_name: &'static str,
    },

    /// The type is excluded from binary serialization as a whole.
    #[error("type '{type_name}' is excluded from binary serialization")]
    Excluded {
        /// Name of the excluded type.
        type_name: &'static str,
    },

    /// The target type could not be constructed before decoding.
    #[error("cannot instantiate '{type_name}': {reason}")]
    Instantiation {
        /// Name of the type.
        type_name: &'static str,
        /// Why construction failed.
        reason: String,
    },

    /// A string length prefix is negative.
    #[error("negative string length {length} at offset {offset}")]
    NegativeLength {
        /// Offset of the length prefix.
        offset: usize,
        /// Length value read from the stream.
        length: i32,
    },

    /// A string payload is not valid UTF-8.
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 {
        /// Byte offset of the first invalid byte.
        offset: usize,
    },

    /// An enum ordinal does not fit the 16-bit wire representation.
    #[error("enum ordinal {ordinal} does not fit in 16 bits")]
    OrdinalOverflow {
        /// Zero-based ordinal of the variant.
        ordinal: usize,
    },

    /// An error raised while encoding or decoding a specific field.
    #[error("field '{field}': {source}")]
    Field {
        /// Field name.
        field: &'static str,
        /// Underlying error.
        #[source]
        source: Box<Error>,
    },
}

/// Flat classification of [`Error`], independent of field context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Buffer range violation.
    Bounds,
    /// Version tag mismatch.
    VersionMismatch,
    /// No encoding rule for a declared type.
    UnsupportedType,
    /// Type excluded from serialization.
    Excluded,
    /// Target type could not be constructed.
    Instantiation,
    /// Malformed payload (negative length, bad UTF-8, ordinal overflow).
    Malformed,
}

impl Error {
    /// Creates an unsupported type error.
    pub fn unsupported(field: &'static str, type_name: &'static str) -> Self {
        Self::UnsupportedType { field, type_name }
    }

    /// Creates an exclusion error.
    pub fn excluded(type_name: &'static str) -> Self {
        Self::Excluded { type_name }
    }

    /// Creates an instantiation error.
    pub fn instantiation(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Instantiation {
            type_name,
            reason: reason.into(),
        }
    }

    /// Wraps this error with the name of the field it was raised in.
    #[must_use]
    pub fn in_field(self, field: &'static str) -> Self {
        Self::Field {
            field,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping field context.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the dotted field path the error was raised at, if any.
    #[must_use]
    pub fn field_path(&self) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = self;
        while let Self::Field { field, source } = current {
            segments.push(*field);
            current = source.as_ref();
        }
        (!segments.is_empty()).then(|| segments.join("."))
    }

    /// Returns the classification of the root cause.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            Self::OutOfBounds { .. } => ErrorKind::Bounds,
            Self::VersionMismatch { .. } => ErrorKind::VersionMismatch,
            Self::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Self::Excluded { .. } => ErrorKind::Excluded,
            Self::Instantiation { .. } => ErrorKind::Instantiation,
            Self::NegativeLength { .. } | Self::InvalidUtf8 { .. } | Self::OrdinalOverflow { .. } => {
                ErrorKind::Malformed
            }
            // root_cause never returns a Field wrapper
            Self::Field { .. } => ErrorKind::Malformed,
        }
    }
}

/// Result type alias for IronBin operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_display() {
        let err = Error::OutOfBounds {
            offset: 60,
            len: 8,
            capacity: 64,
        };
        let msg = err.to_string();
        assert!(msg.contains("60"));
        assert!(msg.contains("64"));
        assert!(msg.contains("out of bounds"));
    }

    #[test]
    fn test_version_mismatch_carries_both_values() {
        let err = Error::VersionMismatch {
            type_name: "Player",
            expected: 2,
            actual: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected 2"));
        assert!(msg.contains("found 1"));
        assert!(msg.contains("Player"));
    }

    #[test]
    fn test_field_context_nesting() {
        let err = Error::OutOfBounds {
            offset: 0,
            len: 4,
            capacity: 2,
        }
        .in_field("id")
        .in_field("owner");

        assert_eq!(err.field_path().as_deref(), Some("owner.id"));
        assert_eq!(err.kind(), ErrorKind::Bounds);
        assert!(matches!(err.root_cause(), Error::OutOfBounds { .. }));
        assert!(err.to_string().starts_with("field 'owner'"));
    }

    #[test]
    fn test_field_path_absent_without_context() {
        let err = Error::excluded("Secret");
        assert_eq!(err.field_path(), None);
        assert_eq!(err.kind(), ErrorKind::Excluded);
    }

    #[test]
    fn test_constructors() {
        assert_eq!(
            Error::unsupported("tags", "Vec"),
            Error::UnsupportedType {
                field: "tags",
                type_name: "Vec"
            }
        );
        let err = Error::instantiation("Player", "no default constructor");
        assert_eq!(err.kind(), ErrorKind::Instantiation);
        assert!(err.to_string().contains("no default constructor"));
    }

    #[test]
    fn test_malformed_kinds() {
        assert_eq!(
            Error::NegativeLength {
                offset: 0,
                length: -1
            }
            .kind(),
            ErrorKind::Malformed
        );
        assert_eq!(Error::InvalidUtf8 { offset: 3 }.kind(), ErrorKind::Malformed);
        assert_eq!(
            Error::OrdinalOverflow { ordinal: 40_000 }.kind(),
            ErrorKind::Malformed
        );
    }
}
