//! Codec configuration.

use crate::codec::BinaryCodec;

/// Default buffer capacity used by [`BinaryCodec::serialize`].
pub const DEFAULT_BUFFER_CAPACITY: usize = 65535;

/// Size of the version tag in bytes.
pub const VERSION_TAG_LEN: usize = 2;

/// How nested composite fields carry version tags.
///
/// Writer and reader must agree on the policy; the stream does not record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NestedVersioning {
    /// Every composite writes and checks its own version tag before its
    /// fields, the same layout as a top-level record.
    #[default]
    EveryLevel,
    /// Only the outermost record carries a version tag; composites are
    /// flattened into the parent stream with no prefix.
    TopLevelOnly,
}

impl NestedVersioning {
    /// Returns the number of prefix bytes a nested composite carries.
    #[must_use]
    pub const fn prefix_len(self) -> usize {
        match self {
            Self::EveryLevel => VERSION_TAG_LEN,
            Self::TopLevelOnly => 0,
        }
    }
}

/// Configuration shared by every operation of a [`BinaryCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Capacity of buffers allocated by `serialize`.
    pub buffer_capacity: usize,
    /// Version tag policy for composite fields.
    pub nested_versioning: NestedVersioning,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            nested_versioning: NestedVersioning::default(),
        }
    }
}

/// Builder for configuring and creating a codec.
#[derive(Debug, Clone, Default)]
pub struct CodecBuilder {
    config: CodecConfig,
}

impl CodecBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capacity of buffers allocated by `serialize`.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    /// Sets the version tag policy for composite fields.
    #[must_use]
    pub fn nested_versioning(mut self, policy: NestedVersioning) -> Self {
        self.config.nested_versioning = policy;
        self
    }

    /// Builds the codec.
    #[must_use]
    pub fn build(self) -> BinaryCodec {
        BinaryCodec::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.buffer_capacity, 65535);
        assert_eq!(config.nested_versioning, NestedVersioning::EveryLevel);
    }

    #[test]
    fn test_prefix_len() {
        assert_eq!(NestedVersioning::EveryLevel.prefix_len(), 2);
        assert_eq!(NestedVersioning::TopLevelOnly.prefix_len(), 0);
    }

    #[test]
    fn test_builder() {
        let codec = CodecBuilder::new()
            .buffer_capacity(128)
            .nested_versioning(NestedVersioning::TopLevelOnly)
            .build();
        assert_eq!(codec.config().buffer_capacity, 128);
        assert_eq!(
            codec.config().nested_versioning,
            NestedVersioning::TopLevelOnly
        );
    }
}
