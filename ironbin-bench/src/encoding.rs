//! Encoding/decoding benchmark helpers.

use ironbin::{BinaryCodec, BinarySerialize, ByteCursorBuffer};
use std::time::{Duration, Instant};

/// Serializes `value` `iterations` times into one reused buffer.
///
/// Returns the elapsed time, or the first encoding error.
///
/// # Errors
/// Returns the error raised by [`BinaryCodec::serialize_into`].
pub fn benchmark_encode<T: BinarySerialize>(
    codec: &BinaryCodec,
    value: &T,
    iterations: usize,
) -> ironbin::Result<Duration> {
    let mut buffer = ByteCursorBuffer::new(codec.encoded_len(value));
    let start = Instant::now();

    for _ in 0..iterations {
        buffer.reset_write_cursor();
        codec.serialize_into(value, &mut buffer)?;
    }

    Ok(start.elapsed())
}

/// Deserializes `data` `iterations` times.
///
/// # Errors
/// Returns the error raised by [`BinaryCodec::deserialize`].
pub fn benchmark_decode<T: BinarySerialize>(
    codec: &BinaryCodec,
    data: &[u8],
    iterations: usize,
) -> ironbin::Result<Duration> {
    let mut buffer = ByteCursorBuffer::from_slice(data);
    let start = Instant::now();

    for _ in 0..iterations {
        buffer.reset_read_cursor();
        let _: T = codec.deserialize(&mut buffer)?;
    }

    Ok(start.elapsed())
}
