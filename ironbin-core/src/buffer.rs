//! Buffer traits and the cursor buffer used by the codec.
//!
//! This module provides:
//! - [`ReadBuffer`] trait for offset-addressed, bounds-checked reads
//! - [`WriteBuffer`] trait for offset-addressed, bounds-checked writes
//! - [`ByteCursorBuffer`], a fixed-capacity region with independent read and
//!   write cursors
//! - [`BufferPool`] for reusing cursor buffers across workers
//!
//! All multi-byte integers are big-endian.

use crate::error::{Error, Result};
use crate::types::BinaryEnum;
use bytes::Bytes;
use crossbeam_queue::ArrayQueue;
use std::sync::Arc;

/// Size of the `i32` byte-count prefix in front of every string.
pub const UTF8_PREFIX_LEN: usize = 4;

/// Ordinal written for an absent enum value. Reads back as absent.
pub const ABSENT_ORDINAL: i16 = -1;

/// Maps a raw wire ordinal to an enum variant, `None` when out of range.
#[inline]
pub(crate) fn variant_for<E: BinaryEnum>(raw: i16) -> Option<E> {
    usize::try_from(raw).ok().and_then(E::from_ordinal)
}

/// Converts a variant to its 16-bit wire ordinal.
#[inline]
pub(crate) fn ordinal_of<E: BinaryEnum>(value: E) -> Result<i16> {
    let ordinal = value.ordinal();
    i16::try_from(ordinal).map_err(|_| Error::OrdinalOverflow { ordinal })
}

/// Trait for read-only buffer access with bounds-checked primitive reads.
///
/// Every method takes an explicit offset and fails with
/// [`Error::OutOfBounds`] if the requested range does not fit.
pub trait ReadBuffer {
    /// Returns the buffer as a byte slice.
    fn as_slice(&self) -> &[u8];

    /// Returns the length of the buffer in bytes.
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that `len` bytes starting at `offset` lie inside the buffer.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the range exceeds the buffer.
    #[inline]
    fn check_range(&self, offset: usize, len: usize) -> Result<()> {
        let capacity = self.len();
        match offset.checked_add(len) {
            Some(end) if end <= capacity => Ok(()),
            _ => Err(Error::OutOfBounds {
                offset,
                len,
                capacity,
            }),
        }
    }

    /// Returns a slice of bytes at the given offset and length.
    ///
    /// # Arguments
    /// * `offset` - Byte offset to start from
    /// * `len` - Number of bytes to read
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the range exceeds the buffer.
    #[inline]
    fn get_bytes(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.check_range(offset, len)?;
        Ok(&self.as_slice()[offset..offset + len])
    }

    /// Reads a u8 at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the offset is past the end.
    #[inline]
    fn get_u8(&self, offset: usize) -> Result<u8> {
        self.check_range(offset, 1)?;
        Ok(self.as_slice()[offset])
    }

    /// Reads an i16 in big-endian at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the range exceeds the buffer.
    #[inline]
    fn get_i16_be(&self, offset: usize) -> Result<i16> {
        let bytes = self.get_bytes(offset, 2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Reads an i32 in big-endian at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the range exceeds the buffer.
    #[inline]
    fn get_i32_be(&self, offset: usize) -> Result<i32> {
        let bytes = self.get_bytes(offset, 4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a length-prefixed UTF-8 string at the given offset.
    ///
    /// The string occupies [`UTF8_PREFIX_LEN`] bytes of big-endian byte count
    /// followed by that many bytes of UTF-8.
    ///
    /// # Errors
    /// Returns [`Error::NegativeLength`] for a negative prefix,
    /// [`Error::OutOfBounds`] if the payload runs past the buffer and
    /// [`Error::InvalidUtf8`] if the payload does not decode.
    fn get_utf8(&self, offset: usize) -> Result<String> {
        let length = self.get_i32_be(offset)?;
        let len = usize::try_from(length).map_err(|_| Error::NegativeLength { offset, length })?;
        let start = offset + UTF8_PREFIX_LEN;
        let bytes = self.get_bytes(start, len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(e) => Err(Error::InvalidUtf8 {
                offset: start + e.valid_up_to(),
            }),
        }
    }

    /// Reads an enum ordinal at the given offset.
    ///
    /// Returns `Ok(None)` when the ordinal has no matching variant.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the range exceeds the buffer.
    #[inline]
    fn get_enum_ordinal<E: BinaryEnum>(&self, offset: usize) -> Result<Option<E>> {
        Ok(variant_for(self.get_i16_be(offset)?))
    }
}

/// Trait for read-write buffer access with bounds-checked primitive writes.
///
/// The full range of a write is checked before any byte is modified.
pub trait WriteBuffer: ReadBuffer {
    /// Returns the buffer as a mutable byte slice.
    fn as_mut_slice(&mut self) -> &mut [u8];

    /// Writes a byte slice at the given offset.
    ///
    /// # Arguments
    /// * `offset` - Byte offset to write to
    /// * `src` - Source bytes to copy
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the range exceeds the buffer.
    #[inline]
    fn put_bytes(&mut self, offset: usize, src: &[u8]) -> Result<()> {
        self.check_range(offset, src.len())?;
        self.as_mut_slice()[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }

    /// Writes a u8 at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the offset is past the end.
    #[inline]
    fn put_u8(&mut self, offset: usize, value: u8) -> Result<()> {
        self.put_bytes(offset, &[value])
    }

    /// Writes an i16 in big-endian at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the range exceeds the buffer.
    #[inline]
    fn put_i16_be(&mut self, offset: usize, value: i16) -> Result<()> {
        self.put_bytes(offset, &value.to_be_bytes())
    }

    /// Writes an i32 in big-endian at the given offset.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the range exceeds the buffer.
    #[inline]
    fn put_i32_be(&mut self, offset: usize, value: i32) -> Result<()> {
        self.put_bytes(offset, &value.to_be_bytes())
    }

    /// Writes a length-prefixed UTF-8 string at the given offset.
    ///
    /// Returns the number of bytes written (prefix included).
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if prefix and payload do not both fit;
    /// nothing is written in that case.
    fn put_utf8(&mut self, offset: usize, value: &str) -> Result<usize> {
        let bytes = value.as_bytes();
        let total = UTF8_PREFIX_LEN.saturating_add(bytes.len());
        self.check_range(offset, total)?;
        let length = i32::try_from(bytes.len()).map_err(|_| Error::OutOfBounds {
            offset,
            len: total,
            capacity: self.len(),
        })?;
        self.put_i32_be(offset, length)?;
        self.put_bytes(offset + UTF8_PREFIX_LEN, bytes)?;
        Ok(total)
    }

    /// Writes the zero-based ordinal of an enum variant as an i16.
    ///
    /// # Errors
    /// Returns [`Error::OrdinalOverflow`] if the ordinal exceeds `i16::MAX`,
    /// or [`Error::OutOfBounds`] if the range exceeds the buffer.
    #[inline]
    fn put_enum_ordinal<E: BinaryEnum>(&mut self, offset: usize, value: E) -> Result<()> {
        let ordinal = ordinal_of(value)?;
        self.put_i16_be(offset, ordinal)
    }

    /// Fills a range with zeros.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the range exceeds the buffer.
    #[inline]
    fn zero(&mut self, offset: usize, len: usize) -> Result<()> {
        self.check_range(offset, len)?;
        self.as_mut_slice()[offset..offset + len].fill(0);
        Ok(())
    }
}

impl ReadBuffer for [u8] {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl WriteBuffer for [u8] {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }
}

impl ReadBuffer for Vec<u8> {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl WriteBuffer for Vec<u8> {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }
}

/// Fixed-capacity byte region with independent read and write cursors.
///
/// Cursor-advancing operations (`write_*` / `read_*`) move their cursor by
/// exactly the number of bytes produced or consumed. The offset-addressed
/// forms come from [`ReadBuffer`] and [`WriteBuffer`] and never move either
/// cursor. Both cursors always stay within `[0, capacity]`: an operation that
/// would cross the capacity fails with [`Error::OutOfBounds`] and leaves the
/// cursor where it was.
///
/// # Example
/// ```
/// use ironbin_core::buffer::ByteCursorBuffer;
///
/// let mut buf = ByteCursorBuffer::new(16);
/// buf.write_i16(3)?;
/// buf.write_utf8("A")?;
/// assert_eq!(buf.written(), &[0x00, 0x03, 0x00, 0x00, 0x00, 0x01, b'A']);
///
/// assert_eq!(buf.read_i16()?, 3);
/// assert_eq!(buf.read_utf8()?, "A");
/// # Ok::<(), ironbin_core::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ByteCursorBuffer {
    data: Box<[u8]>,
    read_pos: usize,
    write_pos: usize,
}

impl ByteCursorBuffer {
    /// Creates a zeroed buffer with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::wrap(vec![0u8; capacity])
    }

    /// Wraps existing storage. Both cursors start at 0.
    #[must_use]
    pub fn wrap(data: Vec<u8>) -> Self {
        Self {
            data: data.into_boxed_slice(),
            read_pos: 0,
            write_pos: 0,
        }
    }

    /// Copies `bytes` into a new buffer positioned for reading.
    ///
    /// The write cursor sits at the end, so [`Self::written`] returns the
    /// copied bytes.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut buf = Self::wrap(bytes.to_vec());
        buf.write_pos = bytes.len();
        buf
    }

    /// Returns the fixed capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    // Bytes

    /// Writes raw bytes at the write cursor and advances it.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the bytes do not fit.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.put_bytes(self.write_pos, data)?;
        self.write_pos += data.len();
        Ok(())
    }

    /// Reads `count` raw bytes at the read cursor and advances it.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if fewer than `count` bytes remain.
    pub fn read_bytes(&mut self, count: usize) -> Result<&[u8]> {
        let start = self.read_pos;
        self.check_range(start, count)?;
        self.read_pos += count;
        Ok(&self.data[start..start + count])
    }

    // Integers

    /// Writes an i16 at the write cursor and advances it by 2.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the value does not fit.
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.put_i16_be(self.write_pos, value)?;
        self.write_pos += 2;
        Ok(())
    }

    /// Reads an i16 at the read cursor and advances it by 2.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if fewer than 2 bytes remain.
    pub fn read_i16(&mut self) -> Result<i16> {
        let value = self.get_i16_be(self.read_pos)?;
        self.read_pos += 2;
        Ok(value)
    }

    /// Writes an i32 at the write cursor and advances it by 4.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the value does not fit.
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.put_i32_be(self.write_pos, value)?;
        self.write_pos += 4;
        Ok(())
    }

    /// Reads an i32 at the read cursor and advances it by 4.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if fewer than 4 bytes remain.
    pub fn read_i32(&mut self) -> Result<i32> {
        let value = self.get_i32_be(self.read_pos)?;
        self.read_pos += 4;
        Ok(value)
    }

    // Strings

    /// Writes a length-prefixed UTF-8 string at the write cursor.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if prefix and payload do not both fit.
    /// The cursor does not move and no byte is written in that case.
    pub fn write_utf8(&mut self, value: &str) -> Result<()> {
        let written = self.put_utf8(self.write_pos, value)?;
        self.write_pos += written;
        Ok(())
    }

    /// Reads a length-prefixed UTF-8 string at the read cursor.
    ///
    /// # Errors
    /// See [`ReadBuffer::get_utf8`].
    pub fn read_utf8(&mut self) -> Result<String> {
        let value = self.get_utf8(self.read_pos)?;
        self.read_pos += UTF8_PREFIX_LEN + value.len();
        Ok(value)
    }

    // Enums

    /// Writes the ordinal of an enum variant at the write cursor.
    ///
    /// # Errors
    /// Returns [`Error::OrdinalOverflow`] or [`Error::OutOfBounds`].
    pub fn write_enum_ordinal<E: BinaryEnum>(&mut self, value: E) -> Result<()> {
        self.put_enum_ordinal(self.write_pos, value)?;
        self.write_pos += 2;
        Ok(())
    }

    /// Reads an enum ordinal at the read cursor.
    ///
    /// An ordinal outside the variant list of `E` yields `Ok(None)`; the two
    /// bytes are consumed either way.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if fewer than 2 bytes remain.
    pub fn read_enum_ordinal<E: BinaryEnum>(&mut self) -> Result<Option<E>> {
        Ok(variant_for(self.read_i16()?))
    }

    // Cursors

    /// Rewinds the read cursor to 0 without touching storage.
    pub fn reset_read_cursor(&mut self) {
        self.read_pos = 0;
    }

    /// Rewinds the write cursor to 0 without touching storage.
    pub fn reset_write_cursor(&mut self) {
        self.write_pos = 0;
    }

    /// Zeroes storage and rewinds both cursors.
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.read_pos = 0;
        self.write_pos = 0;
    }

    /// Returns the write cursor position.
    #[must_use]
    pub const fn write_cursor_position(&self) -> usize {
        self.write_pos
    }

    /// Returns the read cursor position.
    #[must_use]
    pub const fn read_cursor_position(&self) -> usize {
        self.read_pos
    }

    /// Returns the number of bytes between the write cursor and capacity.
    #[must_use]
    pub fn remaining_write(&self) -> usize {
        self.data.len() - self.write_pos
    }

    /// Returns the number of bytes between the read cursor and capacity.
    #[must_use]
    pub fn remaining_read(&self) -> usize {
        self.data.len() - self.read_pos
    }

    // Extraction

    /// Returns the bytes before the write cursor.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.data[..self.write_pos]
    }

    /// Returns a copy of the full backing storage, `capacity` bytes long,
    /// regardless of how much was written.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.to_vec()
    }

    /// Consumes the buffer and returns the full backing storage.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data.into_vec()
    }

    /// Consumes the buffer and returns the written prefix for transport.
    #[must_use]
    pub fn freeze(self) -> Bytes {
        let len = self.write_pos;
        let mut bytes = Bytes::from(self.data.into_vec());
        bytes.truncate(len);
        bytes
    }
}

impl ReadBuffer for ByteCursorBuffer {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.data.len()
    }
}

impl WriteBuffer for ByteCursorBuffer {
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl AsRef<[u8]> for ByteCursorBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for ByteCursorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteCursorBuffer")
            .field("capacity", &self.data.len())
            .field("read_cursor", &self.read_pos)
            .field("write_cursor", &self.write_pos)
            .finish()
    }
}

/// Pool of reusable cursor buffers of one capacity.
///
/// The pool uses a lock-free queue so each worker can take a buffer, own it
/// exclusively for one operation, and hand it back without contention.
pub struct BufferPool {
    buffers: Arc<ArrayQueue<ByteCursorBuffer>>,
    slots: usize,
    buffer_capacity: usize,
}

impl BufferPool {
    /// Creates a pool pre-filled with `slots` buffers of `buffer_capacity`
    /// bytes each.
    ///
    /// # Panics
    /// Panics if `slots` is zero.
    #[must_use]
    pub fn new(slots: usize, buffer_capacity: usize) -> Self {
        let buffers = ArrayQueue::new(slots);
        for _ in 0..slots {
            let _ = buffers.push(ByteCursorBuffer::new(buffer_capacity));
        }
        Self {
            buffers: Arc::new(buffers),
            slots,
            buffer_capacity,
        }
    }

    /// Acquires a buffer from the pool.
    ///
    /// Returns `None` if the pool is empty.
    #[inline]
    #[must_use]
    pub fn acquire(&self) -> Option<ByteCursorBuffer> {
        self.buffers.pop()
    }

    /// Acquires a pooled buffer, allocating a fresh one if the pool is empty.
    #[must_use]
    pub fn acquire_or_new(&self) -> ByteCursorBuffer {
        self.acquire().unwrap_or_else(|| {
            tracing::debug!(
                "Buffer pool exhausted, allocating {} bytes",
                self.buffer_capacity
            );
            ByteCursorBuffer::new(self.buffer_capacity)
        })
    }

    /// Releases a buffer back to the pool.
    ///
    /// The buffer is cleared before it is queued. Buffers of a different
    /// capacity, or arriving while the pool is full, are dropped.
    pub fn release(&self, mut buffer: ByteCursorBuffer) {
        if buffer.capacity() != self.buffer_capacity {
            tracing::debug!(
                "Dropping buffer of {} bytes released to a {} byte pool",
                buffer.capacity(),
                self.buffer_capacity
            );
            return;
        }
        buffer.clear();
        let _ = self.buffers.push(buffer);
    }

    /// Returns the number of slots in the pool.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Returns the capacity of each pooled buffer.
    #[must_use]
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Returns the number of buffers currently available.
    #[must_use]
    pub fn available(&self) -> usize {
        self.buffers.len()
    }
}

impl Clone for BufferPool {
    fn clone(&self) -> Self {
        Self {
            buffers: Arc::clone(&self.buffers),
            slots: self.slots,
            buffer_capacity: self.buffer_capacity,
        }
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPool")
            .field("slots", &self.slots)
            .field("buffer_capacity", &self.buffer_capacity)
            .field("available", &self.buffers.len())
            .finish()
    }
}
