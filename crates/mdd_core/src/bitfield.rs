//! Fixed-size bit array packed into bytes.
//!
//! Addressing is MSB-first inside each byte and 1-based per block of eight:
//! bit 1 is the high bit of byte 0, bit 8 its low bit, bit 9 the high bit of
//! byte 1. Bit 0 has no block of its own; `set_bit`/`get_bit` wrap it onto the
//! low bit of the final byte. Persisted filters depend on this mapping.

use crate::errors::{MddError, Result};
use crate::utils::byte_len;
use tracing::trace;

/// Location of a bit inside the backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub byte_index: i32,
    pub bit_index: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitField {
    size: i32,
    storage: Vec<u8>,
}

impl BitField {
    /// Zero-filled field of `size` bits.
    pub fn new(size: i32) -> Result<Self> {
        if size < 1 {
            return Err(MddError::InvalidSize(size as i64));
        }
        Ok(Self { size, storage: vec![0u8; byte_len(size as i64)] })
    }

    /// Restores a field from its raw buffer.
    pub fn from_bytes(size: i32, storage: Vec<u8>) -> Result<Self> {
        if size < 1 {
            return Err(MddError::InvalidSize(size as i64));
        }
        let expected = byte_len(size as i64);
        if storage.len() != expected {
            return Err(MddError::BufferLength { expected, got: storage.len() });
        }
        Ok(Self { size, storage })
    }

    #[inline]
    pub fn size(&self) -> i32 { self.size }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] { &self.storage }

    #[inline]
    pub fn byte_len(&self) -> usize { self.storage.len() }

    /// Number of set bits across the whole buffer.
    pub fn count_ones(&self) -> u64 {
        self.storage.iter().map(|b| b.count_ones() as u64).sum()
    }

    /// Byte/bit location of `position`. Position 100 is 4 bits into byte 12.
    pub fn get_pos(&self, position: i32) -> Position {
        let p = position as i64;
        let byte_index = (-((-p).div_euclid(8)) - 1) as i32;
        let raw_bit = position % 8;
        let bit_index = if raw_bit == 0 { 0 } else { 8 - raw_bit };
        Position { byte_index, bit_index }
    }

    /// Sets the bit at `position`. Negative positions count back from the end.
    ///
    /// # Panics
    /// If `position` lies beyond the last byte of the buffer.
    pub fn set_bit(&mut self, position: i32) {
        let (idx, mask) = self.locate(position);
        trace!(position, byte = idx, "set bit");
        self.storage[idx] |= mask;
    }

    /// Clears the bit at `position`.
    ///
    /// Unlike `set_bit` and `get_bit` this neither normalizes negative
    /// positions nor wraps position 0 onto the final byte.
    ///
    /// # Panics
    /// If the computed byte lies outside the buffer, which includes position 0.
    pub fn unset_bit(&mut self, position: i32) {
        let pos = self.get_pos(position);
        let idx = self.slot(pos.byte_index);
        self.storage[idx] &= !mask(pos.bit_index);
    }

    /// # Panics
    /// If `position` lies beyond the last byte of the buffer.
    pub fn get_bit(&self, position: i32) -> bool {
        let (idx, mask) = self.locate(position);
        self.storage[idx] & mask != 0
    }

    pub fn zero(&mut self) { self.storage.fill(0x00); }

    pub fn one(&mut self) { self.storage.fill(0xFF); }

    fn locate(&self, mut position: i32) -> (usize, u8) {
        if position < 0 {
            position = position.rem_euclid(self.size);
        }
        let pos = self.get_pos(position);
        let mut byte_index = pos.byte_index;
        if byte_index == -1 {
            byte_index += self.storage.len() as i32;
        }
        (self.slot(byte_index), mask(pos.bit_index))
    }

    fn slot(&self, byte_index: i32) -> usize {
        match usize::try_from(byte_index) {
            Ok(i) if i < self.storage.len() => i,
            _ => panic!(
                "bit field byte index {byte_index} out of range for {} bytes",
                self.storage.len()
            ),
        }
    }
}

#[inline]
fn mask(bit_index: i32) -> u8 {
    (1u32.checked_shl(bit_index as u32).unwrap_or(0) & 0xFF) as u8
}
