//! Bloom filter over a [`BitField`], with the padded little-endian file format.
//!
//! File layout (LE):
//!   size[8]       + pad[8]
//!   hash_count[8] + pad[8]
//!   bits[ceil(size/8)]

use crate::bitfield::BitField;
use crate::consts::{HDR_SIZE, SIZE_UNITS};
use crate::errors::{MddError, Result};
use crate::hash::seeded_hash32;
use crate::storage::FilterStore;
use crate::utils::{byte_len, read_padded_u64, write_padded_u64};
use std::f64::consts::LN_2;
use std::io::{Read, Write};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct BloomFilter {
    size: i32,
    hash_count: u32,
    filter: BitField,
    byte_size: usize,
    byte_size_human: String,
}

/// Expected accuracy, in percent, of a filter holding `elements` items.
pub fn accuracy(size: u64, hash_count: u32, elements: u64) -> f64 {
    let s = size as f64;
    let k = hash_count as f64;
    let n = elements as f64;
    let fp = (1.0 - (1.0 - 1.0 / s).powf(k * n)).powf(k);
    debug!(false_positive = fp, "estimated");
    100.0 - fp * 100.0
}

/// `byte_size` in the largest base-1024 unit not exceeding it, e.g. `4.0bytes`, `2.0Kb`.
pub fn byte_size_human(byte_size: usize) -> String {
    let mut order = 0usize;
    if byte_size > 0 {
        order = ((byte_size as f64).log2() / 10.0).floor() as usize;
        order = order.min(SIZE_UNITS.len() - 1);
    }
    let scaled = byte_size as f64 / 1024f64.powi(order as i32);
    format!("{:.1}{}", scaled, SIZE_UNITS[order])
}

fn ideal_size(expected_items: u64, fp_rate: f64) -> f64 {
    (-(expected_items as f64 * fp_rate.ln()) / (LN_2 * LN_2)).trunc()
}

fn ideal_hash_count(size: i32, expected_items: u64) -> u32 {
    ((size as f64 / expected_items as f64) * LN_2).floor() as u32
}

impl BloomFilter {
    /// Sizes a filter for `expected_items` elements at false-positive rate `fp_rate`.
    pub fn new(expected_items: u64, fp_rate: f64) -> Result<Self> {
        if expected_items == 0 {
            return Err(MddError::InvalidExpectedItems(expected_items));
        }
        if !(fp_rate > 0.0 && fp_rate < 1.0) {
            return Err(MddError::InvalidFpRate(fp_rate));
        }
        let ideal = ideal_size(expected_items, fp_rate);
        if !(1.0..=i32::MAX as f64).contains(&ideal) {
            return Err(MddError::InvalidSize(ideal as i64));
        }
        let size = ideal as i32;
        let hash_count = ideal_hash_count(size, expected_items).max(1);
        debug!(expected_items, fp_rate, size, hash_count, "sized filter");
        Self::from_parts(size, hash_count, BitField::new(size)?)
    }

    fn from_parts(size: i32, hash_count: u32, filter: BitField) -> Result<Self> {
        let byte_size = byte_len(size as i64);
        if filter.byte_len() != byte_size {
            return Err(MddError::BufferLength { expected: byte_size, got: filter.byte_len() });
        }
        Ok(Self { size, hash_count, filter, byte_size, byte_size_human: byte_size_human(byte_size) })
    }

    #[inline]
    pub fn size(&self) -> i32 { self.size }
    #[inline]
    pub fn hash_count(&self) -> u32 { self.hash_count }
    #[inline]
    pub fn byte_size(&self) -> usize { self.byte_size }
    pub fn byte_size_human(&self) -> &str { &self.byte_size_human }
    pub fn bits(&self) -> &BitField { &self.filter }

    /// Expected accuracy once `elements` items have been added.
    pub fn accuracy(&self, elements: u64) -> f64 {
        accuracy(self.size as u64, self.hash_count, elements)
    }

    /// Bit position for `element` under `seed`: LE u32 digest, truncated remainder by `size`.
    #[inline]
    fn position(&self, element: &[u8], seed: u32) -> i32 {
        let h = u32::from_le_bytes(seeded_hash32(element, seed)) as i64;
        (h % self.size as i64) as i32
    }

    pub fn add(&mut self, element: &str) {
        for seed in 0..self.hash_count {
            let bit = self.position(element.as_bytes(), seed);
            self.filter.set_bit(bit);
        }
    }

    pub fn lookup(&self, element: &str) -> bool {
        (0..self.hash_count).all(|seed| self.filter.get_bit(self.position(element.as_bytes(), seed)))
    }

    /// Writes the header and bit buffer to `w`.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        write_padded_u64(w, self.size as u64)?;
        write_padded_u64(w, self.hash_count as u64)?;
        w.write_all(self.filter.as_bytes())?;
        w.flush()?;
        debug!(bytes = HDR_SIZE + self.byte_size, "saved filter");
        Ok(())
    }

    /// Reads a filter from `r`, replacing this one. On error `self` is unchanged.
    pub fn load<R: Read>(&mut self, r: &mut R) -> Result<()> {
        *self = Self::read_from(r)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let size = read_padded_u64(r, "size")?;
        let hash_count = read_padded_u64(r, "hash_count")?;
        if size == 0 || size > i32::MAX as u64 || hash_count == 0 || hash_count > u32::MAX as u64 {
            return Err(MddError::InvalidHeader { size, hash_count });
        }
        // Sized by the bytes that arrive, not by the header's claim.
        let want = byte_len(size as i64);
        let mut bits = Vec::new();
        r.by_ref().take(want as u64).read_to_end(&mut bits)?;
        if bits.len() < want {
            return Err(MddError::Truncated { field: "bit field" });
        }
        debug!(size, hash_count, "loaded filter");
        Self::from_parts(size as i32, hash_count as u32, BitField::from_bytes(size as i32, bits)?)
    }

    /// Saves under `name`; nothing is published unless the whole filter was written.
    pub fn save_to(&self, store: &dyn FilterStore, name: &str) -> Result<()> {
        let mut w = store.writer(name)?;
        self.save(&mut w)?;
        w.commit()
    }

    pub fn load_from(&mut self, store: &dyn FilterStore, name: &str) -> Result<()> {
        let mut r = store.reader(name)?;
        self.load(&mut r)
    }
}
