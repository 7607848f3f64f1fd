//! Seeded 32-bit element hashing (MurmurHash3 x86_32).

use std::io::Cursor;

/// 32-bit MurmurHash3 digest of `bytes` under `seed`, as little-endian bytes.
#[inline]
pub fn seeded_hash32(bytes: &[u8], seed: u32) -> [u8; 4] {
    // reading from an in-memory cursor cannot fail
    let h = murmur3::murmur3_32(&mut Cursor::new(bytes), seed).unwrap_or(0);
    h.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(u32::from_le_bytes(seeded_hash32(b"", 0)), 0);
        assert_eq!(u32::from_le_bytes(seeded_hash32(b"", 1)), 0x514E_28B7);
        assert_eq!(u32::from_le_bytes(seeded_hash32(b"hello", 0)), 0x248B_FA47);
    }

    #[test]
    fn seed_changes_digest() {
        let a = seeded_hash32(b"5d41402abc4b2a76b9719d911017c592", 0);
        let b = seeded_hash32(b"5d41402abc4b2a76b9719d911017c592", 1);
        assert_ne!(a, b);
        assert_eq!(a, seeded_hash32(b"5d41402abc4b2a76b9719d911017c592", 0));
    }
}
