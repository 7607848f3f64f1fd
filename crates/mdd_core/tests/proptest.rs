use mdd_core::{BitField, BloomFilter};
use proptest::prelude::*;
use std::io::Cursor;

proptest! {
    #[test]
    fn set_then_get(size in 1i32..2048, seed in any::<u32>()) {
        let mut bf = BitField::new(size).unwrap();
        let p = (seed % size as u32) as i32;
        bf.set_bit(p);
        prop_assert!(bf.get_bit(p));
    }

    #[test]
    fn unset_clears_interior_bits(size in 2i32..2048, seed in any::<u32>()) {
        let mut bf = BitField::new(size).unwrap();
        bf.one();
        let p = 1 + (seed % (size as u32 - 1)) as i32;
        bf.unset_bit(p);
        prop_assert!(!bf.get_bit(p));
    }

    #[test]
    fn no_false_negatives(items in prop::collection::vec("[0-9a-f]{32}", 1..200)) {
        let mut bf = BloomFilter::new(items.len() as u64, 0.01).unwrap();
        for it in &items {
            bf.add(it);
        }
        for it in &items {
            prop_assert!(bf.lookup(it));
        }
    }

    #[test]
    fn round_trip_preserves_answers(
        items in prop::collection::vec("[0-9a-f]{32}", 1..100),
        probes in prop::collection::vec("[0-9a-f]{32}", 0..50),
    ) {
        let mut bf = BloomFilter::new(items.len() as u64, 0.05).unwrap();
        for it in &items {
            bf.add(it);
        }
        let mut raw = Vec::new();
        bf.save(&mut raw).unwrap();
        prop_assert_eq!(raw.len(), 32 + bf.byte_size());

        let loaded = BloomFilter::read_from(&mut Cursor::new(raw)).unwrap();
        prop_assert_eq!(loaded.bits(), bf.bits());
        for p in items.iter().chain(probes.iter()) {
            prop_assert_eq!(loaded.lookup(p), bf.lookup(p));
        }
    }
}
