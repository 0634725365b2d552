use crate::data_structures::BitField;
use rand::prelude::SliceRandom;
use rand::thread_rng;

#[test]
pub fn set_and_get() {
	let mut bits = BitField::new();
	assert!(!bits.get(100), "Bits past the end should read as unset");

	bits.set(3, true);
	bits.set(40, true);
	assert!(bits.get(3));
	assert!(bits.get(40));
	assert!(!bits.get(4));
	assert_eq!(bits.capacity(), 64);

	bits.set(3, false);
	assert!(!bits.get(3));
	assert_eq!(bits.count_ones(), 1);
}

#[test]
pub fn iterate_set_bits_in_order() {
	let mut indices = vec![0, 1, 31, 32, 33, 63, 64, 100, 127];
	let mut bits = BitField::with_capacity(128);

	indices.shuffle(&mut thread_rng());
	for i in indices.iter() {
		bits.set(*i, true);
	}

	indices.sort();
	assert_eq!(bits.iter_ones().collect::<Vec<_>>(), indices);
	assert_eq!(bits.count_ones(), indices.len());
}

#[test]
pub fn first_unset_respects_limit() {
	let mut bits = BitField::with_capacity(40);
	for i in 0..40 {
		bits.set(i, true);
	}

	assert_eq!(bits.first_unset(40), None);
	assert_eq!(bits.first_unset(41), Some(40));

	bits.set(33, false);
	assert_eq!(bits.first_unset(40), Some(33));
	assert_eq!(bits.first_unset(33), None);
	assert_eq!(BitField::new().first_unset(1), Some(0));
	assert_eq!(BitField::new().first_unset(0), None);
}

#[test]
pub fn truncate_drops_high_bits() {
	let mut bits = BitField::with_capacity(64);
	bits.set(5, true);
	bits.set(20, true);
	bits.set(50, true);

	bits.truncate(10);
	assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![5]);

	bits.ensure_capacity(64);
	assert!(!bits.get(20), "Truncated bits must not come back when growing again");
	assert!(!bits.get(50));
}
