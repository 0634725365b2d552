use crate::data_structures::SlotAllocator;
use crate::error::HandleError;
use crate::handles::Handle;
use rand::prelude::SliceRandom;
use rand::{thread_rng, Rng};
use std::cell::Cell;
use std::rc::Rc;

struct Tracked {
	value: u32,
	drops: Rc<Cell<usize>>,
}

impl Tracked {
	fn new(value: u32, drops: &Rc<Cell<usize>>) -> Self {
		Self {
			value,
			drops: drops.clone(),
		}
	}
}

impl Drop for Tracked {
	fn drop(&mut self) {
		self.drops.set(self.drops.get() + 1);
	}
}

#[test]
pub fn reserve_returns_first_free_slot() {
	let mut allocator = SlotAllocator::<u32>::with_capacity(4);
	assert_eq!(allocator.reserve(), 0);
	assert_eq!(allocator.reserve(), 1);
	assert_eq!(allocator.reserve(), 2);

	allocator.release(1);
	assert_eq!(allocator.reserve(), 1, "Released slots should be reused lowest first");
	assert_eq!(allocator.reserve(), 3);
	assert!(allocator.is_full());
	assert_eq!(allocator.try_reserve(), None);
}

#[test]
pub fn reserved_slot_is_not_readable_until_initialized() {
	let mut allocator = SlotAllocator::<u32>::with_capacity(2);
	let index = allocator.reserve();

	assert!(allocator.occupied(index));
	assert!(!allocator.is_initialized(index));
	assert_eq!(allocator.get(index), None);
	assert_eq!(allocator.handle(index), None);

	*allocator.initialize(index, 7) += 1;
	assert_eq!(allocator.get(index), Some(&8));
	assert!(allocator.handle(index).is_some());
}

#[test]
#[should_panic(expected = "must be reserved")]
pub fn initialize_requires_reservation() {
	let mut allocator = SlotAllocator::<u32>::with_capacity(2);
	allocator.initialize(0, 1);
}

#[test]
#[should_panic(expected = "already initialized")]
pub fn initialize_twice_panics() {
	let mut allocator = SlotAllocator::<u32>::with_capacity(2);
	let index = allocator.reserve();
	allocator.initialize(index, 1);
	allocator.initialize(index, 2);
}

#[test]
#[should_panic(expected = "at capacity")]
pub fn reserve_past_capacity_panics() {
	let mut allocator = SlotAllocator::<u32>::with_capacity(1);
	allocator.reserve();
	allocator.reserve();
}

#[test]
pub fn count_tracks_random_reserve_release_sequences() {
	let capacity = 256;
	let mut rng = thread_rng();
	let mut allocator = SlotAllocator::<usize>::with_capacity(capacity);
	let mut live = Vec::new();

	for _ in 0..2048 {
		let reserve = live.is_empty() || (live.len() < capacity && rng.gen_bool(0.6));
		if reserve {
			let index = allocator.reserve();
			allocator.initialize(index, index * 3);
			live.push(index);
		} else {
			let position = rng.gen_range(0..live.len());
			let index = live.swap_remove(position);
			assert!(allocator.release(index));
		}

		assert_eq!(allocator.count(), live.len(), "Count does not match reserves minus releases");
	}

	for index in live.iter() {
		assert!(allocator.occupied(*index), "Live slot {} reports free", index);
		assert_eq!(allocator.get(*index), Some(&(index * 3)));
	}

	live.sort();
	assert_eq!(allocator.occupied_indices().collect::<Vec<_>>(), live);
}

#[test]
pub fn release_drops_payload_once() {
	let drops = Rc::new(Cell::new(0));
	let mut allocator = SlotAllocator::with_capacity(4);
	let handle = allocator.insert(Tracked::new(1, &drops));

	assert!(allocator.release(handle.index()));
	assert_eq!(drops.get(), 1);

	assert!(!allocator.release(handle.index()), "Releasing a free slot should be a no-op");
	assert!(!allocator.release(100), "Releasing out of range should be a no-op");
	assert_eq!(drops.get(), 1);
	assert_eq!(allocator.count(), 0);
}

#[test]
pub fn release_of_reserved_slot_drops_nothing() {
	let drops = Rc::new(Cell::new(0));
	let mut allocator = SlotAllocator::<Tracked>::with_capacity(2);
	let index = allocator.reserve();

	assert!(allocator.release(index));
	assert_eq!(drops.get(), 0);
	assert!(!allocator.occupied(index));
}

#[test]
pub fn grow_preserves_slots() {
	let mut allocator = SlotAllocator::<String>::with_capacity(3);
	let handles: Vec<_> = (0..3).map(|i| allocator.insert(format!("value {}", i))).collect();
	allocator.release(handles[1].index());

	allocator.grow(10);
	assert_eq!(allocator.capacity(), 10);
	assert_eq!(allocator.count(), 2);

	assert_eq!(handles[0].get(&allocator).map(String::as_str), Some("value 0"));
	assert_eq!(handles[2].get(&allocator).map(String::as_str), Some("value 2"));
	assert!(!allocator.occupied(1));

	assert_eq!(allocator.reserve(), 1, "Holes left before growth are filled first");
	assert_eq!(allocator.reserve(), 3);
}

#[test]
pub fn grow_to_smaller_capacity_is_ignored() {
	let mut allocator = SlotAllocator::<u8>::with_capacity(4);
	allocator.insert(1);
	allocator.grow(2);
	assert_eq!(allocator.capacity(), 4);
	assert_eq!(allocator.count(), 1);
}

#[test]
pub fn regrow_with_preserve_behaves_like_grow() {
	let mut allocator = SlotAllocator::<u64>::with_capacity(2);
	let handle = allocator.insert(42);

	allocator.regrow(8, true);
	assert_eq!(allocator.capacity(), 8);
	assert_eq!(handle.get(&allocator), Some(&42));
}

#[test]
pub fn regrow_without_preserve_discards_everything() {
	let drops = Rc::new(Cell::new(0));
	let mut allocator = SlotAllocator::with_capacity(4);
	let handles: Vec<_> = (0..4).map(|i| allocator.insert(Tracked::new(i, &drops))).collect();

	allocator.regrow(6, false);
	assert_eq!(allocator.count(), 0);
	assert_eq!(allocator.capacity(), 6);
	assert_eq!(drops.get(), 0, "Discarded slots are not dropped");

	for handle in handles.iter() {
		assert!(matches!(handle.try_get(&allocator), Err(HandleError::Stale { .. })));
	}

	let handle = allocator.insert(Tracked::new(9, &drops));
	assert_eq!(handle.index(), 0);
	assert_eq!(handle.get(&allocator).map(|t| t.value), Some(9));
	assert_ne!(Some(handle), handles.first().copied());
}

#[test]
pub fn regrow_to_smaller_capacity_discards_everything() {
	let mut allocator = SlotAllocator::<u32>::with_capacity(8);
	let far = {
		for i in 0..7 {
			allocator.insert(i);
		}
		allocator.insert(7)
	};

	allocator.regrow(4, true);
	assert_eq!(allocator.capacity(), 4);
	assert_eq!(allocator.count(), 0);
	assert!(matches!(far.try_get(&allocator), Err(HandleError::OutOfBounds { index: 7, capacity: 4 })));
}

#[test]
pub fn dropping_allocator_drops_live_values() {
	let drops = Rc::new(Cell::new(0));
	let mut indices: Vec<_> = (0..16).collect();
	indices.shuffle(&mut thread_rng());

	{
		let mut allocator = SlotAllocator::with_capacity(16);
		for i in 0..16 {
			allocator.insert(Tracked::new(i, &drops));
		}
		for index in indices.iter().take(5) {
			allocator.release(*index);
		}
		assert_eq!(drops.get(), 5);
	}

	assert_eq!(drops.get(), 16);
}

#[test]
pub fn iteration_visits_values_in_slot_order() {
	let mut allocator = SlotAllocator::<u32>::with_capacity(8);
	for i in 0..8 {
		allocator.insert(i * 10);
	}
	allocator.release(2);
	allocator.release(5);

	let values: Vec<_> = allocator.iter().map(|(i, v)| (i, *v)).collect();
	assert_eq!(values, vec![(0, 0), (1, 10), (3, 30), (4, 40), (6, 60), (7, 70)]);

	allocator.for_each_mut(|_, value| *value += 1);
	assert_eq!(allocator.get(7), Some(&71));
	assert_eq!(allocator.find(|v| *v == 41).map(|h: Handle<u32>| h.index()), Some(4));
}

#[test]
pub fn zero_sized_payloads() {
	let mut allocator = SlotAllocator::<()>::with_capacity(3);
	let handle = allocator.insert(());
	allocator.insert(());
	allocator.grow(5);

	assert_eq!(allocator.count(), 2);
	assert_eq!(handle.get(&allocator), Some(&()));
}

#[test]
#[cfg(target_pointer_width = "64")]
#[should_panic(expected = "does not fit in a handle index")]
pub fn capacity_past_handle_range_panics() {
	SlotAllocator::<()>::with_capacity(u32::MAX as usize + 1);
}

#[test]
#[cfg(target_pointer_width = "64")]
#[should_panic(expected = "does not fit in a handle index")]
pub fn growth_past_handle_range_panics() {
	let mut allocator = SlotAllocator::<()>::with_capacity(1);
	allocator.grow(u32::MAX as usize + 1);
}
