use crate::data_structures::SlotAllocator;
use crate::handles::{Handle, RawHandle};
use crate::error::HandleError;
use std::collections::HashSet;

#[test]
pub fn null_handle_resolves_to_nothing() {
	let allocator = SlotAllocator::<u32>::with_capacity(1);
	let handle = Handle::<u32>::null();

	assert!(handle.is_null());
	assert_eq!(handle, Handle::default());
	assert_eq!(handle.get(&allocator), None);
	assert_eq!(handle.try_get(&allocator), Err(HandleError::Null));
	assert!(RawHandle::NULL.is_null());
}

#[test]
pub fn equality_compares_allocator_index_and_generation() {
	let mut first = SlotAllocator::<u32>::with_capacity(2);
	let mut second = SlotAllocator::<u32>::with_capacity(2);

	let a = first.insert(1);
	let b = second.insert(1);
	assert_eq!(a.index(), b.index());
	assert_ne!(a, b, "Handles from different allocators must differ");

	assert_eq!(first.handle(0), Some(a));

	first.release(0);
	let c = first.insert(1);
	assert_eq!(a.index(), c.index());
	assert_ne!(a, c, "A reused slot must produce a different handle");

	let set: HashSet<_> = [a, b, c, a].into_iter().collect();
	assert_eq!(set.len(), 3);
}

#[test]
pub fn stale_handle_does_not_alias_reused_slot() {
	let mut allocator = SlotAllocator::<&str>::with_capacity(1);
	let old = allocator.insert("old");
	allocator.release(old.index());
	let new = allocator.insert("new");

	assert_eq!(old.get(&allocator), None);
	assert_eq!(
		old.try_get(&allocator),
		Err(HandleError::Stale {
			index: 0,
			expected: 0,
			found: 1
		})
	);
	assert_eq!(new.get(&allocator), Some(&"new"));
}

#[test]
pub fn released_slot_is_stale_before_reuse() {
	let mut allocator = SlotAllocator::<u32>::with_capacity(1);
	let handle = allocator.insert(5);
	allocator.release(handle.index());

	assert!(!handle.is_valid(&allocator));
	assert!(matches!(handle.try_get(&allocator), Err(HandleError::Stale { .. })));
}

#[test]
pub fn reserved_but_uninitialized_slot_is_vacant() {
	let mut allocator = SlotAllocator::<u32>::with_capacity(2);
	let index = allocator.reserve();
	let raw = RawHandle::new(allocator.id(), index, 0);

	assert_eq!(allocator.check(raw), Err(HandleError::Vacant { index }));
}

#[test]
pub fn foreign_handle_is_rejected() {
	let mut first = SlotAllocator::<u32>::with_capacity(1);
	let second = SlotAllocator::<u32>::with_capacity(1);
	let handle = first.insert(3);

	assert_eq!(
		handle.try_get(&second),
		Err(HandleError::ForeignAllocator {
			expected: second.id(),
			found: first.id()
		})
	);
}

#[test]
pub fn handles_survive_growth() {
	let mut allocator = SlotAllocator::<u64>::with_capacity(1);
	let handle = allocator.insert(11);

	for size in 2..64 {
		allocator.grow(size);
		allocator.insert(size as u64);
	}

	if let Some(value) = handle.get_mut(&mut allocator) {
		*value += 1;
	}
	assert_eq!(handle.get(&allocator), Some(&12));
}
