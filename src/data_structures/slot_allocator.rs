use crate::data_structures::{AnyBuffer, BitField};
use crate::handles::{Handle, RawHandle, Resolve};
use std::sync::atomic::{AtomicU32, Ordering};
use std::ops::{Deref, DerefMut};
use crate::error::HandleError;
use std::marker::PhantomData;
use std::any::TypeId;
use std::iter::repeat;
use std::fmt;

static NEXT_ALLOCATOR_ID: AtomicU32 = AtomicU32::new(1);

/// A process-wide unique identifier of a slot allocator.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AllocatorId(u32);

impl AllocatorId {
	fn next() -> Self {
		AllocatorId(NEXT_ALLOCATOR_ID.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for AllocatorId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A fixed-capacity array of slots with one occupancy bit per slot.
///
/// This is the non-generic half of [SlotAllocator]: it knows the payload type only through
/// a [TypeId] and a drop function, so it can be driven without naming the payload type.
///
/// Slots go through two steps. [reserve](RawSlotAllocator::reserve) marks a slot occupied and
/// returns its index; [SlotAllocator::initialize] moves a value into it. Only occupied and
/// initialized slots can be read.
pub struct RawSlotAllocator {
	id: AllocatorId,
	buffer: AnyBuffer,
	occupied: BitField,
	initialized: BitField,
	generations: Vec<u32>,
}

impl RawSlotAllocator {
	fn new<T: 'static>(capacity: usize) -> Self {
		assert_capacity(capacity);
		Self {
			id: AllocatorId::next(),
			buffer: AnyBuffer::with_capacity::<T>(capacity),
			occupied: BitField::with_capacity(capacity),
			initialized: BitField::with_capacity(capacity),
			generations: vec![0; capacity],
		}
	}

	pub fn id(&self) -> AllocatorId {
		self.id
	}

	pub fn capacity(&self) -> usize {
		self.buffer.capacity()
	}

	/// Number of occupied slots. Scans the occupancy bits.
	pub fn count(&self) -> usize {
		self.occupied.count_ones()
	}

	pub fn is_full(&self) -> bool {
		self.count() >= self.capacity()
	}

	pub fn occupied(&self, index: usize) -> bool {
		self.occupied.get(index)
	}

	/// Whether the slot holds a value, as opposed to being free or only reserved.
	pub fn is_initialized(&self, index: usize) -> bool {
		self.initialized.get(index)
	}

	pub fn generation(&self, index: usize) -> Option<u32> {
		self.generations.get(index).copied()
	}

	pub fn payload_type(&self) -> TypeId {
		self.buffer.type_id()
	}

	pub fn payload_name(&self) -> &'static str {
		self.buffer.type_name()
	}

	/// Mark the first free slot as occupied and return its index.
	/// The slot's payload is left uninitialized.
	///
	/// # Panics
	/// Panics if every slot is occupied. Callers are expected to [grow](RawSlotAllocator::grow) first.
	pub fn reserve(&mut self) -> usize {
		match self.try_reserve() {
			Some(index) => index,
			None => panic!(
				"SlotAllocator<{}> is at capacity ({} slots)",
				self.payload_name(),
				self.capacity()
			),
		}
	}

	/// Mark the first free slot as occupied, or return [None] if there is none.
	pub fn try_reserve(&mut self) -> Option<usize> {
		let index = self.occupied.first_unset(self.capacity())?;
		self.occupied.set(index, true);
		Some(index)
	}

	/// Destroy the payload of slot `index` (if it was initialized) and mark the slot free.
	/// Returns `false`, doing nothing, if the slot was already free.
	pub fn release(&mut self, index: usize) -> bool {
		if !self.occupied.get(index) {
			return false;
		}

		if self.initialized.get(index) {
			self.initialized.set(index, false);
			unsafe { self.buffer.drop_value(index) };
		}

		self.occupied.set(index, false);
		self.generations[index] = self.generations[index].wrapping_add(1);
		true
	}

	/// Raise the capacity to `capacity`, keeping every slot, flag and index as it is.
	/// A capacity that is not larger than the current one is ignored.
	pub fn grow(&mut self, capacity: usize) {
		let current = self.capacity();
		if capacity <= current {
			return;
		}
		assert_capacity(capacity);

		log::debug!(
			"SlotAllocator<{}> {} growing from {} to {} slots",
			self.payload_name(),
			self.id,
			current,
			capacity
		);

		self.buffer.grow(capacity);
		self.occupied.ensure_capacity(capacity);
		self.initialized.ensure_capacity(capacity);
		self.generations.extend(repeat(0).take(capacity - current));
	}

	/// Resize the allocator, discarding its contents unless this is a preserving growth.
	///
	/// With `preserve` set and a larger `capacity` this is [grow](RawSlotAllocator::grow).
	/// In every other case **all slots are discarded without running their destructors**
	/// and the allocator restarts empty at `capacity`. Values owning resources leak.
	/// Every generation is bumped, so handles issued before the call resolve as stale.
	///
	/// New code should call [grow](RawSlotAllocator::grow) instead.
	pub fn regrow(&mut self, capacity: usize, preserve: bool) {
		if preserve && capacity > self.capacity() {
			self.grow(capacity);
			return;
		}
		assert_capacity(capacity);

		let live = self.count();
		if live > 0 {
			log::warn!(
				"SlotAllocator<{}> {} discarding {} occupied slots without dropping them",
				self.payload_name(),
				self.id,
				live
			);
		}

		self.buffer.replace(capacity);

		self.occupied.clear();
		self.occupied.truncate(capacity);
		self.occupied.ensure_capacity(capacity);

		self.initialized.clear();
		self.initialized.truncate(capacity);
		self.initialized.ensure_capacity(capacity);

		for generation in self.generations.iter_mut() {
			*generation = generation.wrapping_add(1);
		}
		self.generations.resize(capacity, 0);
	}

	/// Iterate over the occupied slot indices in ascending order.
	pub fn occupied_indices(&self) -> impl Iterator<Item = usize> + '_ {
		let capacity = self.capacity();
		self.occupied.iter_ones().take_while(move |i| *i < capacity)
	}

	/// Iterate over the initialized slot indices in ascending order.
	pub fn initialized_indices(&self) -> impl Iterator<Item = usize> + '_ {
		let capacity = self.capacity();
		self.initialized.iter_ones().take_while(move |i| *i < capacity)
	}

	/// An erased handle to slot `index`, or [None] if the slot holds no value.
	pub fn raw_handle(&self, index: usize) -> Option<RawHandle> {
		if !self.initialized.get(index) {
			return None;
		}
		Some(RawHandle::new(self.id, index, self.generations[index]))
	}

	/// Validate `handle` against this allocator and return the slot index it names.
	pub fn check(&self, handle: RawHandle) -> Result<usize, HandleError> {
		let allocator = handle.allocator.ok_or(HandleError::Null)?;
		if allocator != self.id {
			return Err(HandleError::ForeignAllocator {
				expected: self.id,
				found: allocator,
			});
		}

		let index = handle.index();
		let generation = match self.generations.get(index) {
			Some(generation) => *generation,
			None => {
				return Err(HandleError::OutOfBounds {
					index,
					capacity: self.capacity(),
				})
			},
		};

		if generation != handle.generation {
			return Err(HandleError::Stale {
				index,
				expected: handle.generation,
				found: generation,
			});
		}

		if !self.initialized.get(index) {
			return Err(HandleError::Vacant { index });
		}

		Ok(index)
	}

	pub fn is_live(&self, handle: RawHandle) -> bool {
		self.check(handle).is_ok()
	}
}

impl Drop for RawSlotAllocator {
	fn drop(&mut self) {
		let capacity = self.capacity();
		for index in self.initialized.iter_ones().take_while(|i| *i < capacity) {
			unsafe { self.buffer.drop_value(index) };
		}
	}
}

/// Slot indices travel in [RawHandle]s as `u32`.
fn assert_capacity(capacity: usize) {
	assert!(
		capacity <= u32::MAX as usize,
		"SlotAllocator capacity {} does not fit in a handle index",
		capacity
	);
}

/// Typed storage for values of type `T` addressed by slot index.
///
/// Derefs to [RawSlotAllocator] for every operation that does not need to know `T`.
pub struct SlotAllocator<T> {
	raw: RawSlotAllocator,
	phantom: PhantomData<T>,
}

impl<T: 'static> SlotAllocator<T> {
	/// Create a new [SlotAllocator] with `capacity` free slots.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			raw: RawSlotAllocator::new::<T>(capacity),
			phantom: PhantomData,
		}
	}

	/// Move `value` into the reserved slot `index`.
	///
	/// # Panics
	/// Panics if the slot was not reserved, or already holds a value.
	pub fn initialize(&mut self, index: usize, value: T) -> &mut T {
		assert!(
			self.raw.occupied(index),
			"Slot {} of SlotAllocator<{}> must be reserved before it is initialized",
			index,
			self.raw.payload_name()
		);
		assert!(
			!self.raw.is_initialized(index),
			"Slot {} of SlotAllocator<{}> is already initialized",
			index,
			self.raw.payload_name()
		);

		self.raw.initialized.set(index, true);
		unsafe { self.raw.buffer.write(index, value) }
	}

	/// Reserve a slot and move `value` into it.
	///
	/// # Panics
	/// Panics if the allocator is full.
	pub fn insert(&mut self, value: T) -> Handle<T> {
		let index = self.raw.reserve();
		self.initialize(index, value);
		Handle::from_raw(RawHandle::new(self.raw.id, index, self.raw.generations[index]))
	}

	pub fn get(&self, index: usize) -> Option<&T> {
		match self.raw.is_initialized(index) {
			true => Some(unsafe { self.raw.buffer.get(index) }),
			false => None,
		}
	}

	pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
		match self.raw.is_initialized(index) {
			true => Some(unsafe { self.raw.buffer.get_mut(index) }),
			false => None,
		}
	}

	/// A handle to slot `index`, or [None] if the slot holds no value.
	pub fn handle(&self, index: usize) -> Option<Handle<T>> {
		self.raw.raw_handle(index).map(Handle::from_raw)
	}

	/// Iterate over the stored values and their slot indices in ascending order.
	pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
		self.raw
			.initialized_indices()
			.map(move |index| (index, unsafe { self.raw.buffer.get::<T>(index) }))
	}

	/// Call `func` on every stored value in ascending slot order.
	pub fn for_each_mut(&mut self, mut func: impl FnMut(usize, &mut T)) {
		let capacity = self.raw.capacity();
		let buffer = &mut self.raw.buffer;
		for index in self.raw.initialized.iter_ones().take_while(|i| *i < capacity) {
			func(index, unsafe { buffer.get_mut::<T>(index) });
		}
	}

	/// Find the first stored value matching `predicate`.
	pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<Handle<T>> {
		let (index, _) = self.iter().find(|(_, value)| predicate(value))?;
		self.handle(index)
	}
}

impl<T: 'static> Resolve<T> for SlotAllocator<T> {
	fn resolve(&self, handle: Handle<T>) -> Result<&T, HandleError> {
		let index = self.raw.check(handle.raw())?;
		Ok(unsafe { self.raw.buffer.get(index) })
	}

	fn resolve_mut(&mut self, handle: Handle<T>) -> Result<&mut T, HandleError> {
		let index = self.raw.check(handle.raw())?;
		Ok(unsafe { self.raw.buffer.get_mut(index) })
	}
}

impl<T> Deref for SlotAllocator<T> {
	type Target = RawSlotAllocator;

	#[inline(always)]
	fn deref(&self) -> &Self::Target {
		&self.raw
	}
}

impl<T> DerefMut for SlotAllocator<T> {
	#[inline(always)]
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.raw
	}
}
