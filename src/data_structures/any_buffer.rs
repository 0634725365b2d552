use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::mem::{align_of, size_of};
use std::ptr::NonNull;
use std::any::TypeId;

/// A polymorphic container for items of the same type.
/// The container does not keep track of which values stored within have been initialized,
/// nor will it automatically drop them upon destruction.
pub(crate) struct AnyBuffer {
	ptr: NonNull<u8>,
	capacity: usize,
	type_id: TypeId,
	type_name: &'static str,
	layout: Layout,
	drop: unsafe fn(*mut u8),
}

impl AnyBuffer {
	pub fn with_capacity<T: 'static>(capacity: usize) -> Self {
		let layout = Layout::new::<T>();
		debug_assert_eq!(layout.size(), size_of::<T>());
		debug_assert_eq!(layout.align(), align_of::<T>());

		Self {
			ptr: make_buffer(layout, capacity),
			capacity,
			layout,
			type_id: TypeId::of::<T>(),
			type_name: std::any::type_name::<T>(),
			drop: |ptr| unsafe { std::ptr::drop_in_place(ptr as *mut T) },
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Move `value` into slot `index`. Whatever the slot held before is forgotten.
	///
	/// # Safety
	/// - `T` must match the buffer's internal type.
	/// - `index` must be within the bounds of the buffer.
	pub unsafe fn write<T: 'static>(&mut self, index: usize, value: T) -> &mut T {
		debug_assert_eq!(self.type_id, TypeId::of::<T>());
		debug_assert!(index < self.capacity);

		let slot = self.slot_ptr(index) as *mut T;
		slot.write(value);
		&mut *slot
	}

	/// # Safety
	/// - `T` must match the buffer's internal type.
	/// - The value at `index` must be initialized.
	pub unsafe fn get<T: 'static>(&self, index: usize) -> &T {
		debug_assert_eq!(self.type_id, TypeId::of::<T>());
		debug_assert!(index < self.capacity);

		&*(self.slot_ptr(index) as *const T)
	}

	/// # Safety
	/// - `T` must match the buffer's internal type.
	/// - The value at `index` must be initialized.
	pub unsafe fn get_mut<T: 'static>(&mut self, index: usize) -> &mut T {
		debug_assert_eq!(self.type_id, TypeId::of::<T>());
		debug_assert!(index < self.capacity);

		&mut *(self.slot_ptr(index) as *mut T)
	}

	/// Run the destructor of the value at `index` in place.
	///
	/// # Safety
	/// - The value at `index` must be initialized; afterwards it is not.
	pub unsafe fn drop_value(&mut self, index: usize) {
		debug_assert!(index < self.capacity);
		(self.drop)(self.slot_ptr(index));
	}

	/// Move the buffer into a larger block, keeping every slot's bytes at the same index.
	/// Does nothing if `capacity` is not larger than the current capacity.
	pub fn grow(&mut self, capacity: usize) {
		if capacity <= self.capacity {
			return;
		}

		let buffer = make_buffer(self.layout, capacity);
		unsafe {
			std::ptr::copy_nonoverlapping(
				self.ptr.as_ptr(),
				buffer.as_ptr(),
				self.layout.size() * self.capacity,
			);
			free_buffer(self.ptr, self.layout, self.capacity);
		}

		self.ptr = buffer;
		self.capacity = capacity;
	}

	/// Throw the current block away and start over with `capacity` uninitialized slots.
	/// No destructor runs for anything the old block held.
	pub fn replace(&mut self, capacity: usize) {
		let buffer = make_buffer(self.layout, capacity);
		unsafe { free_buffer(self.ptr, self.layout, self.capacity) };

		self.ptr = buffer;
		self.capacity = capacity;
	}

	#[inline(always)]
	fn slot_ptr(&self, index: usize) -> *mut u8 {
		unsafe { self.ptr.as_ptr().add(index * self.layout.size()) }
	}
}

impl Drop for AnyBuffer {
	fn drop(&mut self) {
		unsafe { free_buffer(self.ptr, self.layout, self.capacity) }
	}
}

fn array_layout(layout: Layout, count: usize) -> Layout {
	let bytes = layout.size().checked_mul(count).expect("AnyBuffer capacity overflow");
	Layout::from_size_align(bytes, layout.align()).expect("AnyBuffer capacity overflow")
}

fn make_buffer(layout: Layout, count: usize) -> NonNull<u8> {
	let array = array_layout(layout, count);
	if array.size() == 0 {
		// Zero-sized storage is never dereferenced as bytes, only as `T` values of size 0.
		return unsafe { NonNull::new_unchecked(array.align() as *mut u8) };
	}

	let ptr = unsafe { alloc(array) };
	match NonNull::new(ptr) {
		Some(ptr) => ptr,
		None => handle_alloc_error(array),
	}
}

unsafe fn free_buffer(ptr: NonNull<u8>, layout: Layout, count: usize) {
	let array = array_layout(layout, count);
	if array.size() != 0 {
		dealloc(ptr.as_ptr(), array);
	}
}
