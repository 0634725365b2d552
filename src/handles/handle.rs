use crate::data_structures::AllocatorId;
use crate::error::HandleError;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::fmt;

/// A type-erased reference to one slot of one allocator.
///
/// The generation is the slot's release count at the time the handle was issued;
/// it no longer matches once the slot is released, so a stale handle never aliases
/// whatever is stored in the slot afterwards.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RawHandle {
	pub(crate) allocator: Option<AllocatorId>,
	pub(crate) index: u32,
	pub(crate) generation: u32,
}

impl RawHandle {
	/// The "no reference" sentinel.
	pub const NULL: RawHandle = RawHandle {
		allocator: None,
		index: 0,
		generation: 0,
	};

	pub(crate) fn new(allocator: AllocatorId, index: usize, generation: u32) -> Self {
		Self {
			allocator: Some(allocator),
			index: index as u32,
			generation,
		}
	}

	pub fn is_null(&self) -> bool {
		self.allocator.is_none()
	}

	pub fn allocator(&self) -> Option<AllocatorId> {
		self.allocator
	}

	pub fn index(&self) -> usize {
		self.index as usize
	}

	pub fn generation(&self) -> u32 {
		self.generation
	}
}

/// A typed, non-owning reference to a value stored in a
/// [SlotAllocator](crate::data_structures::SlotAllocator).
///
/// Handles are plain values: copying or dropping one has no effect on the referent.
/// They stay valid across allocator growth, unlike references obtained by resolving them.
pub struct Handle<T> {
	raw: RawHandle,
	phantom: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
	/// Create the null handle.
	pub const fn null() -> Self {
		Self::from_raw(RawHandle::NULL)
	}

	/// Reinterpret an erased handle as a handle to `T`.
	/// Resolving it against a source of another type fails with [HandleError::ForeignAllocator].
	pub const fn from_raw(raw: RawHandle) -> Self {
		Self {
			raw,
			phantom: PhantomData,
		}
	}

	pub fn raw(&self) -> RawHandle {
		self.raw
	}

	pub fn is_null(&self) -> bool {
		self.raw.is_null()
	}

	pub fn allocator(&self) -> Option<AllocatorId> {
		self.raw.allocator
	}

	pub fn index(&self) -> usize {
		self.raw.index()
	}

	pub fn generation(&self) -> u32 {
		self.raw.generation
	}

	/// Resolve the handle against `source`.
	/// Returns [None] for the null handle and for handles whose slot was released.
	pub fn get<'l, S: Resolve<T> + ?Sized>(&self, source: &'l S) -> Option<&'l T> {
		source.resolve(*self).ok()
	}

	/// Resolve the handle mutably against `source`.
	pub fn get_mut<'l, S: Resolve<T> + ?Sized>(&self, source: &'l mut S) -> Option<&'l mut T> {
		source.resolve_mut(*self).ok()
	}

	/// Resolve the handle against `source`, reporting why resolution failed.
	pub fn try_get<'l, S: Resolve<T> + ?Sized>(&self, source: &'l S) -> Result<&'l T, HandleError> {
		source.resolve(*self)
	}

	/// Check whether the handle still refers to a live value of `source`.
	pub fn is_valid<S: Resolve<T> + ?Sized>(&self, source: &S) -> bool {
		source.resolve(*self).is_ok()
	}
}

/// Anything a [Handle] can be resolved against.
pub trait Resolve<T> {
	fn resolve(&self, handle: Handle<T>) -> Result<&T, HandleError>;
	fn resolve_mut(&mut self, handle: Handle<T>) -> Result<&mut T, HandleError>;
}

impl<T> Default for Handle<T> {
	fn default() -> Self {
		Self::null()
	}
}

impl<T> Copy for Handle<T> {}

impl<T> Clone for Handle<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Eq for Handle<T> {}

impl<T> PartialEq for Handle<T> {
	fn eq(&self, other: &Self) -> bool {
		self.raw == other.raw
	}
}

impl<T> Hash for Handle<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.raw.hash(state)
	}
}

impl<T> fmt::Debug for Handle<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.raw.allocator {
			None => write!(f, "Handle<{}>(null)", std::any::type_name::<T>()),
			Some(allocator) => write!(
				f,
				"Handle<{}>({}:{}v{})",
				std::any::type_name::<T>(),
				allocator,
				self.raw.index,
				self.raw.generation
			),
		}
	}
}

impl<T> From<Handle<T>> for RawHandle {
	fn from(handle: Handle<T>) -> Self {
		handle.raw
	}
}
