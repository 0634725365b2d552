use crate::components::{Component, ComponentBase, ComponentId};
use crate::handles::{Handle, RawHandle, Resolve};
use crate::data_structures::SlotAllocator;
use crate::error::HandleError;
use crate::entities::Entity;
use std::any::Any;

/// The slots holding every component of type `T` in a [Scene](crate::scene::Scene).
///
/// Lookups by [Entity] scan the occupied slots, so they cost time proportional to the
/// number of live components of that type.
pub struct ComponentStorage<T: Component> {
	allocator: SlotAllocator<T>,
	growth: usize,
}

impl<T: Component> ComponentStorage<T> {
	/// Create a new [ComponentStorage].
	///
	/// # Arguments
	/// * `capacity` - The number of components that fit before the first growth
	/// * `growth` - The number of slots added every time the storage is full
	pub fn new(capacity: usize, growth: usize) -> Self {
		Self {
			allocator: SlotAllocator::with_capacity(capacity),
			growth: usize::max(growth, 1),
		}
	}

	pub fn allocator(&self) -> &SlotAllocator<T> {
		&self.allocator
	}

	pub fn len(&self) -> usize {
		self.allocator.count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn capacity(&self) -> usize {
		self.allocator.capacity()
	}

	/// The handle of the component attached to `entity`, if any.
	pub fn find(&self, entity: Entity) -> Option<Handle<T>> {
		self.allocator.find(|component| component.entity() == entity)
	}

	/// Attach a component to `entity`, unless one is already attached.
	///
	/// Returns the handle and whether a new component was created. A full storage grows by
	/// the configured increment first, keeping every existing component where it is.
	pub fn attach(&mut self, entity: Entity, init: impl FnOnce(ComponentBase) -> T) -> (Handle<T>, bool) {
		if let Some(handle) = self.find(entity) {
			return (handle, false);
		}

		if self.allocator.is_full() {
			let capacity = self.allocator.capacity() + self.growth;
			self.allocator.grow(capacity);
		}

		let index = self.allocator.reserve();
		let generation = self.allocator.generation(index).unwrap_or_default();
		let raw = RawHandle::new(self.allocator.id(), index, generation);
		let base = ComponentBase::new(entity, ComponentId::of::<T>(), raw);

		let mut component = init(base);
		*component.base_mut() = base;
		self.allocator.initialize(index, component);

		log::trace!("Attached {} to entity {} in slot {}", std::any::type_name::<T>(), entity, index);
		(Handle::from_raw(raw), true)
	}

	pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
		self.allocator.iter().map(|(_, component)| component)
	}

	pub fn for_each_mut(&mut self, mut func: impl FnMut(&mut T)) {
		self.allocator.for_each_mut(|_, component| func(component))
	}
}

impl<T: Component> Resolve<T> for ComponentStorage<T> {
	fn resolve(&self, handle: Handle<T>) -> Result<&T, HandleError> {
		self.allocator.resolve(handle)
	}

	fn resolve_mut(&mut self, handle: Handle<T>) -> Result<&mut T, HandleError> {
		self.allocator.resolve_mut(handle)
	}
}

/// Object-safe view of a [ComponentStorage] used by the [Scene](crate::scene::Scene).
pub(crate) trait ComponentStore {
	fn find(&self, entity: Entity) -> Option<RawHandle>;
	fn is_live(&self, handle: RawHandle) -> bool;
	fn release(&mut self, handle: RawHandle) -> bool;
	fn collect_live(&self, out: &mut Vec<RawHandle>);
	fn len(&self) -> usize;
	fn capacity(&self) -> usize;
	fn as_any(&self) -> &dyn Any;
	fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ComponentStore for ComponentStorage<T> {
	fn find(&self, entity: Entity) -> Option<RawHandle> {
		ComponentStorage::find(self, entity).map(|handle| handle.raw())
	}

	fn is_live(&self, handle: RawHandle) -> bool {
		self.allocator.is_live(handle)
	}

	fn release(&mut self, handle: RawHandle) -> bool {
		match self.allocator.check(handle) {
			Ok(index) => self.allocator.release(index),
			Err(_) => false,
		}
	}

	fn collect_live(&self, out: &mut Vec<RawHandle>) {
		out.extend(self.allocator.initialized_indices().filter_map(|index| self.allocator.raw_handle(index)));
	}

	fn len(&self) -> usize {
		ComponentStorage::len(self)
	}

	fn capacity(&self) -> usize {
		ComponentStorage::capacity(self)
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}
