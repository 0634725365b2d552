//! A unique runtime identifier tied to a [Component](crate::components::Component) type.
//!
//! Ids are handed out by a process-wide registry the first time a type asks for one,
//! in increasing order starting at 1. Developers shouldn't rely on
//! [component ids](ComponentId), as they are not stable between program re-runs.

use std::collections::HashMap;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::any::TypeId;
use std::fmt;

lazy_static! {
	static ref REGISTRY: Mutex<ComponentRegistry> = Mutex::new(ComponentRegistry::default());
}

#[derive(Default)]
struct ComponentRegistry {
	ids: HashMap<TypeId, ComponentId>,
	names: Vec<&'static str>,
}

impl ComponentRegistry {
	fn register<T: 'static>(&mut self) -> ComponentId {
		if let Some(id) = self.ids.get(&TypeId::of::<T>()) {
			return *id;
		}

		self.names.push(std::any::type_name::<T>());
		let id = ComponentId { value: self.names.len() };
		debug_assert!(
			id.value <= u32::MAX as usize,
			"This is an insane number of components. Please seek help."
		);

		self.ids.insert(TypeId::of::<T>(), id);
		log::trace!("Registered component type {} as {}", std::any::type_name::<T>(), id);
		id
	}
}

/// A globally unique identifier for a component type.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub struct ComponentId {
	value: usize,
}

impl ComponentId {
	/// Get the [ComponentId] of the type `T`, registering `T` if it was never seen before.
	pub fn of<T: 'static>() -> ComponentId {
		REGISTRY.lock().register::<T>()
	}

	/// The type name `T` was registered with.
	pub fn name(&self) -> &'static str {
		REGISTRY.lock().names[self.value - 1]
	}

	#[inline(always)]
	pub const fn value(&self) -> usize {
		self.value
	}
}

impl fmt::Display for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "component #{}", self.value)
	}
}
