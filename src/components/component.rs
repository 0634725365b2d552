use crate::components::ComponentId;
use crate::handles::{Handle, RawHandle};
use crate::entities::Entity;

/// The part every [Component] embeds: who owns it, what type it is and where it lives.
///
/// The base is filled in by the [Scene](crate::scene::Scene) when the component is attached
/// and must not be changed afterwards.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ComponentBase {
	entity: Entity,
	component: ComponentId,
	handle: RawHandle,
}

impl ComponentBase {
	pub(crate) fn new(entity: Entity, component: ComponentId, handle: RawHandle) -> Self {
		Self {
			entity,
			component,
			handle,
		}
	}

	/// The [Entity] this component is attached to.
	pub fn entity(&self) -> Entity {
		self.entity
	}

	pub fn component_id(&self) -> ComponentId {
		self.component
	}

	/// The component's own handle, with its type erased.
	pub fn raw_handle(&self) -> RawHandle {
		self.handle
	}
}

/// Data attached to an [Entity] and stored in the slots of a [System](crate::systems::System).
///
/// Usually implemented with `#[derive(Component)]`, which looks for the field of type
/// [ComponentBase] (or the field marked `#[component(base)]`) and fills every other field
/// with its [Default] value in [from_base](Component::from_base).
pub trait Component: 'static + Sized {
	/// Build a fresh component around `base`.
	fn from_base(base: ComponentBase) -> Self;

	fn base(&self) -> &ComponentBase;

	fn base_mut(&mut self) -> &mut ComponentBase;

	fn entity(&self) -> Entity {
		self.base().entity()
	}

	fn component_id(&self) -> ComponentId {
		self.base().component_id()
	}

	/// A handle to this very component.
	fn handle(&self) -> Handle<Self> {
		Handle::from_raw(self.base().raw_handle())
	}
}
