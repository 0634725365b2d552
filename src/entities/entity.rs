use crate::components::Component;
use crate::handles::Handle;
use crate::scene::{Scene, SceneId};
use std::fmt;

/// A lightweight reference to an entity of a [Scene].
///
/// An entity is not stored anywhere by itself: it exists as long as a
/// [Transform](crate::components::Transform) tagged with its id does.
/// Ids of destroyed entities are reused, so an [Entity] kept past its destruction
/// may end up naming a newer entity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Entity {
	pub(crate) scene: SceneId,
	pub(crate) id: u32,
}

impl Entity {
	pub fn id(&self) -> u32 {
		self.id
	}

	pub fn scene(&self) -> SceneId {
		self.scene
	}

	/// Attach a default-built `T`. See [Scene::add_component].
	pub fn add_component<T: Component>(self, scene: &mut Scene) -> Handle<T> {
		scene.add_component::<T>(self)
	}

	/// Attach the `T` built by `init`. See [Scene::add_component_with].
	pub fn add_component_with<T: Component>(
		self, scene: &mut Scene, init: impl FnOnce(crate::components::ComponentBase) -> T,
	) -> Handle<T> {
		scene.add_component_with(self, init)
	}

	pub fn get_component<T: Component>(self, scene: &Scene) -> Handle<T> {
		scene.get_component::<T>(self)
	}

	pub fn has_component<T: Component>(self, scene: &Scene) -> bool {
		scene.has_component::<T>(self)
	}

	pub fn remove_component<T: Component>(self, scene: &mut Scene) -> bool {
		scene.remove_component::<T>(self)
	}

	/// Mark the entity for destruction at the start of the next [Scene::tick].
	pub fn destroy(self, scene: &mut Scene) {
		scene.destroy(self)
	}

	pub fn is_alive(self, scene: &Scene) -> bool {
		scene.is_alive(self)
	}
}

impl fmt::Display for Entity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.scene, self.id)
	}
}

/// Panics if `entity` does not belong to `scene`.
#[inline(always)]
pub(crate) fn assert_entity_scene(entity: Entity, scene: SceneId) {
	assert_eq!(
		entity.scene, scene,
		"Entity {} does not belong to scene {}",
		entity, scene
	);
}
