use crate::components::{Component, ComponentBase, ComponentId, Transform};
use crate::systems::{AnySystem, ComponentStorage, ComponentStore, System, TransformSystem};
use crate::entities::{assert_entity_scene, Entity};
use crate::handles::{Handle, RawHandle, Resolve};
use crate::error::{HandleError, SceneError};
use crate::scene::{Phase, SceneConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::collections::{HashSet, VecDeque};
use crate::data_structures::VecPool;
use std::hash::BuildHasherDefault;
use nohash_hasher::NoHashHasher;
use std::any::type_name;
use std::fmt;

type Hasher = BuildHasherDefault<NoHashHasher<u32>>;

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// The [TransformSystem] (or its replacement) is always the first registered system.
const TRANSFORM_SYSTEM: usize = 0;

/// A process-wide unique identifier of a [Scene].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SceneId(u32);

impl fmt::Display for SceneId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Copy, Clone, Debug)]
enum Hook {
	Begin(RawHandle),
	End(RawHandle),
	Phase(Phase, RawHandle, f32),
}

struct SystemEntry {
	component: ComponentId,
	name: &'static str,
	store: Box<dyn ComponentStore>,
	/// [None] while one of the system's hooks is running.
	system: Option<Box<dyn AnySystem>>,
	/// Hooks requested while the system was busy.
	queued: VecDeque<Hook>,
}

#[derive(Default, Copy, Clone, Eq, PartialEq, Debug)]
enum State {
	#[default]
	Idle,
	Ticking,
	Clearing,
}

/// A container for [entities](Entity), their [components](Component) and the
/// [systems](System) giving those components behaviour.
///
/// Systems are dispatched in registration order. [tick](Scene::tick) runs each phase over
/// every system before the next phase starts, so all `on_tick` calls of a frame happen
/// before any `on_late_tick` call.
pub struct Scene {
	id: SceneId,
	config: SceneConfig,
	state: State,
	/// Number of hooks currently running, nested ones included.
	hook_depth: usize,
	frame: u64,
	systems: Vec<SystemEntry>,

	next_entity: u32,
	free_entities: Vec<u32>,
	free_set: HashSet<u32, Hasher>,
	marked_entities: Vec<Entity>,
	marked_set: HashSet<u32, Hasher>,
	marked_components: Vec<(ComponentId, RawHandle)>,

	scratch: VecPool<RawHandle>,
}

impl Scene {
	pub fn new() -> Self {
		Self::with_config(SceneConfig::default())
	}

	pub fn with_config(config: SceneConfig) -> Self {
		Self::with_transform_system(config, TransformSystem)
	}

	/// Create a [Scene] whose [Transform] components are driven by `system`
	/// instead of the default [TransformSystem].
	pub fn with_transform_system<S: System<Component = Transform>>(config: SceneConfig, system: S) -> Self {
		let mut scene = Self {
			id: SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed)),
			config,
			state: State::default(),
			hook_depth: 0,
			frame: 0,
			systems: Vec::new(),

			next_entity: 0,
			free_entities: Vec::new(),
			free_set: HashSet::default(),
			marked_entities: Vec::new(),
			marked_set: HashSet::default(),
			marked_components: Vec::new(),

			scratch: VecPool::new(),
		};

		scene.push_system(system, config.initial_capacity);
		scene
	}

	pub fn id(&self) -> SceneId {
		self.id
	}

	pub fn config(&self) -> &SceneConfig {
		&self.config
	}

	/// Number of completed [ticks](Scene::tick).
	pub fn frame(&self) -> u64 {
		self.frame
	}

	/// Add a new [system](System) to the [Scene], with the configured initial capacity.
	pub fn register_system<S: System>(&mut self, system: S) -> Result<ComponentId, SceneError> {
		self.register_system_with_capacity(system, self.config.initial_capacity)
	}

	/// Add a new [system](System) to the [Scene].
	/// Only one system can serve a given component type.
	///
	/// # Arguments
	/// * `system` - The system, dispatched after every system registered before it
	/// * `capacity` - The number of components that fit before the storage first grows
	pub fn register_system_with_capacity<S: System>(
		&mut self, system: S, capacity: usize,
	) -> Result<ComponentId, SceneError> {
		let component = ComponentId::of::<S::Component>();
		if self.system_index(component).is_some() {
			return Err(SceneError::SystemAlreadyRegistered(type_name::<S::Component>()));
		}

		Ok(self.push_system(system, capacity))
	}

	fn push_system<S: System>(&mut self, system: S, capacity: usize) -> ComponentId {
		let component = ComponentId::of::<S::Component>();
		let storage = ComponentStorage::<S::Component>::new(capacity, self.config.growth_increment);

		log::debug!(
			"Scene {} registered {} for {} (capacity {})",
			self.id,
			type_name::<S>(),
			type_name::<S::Component>(),
			capacity
		);

		self.systems.push(SystemEntry {
			component,
			name: type_name::<S>(),
			store: Box::new(storage),
			system: Some(Box::new(system)),
			queued: VecDeque::new(),
		});
		component
	}

	/// Create a new [Entity] with a [Transform] attached.
	/// Ids of destroyed entities are reused before new ones are drawn.
	pub fn create(&mut self) -> Entity {
		let id = match self.free_entities.pop() {
			Some(id) => {
				self.free_set.remove(&id);
				id
			},
			None => {
				let id = self.next_entity;
				self.next_entity += 1;
				id
			},
		};

		let entity = Entity { scene: self.id, id };
		self.attach(TRANSFORM_SYSTEM, entity, Transform::from_base);

		log::trace!("Created entity {}", entity);
		entity
	}

	/// Mark `entity` for destruction. Its components are ended and released at the start
	/// of the next [tick](Scene::tick); until then the entity stays fully usable.
	///
	/// Entities that no longer exist, or are being torn down right now, are left alone.
	pub fn destroy(&mut self, entity: Entity) {
		assert_entity_scene(entity, self.id);
		if !self.is_alive(entity) {
			return;
		}
		if self.marked_set.insert(entity.id) {
			log::trace!("Marked entity {} for destruction", entity);
			self.marked_entities.push(entity);
		}
	}

	/// Mark a single component for removal at the start of the next [tick](Scene::tick).
	/// [Transform] components are only removed together with their entity.
	pub fn destroy_component<T: Component>(&mut self, handle: Handle<T>) {
		let component = ComponentId::of::<T>();
		if handle.is_null() || self.is_transform(component) {
			return;
		}
		self.marked_components.push((component, handle.raw()));
	}

	pub fn is_marked_for_destruction(&self, entity: Entity) -> bool {
		entity.scene == self.id && self.marked_set.contains(&entity.id)
	}

	/// Whether `entity` currently exists in this scene.
	pub fn is_alive(&self, entity: Entity) -> bool {
		entity.scene == self.id && self.systems[TRANSFORM_SYSTEM].store.find(entity).is_some()
	}

	pub fn entity_count(&self) -> usize {
		self.systems[TRANSFORM_SYSTEM].store.len()
	}

	/// Iterate over the live entities in [Transform] slot order.
	pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
		self.storage::<Transform>().into_iter().flat_map(|storage| storage.iter().map(|t| t.entity()))
	}

	/// Run one frame.
	///
	/// 1. Every component of every entity marked for destruction is collected.
	/// 2. Each collected (or individually marked) component is ended and released.
	/// 3. `on_tick`, then `on_late_tick`, then `on_pre_render` run over all systems.
	///
	/// # Panics
	/// Panics when called from inside a hook.
	pub fn tick(&mut self, dt: f32) {
		match self.state {
			State::Idle => {},
			State::Ticking => panic!("Recursive call to Scene::tick"),
			State::Clearing => panic!("Scene::tick called while the scene is being cleared"),
		}
		assert_eq!(self.hook_depth, 0, "Scene::tick called from inside a hook");

		self.state = State::Ticking;
		self.sweep();
		for phase in Phase::ALL {
			self.run_phase(phase, dt);
		}

		self.frame += 1;
		self.state = State::Idle;
	}

	/// End and release every component of every entity, then reset the entity id space.
	///
	/// # Panics
	/// Panics when called from inside a hook.
	pub fn clear(&mut self) {
		assert!(
			self.state == State::Idle && self.hook_depth == 0,
			"Scene::clear called from inside a hook"
		);
		self.state = State::Clearing;

		loop {
			let mut ended = false;
			for index in (0..self.systems.len()).rev() {
				let mut handles = self.scratch.take();
				self.systems[index].store.collect_live(&mut handles);
				ended |= !handles.is_empty();

				for handle in handles.iter() {
					self.run_hook(index, Hook::End(*handle));
				}
			}

			if !ended {
				break;
			}
		}

		self.next_entity = 0;
		self.free_entities.clear();
		self.free_set.clear();
		self.marked_entities.clear();
		self.marked_set.clear();
		self.marked_components.clear();
		self.state = State::Idle;

		log::debug!("Scene {} cleared", self.id);
	}

	/// Attach a default-built `T` to `entity` and return its handle.
	///
	/// If `entity` already has a `T`, its handle is returned and nothing else happens.
	/// Returns the null handle if no system serves `T` or the entity does not exist.
	pub fn add_component<T: Component>(&mut self, entity: Entity) -> Handle<T> {
		self.add_component_with(entity, T::from_base)
	}

	/// Attach the `T` built by `init` to `entity` and return its handle.
	/// The base passed to `init` is written back into the component afterwards.
	pub fn add_component_with<T: Component>(
		&mut self, entity: Entity, init: impl FnOnce(ComponentBase) -> T,
	) -> Handle<T> {
		match self.try_add_component_with(entity, init) {
			Ok(handle) => handle,
			Err(error) => {
				log::warn!("Could not add {} to entity {}: {}", type_name::<T>(), entity, error);
				Handle::null()
			},
		}
	}

	pub fn try_add_component<T: Component>(&mut self, entity: Entity) -> Result<Handle<T>, SceneError> {
		self.try_add_component_with(entity, T::from_base)
	}

	pub fn try_add_component_with<T: Component>(
		&mut self, entity: Entity, init: impl FnOnce(ComponentBase) -> T,
	) -> Result<Handle<T>, SceneError> {
		assert_entity_scene(entity, self.id);

		let index = self
			.system_index(ComponentId::of::<T>())
			.ok_or(SceneError::SystemNotRegistered(type_name::<T>()))?;
		if !self.is_alive(entity) {
			return Err(SceneError::DeadEntity(entity));
		}

		Ok(self.attach(index, entity, init))
	}

	/// The handle of the `T` attached to `entity`, or the null handle.
	pub fn get_component<T: Component>(&self, entity: Entity) -> Handle<T> {
		assert_entity_scene(entity, self.id);
		match self.storage::<T>() {
			Some(storage) => storage.find(entity).unwrap_or_default(),
			None => Handle::null(),
		}
	}

	pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
		!self.get_component::<T>(entity).is_null()
	}

	/// End and release the `T` attached to `entity`.
	///
	/// Returns `false` if there is no such component. A [Transform] is never removed this
	/// way; [destroy](Scene::destroy) the entity instead.
	pub fn remove_component<T: Component>(&mut self, entity: Entity) -> bool {
		assert_entity_scene(entity, self.id);

		let component = ComponentId::of::<T>();
		if self.is_transform(component) {
			log::warn!("Refusing to remove the Transform of entity {}; destroy the entity instead", entity);
			return false;
		}

		let index = match self.system_index(component) {
			Some(index) => index,
			None => return false,
		};

		match self.systems[index].store.find(entity) {
			Some(handle) => {
				self.run_hook(index, Hook::End(handle));
				true
			},
			None => false,
		}
	}

	/// Resolve `handle` to the component it names.
	pub fn get<T: Component>(&self, handle: Handle<T>) -> Option<&T> {
		self.resolve(handle).ok()
	}

	/// Resolve `handle` to the component it names, mutably.
	pub fn get_mut<T: Component>(&mut self, handle: Handle<T>) -> Option<&mut T> {
		self.resolve_mut(handle).ok()
	}

	/// The storage of every `T` in the scene, if a system serves `T`.
	pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
		let index = self.system_index(ComponentId::of::<T>())?;
		self.systems[index].store.as_any().downcast_ref()
	}

	pub fn component_count<T: Component>(&self) -> usize {
		self.storage::<T>().map_or(0, |storage| storage.len())
	}

	pub fn component_capacity<T: Component>(&self) -> Option<usize> {
		self.storage::<T>().map(|storage| storage.capacity())
	}

	/// The registered system of type `S`.
	/// Returns [None] while one of that system's own hooks is running.
	pub fn system<S: System>(&self) -> Option<&S> {
		let index = self.system_index(ComponentId::of::<S::Component>())?;
		self.systems[index].system.as_ref()?.as_any().downcast_ref()
	}

	/// The registered system of type `S`, mutably.
	/// Returns [None] while one of that system's own hooks is running.
	pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
		let index = self.system_index(ComponentId::of::<S::Component>())?;
		self.systems[index].system.as_mut()?.as_any_mut().downcast_mut()
	}

	/// Names of the registered systems in dispatch order.
	pub fn system_names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.systems.iter().map(|entry| entry.name)
	}

	fn system_index(&self, component: ComponentId) -> Option<usize> {
		self.systems.iter().position(|entry| entry.component == component)
	}

	fn is_transform(&self, component: ComponentId) -> bool {
		self.systems[TRANSFORM_SYSTEM].component == component
	}

	fn storage_at_mut<T: Component>(&mut self, index: usize) -> &mut ComponentStorage<T> {
		match self.systems[index].store.as_any_mut().downcast_mut() {
			Some(storage) => storage,
			None => unreachable!("System at index {} does not store {}", index, type_name::<T>()),
		}
	}

	fn attach<T: Component>(
		&mut self, index: usize, entity: Entity, init: impl FnOnce(ComponentBase) -> T,
	) -> Handle<T> {
		let (handle, created) = self.storage_at_mut::<T>(index).attach(entity, init);
		if created {
			self.run_hook(index, Hook::Begin(handle.raw()));
		}
		handle
	}

	fn sweep(&mut self) {
		// Marks stay set during teardown so hooks destroying their own entity are no-ops.
		let entities = std::mem::take(&mut self.marked_entities);

		for entity in entities.iter() {
			for entry in self.systems.iter() {
				if let Some(handle) = entry.store.find(*entity) {
					self.marked_components.push((entry.component, handle));
				}
			}
		}

		let components = std::mem::take(&mut self.marked_components);
		for (component, handle) in components {
			if let Some(index) = self.system_index(component) {
				self.run_hook(index, Hook::End(handle));
			}
		}

		for entity in entities.iter() {
			self.marked_set.remove(&entity.id);
		}

		for entity in entities {
			if self.systems.iter().any(|entry| entry.store.find(entity).is_some()) {
				// Something attached a component while the entity was being torn down.
				log::warn!("Entity {} gained components during its destruction", entity);
				self.marked_set.insert(entity.id);
				self.marked_entities.push(entity);
			} else if entity.id < self.next_entity && self.free_set.insert(entity.id) {
				log::trace!("Destroyed entity {}", entity);
				self.free_entities.push(entity.id);
			}
		}
	}

	fn run_phase(&mut self, phase: Phase, dt: f32) {
		let mut index = 0;
		while index < self.systems.len() {
			let mut handles = self.scratch.take();
			self.systems[index].store.collect_live(&mut handles);

			for handle in handles.iter() {
				self.run_hook(index, Hook::Phase(phase, *handle, dt));
			}
			index += 1;
		}
	}

	fn run_hook(&mut self, index: usize, hook: Hook) {
		let mut system = match self.systems[index].system.take() {
			Some(system) => system,
			None => {
				self.systems[index].queued.push_back(hook);
				return;
			},
		};

		self.invoke(system.as_mut(), index, hook);
		while let Some(hook) = self.systems[index].queued.pop_front() {
			self.invoke(system.as_mut(), index, hook);
		}

		self.systems[index].system = Some(system);
	}

	fn invoke(&mut self, system: &mut dyn AnySystem, index: usize, hook: Hook) {
		self.hook_depth += 1;
		match hook {
			Hook::Begin(handle) => {
				if self.systems[index].store.is_live(handle) {
					system.begin(self, handle);
				}
			},
			Hook::End(handle) => {
				if self.systems[index].store.is_live(handle) {
					system.end(self, handle);
					self.systems[index].store.release(handle);
				}
			},
			Hook::Phase(phase, handle, dt) => {
				if self.systems[index].store.is_live(handle) {
					system.phase(self, phase, handle, dt);
				}
			},
		}
		self.hook_depth -= 1;
	}
}

impl<T: Component> Resolve<T> for Scene {
	fn resolve(&self, handle: Handle<T>) -> Result<&T, HandleError> {
		if handle.is_null() {
			return Err(HandleError::Null);
		}
		match self.storage::<T>() {
			Some(storage) => storage.resolve(handle),
			None => Err(HandleError::Unregistered(type_name::<T>())),
		}
	}

	fn resolve_mut(&mut self, handle: Handle<T>) -> Result<&mut T, HandleError> {
		if handle.is_null() {
			return Err(HandleError::Null);
		}
		let index = self
			.system_index(ComponentId::of::<T>())
			.ok_or(HandleError::Unregistered(type_name::<T>()))?;
		self.storage_at_mut::<T>(index).resolve_mut(handle)
	}
}

impl Default for Scene {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Scene {
	fn drop(&mut self) {
		if self.state == State::Idle && !std::thread::panicking() {
			self.clear();
		}
	}
}
