use crate::components::Transform;
use crate::systems::System;
use crate::handles::Handle;
use crate::scene::Scene;

/// The default [System] for [Transform], registered by every [Scene].
///
/// Refreshes each transform's world matrix during `on_tick`.
#[derive(Default)]
pub struct TransformSystem;

impl System for TransformSystem {
	type Component = Transform;

	fn on_tick(&mut self, scene: &mut Scene, handle: Handle<Transform>, _dt: f32) {
		if let Some(transform) = scene.get_mut(handle) {
			transform.update_world();
		}
	}
}
