use crate::components::{Component, ComponentBase};
use nalgebra_glm::{Mat4, Quat, Vec3};
use nalgebra_glm as glm;

/// Position, orientation and scale of an [Entity](crate::entities::Entity).
///
/// Every entity carries exactly one [Transform] from the moment it is created.
/// `world` is recomputed by [TransformSystem](crate::systems::TransformSystem) during
/// `on_tick`, so it is up to date for every other system from `on_late_tick` on.
#[derive(Clone, Debug)]
pub struct Transform {
	base: ComponentBase,
	pub position: Vec3,
	pub rotation: Quat,
	pub scale: Vec3,
	world: Mat4,
}

impl Transform {
	/// The local matrix built from the current position, rotation and scale.
	pub fn local_matrix(&self) -> Mat4 {
		glm::translation(&self.position) * glm::quat_to_mat4(&self.rotation) * glm::scaling(&self.scale)
	}

	/// The matrix computed during the last `on_tick`.
	pub fn world_matrix(&self) -> &Mat4 {
		&self.world
	}

	pub fn translate(&mut self, offset: &Vec3) {
		self.position += offset;
	}

	/// Rotate by `angle` radians around `axis`.
	pub fn rotate(&mut self, angle: f32, axis: &Vec3) {
		self.rotation = glm::quat_angle_axis(angle, axis) * self.rotation;
	}

	pub fn forward(&self) -> Vec3 {
		glm::quat_rotate_vec3(&self.rotation, &Vec3::new(0.0, 0.0, -1.0))
	}

	pub(crate) fn update_world(&mut self) {
		self.world = self.local_matrix();
	}
}

impl Component for Transform {
	fn from_base(base: ComponentBase) -> Self {
		Self {
			base,
			position: Vec3::zeros(),
			rotation: glm::quat_identity(),
			scale: Vec3::new(1.0, 1.0, 1.0),
			world: Mat4::identity(),
		}
	}

	fn base(&self) -> &ComponentBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut ComponentBase {
		&mut self.base
	}
}
