extern crate self as strata_ecs;

pub mod data_structures;
pub mod components;
pub mod entities;
pub mod handles;
pub mod systems;
pub mod scene;
pub mod error;

pub mod prelude {
	pub use crate::systems::{ComponentStorage, System, TransformSystem};
	pub use crate::components::{Component, ComponentBase, ComponentId, Transform};
	pub use crate::scene::{Phase, Scene, SceneConfig};
	pub use crate::handles::{Handle, Resolve};
	pub use crate::error::{HandleError, SceneError};
	pub use crate::entities::Entity;
}

#[cfg(test)]
mod tests;
