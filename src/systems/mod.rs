//! [Systems](System) provide the behaviour of [Components](crate::components::Component).
//!
//! A [System] must be registered with a [Scene](crate::scene::Scene) before components of its
//! type can be attached. The scene keeps the components in a [ComponentStorage] next to the system
//! and calls the system's hooks for each of them.

mod system;
mod transform_system;
mod component_storage;

pub use system::*;
pub use transform_system::*;
pub use component_storage::*;
