//! [Components](Component) are the data attached to [entities](crate::entities::Entity).
//!
//! Each component type is served by exactly one [System](crate::systems::System) registered
//! with the [Scene](crate::scene::Scene), and an entity holds at most one component of each type.

mod component;
mod transform;
mod component_id;

pub use component::*;
pub use transform::*;
pub use component_id::*;
pub use strata_ecs_derive::Component;
