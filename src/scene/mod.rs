//! The [Scene] owns the systems, the entity id space and the per-frame schedule.

mod phase;
mod scene;
mod config;

pub use phase::*;
pub use scene::*;
pub use config::*;
