//! [Handles](Handle) are the only sanctioned way to refer to a component or resource across frames.
//!
//! A [Handle] names an allocator and a slot index, plus the generation of that slot.
//! It is resolved on demand through anything implementing [Resolve]; resolution fails cleanly
//! once the slot has been released, even if the slot has since been reused.

mod handle;

pub use handle::*;
