//! Allocation building blocks.
//!
//! [PoolAllocator] hands out raw chunks from one block and frees them all at once.
//! [SlotAllocator] generalizes it to typed, individually released slots and is the
//! storage engine behind every [System](crate::systems::System).

mod pool;
mod any_buffer;
mod bit_field;
mod slot_allocator;
mod pool_allocator;

pub use pool::*;
pub use bit_field::*;
pub use slot_allocator::*;
pub use pool_allocator::*;

pub(crate) use any_buffer::*;
