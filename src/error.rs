//! Error types for the recoverable parts of the API.
//!
//! Precondition violations (reserving from a full allocator, using an entity with the wrong
//! [Scene](crate::scene::Scene), ...) are programmer errors and panic instead.

use crate::data_structures::AllocatorId;
use crate::entities::Entity;
use thiserror::Error;

/// Why a [Handle](crate::handles::Handle) could not be resolved.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum HandleError {
	#[error("handle is null")]
	Null,

	#[error("handle was issued by allocator {found}, not by allocator {expected}")]
	ForeignAllocator { expected: AllocatorId, found: AllocatorId },

	#[error("slot {index} is out of bounds (capacity {capacity})")]
	OutOfBounds { index: usize, capacity: usize },

	#[error("slot {index} does not hold a value")]
	Vacant { index: usize },

	#[error("no storage for `{0}` is registered")]
	Unregistered(&'static str),

	#[error("slot {index} was released since the handle was issued (generation {expected}, slot is at {found})")]
	Stale { index: usize, expected: u32, found: u32 },
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum SceneError {
	#[error("a system for component `{0}` is already registered")]
	SystemAlreadyRegistered(&'static str),

	#[error("no system is registered for component `{0}`")]
	SystemNotRegistered(&'static str),

	#[error("entity {0} does not exist")]
	DeadEntity(Entity),
}
