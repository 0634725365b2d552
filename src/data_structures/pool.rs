use std::ops::{Deref, DerefMut};
use std::cell::RefCell;
use std::rc::Rc;

/// A recycler for scratch vectors.
///
/// Vectors taken from the pool are handed back automatically when the borrow is dropped,
/// so repeated passes reuse the same allocations. Clones share the same free list.
#[derive(Clone)]
pub struct VecPool<T> {
	free: Rc<RefCell<Vec<Vec<T>>>>,
}

pub struct PooledVec<T> {
	vec: Vec<T>,
	free: Rc<RefCell<Vec<Vec<T>>>>,
}

impl<T> VecPool<T> {
	pub fn new() -> Self {
		Self {
			free: Rc::new(RefCell::new(Vec::new())),
		}
	}

	/// Take an empty vector from the pool.
	pub fn take(&self) -> PooledVec<T> {
		let vec = self.free.borrow_mut().pop().unwrap_or_default();
		debug_assert!(vec.is_empty());

		PooledVec {
			vec,
			free: self.free.clone(),
		}
	}
}

impl<T> Default for VecPool<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Deref for PooledVec<T> {
	type Target = Vec<T>;
	fn deref(&self) -> &Self::Target {
		&self.vec
	}
}

impl<T> DerefMut for PooledVec<T> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.vec
	}
}

impl<T> Drop for PooledVec<T> {
	fn drop(&mut self) {
		let mut vec = std::mem::take(&mut self.vec);
		vec.clear();
		self.free.borrow_mut().push(vec);
	}
}
