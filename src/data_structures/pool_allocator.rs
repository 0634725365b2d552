use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::ptr::NonNull;

/// A fixed-capacity block of equally sized chunks handed out in strict sequential order.
///
/// Chunks cannot be returned individually: the whole pool is released at once with
/// [reset](PoolAllocator::reset), or when the pool is dropped. Nothing stored in a chunk
/// is ever dropped by the pool.
pub struct PoolAllocator {
	block: NonNull<u8>,
	layout: Layout,
	chunk_size: usize,
	stride: usize,
	chunk_count: usize,
	next: usize,
}

impl PoolAllocator {
	/// Create a new [PoolAllocator].
	///
	/// # Arguments
	/// * `chunk_size` - The size in bytes of a single chunk, must not be 0
	/// * `chunk_count` - The number of chunks the pool can hand out
	/// * `align` - The alignment of every chunk, must be a power of two
	pub fn new(chunk_size: usize, chunk_count: usize, align: usize) -> Self {
		assert!(chunk_size > 0, "PoolAllocator chunks must not be empty");
		assert!(align.is_power_of_two(), "PoolAllocator alignment must be a power of two, got {}", align);

		let stride = (chunk_size + align - 1) & !(align - 1);
		let bytes = stride.checked_mul(chunk_count).expect("PoolAllocator capacity overflow");
		let layout = Layout::from_size_align(bytes, align).expect("PoolAllocator capacity overflow");

		let block = if bytes == 0 {
			unsafe { NonNull::new_unchecked(align as *mut u8) }
		} else {
			let ptr = unsafe { alloc(layout) };
			match NonNull::new(ptr) {
				Some(ptr) => ptr,
				None => handle_alloc_error(layout),
			}
		};

		log::debug!(
			"PoolAllocator reserved {} chunks of {} bytes (stride {}, align {})",
			chunk_count,
			chunk_size,
			stride,
			align
		);

		Self {
			block,
			layout,
			chunk_size,
			stride,
			chunk_count,
			next: 0,
		}
	}

	/// Hand out the next chunk.
	///
	/// # Panics
	/// Panics if every chunk has already been handed out; the pool must be sized up front.
	pub fn allocate(&mut self) -> NonNull<u8> {
		match self.try_allocate() {
			Some(chunk) => chunk,
			None => panic!("PoolAllocator exhausted ({} chunks of {} bytes)", self.chunk_count, self.chunk_size),
		}
	}

	/// Hand out the next chunk, or [None] if the pool is exhausted.
	pub fn try_allocate(&mut self) -> Option<NonNull<u8>> {
		if self.next >= self.chunk_count {
			return None;
		}

		let chunk = unsafe { NonNull::new_unchecked(self.block.as_ptr().add(self.next * self.stride)) };
		self.next += 1;
		Some(chunk)
	}

	/// Release every chunk at once.
	/// Pointers previously handed out must no longer be used.
	pub fn reset(&mut self) {
		self.next = 0;
	}

	/// Check whether `ptr` points at the start of a chunk that is currently handed out.
	pub fn contains(&self, ptr: NonNull<u8>) -> bool {
		let start = self.block.as_ptr() as usize;
		let address = ptr.as_ptr() as usize;
		address >= start && address < start + self.next * self.stride && (address - start) % self.stride == 0
	}

	pub fn chunk_size(&self) -> usize {
		self.chunk_size
	}

	/// Distance in bytes between two consecutive chunks.
	pub fn stride(&self) -> usize {
		self.stride
	}

	pub fn align(&self) -> usize {
		self.layout.align()
	}

	pub fn chunk_count(&self) -> usize {
		self.chunk_count
	}

	pub fn allocated(&self) -> usize {
		self.next
	}

	pub fn remaining(&self) -> usize {
		self.chunk_count - self.next
	}

	pub fn is_exhausted(&self) -> bool {
		self.next == self.chunk_count
	}
}

impl Drop for PoolAllocator {
	fn drop(&mut self) {
		if self.layout.size() != 0 {
			unsafe { dealloc(self.block.as_ptr(), self.layout) }
		}
	}
}
