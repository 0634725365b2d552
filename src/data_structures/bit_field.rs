use std::iter::repeat;

const BITS: usize = 32;
const FIRST_BIT: u32 = 1 << (BITS - 1);

/// A dynamically sized bit-field.
///
/// Bits are stored most-significant first within each word, so ascending bit
/// indices map to descending bit positions inside a `u32`.
#[derive(Default, Clone, Debug)]
pub struct BitField {
	values: Vec<u32>,
}

impl BitField {
	/// Create a new [BitField].
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a new [BitField] with the specified capacity.
	///
	/// # Arguments
	/// * `capacity` - A usize representing the container's target capacity in bits
	pub fn with_capacity(capacity: usize) -> Self {
		let mut instance = Self { values: Vec::new() };
		instance.ensure_capacity(capacity);
		instance
	}

	/// Get the value of the bit at index `i`.
	/// Bits past the end of the field read as unset.
	///
	/// # Arguments
	/// * `i` - The index of the element to retrieve
	#[inline(always)]
	pub fn get(&self, i: usize) -> bool {
		let (position, shift) = Self::pos_shift(i);
		match self.values.get(position) {
			Some(word) => (word & (FIRST_BIT >> shift)) != 0,
			None => false,
		}
	}

	/// Set the value of the bit at index `i`.
	/// Setting a bit past the end of the field extends it.
	///
	/// # Arguments
	/// * `i` - The index of the element to modify
	#[inline(always)]
	pub fn set(&mut self, i: usize, value: bool) {
		let (position, shift) = Self::pos_shift(i);
		let bit = FIRST_BIT >> shift;

		if value {
			if self.values.len() <= position {
				self.ensure_capacity(i + 1);
			}
			self.values[position] |= bit;
		} else if let Some(word) = self.values.get_mut(position) {
			*word &= !bit;
		}
	}

	/// Set all bits to 0.
	pub fn clear(&mut self) {
		self.values.fill(0);
	}

	/// Set the minimum capacity of the [BitField].
	///
	/// # Arguments
	/// * `capacity` - A usize representing the container's minimum capacity in bits
	pub fn ensure_capacity(&mut self, capacity: usize) {
		let words = Self::words_for(capacity);
		if self.values.len() < words {
			let count = words - self.values.len();
			self.values.extend(repeat(0).take(count));
		}
	}

	/// Drop every bit at or past `capacity`.
	pub fn truncate(&mut self, capacity: usize) {
		self.values.truncate(Self::words_for(capacity));

		let (position, shift) = Self::pos_shift(capacity);
		if shift != 0 {
			if let Some(word) = self.values.get_mut(position) {
				*word &= !(u32::MAX >> shift);
			}
		}
	}

	/// Get the [BitField]'s capacity in bits.
	pub fn capacity(&self) -> usize {
		self.values.len() * BITS
	}

	/// Count the set bits.
	pub fn count_ones(&self) -> usize {
		self.values.iter().map(|word| word.count_ones() as usize).sum()
	}

	/// Find the lowest unset bit below `limit`.
	///
	/// # Arguments
	/// * `limit` - Bits at or past this index are not considered
	pub fn first_unset(&self, limit: usize) -> Option<usize> {
		for (position, word) in self.values.iter().enumerate() {
			let start = position * BITS;
			if start >= limit {
				return None;
			}
			if *word != u32::MAX {
				let index = start + word.leading_ones() as usize;
				return if index < limit { Some(index) } else { None };
			}
		}

		let start = self.values.len() * BITS;
		if start < limit {
			Some(start)
		} else {
			None
		}
	}

	/// Iterate over the indices of the set bits in ascending order.
	pub fn iter_ones(&self) -> Ones {
		Ones {
			position: 0,
			current: self.values.first().copied().unwrap_or(0),
			values: &self.values,
		}
	}

	#[inline(always)]
	fn pos_shift(a: usize) -> (usize, usize) {
		(a / BITS, a % BITS)
	}

	#[inline(always)]
	fn words_for(capacity: usize) -> usize {
		(capacity + BITS - 1) / BITS
	}
}

/// Iterates over the set bits of a [BitField].
pub struct Ones<'l> {
	position: usize,
	current: u32,
	values: &'l [u32],
}

impl Iterator for Ones<'_> {
	type Item = usize;

	fn next(&mut self) -> Option<Self::Item> {
		while self.current == 0 {
			self.position += 1;
			self.current = *self.values.get(self.position)?;
		}

		let shift = self.current.leading_zeros() as usize;
		self.current &= !(FIRST_BIT >> shift);
		Some(self.position * BITS + shift)
	}
}
