/// Sizing parameters of a [Scene](crate::scene::Scene).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SceneConfig {
	/// Number of component slots each system's storage starts with.
	pub initial_capacity: usize,
	/// Number of slots added to a system's storage each time it runs full.
	pub growth_increment: usize,
}

impl SceneConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
		self.initial_capacity = capacity;
		self
	}

	/// # Panics
	/// Panics if `increment` is 0.
	pub fn with_growth_increment(mut self, increment: usize) -> Self {
		assert!(increment > 0, "SceneConfig growth increment must not be 0");
		self.growth_increment = increment;
		self
	}
}

impl Default for SceneConfig {
	fn default() -> Self {
		Self {
			initial_capacity: 32,
			growth_increment: 32,
		}
	}
}
