/// The per-frame hooks of a [System](crate::systems::System), in the order
/// [Scene::tick](crate::scene::Scene::tick) runs them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Phase {
	Tick,
	LateTick,
	PreRender,
}

impl Phase {
	pub const ALL: [Phase; 3] = [Phase::Tick, Phase::LateTick, Phase::PreRender];
}
