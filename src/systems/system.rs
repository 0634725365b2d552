use crate::components::Component;
use crate::handles::{Handle, RawHandle};
use crate::scene::{Phase, Scene};
use std::any::Any;
use paste::paste;

/// Provides the behaviour of one [Component] type.
///
/// The [Scene] calls `on_begin` once when a component is attached and `on_end` once before
/// it is released. Every [Scene::tick] then calls `on_tick`, `on_late_tick` and
/// `on_pre_render` for each attached component, one phase at a time across all systems.
///
/// Every hook receives the scene and the handle of the component it is called for.
/// Hooks may freely add, remove or destroy anything through the scene; a hook is never
/// called while another hook of the same system is still running.
pub trait System: 'static {
	type Component: Component;

	fn on_begin(&mut self, _scene: &mut Scene, _handle: Handle<Self::Component>) {}

	fn on_tick(&mut self, _scene: &mut Scene, _handle: Handle<Self::Component>, _dt: f32) {}

	fn on_late_tick(&mut self, _scene: &mut Scene, _handle: Handle<Self::Component>, _dt: f32) {}

	fn on_pre_render(&mut self, _scene: &mut Scene, _handle: Handle<Self::Component>, _dt: f32) {}

	fn on_end(&mut self, _scene: &mut Scene, _handle: Handle<Self::Component>) {}
}

/// Object-safe view of a [System] used by the [Scene] to drive it without knowing its type.
pub(crate) trait AnySystem {
	fn begin(&mut self, scene: &mut Scene, handle: RawHandle);
	fn end(&mut self, scene: &mut Scene, handle: RawHandle);
	fn phase(&mut self, scene: &mut Scene, phase: Phase, handle: RawHandle, dt: f32);
	fn as_any(&self) -> &dyn Any;
	fn as_any_mut(&mut self) -> &mut dyn Any;
}

macro_rules! dispatch_phase {
	($system: expr, $scene: expr, $phase: expr, $handle: expr, $dt: expr, [$($name: ident),*]) => {
		paste! {
			match $phase {
				$(Phase::[<$name:camel>] => $system.[<on_ $name>]($scene, Handle::from_raw($handle), $dt),)*
			}
		}
	};
}

impl<S: System> AnySystem for S {
	fn begin(&mut self, scene: &mut Scene, handle: RawHandle) {
		self.on_begin(scene, Handle::from_raw(handle))
	}

	fn end(&mut self, scene: &mut Scene, handle: RawHandle) {
		self.on_end(scene, Handle::from_raw(handle))
	}

	fn phase(&mut self, scene: &mut Scene, phase: Phase, handle: RawHandle, dt: f32) {
		dispatch_phase!(self, scene, phase, handle, dt, [tick, late_tick, pre_render])
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}
