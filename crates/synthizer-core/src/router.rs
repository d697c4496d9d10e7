//! Sparse source-to-effect routing table with linear gain-ramp fades.
//!
//! Grounded on the teacher's mixer command/ramp design (`RampState` with
//! `remaining`/`step`/`target`, driven by `SetGain`/`SwapRouting`-style
//! commands), generalized from per-track gain to per-route fade state.

use std::collections::HashMap;

use crate::handle::Handle;

/// Identifies a single route between a source and an effect/destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RouteId(pub u64);

/// Lifecycle state of a route's gain ramp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FadeState {
    /// Ramping from zero up to `target_gain`.
    FadingIn,
    /// Holding at `target_gain`.
    Steady,
    /// Ramping from `current_gain` down to zero; removed once it reaches it.
    FadingOut,
    /// Fully faded out; the route is removed at the next tick boundary.
    Dead,
}

/// One route's mixing state.
#[derive(Clone, Copy, Debug)]
pub struct Route {
    /// Source-side endpoint.
    pub from: Handle,
    /// Effect/destination-side endpoint.
    pub to: Handle,
    /// Gain applied this tick, linearly interpolated towards `target_gain`.
    pub current_gain: f32,
    /// Gain the ramp is heading towards.
    pub target_gain: f32,
    /// Samples remaining until `current_gain` reaches `target_gain`.
    pub samples_remaining: u32,
    /// Per-sample gain increment applied while ramping.
    pub step: f32,
    /// Current lifecycle phase.
    pub state: FadeState,
}

impl Route {
    fn new(from: Handle, to: Handle, target_gain: f32, ramp_samples: u32) -> Self {
        let mut route = Self {
            from,
            to,
            current_gain: 0.0,
            target_gain,
            samples_remaining: 0,
            step: 0.0,
            state: FadeState::Steady,
        };
        route.start_ramp(target_gain, ramp_samples, FadeState::FadingIn);
        route
    }

    fn start_ramp(&mut self, target: f32, ramp_samples: u32, state: FadeState) {
        self.target_gain = target;
        self.samples_remaining = ramp_samples.max(1);
        self.step = (target - self.current_gain) / self.samples_remaining as f32;
        self.state = state;
    }

    /// Advances the ramp by one sample, returning the gain to apply.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current_gain += self.step;
            self.samples_remaining -= 1;
            if self.samples_remaining == 0 {
                self.current_gain = self.target_gain;
                self.state = match self.state {
                    FadeState::FadingOut => FadeState::Dead,
                    _ => FadeState::Steady,
                };
            }
        }
        self.current_gain
    }

    /// Whether this route has finished fading out and should be dropped.
    pub fn is_dead(&self) -> bool {
        self.state == FadeState::Dead
    }
}

/// Sparse table of active routes, keyed by [`RouteId`].
#[derive(Default)]
pub struct Router {
    routes: HashMap<RouteId, Route>,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new route fading in to `gain` over `ramp_samples`.
    pub fn add_route(&mut self, id: RouteId, from: Handle, to: Handle, gain: f32, ramp_samples: u32) {
        self.routes.insert(id, Route::new(from, to, gain, ramp_samples));
    }

    /// Begins fading `id` out over `ramp_samples`; the route is dropped once
    /// the fade completes (see [`Router::reap_dead_routes`]).
    pub fn remove_route(&mut self, id: RouteId, ramp_samples: u32) {
        if let Some(route) = self.routes.get_mut(&id) {
            route.start_ramp(0.0, ramp_samples, FadeState::FadingOut);
        }
    }

    /// Iterates all routes whose source is `from`.
    pub fn routes_from(&self, from: Handle) -> impl Iterator<Item = &Route> {
        self.routes.values().filter(move |route| route.from == from)
    }

    /// Mutable iterator over every route, for per-sample ramp advancement.
    pub fn routes_mut(&mut self) -> impl Iterator<Item = &mut Route> {
        self.routes.values_mut()
    }

    /// Mutable iterator over every route whose source is `from`, for mixing
    /// one source's output into each of its destinations' input buses.
    pub fn routes_from_mut(&mut self, from: Handle) -> impl Iterator<Item = &mut Route> {
        self.routes.values_mut().filter(move |route| route.from == from)
    }

    /// Drops every route whose fade-out has completed. Called once per tick
    /// after advancing all ramps.
    pub fn reap_dead_routes(&mut self) {
        self.routes.retain(|_, route| !route.is_dead());
    }

    /// Number of currently active routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the router currently has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
