//! Gaze Arena - agents who must hold each other's gaze to stay inside
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (agents, vision, orchestration)
//! - `config`: Flat run configuration with validation
//! - `stats`: Roster reduction into display counters
//! - `web`: wasm-bindgen surface for a browser render host

pub mod config;
pub mod sim;
pub mod stats;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, SimConfig};
pub use sim::{Agent, Regime, RunPhase, SimEvent, Simulation};
pub use stats::Statistics;

use glam::Vec2;

/// Simulation tuning constants
pub mod consts {
    use std::f32::consts::{FRAC_PI_2, PI};

    /// Cruising speed of a free or approaching agent (arena units per second)
    pub const AGENT_SPEED: f32 = 50.0;
    /// Lower bound on each velocity component when velocity is (re)drawn
    pub const MIN_VELOCITY_COMPONENT: f32 = 10.0;
    /// Speed boost while walking out to the edge
    pub const EDGE_SPEED_MULTIPLIER: f32 = 2.5;
    /// Distance at which an edge-seeking agent counts as arrived
    pub const EDGE_ARRIVAL_EPSILON: f32 = 1.0;
    /// Per-tick chance a free agent picks a brand new velocity
    pub const RANDOM_TURN_CHANCE: f64 = 0.01;

    /// Per-tick chance a free agent glances somewhere new
    pub const HEAD_GLANCE_CHANCE: f64 = 0.02;
    /// Max glance offset from body heading (either side)
    pub const HEAD_GLANCE_SPREAD: f32 = FRAC_PI_2;

    /// Per-tick chance an excluded agent snaps its gaze to a random interior point
    pub const GAZE_JUMP_CHANCE: f64 = 0.2;
    /// Half-width of the excluded search sweep (~81 degrees each way)
    pub const GAZE_SWEEP_AMPLITUDE: f32 = 0.45 * PI;
    /// Angular frequency of the search sweep (radians per excluded second)
    pub const GAZE_SWEEP_FREQUENCY: f32 = 1.2;
    /// Head turns faster while searching from the edge
    pub const EXCLUDED_HEAD_SPEED_MULTIPLIER: f32 = 1.5;

    /// How far a re-entering agent is pushed in from the wall
    pub const REENTRY_NUDGE: f32 = 20.0;
    /// Spawn distance outside the arena perimeter
    pub const SPAWN_OUTSET: f32 = 20.0;
    /// Vision range as a fraction of the arena side
    pub const VISION_DISTANCE_FACTOR: f32 = 0.8;

    /// Frame deltas outside (0, MAX_FRAME_ELAPSED] are dropped
    pub const MAX_FRAME_ELAPSED: f64 = 1.0;
}

/// Wrap an angle into (-π, π]
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle % TAU;
    if wrapped > PI {
        wrapped - TAU
    } else if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Heading of a vector in radians (0 = +x, counter-clockwise)
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector for a heading
#[inline]
pub fn direction(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
