//! Agent entity and movement regime
//!
//! Every agent is in exactly one [`Regime`]. The lifecycle flags hosts care
//! about (`is_inside`, `is_excluded`, `is_moving_to_edge`) are derived from it,
//! so they can never disagree with each other.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::{Arena, Wall};
use super::vision::ViewCone;
use crate::config::SimConfig;
use crate::consts::*;
use crate::{heading, normalize_angle};

/// Movement regime of an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Regime {
    /// Walking in from the spawn point outside the arena
    Approaching,
    /// Random walk inside the arena
    Free,
    /// Timed out; walking to the nearest wall
    EdgeSeeking { target: Vec2, wall: Wall },
    /// Standing on the boundary, searching for someone to look back
    Excluded { wall: Wall, search_time: f32 },
}

/// Coarse state used by renderers to pick colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateCategory {
    Approaching,
    Free,
    InContact,
    MovingToEdge,
    Excluded,
}

impl StateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateCategory::Approaching => "approaching",
            StateCategory::Free => "free",
            StateCategory::InContact => "in_contact",
            StateCategory::MovingToEdge => "moving_to_edge",
            StateCategory::Excluded => "excluded",
        }
    }
}

/// Per-agent accumulators; only a restart resets them
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub total_time_inside: f64,
    pub total_time_outside: f64,
    pub exit_count: u32,
    pub eye_contact_count: u32,
}

/// A participant in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading of the velocity (radians)
    pub body_direction: f32,
    /// Where the agent is looking (radians)
    pub head_direction: f32,
    /// Angle the head eases toward
    pub head_rotation_target: f32,
    /// Full vision cone width (radians)
    pub vision_angle: f32,
    pub vision_distance: f32,
    pub regime: Regime,
    /// Current eye-contact partner, looked up by id
    pub eye_contact_partner: Option<u32>,
    /// Simulation time of the last tick with mutual contact
    pub last_eye_contact_time: f64,
    /// Simulation time up to which inside/outside time has been attributed
    pub last_status_change_time: f64,
    pub stats: AgentStats,
}

impl Agent {
    pub fn new(id: u32, position: Vec2, vision_angle: f32, vision_distance: f32) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            body_direction: 0.0,
            head_direction: 0.0,
            head_rotation_target: 0.0,
            vision_angle,
            vision_distance,
            regime: Regime::Approaching,
            eye_contact_partner: None,
            last_eye_contact_time: 0.0,
            last_status_change_time: 0.0,
            stats: AgentStats::default(),
        }
    }

    /// Create an approaching agent at `position`, heading for the arena centre
    pub fn spawn(id: u32, position: Vec2, config: &SimConfig, rng: &mut impl Rng) -> Self {
        let mut agent = Self::new(
            id,
            position,
            config.vision_angle_radians(),
            config.vision_distance(),
        );
        agent.aim_at_centre(rng);
        agent.head_direction = agent.body_direction;
        agent.head_rotation_target = agent.body_direction;
        agent
    }

    #[inline]
    pub fn is_inside(&self) -> bool {
        matches!(self.regime, Regime::Free | Regime::EdgeSeeking { .. })
    }

    #[inline]
    pub fn is_excluded(&self) -> bool {
        matches!(
            self.regime,
            Regime::EdgeSeeking { .. } | Regime::Excluded { .. }
        )
    }

    #[inline]
    pub fn is_moving_to_edge(&self) -> bool {
        matches!(self.regime, Regime::EdgeSeeking { .. })
    }

    /// Point on the boundary the agent is walking to, while edge-seeking
    pub fn edge_target(&self) -> Option<Vec2> {
        match self.regime {
            Regime::EdgeSeeking { target, .. } => Some(target),
            _ => None,
        }
    }

    #[inline]
    pub fn has_eye_contact(&self) -> bool {
        self.eye_contact_partner.is_some()
    }

    /// Agents that take part in eye-contact scans as candidates
    #[inline]
    pub fn is_contact_candidate(&self) -> bool {
        !self.is_excluded()
    }

    pub fn category(&self) -> StateCategory {
        match self.regime {
            Regime::Approaching => StateCategory::Approaching,
            Regime::Free if self.has_eye_contact() => StateCategory::InContact,
            Regime::Free => StateCategory::Free,
            Regime::EdgeSeeking { .. } => StateCategory::MovingToEdge,
            Regime::Excluded { .. } => StateCategory::Excluded,
        }
    }

    pub fn view_cone(&self) -> ViewCone {
        ViewCone {
            origin: self.position,
            facing: self.head_direction,
            angle: self.vision_angle,
            range: self.vision_distance,
        }
    }

    /// Point velocity at the arena centre
    pub fn aim_at_centre(&mut self, rng: &mut impl Rng) {
        let inward = -self.position.normalize_or_zero() * AGENT_SPEED;
        self.set_velocity(enforce_min_components(inward, rng));
    }

    /// Draw a fresh random velocity
    pub fn randomize_velocity(&mut self, rng: &mut impl Rng) {
        self.set_velocity(random_velocity(rng));
    }

    pub(crate) fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
        if velocity != Vec2::ZERO {
            self.body_direction = heading(velocity);
        }
    }

    /// Ease the head toward its target along the shortest arc
    pub fn ease_head(&mut self, dt: f32, gain: f32) {
        let diff = normalize_angle(self.head_rotation_target - self.head_direction);
        let step = (gain * dt).clamp(0.0, 1.0);
        self.head_direction = normalize_angle(self.head_direction + diff * step);
    }

    /// Attribute time since the last status change to inside or outside
    pub fn record_time(&mut self, now: f64) {
        let elapsed = (now - self.last_status_change_time).max(0.0);
        if self.is_inside() {
            self.stats.total_time_inside += elapsed;
        } else {
            self.stats.total_time_outside += elapsed;
        }
        self.last_status_change_time = now;
    }

    /// Leave free movement and head for the nearest wall
    pub fn begin_edge_seek(&mut self, arena: &Arena) {
        let wall = arena.nearest_wall(self.position);
        let target = arena.project_onto(self.position, wall);
        self.regime = Regime::EdgeSeeking { target, wall };
        self.eye_contact_partner = None;
        self.stats.exit_count += 1;
        let speed = AGENT_SPEED * EDGE_SPEED_MULTIPLIER;
        self.set_velocity((target - self.position).normalize_or_zero() * speed);
        self.head_rotation_target = self.body_direction;
    }

    /// Stop on the boundary and start searching
    pub fn settle(&mut self, wall: Wall) {
        self.velocity = Vec2::ZERO;
        self.regime = Regime::Excluded {
            wall,
            search_time: 0.0,
        };
        self.head_rotation_target = wall.inward_angle();
    }

    /// Come back in after catching `partner`'s eye from the boundary
    ///
    /// Returns true if this starts a new contact.
    pub fn reenter(
        &mut self,
        partner: &Agent,
        arena: &Arena,
        now: f64,
        rng: &mut impl Rng,
    ) -> bool {
        let wall = match self.regime {
            Regime::Excluded { wall, .. } => wall,
            _ => arena.nearest_wall(self.position),
        };
        let inner = Arena {
            half_size: (arena.half_size - REENTRY_NUDGE).max(0.0),
        };
        self.position = inner.clamp(self.position + wall.inward_normal() * REENTRY_NUDGE);
        self.regime = Regime::Free;
        self.randomize_velocity(rng);
        self.acquire_contact(partner, now)
    }

    /// Record mutual contact with `partner` this tick
    ///
    /// Returns true on a rising edge (no contact last tick).
    pub(crate) fn acquire_contact(&mut self, partner: &Agent, now: f64) -> bool {
        let rising = !self.has_eye_contact();
        self.eye_contact_partner = Some(partner.id);
        self.last_eye_contact_time = now;
        if rising {
            self.stats.eye_contact_count += 1;
        }
        let offset = partner.position - self.position;
        if offset != Vec2::ZERO {
            self.head_rotation_target = heading(offset);
        }
        rising
    }
}

/// Random velocity with both components clear of zero
pub fn random_velocity(rng: &mut impl Rng) -> Vec2 {
    let v = Vec2::new(
        rng.random_range(-AGENT_SPEED..=AGENT_SPEED),
        rng.random_range(-AGENT_SPEED..=AGENT_SPEED),
    );
    enforce_min_components(v, rng)
}

/// Push each component out to at least `MIN_VELOCITY_COMPONENT`, keeping its sign
pub fn enforce_min_components(v: Vec2, rng: &mut impl Rng) -> Vec2 {
    let mut fix = |c: f32| {
        if c.abs() >= MIN_VELOCITY_COMPONENT {
            c
        } else if c > 0.0 {
            MIN_VELOCITY_COMPONENT
        } else if c < 0.0 {
            -MIN_VELOCITY_COMPONENT
        } else if rng.random_bool(0.5) {
            MIN_VELOCITY_COMPONENT
        } else {
            -MIN_VELOCITY_COMPONENT
        }
    };
    let x = fix(v.x);
    let y = fix(v.y);
    Vec2::new(x, y)
}
