//! Visibility oracle
//!
//! Pure checks of whether one agent's head-centred vision cone covers another.
//! Mutual eye contact is the conjunction of both directions, each evaluated
//! with that agent's own head direction.

use glam::Vec2;

use super::agent::Agent;
use crate::{heading, normalize_angle};

/// A vision cone anchored at an observer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCone {
    pub origin: Vec2,
    /// Centre of the cone (radians)
    pub facing: f32,
    /// Full cone width (radians)
    pub angle: f32,
    pub range: f32,
}

impl ViewCone {
    /// Whether `point` lies within range and inside the angular sector
    ///
    /// A point coincident with the origin has no bearing and counts as visible.
    pub fn covers(&self, point: Vec2) -> bool {
        let offset = point - self.origin;
        let distance = offset.length();
        if distance > self.range {
            return false;
        }
        if distance <= f32::EPSILON {
            return true;
        }
        let off_axis = normalize_angle(heading(offset) - self.facing);
        off_axis.abs() <= self.angle / 2.0
    }
}

/// Whether `observer` can currently see `target`
pub fn can_see(observer: &Agent, target: &Agent) -> bool {
    observer.view_cone().covers(target.position)
}

/// Whether `a` and `b` are looking at each other
pub fn mutual_eye_contact(a: &Agent, b: &Agent) -> bool {
    can_see(a, b) && can_see(b, a)
}
