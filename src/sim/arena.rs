//! Square arena geometry
//!
//! The arena is an axis-aligned square centred on the origin. Positions with
//! `|x| <= half_size` and `|y| <= half_size` are inside.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One of the four arena walls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wall {
    Left,
    Right,
    Bottom,
    Top,
}

impl Wall {
    /// Outward compass direction of the wall (radians)
    pub fn outward_angle(self) -> f32 {
        use std::f32::consts::{FRAC_PI_2, PI};
        match self {
            Wall::Right => 0.0,
            Wall::Top => FRAC_PI_2,
            Wall::Left => PI,
            Wall::Bottom => -FRAC_PI_2,
        }
    }

    /// Direction facing the arena interior from this wall
    pub fn inward_angle(self) -> f32 {
        crate::normalize_angle(self.outward_angle() + std::f32::consts::PI)
    }

    /// Unit normal pointing into the arena
    pub fn inward_normal(self) -> Vec2 {
        match self {
            Wall::Right => Vec2::NEG_X,
            Wall::Top => Vec2::NEG_Y,
            Wall::Left => Vec2::X,
            Wall::Bottom => Vec2::Y,
        }
    }
}

/// The square the agents occupy while inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub half_size: f32,
}

impl Arena {
    pub fn new(square_size: f32) -> Self {
        Self {
            half_size: square_size / 2.0,
        }
    }

    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x.abs() <= self.half_size && pos.y.abs() <= self.half_size
    }

    #[inline]
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        pos.clamp(Vec2::splat(-self.half_size), Vec2::splat(self.half_size))
    }

    /// Perpendicular distance from `pos` to a wall
    pub fn distance_to(&self, pos: Vec2, wall: Wall) -> f32 {
        match wall {
            Wall::Left => pos.x + self.half_size,
            Wall::Right => self.half_size - pos.x,
            Wall::Bottom => pos.y + self.half_size,
            Wall::Top => self.half_size - pos.y,
        }
    }

    /// Wall with the smallest perpendicular distance (ties: Left, Right, Bottom, Top)
    pub fn nearest_wall(&self, pos: Vec2) -> Wall {
        [Wall::Left, Wall::Right, Wall::Bottom, Wall::Top]
            .into_iter()
            .min_by(|a, b| {
                self.distance_to(pos, *a)
                    .partial_cmp(&self.distance_to(pos, *b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(Wall::Left)
    }

    /// Project `pos` onto a wall, moving along that wall's axis only
    pub fn project_onto(&self, pos: Vec2, wall: Wall) -> Vec2 {
        match wall {
            Wall::Left => Vec2::new(-self.half_size, pos.y),
            Wall::Right => Vec2::new(self.half_size, pos.y),
            Wall::Bottom => Vec2::new(pos.x, -self.half_size),
            Wall::Top => Vec2::new(pos.x, self.half_size),
        }
    }

    /// Point `outset` beyond `wall`, at fraction `s` along it (counter-clockwise)
    ///
    /// Only the wall's own span is used, so `s` in (0, 1) never lands on a corner.
    pub fn wall_point(&self, wall: Wall, s: f32, outset: f32) -> Vec2 {
        let along = -self.half_size + 2.0 * self.half_size * s.clamp(0.0, 1.0);
        let out = self.half_size + outset;
        match wall {
            Wall::Bottom => Vec2::new(along, -out),
            Wall::Right => Vec2::new(out, along),
            Wall::Top => Vec2::new(-along, out),
            Wall::Left => Vec2::new(-out, -along),
        }
    }

    /// Uniform random point inside the arena
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec2 {
        let h = self.half_size;
        Vec2::new(rng.random_range(-h..=h), rng.random_range(-h..=h))
    }
}
