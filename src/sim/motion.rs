//! Per-agent update
//!
//! One call advances a single agent by one tick: time bookkeeping, eye-contact
//! evaluation, the exclusion timeout, regime movement and head easing, in that
//! order. Other agents are only read, from the roster passed in.

use glam::Vec2;
use rand::Rng;

use super::agent::{Agent, Regime};
use super::arena::{Arena, Wall};
use super::state::SimEvent;
use super::vision::mutual_eye_contact;
use crate::consts::*;
use crate::{heading, normalize_angle};

/// Everything an agent needs to know about the tick it is being advanced in
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    /// Simulation clock after this tick's advance
    pub now: f64,
    /// Simulated seconds covered by this tick
    pub dt: f32,
    pub arena: Arena,
    /// Seconds without contact before a free agent is excluded
    pub timeout: f64,
    /// Clock value before which timeouts are not enforced
    pub grace_until: f64,
    pub head_rotation_speed: f32,
}

impl TickContext {
    #[inline]
    pub fn timeout_armed(&self) -> bool {
        self.now >= self.grace_until
    }
}

impl Agent {
    /// Advance this agent by one tick against `roster`
    pub fn update(
        &mut self,
        roster: &[Agent],
        ctx: &TickContext,
        rng: &mut impl Rng,
        events: &mut Vec<SimEvent>,
    ) {
        self.record_time(ctx.now);

        match self.regime {
            Regime::Approaching | Regime::Free => self.look_for_contact(roster, ctx.now, events),
            Regime::Excluded { .. } => self.look_for_reentry(roster, ctx, rng, events),
            Regime::EdgeSeeking { .. } => {}
        }

        if self.timed_out(ctx) {
            log::debug!(
                "Agent {} excluded after {:.2}s without contact",
                self.id,
                ctx.now - self.last_eye_contact_time
            );
            self.begin_edge_seek(&ctx.arena);
            events.push(SimEvent::Excluded { id: self.id });
        }

        match self.regime {
            Regime::Approaching => self.approach(ctx),
            Regime::Free => self.wander(ctx, rng),
            Regime::EdgeSeeking { target, wall } => self.walk_to_edge(target, wall, ctx, events),
            Regime::Excluded { wall, search_time } => self.search(wall, search_time, ctx, rng),
        }
        self.ease_head(ctx.dt, self.head_gain(ctx.head_rotation_speed));
    }

    /// Excluded agents turn their heads faster while searching
    fn head_gain(&self, base: f32) -> f32 {
        match self.regime {
            Regime::Excluded { .. } => base * EXCLUDED_HEAD_SPEED_MULTIPLIER,
            _ => base,
        }
    }

    /// Free agent, no contact, timeout exceeded, past the grace window
    fn timed_out(&self, ctx: &TickContext) -> bool {
        self.regime == Regime::Free
            && !self.has_eye_contact()
            && ctx.timeout_armed()
            && ctx.now - self.last_eye_contact_time > ctx.timeout
    }

    /// First agent in roster order that looks back, excluded agents skipped
    fn look_for_contact(&mut self, roster: &[Agent], now: f64, events: &mut Vec<SimEvent>) {
        let partner = roster.iter().find(|other| {
            other.id != self.id && other.is_contact_candidate() && mutual_eye_contact(self, other)
        });
        match partner {
            Some(partner) => {
                if self.acquire_contact(partner, now) {
                    events.push(SimEvent::EyeContact {
                        id: self.id,
                        partner: partner.id,
                    });
                }
            }
            None => self.eye_contact_partner = None,
        }
    }

    /// Excluded agents only come back via someone free and inside
    fn look_for_reentry(
        &mut self,
        roster: &[Agent],
        ctx: &TickContext,
        rng: &mut impl Rng,
        events: &mut Vec<SimEvent>,
    ) {
        let partner = roster.iter().find(|other| {
            other.id != self.id && other.regime == Regime::Free && mutual_eye_contact(self, other)
        });
        if let Some(partner) = partner {
            let rising = self.reenter(partner, &ctx.arena, ctx.now, rng);
            log::debug!("Agent {} re-entered via agent {}", self.id, partner.id);
            events.push(SimEvent::Reentered {
                id: self.id,
                partner: partner.id,
            });
            if rising {
                events.push(SimEvent::EyeContact {
                    id: self.id,
                    partner: partner.id,
                });
            }
        }
    }

    fn approach(&mut self, ctx: &TickContext) {
        self.position += self.velocity * ctx.dt;
        if !self.has_eye_contact() {
            self.head_rotation_target = self.body_direction;
        }
        if ctx.arena.contains(self.position) {
            self.regime = Regime::Free;
            log::debug!("Agent {} entered the arena", self.id);
        }
    }

    /// Bounded random walk, reflecting off the walls
    fn wander(&mut self, ctx: &TickContext, rng: &mut impl Rng) {
        if rng.random_bool(RANDOM_TURN_CHANCE) {
            self.randomize_velocity(rng);
        }

        let (pos, vel) = reflect_off_walls(
            self.position + self.velocity * ctx.dt,
            self.velocity,
            &ctx.arena,
        );
        self.position = pos;
        self.set_velocity(vel);

        if !self.has_eye_contact() && rng.random_bool(HEAD_GLANCE_CHANCE) {
            let offset = rng.random_range(-HEAD_GLANCE_SPREAD..=HEAD_GLANCE_SPREAD);
            self.head_rotation_target = normalize_angle(self.body_direction + offset);
        }
    }

    fn walk_to_edge(
        &mut self,
        target: Vec2,
        wall: Wall,
        ctx: &TickContext,
        events: &mut Vec<SimEvent>,
    ) {
        let to_target = target - self.position;
        let distance = to_target.length();
        let step = AGENT_SPEED * EDGE_SPEED_MULTIPLIER * ctx.dt;
        if distance <= step {
            self.position = target;
        } else {
            self.position += to_target / distance * step;
        }

        if self.position.distance(target) < EDGE_ARRIVAL_EPSILON {
            self.position = target;
            self.settle(wall);
            log::debug!("Agent {} settled on the {:?} wall", self.id, wall);
            events.push(SimEvent::Settled { id: self.id });
        }
    }

    /// Sweep the gaze across the interior, with occasional random snaps
    fn search(&mut self, wall: Wall, search_time: f32, ctx: &TickContext, rng: &mut impl Rng) {
        let mut search_time = search_time + ctx.dt;
        if rng.random_bool(GAZE_JUMP_CHANCE) {
            let point = ctx.arena.random_point(rng);
            let target = heading(point - self.position);
            self.head_rotation_target = target;
            self.head_direction = target;
            search_time = 0.0;
        } else {
            let sweep = GAZE_SWEEP_AMPLITUDE * (GAZE_SWEEP_FREQUENCY * search_time).sin();
            self.head_rotation_target = normalize_angle(wall.inward_angle() + sweep);
        }
        self.regime = Regime::Excluded { wall, search_time };
    }
}

/// Negate each velocity component whose axis overshot the walls, then clamp
pub fn reflect_off_walls(pos: Vec2, mut vel: Vec2, arena: &Arena) -> (Vec2, Vec2) {
    if pos.x.abs() > arena.half_size {
        vel.x = -vel.x;
    }
    if pos.y.abs() > arena.half_size {
        vel.y = -vel.y;
    }
    (arena.clamp(pos), vel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::PI;

    fn ctx(now: f64, dt: f32) -> TickContext {
        TickContext {
            now,
            dt,
            arena: Arena::new(400.0),
            timeout: 5.0,
            grace_until: 0.0,
            head_rotation_speed: 3.0,
        }
    }

    fn agent_at(id: u32, x: f32, y: f32, head: f32) -> Agent {
        let mut agent = Agent::new(id, Vec2::new(x, y), 60f32.to_radians(), 320.0);
        agent.head_direction = head;
        agent.head_rotation_target = head;
        agent
    }

    #[test]
    fn test_approaching_becomes_free_inside() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut agent = agent_at(0, -205.0, 0.0, 0.0);
        agent.set_velocity(Vec2::new(50.0, 10.0));
        let mut events = Vec::new();
        agent.update(&[], &ctx(0.2, 0.2), &mut rng, &mut events);
        assert_eq!(agent.regime, Regime::Free);
        assert!(agent.stats.total_time_outside > 0.0);
    }

    #[test]
    fn test_reflect_off_walls() {
        let arena = Arena::new(400.0);
        let (pos, vel) = reflect_off_walls(Vec2::new(215.0, -213.0), Vec2::new(40.0, -30.0), &arena);
        assert_eq!(pos, Vec2::new(200.0, -200.0));
        assert_eq!(vel, Vec2::new(-40.0, 30.0));

        // Only the overshooting axis flips
        let (pos, vel) = reflect_off_walls(Vec2::new(-201.0, 50.0), Vec2::new(-20.0, 15.0), &arena);
        assert_eq!(pos, Vec2::new(-200.0, 50.0));
        assert_eq!(vel, Vec2::new(20.0, 15.0));
    }

    #[test]
    fn test_wander_stays_inside() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut agent = agent_at(0, 195.0, -198.0, 0.0);
        agent.regime = Regime::Free;
        agent.set_velocity(Vec2::new(40.0, -30.0));
        let arena = Arena::new(400.0);
        let mut events = Vec::new();
        let mut now = 0.0;
        for _ in 0..100 {
            now += 0.5;
            agent.update(&[], &ctx(now, 0.5), &mut rng, &mut events);
            if agent.regime != Regime::Free {
                break;
            }
            assert!(arena.contains(agent.position));
        }
    }

    #[test]
    fn test_edge_seek_arrives_and_settles() {
        let mut rng = Pcg32::seed_from_u64(5);
        let arena = Arena::new(400.0);
        let mut agent = agent_at(0, 180.0, 30.0, 0.0);
        agent.regime = Regime::Free;
        agent.begin_edge_seek(&arena);

        let mut events = Vec::new();
        let mut now = 0.0;
        for _ in 0..20 {
            now += 0.05;
            agent.update(&[], &ctx(now, 0.05), &mut rng, &mut events);
            if !agent.is_moving_to_edge() {
                break;
            }
        }
        assert!(matches!(agent.regime, Regime::Excluded { wall: Wall::Right, .. }));
        assert_eq!(agent.position, Vec2::new(200.0, 30.0));
        assert_eq!(agent.velocity, Vec2::ZERO);
        assert!(!agent.is_inside());
        assert!(events.contains(&SimEvent::Settled { id: 0 }));
    }

    #[test]
    fn test_excluded_gaze_stays_on_interior_side() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut agent = agent_at(0, 200.0, 0.0, PI);
        agent.regime = Regime::Excluded {
            wall: Wall::Right,
            search_time: 0.0,
        };
        let mut events = Vec::new();
        let mut now = 0.0;
        for _ in 0..200 {
            now += 1.0 / 30.0;
            agent.update(&[], &ctx(now, 1.0 / 30.0), &mut rng, &mut events);
            // Sweep and random interior points both stay within ±90° of facing west
            let off = normalize_angle(agent.head_rotation_target - PI).abs();
            assert!(off <= PI / 2.0 + 1e-3, "gaze target {off} rad off the interior");
            assert_eq!(agent.position, Vec2::new(200.0, 0.0));
        }
        assert!(events.is_empty());
    }

    #[test]
    fn test_contact_skips_excluded_candidates() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut observer = agent_at(0, 0.0, 0.0, 0.0);
        observer.regime = Regime::Free;

        let mut excluded = agent_at(1, 100.0, 0.0, PI);
        excluded.regime = Regime::Excluded {
            wall: Wall::Right,
            search_time: 0.0,
        };
        let mut free = agent_at(2, 150.0, 0.0, PI);
        free.regime = Regime::Free;

        let roster = vec![observer.clone(), excluded, free];
        let mut events = Vec::new();
        observer.update(&roster, &ctx(0.1, 0.1), &mut rng, &mut events);
        assert_eq!(observer.eye_contact_partner, Some(2));
    }

    #[test]
    fn test_contact_tie_broken_by_roster_order() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut observer = agent_at(5, 0.0, 0.0, 0.0);
        observer.regime = Regime::Free;
        let mut far = agent_at(1, 250.0, 0.0, PI);
        far.regime = Regime::Free;
        let mut near = agent_at(2, 50.0, 0.0, PI);
        near.regime = Regime::Free;

        let roster = vec![far, near, observer.clone()];
        let mut events = Vec::new();
        observer.update(&roster, &ctx(0.1, 0.1), &mut rng, &mut events);
        assert_eq!(observer.eye_contact_partner, Some(1));
        assert_eq!(events, vec![SimEvent::EyeContact { id: 5, partner: 1 }]);
    }

    #[test]
    fn test_lost_contact_clears_partner() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut observer = agent_at(0, 0.0, 0.0, 0.0);
        observer.regime = Regime::Free;
        observer.eye_contact_partner = Some(1);
        let mut other = agent_at(1, 50.0, 0.0, 0.0);
        other.regime = Regime::Free;

        let roster = vec![observer.clone(), other];
        let mut events = Vec::new();
        observer.update(&roster, &ctx(0.1, 0.1), &mut rng, &mut events);
        assert!(!observer.has_eye_contact());
    }

    #[test]
    fn test_reentry_needs_free_partner() {
        let mut rng = Pcg32::seed_from_u64(10);
        let mut excluded = agent_at(0, 200.0, 0.0, PI);
        excluded.regime = Regime::Excluded {
            wall: Wall::Right,
            search_time: 0.0,
        };
        // Still approaching, so not inside: no re-entry
        let approaching = agent_at(1, 100.0, 0.0, 0.0);
        let roster = vec![excluded.clone(), approaching];
        let mut events = Vec::new();
        excluded.update(&roster, &ctx(0.1, 0.1), &mut rng, &mut events);
        assert!(matches!(excluded.regime, Regime::Excluded { .. }));
        assert!(events.is_empty());
    }

    #[test]
    fn test_timeout_respects_grace_window() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut agent = agent_at(0, 0.0, 0.0, 0.0);
        agent.regime = Regime::Free;

        let mut tick = ctx(8.0, 0.1);
        tick.grace_until = 10.0;
        let mut events = Vec::new();
        agent.update(&[], &tick, &mut rng, &mut events);
        assert_eq!(agent.regime, Regime::Free);

        tick.now = 10.0;
        agent.update(&[], &tick, &mut rng, &mut events);
        assert!(agent.is_moving_to_edge());
        assert_eq!(events, vec![SimEvent::Excluded { id: 0 }]);
    }

    #[test]
    fn test_settle_snaps_onto_the_wall() {
        let mut rng = Pcg32::seed_from_u64(12);
        let arena = Arena::new(400.0);
        let mut agent = agent_at(0, 198.6, 30.0, 0.0);
        agent.regime = Regime::Free;
        agent.begin_edge_seek(&arena);

        // 1.25 unit step leaves the agent 0.15 short, inside the arrival radius
        let mut events = Vec::new();
        agent.update(&[], &ctx(0.01, 0.01), &mut rng, &mut events);
        assert!(matches!(agent.regime, Regime::Excluded { wall: Wall::Right, .. }));
        assert_eq!(agent.position, Vec2::new(200.0, 30.0));
        assert_eq!(events, vec![SimEvent::Settled { id: 0 }]);
    }

    #[test]
    fn test_reentry_reports_new_contact() {
        let mut rng = Pcg32::seed_from_u64(13);
        let mut returning = agent_at(0, 200.0, 0.0, PI);
        returning.regime = Regime::Excluded {
            wall: Wall::Right,
            search_time: 0.0,
        };
        let mut inside = agent_at(1, 100.0, 0.0, 0.0);
        inside.regime = Regime::Free;

        let roster = vec![returning.clone(), inside];
        let mut events = Vec::new();
        returning.update(&roster, &ctx(0.1, 0.1), &mut rng, &mut events);

        assert_eq!(returning.regime, Regime::Free);
        assert_eq!(returning.stats.eye_contact_count, 1);
        assert_eq!(
            events,
            vec![
                SimEvent::Reentered { id: 0, partner: 1 },
                SimEvent::EyeContact { id: 0, partner: 1 },
            ]
        );
    }

    #[test]
    fn test_excluded_head_turns_faster() {
        let mut agent = agent_at(0, 0.0, 0.0, 0.0);
        agent.regime = Regime::Free;
        assert_eq!(agent.head_gain(3.0), 3.0);
        agent.regime = Regime::Excluded {
            wall: Wall::Right,
            search_time: 0.0,
        };
        assert!((agent.head_gain(3.0) - 3.0 * EXCLUDED_HEAD_SPEED_MULTIPLIER).abs() < 1e-6);

        // Same gap, dt and base gain: free covers 0.3 of it, excluded 0.45
        let dt = 0.1;
        let mut free = agent_at(0, 0.0, 0.0, 0.0);
        free.head_rotation_target = 1.0;
        free.ease_head(dt, 3.0);
        let mut excluded = agent.clone();
        excluded.head_rotation_target = 1.0;
        excluded.ease_head(dt, excluded.head_gain(3.0));
        assert!((free.head_direction - 0.3).abs() < 1e-5);
        assert!((excluded.head_direction - 0.45).abs() < 1e-5);

        // Through a full update: first seed whose tick sweeps rather than jumps
        let sweep = GAZE_SWEEP_AMPLITUDE * (GAZE_SWEEP_FREQUENCY * dt).sin();
        for seed in 0..32 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut searching = agent_at(0, 200.0, 0.0, PI);
            searching.regime = Regime::Excluded {
                wall: Wall::Right,
                search_time: 0.0,
            };
            let mut events = Vec::new();
            searching.update(&[], &ctx(dt as f64, dt), &mut rng, &mut events);
            let Regime::Excluded { search_time, .. } = searching.regime else {
                panic!("left the boundary without a partner");
            };
            if search_time > 0.0 {
                let turned = normalize_angle(searching.head_direction - PI);
                assert!((turned - sweep * 0.45).abs() < 1e-4, "turned {turned}");
                return;
            }
        }
        panic!("every seed jumped on the first tick");
    }

    #[test]
    fn test_gaze_jump_snaps_head_and_restarts_sweep() {
        let mut rng = Pcg32::seed_from_u64(14);
        let mut agent = agent_at(0, 200.0, 0.0, PI);
        agent.regime = Regime::Excluded {
            wall: Wall::Right,
            search_time: 0.0,
        };
        let mut events = Vec::new();
        let mut now = 0.0;
        for _ in 0..200 {
            now += 0.05;
            agent.update(&[], &ctx(now, 0.05), &mut rng, &mut events);
            let Regime::Excluded { search_time, .. } = agent.regime else {
                panic!("left the boundary without a partner");
            };
            // Sweeping always accumulates time, so zero means a jump this tick
            if search_time == 0.0 {
                let gap = normalize_angle(agent.head_rotation_target - agent.head_direction);
                assert!(gap.abs() < 1e-6);
                return;
            }
        }
        panic!("no gaze jump in 200 ticks");
    }

    #[test]
    fn test_wander_occasionally_redraws_velocity() {
        let mut rng = Pcg32::seed_from_u64(15);
        let mut agent = agent_at(0, 0.0, 0.0, 0.0);
        agent.regime = Regime::Free;
        agent.set_velocity(Vec2::new(37.0, -23.0));
        let mut tick = ctx(0.0, 0.01);
        tick.timeout = f64::INFINITY;

        let mut events = Vec::new();
        for _ in 0..2000 {
            tick.now += 0.01;
            agent.update(&[], &tick, &mut rng, &mut events);
            // Wall bounces only flip signs; a different magnitude is a redraw
            if agent.velocity.abs() != Vec2::new(37.0, 23.0) {
                assert!(agent.velocity.x.abs() >= MIN_VELOCITY_COMPONENT);
                assert!(agent.velocity.y.abs() >= MIN_VELOCITY_COMPONENT);
                assert!((agent.body_direction - heading(agent.velocity)).abs() < 1e-6);
                return;
            }
        }
        panic!("velocity never redrawn in 2000 ticks");
    }
}
