//! Simulation tick
//!
//! Advances every agent once, in roster order, against a snapshot of the
//! roster taken at the start of the tick, then checks for game over.

use super::motion::TickContext;
use super::state::{RunPhase, SimEvent, Simulation};
use crate::consts::MAX_FRAME_ELAPSED;

impl Simulation {
    /// Advance the simulation by `elapsed` real seconds
    ///
    /// Ignored unless running, and when `elapsed` is outside (0, 1].
    pub fn tick(&mut self, elapsed: f64) {
        if self.phase != RunPhase::Running {
            return;
        }
        if !(elapsed > 0.0 && elapsed <= MAX_FRAME_ELAPSED) {
            log::trace!("Dropping tick with elapsed {elapsed}");
            return;
        }

        let dt = elapsed * self.config.simulation_speed;
        self.clock += dt;
        self.tick_count += 1;

        let ctx = TickContext {
            now: self.clock,
            dt: dt as f32,
            arena: self.arena(),
            timeout: self.config.timeout_duration,
            grace_until: self.config.grace_period,
            head_rotation_speed: self.config.head_rotation_speed,
        };

        // Everyone sees the same start-of-tick positions and gazes
        let previous = self.roster.clone();
        for agent in &mut self.roster {
            agent.update(&previous, &ctx, &mut self.rng, &mut self.events);
        }

        self.check_game_over();
    }

    /// Advance using a host wall-clock timestamp (seconds)
    ///
    /// The first frame after `start` or `resume` only sets the anchor.
    pub fn frame(&mut self, now_secs: f64) {
        if self.phase != RunPhase::Running {
            return;
        }
        if let Some(anchor) = self.frame_anchor.replace(now_secs) {
            self.tick(now_secs - anchor);
        }
    }

    fn check_game_over(&mut self) {
        if self.roster.is_empty() || !self.roster.iter().all(|a| a.is_excluded()) {
            return;
        }
        self.phase = RunPhase::GameOver;
        self.events.push(SimEvent::GameOver);
        log::info!(
            "Game over at t={:.2}: {} exits, {} eye contacts",
            self.clock,
            self.total_exits(),
            self.total_eye_contacts()
        );
        self.notify_game_over();
    }
}
