//! Simulation run state and lifecycle
//!
//! The [`Simulation`] owns the roster, the simulation clock and the shared
//! random source. Hosts drive it with `tick`/`frame` (see `tick.rs`) and
//! control it with `start`/`pause`/`resume`/`restart`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::arena::{Arena, Wall};
use crate::config::SimConfig;
use crate::consts::SPAWN_OUTSET;

/// Lifecycle phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Roster built, not ticking yet
    Idle,
    /// Ticking
    Running,
    /// Suspended, state kept
    Paused,
    /// Everyone is excluded; ticking has stopped
    GameOver,
}

/// Notable things that happened during a tick, drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// Two agents started looking at each other (reported by each side)
    EyeContact { id: u32, partner: u32 },
    /// An agent's contact timeout fired; it is walking to the edge
    Excluded { id: u32 },
    /// An agent reached the boundary
    Settled { id: u32 },
    /// An excluded agent caught someone's eye and came back in
    Reentered { id: u32, partner: u32 },
    /// Every agent is excluded
    GameOver,
}

/// Callback fired once when a run ends
pub type GameOverListener = Box<dyn FnMut()>;

/// The simulation orchestrator
pub struct Simulation {
    /// Config of the current run
    pub(crate) config: SimConfig,
    /// Config waiting for the next start/restart
    pub(crate) staged: Option<SimConfig>,
    pub(crate) phase: RunPhase,
    /// Simulated seconds since initialization
    pub(crate) clock: f64,
    /// Host timestamp of the previous frame (seconds)
    pub(crate) frame_anchor: Option<f64>,
    pub(crate) tick_count: u64,
    pub(crate) roster: Vec<Agent>,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<SimEvent>,
    game_over_listener: Option<GameOverListener>,
}

impl Simulation {
    /// Create a simulation with a roster built from `config`
    pub fn new(config: SimConfig) -> Self {
        let mut sim = Self {
            rng: Pcg32::seed_from_u64(config.seed),
            config: config.clone(),
            staged: None,
            phase: RunPhase::Idle,
            clock: 0.0,
            frame_anchor: None,
            tick_count: 0,
            roster: Vec::new(),
            events: Vec::new(),
            game_over_listener: None,
        };
        sim.initialize(config);
        sim
    }

    /// Discard any prior run and build a fresh roster from `config`
    pub fn initialize(&mut self, config: SimConfig) {
        self.rng = Pcg32::seed_from_u64(config.seed);
        self.roster = spawn_roster(&config, &mut self.rng);
        self.config = config;
        self.staged = None;
        self.phase = RunPhase::Idle;
        self.clock = 0.0;
        self.frame_anchor = None;
        self.tick_count = 0;
        self.events.clear();
        log::info!(
            "Initialized {} agents in a {} arena (seed {})",
            self.roster.len(),
            self.config.square_size,
            self.config.seed
        );
    }

    /// Stage a config for the next start/restart; the current run is unaffected
    pub fn set_config(&mut self, config: SimConfig) {
        if self.is_running() {
            log::info!("Config staged; applies on restart");
        }
        self.staged = Some(config);
    }

    /// Begin ticking with a fresh roster; no-op if a run is already going
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let config = self.staged.take().unwrap_or_else(|| self.config.clone());
        self.initialize(config);
        self.phase = RunPhase::Running;
        log::info!("Simulation started");
    }

    pub fn pause(&mut self) {
        if self.phase == RunPhase::Running {
            self.phase = RunPhase::Paused;
            log::info!("Simulation paused at t={:.2}", self.clock);
        }
    }

    /// Continue after `pause`; the next `frame` only re-anchors the clock
    pub fn resume(&mut self) {
        if self.phase == RunPhase::Paused {
            self.phase = RunPhase::Running;
            self.frame_anchor = None;
            log::info!("Simulation resumed at t={:.2}", self.clock);
        }
    }

    /// Throw away the roster and all statistics, then start again
    pub fn restart(&mut self) {
        log::info!("Simulation restarting");
        self.phase = RunPhase::Idle;
        self.start();
    }

    /// Subscribe to the end of the run
    pub fn on_game_over(&mut self, listener: impl FnMut() + 'static) {
        self.game_over_listener = Some(Box::new(listener));
    }

    pub(crate) fn notify_game_over(&mut self) {
        if let Some(listener) = self.game_over_listener.as_mut() {
            listener();
        }
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// A run is in progress (ticking or paused)
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.phase, RunPhase::Running | RunPhase::Paused)
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.phase == RunPhase::Paused
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }

    #[inline]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Config that the next start/restart will use
    pub fn pending_config(&self) -> &SimConfig {
        self.staged.as_ref().unwrap_or(&self.config)
    }

    pub fn arena(&self) -> Arena {
        Arena::new(self.config.square_size)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.roster
    }

    /// Mutable roster access for hosts that script scenarios
    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.roster
    }

    pub fn agent(&self, id: u32) -> Option<&Agent> {
        self.roster.iter().find(|a| a.id == id)
    }

    /// Sum of every agent's eye-contact count
    pub fn total_eye_contacts(&self) -> u64 {
        self.roster
            .iter()
            .map(|a| a.stats.eye_contact_count as u64)
            .sum()
    }

    /// Sum of every agent's exit count
    pub fn total_exits(&self) -> u64 {
        self.roster.iter().map(|a| a.stats.exit_count as u64).sum()
    }
}

/// Place agents just outside the walls, facing the centre
///
/// Agents are dealt to the walls in turn and spaced evenly along each one with
/// a half-slot margin, so nobody starts at a corner.
fn spawn_roster(config: &SimConfig, rng: &mut Pcg32) -> Vec<Agent> {
    const WALLS: [Wall; 4] = [Wall::Bottom, Wall::Right, Wall::Top, Wall::Left];
    let arena = Arena::new(config.square_size);
    let count = config.participant_count;
    (0..count)
        .map(|i| {
            let side = (i % 4) as usize;
            let on_side = count / 4 + u32::from((side as u32) < count % 4);
            let s = (i / 4) as f32 + 0.5;
            let pos = arena.wall_point(WALLS[side], s / on_side as f32, SPAWN_OUTSET);
            Agent::spawn(i, pos, config, rng)
        })
        .collect()
}
