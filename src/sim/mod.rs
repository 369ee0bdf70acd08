//! Simulation module
//!
//! All behavioural logic lives here. Nothing in this module renders, reads
//! wall-clock time or touches the host:
//! - Time only advances through `tick`/`frame`
//! - Seeded RNG only
//! - Stable iteration order (roster index == agent id)

pub mod agent;
pub mod arena;
pub mod motion;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod vision;

pub use agent::{Agent, AgentStats, Regime, StateCategory, enforce_min_components, random_velocity};
pub use arena::{Arena, Wall};
pub use motion::{TickContext, reflect_off_walls};
pub use snapshot::{AgentSnapshot, Snapshot};
pub use state::{GameOverListener, RunPhase, SimEvent, Simulation};
pub use vision::{ViewCone, can_see, mutual_eye_contact};
