//! Read-only views of the simulation for renderers

use serde::{Deserialize, Serialize};

use super::agent::{Agent, StateCategory};
use super::state::{RunPhase, Simulation};

/// Everything a renderer needs to draw one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub body_direction: f32,
    pub head_direction: f32,
    pub vision_angle: f32,
    pub vision_distance: f32,
    pub is_inside: bool,
    pub is_excluded: bool,
    pub is_moving_to_edge: bool,
    pub has_eye_contact: bool,
    pub eye_contact_partner: Option<u32>,
    pub category: StateCategory,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            x: agent.position.x,
            y: agent.position.y,
            body_direction: agent.body_direction,
            head_direction: agent.head_direction,
            vision_angle: agent.vision_angle,
            vision_distance: agent.vision_distance,
            is_inside: agent.is_inside(),
            is_excluded: agent.is_excluded(),
            is_moving_to_edge: agent.is_moving_to_edge(),
            has_eye_contact: agent.has_eye_contact(),
            eye_contact_partner: agent.eye_contact_partner,
            category: agent.category(),
        }
    }
}

/// One frame's worth of render state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub clock: f64,
    pub phase: RunPhase,
    pub square_size: f32,
    pub total_eye_contacts: u64,
    pub total_exits: u64,
    pub agents: Vec<AgentSnapshot>,
}

impl Simulation {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            clock: self.clock,
            phase: self.phase,
            square_size: self.config.square_size,
            total_eye_contacts: self.total_eye_contacts(),
            total_exits: self.total_exits(),
            agents: self.roster.iter().map(AgentSnapshot::from).collect(),
        }
    }
}
