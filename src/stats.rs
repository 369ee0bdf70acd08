//! Summary statistics
//!
//! Reduces the roster into counters for a display layer. Holds nothing of its
//! own beyond the clock value it was collected at.

use serde::{Deserialize, Serialize};

use crate::sim::{Agent, Simulation, StateCategory};

/// Per-agent row for a statistics table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReport {
    pub id: u32,
    pub category: StateCategory,
    pub time_inside: f64,
    pub time_outside: f64,
    pub exit_count: u32,
    pub eye_contact_count: u32,
}

/// Roster-wide counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Simulation clock the numbers were taken at
    pub clock: f64,
    pub participants: usize,
    pub inside: usize,
    pub outside: usize,
    pub approaching: usize,
    pub in_contact: usize,
    pub moving_to_edge: usize,
    pub excluded: usize,
    pub total_eye_contacts: u64,
    pub total_exits: u64,
    pub average_time_inside: f64,
    pub average_time_outside: f64,
    /// Sorted by id
    pub agents: Vec<AgentReport>,
}

impl Statistics {
    pub fn collect(roster: &[Agent], clock: f64) -> Self {
        let mut stats = Self {
            clock,
            participants: roster.len(),
            ..Default::default()
        };

        for agent in roster {
            if agent.is_inside() {
                stats.inside += 1;
            } else {
                stats.outside += 1;
            }
            match agent.category() {
                StateCategory::Approaching => stats.approaching += 1,
                StateCategory::InContact => stats.in_contact += 1,
                StateCategory::MovingToEdge => stats.moving_to_edge += 1,
                StateCategory::Excluded => stats.excluded += 1,
                StateCategory::Free => {}
            }
            stats.total_eye_contacts += agent.stats.eye_contact_count as u64;
            stats.total_exits += agent.stats.exit_count as u64;
            stats.average_time_inside += agent.stats.total_time_inside;
            stats.average_time_outside += agent.stats.total_time_outside;
            stats.agents.push(AgentReport {
                id: agent.id,
                category: agent.category(),
                time_inside: agent.stats.total_time_inside,
                time_outside: agent.stats.total_time_outside,
                exit_count: agent.stats.exit_count,
                eye_contact_count: agent.stats.eye_contact_count,
            });
        }

        if !roster.is_empty() {
            stats.average_time_inside /= roster.len() as f64;
            stats.average_time_outside /= roster.len() as f64;
        }
        stats.agents.sort_by_key(|r| r.id);
        stats
    }

    /// Agent with the most eye contacts (lowest id wins ties)
    pub fn most_contacts(&self) -> Option<&AgentReport> {
        self.agents
            .iter()
            .max_by(|a, b| a.eye_contact_count.cmp(&b.eye_contact_count).then(b.id.cmp(&a.id)))
    }
}

impl Simulation {
    pub fn statistics(&self) -> Statistics {
        Statistics::collect(self.agents(), self.clock())
    }
}
