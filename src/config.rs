//! Run configuration
//!
//! A flat set of named options, applied only when a run is (re)initialized.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::VISION_DISTANCE_FACTOR;

/// Problems with a configuration supplied by the host
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("participant count must be at least 1")]
    NoParticipants,
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("vision angle must be in (0, 360] degrees, got {0}")]
    VisionAngleOutOfRange(f32),
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Options for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimConfig {
    /// Number of agents
    pub participant_count: u32,
    /// Side length of the square arena
    pub square_size: f32,
    /// Seconds a free agent may go without mutual eye contact
    pub timeout_duration: f64,
    /// Simulated seconds per real second
    pub simulation_speed: f64,
    /// Full vision cone width in degrees
    pub vision_angle: f32,
    /// Head easing gain (radians/sec)
    pub head_rotation_speed: f32,
    /// Seconds after initialization during which nobody times out
    pub grace_period: f64,
    /// Seed for the shared random source
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            participant_count: 10,
            square_size: 400.0,
            timeout_duration: 5.0,
            simulation_speed: 1.0,
            vision_angle: 60.0,
            head_rotation_speed: 3.0,
            grace_period: 2.0,
            seed: 0x5eed,
        }
    }
}

impl SimConfig {
    /// Check the preconditions the simulation assumes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.participant_count == 0 {
            return Err(ConfigError::NoParticipants);
        }
        let positives = [
            ("squareSize", self.square_size as f64),
            ("timeoutDuration", self.timeout_duration),
            ("simulationSpeed", self.simulation_speed),
            ("headRotationSpeed", self.head_rotation_speed as f64),
        ];
        for (field, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !(self.grace_period.is_finite() && self.grace_period >= 0.0) {
            return Err(ConfigError::NonPositive {
                field: "gracePeriod",
                value: self.grace_period,
            });
        }
        if !(self.vision_angle > 0.0 && self.vision_angle <= 360.0) {
            return Err(ConfigError::VisionAngleOutOfRange(self.vision_angle));
        }
        Ok(())
    }

    /// Apply a single named option, as sent by a slider or form field
    pub fn set_option(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        match name {
            "participantCount" => self.participant_count = value.max(0.0).round() as u32,
            "squareSize" => self.square_size = value as f32,
            "timeoutDuration" => self.timeout_duration = value,
            "simulationSpeed" => self.simulation_speed = value,
            "visionAngle" => self.vision_angle = value as f32,
            "headRotationSpeed" => self.head_rotation_speed = value as f32,
            "gracePeriod" => self.grace_period = value,
            "seed" => self.seed = value.max(0.0) as u64,
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
        Ok(())
    }

    /// Parse a flat JSON object of options; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load options from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    #[inline]
    pub fn half_size(&self) -> f32 {
        self.square_size / 2.0
    }

    #[inline]
    pub fn vision_angle_radians(&self) -> f32 {
        self.vision_angle.to_radians()
    }

    /// Vision range derived from the arena size
    #[inline]
    pub fn vision_distance(&self) -> f32 {
        self.square_size * VISION_DISTANCE_FACTOR
    }
}
