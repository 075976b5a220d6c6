//! Tunable parameters for a simulation run
//!
//! Every field has a default, so a JSON file only needs the values it
//! overrides.

use serde::Deserialize;
use std::path::Path;

use super::error::{SimError, SimResult};
use super::types::{SEAT_CAPACITY, SECS_PER_DAY};

/// 04:00, when the demo demand begins
pub const DEFAULT_START_TIME_SECS: u32 = 4 * 3600;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seats per VTOL
    pub seat_capacity: usize,
    /// Distance covered per tick by VTOLs that don't set their own speed
    pub default_speed: f32,
    /// Remaining distance under which a VTOL snaps onto its waypoint
    pub arrival_epsilon: f32,
    /// Length of the takeoff maneuver
    pub takeoff_ticks: u32,
    /// Length of the landing maneuver once a slot is held
    pub landing_ticks: u32,
    /// Minimum time on the ground between legs
    pub dwell_ticks: u32,
    /// Ticks a VTOL may stay landed on an unfinished route before recovery
    pub max_landed_ticks: u32,
    /// Ticks a VTOL may hover without clearance before diverting
    pub max_hover_ticks: u32,
    /// Length of a passenger's exit countdown at the destination
    pub person_exit_ticks: u32,
    /// Simulated seconds per tick
    pub tick_secs: u32,
    /// Time of day at tick zero
    pub start_time_secs: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seat_capacity: SEAT_CAPACITY,
            default_speed: 4.0,
            arrival_epsilon: 0.5,
            takeoff_ticks: 30,
            landing_ticks: 30,
            dwell_ticks: 15,
            max_landed_ticks: 120,
            max_hover_ticks: 600,
            person_exit_ticks: 30,
            tick_secs: 6,
            start_time_secs: DEFAULT_START_TIME_SECS,
        }
    }
}

/// A flight speed a VTOL can actually make progress with
pub fn is_valid_speed(speed: f32) -> bool {
    speed.is_finite() && speed > 0.0
}

impl SimConfig {
    /// Load overrides from a JSON file
    pub fn from_json_file(path: &Path) -> SimResult<Self> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> SimResult<()> {
        if !is_valid_speed(self.default_speed) {
            return Err(SimError::InvalidConfig(format!(
                "default_speed must be a positive number, got {}",
                self.default_speed
            )));
        }
        if !(self.arrival_epsilon.is_finite() && self.arrival_epsilon >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "arrival_epsilon must be a non-negative number, got {}",
                self.arrival_epsilon
            )));
        }
        if self.seat_capacity == 0 {
            return Err(SimError::InvalidConfig("seat_capacity must be at least 1".to_string()));
        }
        if self.tick_secs == 0 {
            return Err(SimError::InvalidConfig("tick_secs must be at least 1".to_string()));
        }
        if self.start_time_secs >= SECS_PER_DAY {
            return Err(SimError::InvalidConfig(format!(
                "start_time_secs must be within one day, got {}",
                self.start_time_secs
            )));
        }
        Ok(())
    }
}
