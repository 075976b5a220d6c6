//! Core types for the vertiport simulation
//!
//! Identifiers, positions and the state tags shared by every entity.

use serde::Serialize;
use std::fmt;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SimId(pub usize);

/// A wrapper type for station (vertiport) IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StationId(pub SimId);

/// A wrapper type for VTOL IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VtolId(pub SimId);

/// A wrapper type for passenger IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PersonId(pub SimId);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0 .0)
    }
}

impl fmt::Display for VtolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0 .0)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 .0)
    }
}

/// A 2D position in the simulation plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Move at most `step` units towards `target`.
    ///
    /// Returns the new position and whether the target was reached. Once the
    /// remaining distance drops below `epsilon` the result snaps exactly onto
    /// the target, so no overshoot is ever carried into the next tick.
    pub fn step_towards(&self, target: &Position, step: f32, epsilon: f32) -> (Position, bool) {
        let distance = self.distance(target);
        if distance <= step || distance < epsilon {
            return (*target, true);
        }

        let next = self.lerp(target, step / distance);
        if next.distance(target) < epsilon {
            (*target, true)
        } else {
            (next, false)
        }
    }
}

/// Flight state of a VTOL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VtolState {
    Landed,
    TakingOff,
    Flying,
    Landing,
    Hovering,
}

impl VtolState {
    pub fn as_str(&self) -> &'static str {
        match self {
            VtolState::Landed => "landed",
            VtolState::TakingOff => "taking_off",
            VtolState::Flying => "flying",
            VtolState::Landing => "landing",
            VtolState::Hovering => "hovering",
        }
    }
}

impl fmt::Display for VtolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle state of a passenger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonState {
    Waiting,
    Boarding,
    Flying,
    Arrived,
    Leaving,
}

impl PersonState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonState::Waiting => "waiting",
            PersonState::Boarding => "boarding",
            PersonState::Flying => "flying",
            PersonState::Arrived => "arrived",
            PersonState::Leaving => "leaving",
        }
    }
}

impl fmt::Display for PersonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome of a landing request at a vertiport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingDecision {
    /// A slot was free and is now held by the VTOL
    Granted,
    /// No slot; the VTOL joined the tail of the hovering queue
    Queued,
}

/// Number of seats on every VTOL unless configured otherwise
pub const SEAT_CAPACITY: usize = 4;

/// Seconds in one simulated day, demand windows repeat on this period
pub const SECS_PER_DAY: u32 = 86_400;
