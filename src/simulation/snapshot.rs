//! Read-only views of the world for presentation, and the commands a
//! presentation layer may send back

use serde::Serialize;

use super::stats::SimStats;
use super::types::{PersonId, PersonState, Position, StationId, VtolId, VtolState};

#[derive(Debug, Clone, Serialize)]
pub struct VtolView {
    pub id: VtolId,
    pub label: String,
    pub position: Position,
    pub state: VtolState,
    /// Name of the station the VTOL is on, if any
    pub station: Option<String>,
    /// Name of the current leg's destination, if any
    pub destination: Option<String>,
    pub onboard: usize,
    pub stalled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VertiportView {
    pub id: StationId,
    pub name: String,
    pub position: Position,
    pub occupied: usize,
    pub capacity: usize,
    pub hovering: usize,
    pub waiting: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonView {
    pub id: PersonId,
    /// `None` while airborne
    pub station: Option<String>,
    pub destination: String,
    pub state: PersonState,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct SimSnapshot {
    pub tick: u64,
    pub time_of_day: String,
    pub paused: bool,
    pub vtols: Vec<VtolView>,
    pub vertiports: Vec<VertiportView>,
    pub persons: Vec<PersonView>,
    pub stats: SimStats,
}

/// Commands accepted by `SimWorld::apply`
#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    Pause,
    Resume,
    TogglePause,
    /// Put every VTOL back at the start of its route
    RestartRoutes,
    /// Add a one-shot VTOL between two stations
    SpawnVtol {
        origin: StationId,
        destination: StationId,
        /// Earliest departure, seconds since midnight
        start_secs: u32,
        /// Falls back to the configured default speed
        speed: Option<f32>,
    },
}
