//! Running totals for a simulation
//!
//! Updated by the coordinator from VTOL and passenger update results.

use serde::Serialize;

use super::vtol::VtolUpdateResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    pub passengers_spawned: usize,
    pub passengers_boarded: usize,
    pub passengers_delivered: usize,
    /// Passengers who left the simulation after arriving
    pub passengers_exited: usize,
    /// Passengers lost because their VTOL was reset mid-trip
    pub passengers_dropped: usize,
    pub departures: usize,
    pub landings: usize,
    pub times_queued: usize,
    pub diversions: usize,
    /// Legs that could not start for lack of a path
    pub stalls: usize,
    pub skipped_stops: usize,
    pub vtols_spawned: usize,
}

impl SimStats {
    /// Fold one VTOL update result into the totals
    pub fn record(&mut self, result: &VtolUpdateResult, was_stalled: bool) {
        match result {
            VtolUpdateResult::Continue
            | VtolUpdateResult::LegStarted { .. }
            | VtolUpdateResult::Cleared(_) => {}
            VtolUpdateResult::Departed { boarded, .. } => {
                self.departures += 1;
                self.passengers_boarded += boarded;
            }
            VtolUpdateResult::Queued(_) => self.times_queued += 1,
            VtolUpdateResult::Landed { alighted, .. } => {
                self.landings += 1;
                self.passengers_delivered += alighted;
            }
            VtolUpdateResult::Stalled { .. } => {
                if !was_stalled {
                    self.stalls += 1;
                }
            }
            VtolUpdateResult::SkippedStop { .. } => self.skipped_stops += 1,
            VtolUpdateResult::Diverted { .. } => self.diversions += 1,
        }
    }

    /// Share of spawned passengers that reached their destination
    pub fn delivery_rate(&self) -> f32 {
        if self.passengers_spawned == 0 {
            0.0
        } else {
            self.passengers_delivered as f32 / self.passengers_spawned as f32
        }
    }
}
