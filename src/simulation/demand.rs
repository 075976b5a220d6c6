//! Time-windowed origin/destination demand
//!
//! Demand is not spawned as a block at the start of each window. Every tick,
//! each unit of an active record gets an independent trial with probability
//! `tick_secs / window_secs`, so over a whole window the expected number of
//! spawns equals the record's count.

use rand::Rng;

use super::types::{StationId, SECS_PER_DAY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandRecord {
    /// Window start, seconds since midnight (inclusive)
    pub start_secs: u32,
    /// Window end, seconds since midnight (exclusive)
    pub end_secs: u32,
    pub origin: StationId,
    pub destination: StationId,
    /// Expected passengers over the whole window
    pub count: u32,
}

impl DemandRecord {
    pub fn contains(&self, time_of_day: u32) -> bool {
        self.start_secs <= time_of_day && time_of_day < self.end_secs
    }

    pub fn window_secs(&self) -> u32 {
        self.end_secs.saturating_sub(self.start_secs)
    }

    /// Chance that one unit of demand spawns during a tick of `tick_secs`
    pub fn spawn_probability(&self, tick_secs: u32) -> f64 {
        let window = self.window_secs();
        if window == 0 {
            return 0.0;
        }
        (tick_secs as f64 / window as f64).min(1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DemandModel {
    records: Vec<DemandRecord>,
}

impl DemandModel {
    pub fn new(records: Vec<DemandRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: DemandRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[DemandRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose window contains the given time of day, in load order
    pub fn active_demand(&self, time_of_day: u32) -> Vec<&DemandRecord> {
        let time_of_day = time_of_day % SECS_PER_DAY;
        self.records
            .iter()
            .filter(|record| record.contains(time_of_day))
            .collect()
    }

    /// Run this tick's spawn trials
    ///
    /// Returns one `(origin, destination)` pair per passenger to create.
    pub fn spawn_trials<R: Rng>(
        &self,
        time_of_day: u32,
        tick_secs: u32,
        rng: &mut R,
    ) -> Vec<(StationId, StationId)> {
        let mut spawns = Vec::new();
        for record in self.active_demand(time_of_day) {
            let probability = record.spawn_probability(tick_secs);
            if probability <= 0.0 {
                continue;
            }
            for _ in 0..record.count {
                if rng.random_bool(probability) {
                    spawns.push((record.origin, record.destination));
                }
            }
        }
        spawns
    }
}
