//! Shared setup for the integration tests

#![allow(dead_code)]

use vertiport_sim::simulation::{SimConfig, SimWorld, StationId, VtolId, VtolState};

/// Short maneuvers and no demand-clock surprises, so scenarios finish fast
pub fn fast_config() -> SimConfig {
    SimConfig {
        takeoff_ticks: 2,
        landing_ticks: 2,
        dwell_ticks: 3,
        default_speed: 10.0,
        max_landed_ticks: 50,
        max_hover_ticks: 1000,
        person_exit_ticks: 5,
        ..SimConfig::default()
    }
}

pub fn world_with(config: SimConfig) -> SimWorld {
    SimWorld::with_config(config, Some(42))
}

/// Tick until `done` holds, panicking after `limit` ticks
pub fn run_until(world: &mut SimWorld, limit: u64, mut done: impl FnMut(&SimWorld) -> bool) {
    for _ in 0..limit {
        if done(world) {
            return;
        }
        world.tick();
    }
    assert!(done(world), "condition not reached within {limit} ticks");
}

pub fn state_of(world: &SimWorld, vtol: VtolId) -> VtolState {
    world.vtols[&vtol].state()
}

pub fn occupants(world: &SimWorld, station: StationId) -> usize {
    world.vertiports[&station].occupants().len()
}
