//! Vertiport network simulation engine
//!
//! Everything here runs headless and single-threaded, one tick at a time.
//! Entities refer to each other by ID; `SimWorld` owns them all.

mod bounded_wait;
mod clock;
mod config;
mod demand;
mod error;
mod network;
mod person;
mod route;
mod snapshot;
mod stats;
mod types;
mod vertiport;
mod vtol;
mod world;

pub use bounded_wait::{BoundedWait, RecoveryAction};
pub use clock::{format_time_of_day, parse_time_of_day, SimClock};
pub use config::{is_valid_speed, SimConfig, DEFAULT_START_TIME_SECS};
pub use demand::{DemandModel, DemandRecord};
pub use error::{SimError, SimResult};
pub use network::{LinkEdge, Network, NetworkStats};
pub use person::{Person, PersonUpdateResult};
pub use route::{RouteMode, RoutePlan};
pub use snapshot::{PersonView, SimCommand, SimSnapshot, VertiportView, VtolView};
pub use stats::SimStats;
pub use types::{
    LandingDecision, PersonId, PersonState, Position, SimId, StationId, VtolId, VtolState,
    SEAT_CAPACITY, SECS_PER_DAY,
};
pub use vertiport::{OccupancyInfo, Vertiport};
pub use vtol::{Vtol, VtolManifest, VtolUpdateResult};
pub use world::SimWorld;
