//! Typed errors for the simulation
//!
//! Engine operations return `anyhow::Result`; the variants here travel inside
//! it so callers can tell a routing failure from a configuration problem with
//! `downcast_ref::<SimError>()`.

use thiserror::Error;

use super::types::StationId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown station {0:?}")]
    UnknownStation(String),

    #[error("station {0:?} is defined more than once")]
    DuplicateStation(String),

    #[error("station {name:?} has invalid capacity {capacity}")]
    InvalidCapacity { name: String, capacity: i64 },

    #[error("link from {0:?} to itself is not allowed")]
    SelfLoop(String),

    #[error("no route from {from} to {to}")]
    NoRoute { from: StationId, to: StationId },

    #[error("invalid route for {vehicle:?}: {reason}")]
    InvalidRoute { vehicle: String, reason: String },

    #[error("invalid demand record: {0}")]
    InvalidDemand(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl From<csv::Error> for SimError {
    fn from(err: csv::Error) -> Self {
        SimError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Parse(err.to_string())
    }
}

pub type SimResult<T> = Result<T, SimError>;
