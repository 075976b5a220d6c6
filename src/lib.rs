//! Vertiport Simulation Library
//!
//! A tick-driven simulation of VTOLs flying between capacity-limited
//! vertiports, plus loaders for scenario files.

pub mod scenario;
pub mod simulation;
