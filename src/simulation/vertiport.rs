//! Vertiport capacity ledger and hovering queue
//!
//! VTOLs and passengers are referenced by ID only; the coordinator owns the
//! entities themselves.

use anyhow::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::error::SimError;
use super::types::{LandingDecision, PersonId, Position, StationId, VtolId};

/// Occupancy figures for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OccupancyInfo {
    pub capacity: usize,
    pub occupied: usize,
    pub available: usize,
    pub hovering: usize,
    pub waiting: usize,
    pub occupancy_rate: f32,
}

/// A vertiport in the simulation
#[derive(Debug, Clone)]
pub struct Vertiport {
    pub id: StationId,
    pub name: String,
    pub position: Position,
    pub capacity: usize,
    /// VTOLs holding a slot, in the order they got it
    occupants: Vec<VtolId>,
    /// VTOLs waiting for a slot, first-queued first-served
    hovering: VecDeque<VtolId>,
    /// Queued VTOLs that were handed a slot and may now land
    clearances: BTreeSet<VtolId>,
    /// Waiting passengers per destination, in arrival order
    waiting: BTreeMap<StationId, VecDeque<PersonId>>,
    /// Passengers who got off here and are still leaving
    arrived: Vec<PersonId>,
    pub landings_granted: usize,
    pub times_queued: usize,
    pub peak_queue: usize,
}

impl Vertiport {
    pub fn new(id: StationId, name: &str, position: Position, capacity: usize) -> Self {
        Self {
            id,
            name: name.to_string(),
            position,
            capacity,
            occupants: Vec::new(),
            hovering: VecDeque::new(),
            clearances: BTreeSet::new(),
            waiting: BTreeMap::new(),
            arrived: Vec::new(),
            landings_granted: 0,
            times_queued: 0,
            peak_queue: 0,
        }
    }

    pub fn has_free_slot(&self) -> bool {
        self.occupants.len() < self.capacity
    }

    /// Ask for a landing slot
    ///
    /// Grants immediately while a slot is free, otherwise queues the VTOL at
    /// the tail of the hovering queue. Asking again while already holding a
    /// slot or already queued changes nothing.
    pub fn request_landing(&mut self, vtol_id: VtolId) -> LandingDecision {
        if self.occupants.contains(&vtol_id) {
            return LandingDecision::Granted;
        }
        if self.hovering.contains(&vtol_id) {
            return LandingDecision::Queued;
        }

        if self.has_free_slot() {
            self.occupants.push(vtol_id);
            self.landings_granted += 1;
            LandingDecision::Granted
        } else {
            self.hovering.push_back(vtol_id);
            self.times_queued += 1;
            self.peak_queue = self.peak_queue.max(self.hovering.len());
            LandingDecision::Queued
        }
    }

    /// Release the slot held by a departing VTOL
    ///
    /// Freed slots go straight to the head of the hovering queue. Returns the
    /// VTOLs that were granted a slot this way.
    pub fn takeoff(&mut self, vtol_id: VtolId) -> Result<Vec<VtolId>> {
        let index = self
            .occupants
            .iter()
            .position(|id| *id == vtol_id)
            .ok_or_else(|| {
                SimError::Invariant(format!(
                    "{} took off from {} without holding a slot",
                    vtol_id, self.name
                ))
            })?;
        self.occupants.remove(index);
        self.clearances.remove(&vtol_id);

        Ok(self.release_hovering())
    }

    /// Hand free slots to queued VTOLs in queue order
    pub fn release_hovering(&mut self) -> Vec<VtolId> {
        let mut granted = Vec::new();
        while self.has_free_slot() {
            let Some(next) = self.hovering.pop_front() else {
                break;
            };
            self.occupants.push(next);
            self.clearances.insert(next);
            self.landings_granted += 1;
            granted.push(next);
        }

        debug_assert!(self.occupants.len() <= self.capacity);
        granted
    }

    /// Consume the landing clearance of a formerly queued VTOL
    pub fn take_clearance(&mut self, vtol_id: VtolId) -> bool {
        self.clearances.remove(&vtol_id)
    }

    pub fn has_clearance(&self, vtol_id: VtolId) -> bool {
        self.clearances.contains(&vtol_id)
    }

    /// Leave the hovering queue without landing
    pub fn abandon(&mut self, vtol_id: VtolId) -> bool {
        match self.hovering.iter().position(|id| *id == vtol_id) {
            Some(index) => {
                self.hovering.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every trace of a VTOL, used when routes are restarted
    pub fn evict(&mut self, vtol_id: VtolId) {
        self.occupants.retain(|id| *id != vtol_id);
        self.hovering.retain(|id| *id != vtol_id);
        self.clearances.remove(&vtol_id);
    }

    pub fn is_occupant(&self, vtol_id: VtolId) -> bool {
        self.occupants.contains(&vtol_id)
    }

    pub fn is_queued(&self, vtol_id: VtolId) -> bool {
        self.hovering.contains(&vtol_id)
    }

    pub fn occupants(&self) -> &[VtolId] {
        &self.occupants
    }

    pub fn hovering_queue(&self) -> impl Iterator<Item = &VtolId> {
        self.hovering.iter()
    }

    pub fn hovering_len(&self) -> usize {
        self.hovering.len()
    }

    pub fn add_waiting_passenger(&mut self, person_id: PersonId, destination: StationId) {
        self.waiting.entry(destination).or_default().push_back(person_id);
    }

    /// Hand over up to `max_count` passengers bound for `destination`, oldest first
    pub fn take_passengers_for(&mut self, destination: StationId, max_count: usize) -> Vec<PersonId> {
        let Some(queue) = self.waiting.get_mut(&destination) else {
            return Vec::new();
        };
        let count = max_count.min(queue.len());
        let taken: Vec<PersonId> = queue.drain(..count).collect();
        if queue.is_empty() {
            self.waiting.remove(&destination);
        }
        taken
    }

    pub fn waiting_for(&self, destination: StationId) -> usize {
        self.waiting.get(&destination).map_or(0, VecDeque::len)
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.values().map(VecDeque::len).sum()
    }

    pub fn waiting_passengers(&self) -> impl Iterator<Item = &PersonId> {
        self.waiting.values().flatten()
    }

    pub fn record_arrival(&mut self, person_id: PersonId) {
        self.arrived.push(person_id);
    }

    pub fn remove_arrival(&mut self, person_id: PersonId) {
        self.arrived.retain(|id| *id != person_id);
    }

    pub fn arrived(&self) -> &[PersonId] {
        &self.arrived
    }

    pub fn occupancy(&self) -> OccupancyInfo {
        let occupied = self.occupants.len();
        OccupancyInfo {
            capacity: self.capacity,
            occupied,
            available: self.capacity.saturating_sub(occupied),
            hovering: self.hovering.len(),
            waiting: self.waiting_count(),
            occupancy_rate: if self.capacity > 0 {
                occupied as f32 / self.capacity as f32
            } else {
                0.0
            },
        }
    }
}
