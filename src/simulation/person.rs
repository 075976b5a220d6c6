//! Passenger lifecycle

use anyhow::Result;

use super::error::SimError;
use super::types::{PersonId, PersonState, StationId, VtolId};

/// Result of a passenger update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonUpdateResult {
    Continue,
    /// Exit countdown finished; the passenger leaves the simulation
    Remove,
}

#[derive(Debug, Clone)]
pub struct Person {
    pub id: PersonId,
    pub origin: StationId,
    pub destination: StationId,
    pub spawned_at: u64,
    state: PersonState,
    /// The VTOL carrying this passenger while boarding or flying
    vtol: Option<VtolId>,
    exit_timer: u32,
    exit_ticks: u32,
}

impl Person {
    pub fn new(
        id: PersonId,
        origin: StationId,
        destination: StationId,
        spawned_at: u64,
        exit_ticks: u32,
    ) -> Self {
        Self {
            id,
            origin,
            destination,
            spawned_at,
            state: PersonState::Waiting,
            vtol: None,
            exit_timer: 0,
            exit_ticks,
        }
    }

    pub fn state(&self) -> PersonState {
        self.state
    }

    pub fn vtol(&self) -> Option<VtolId> {
        self.vtol
    }

    fn transition(&mut self, from: PersonState, to: PersonState) -> Result<()> {
        if self.state != from {
            return Err(SimError::Invariant(format!(
                "passenger {} cannot go {} -> {} while {}",
                self.id, from, to, self.state
            ))
            .into());
        }
        self.state = to;
        Ok(())
    }

    /// Selected by a VTOL at the origin
    pub fn begin_boarding(&mut self, vtol_id: VtolId) -> Result<()> {
        self.transition(PersonState::Waiting, PersonState::Boarding)?;
        self.vtol = Some(vtol_id);
        Ok(())
    }

    /// Seated on the VTOL's onboard list
    pub fn take_seat(&mut self) -> Result<()> {
        self.transition(PersonState::Boarding, PersonState::Flying)
    }

    /// The carrying VTOL landed at this passenger's destination
    pub fn arrive(&mut self) -> Result<()> {
        self.transition(PersonState::Flying, PersonState::Arrived)?;
        self.vtol = None;
        Ok(())
    }

    /// Station the passenger is at, if not airborne
    pub fn station(&self) -> Option<StationId> {
        match self.state {
            PersonState::Waiting => Some(self.origin),
            PersonState::Boarding | PersonState::Flying => None,
            PersonState::Arrived | PersonState::Leaving => Some(self.destination),
        }
    }

    pub fn update(&mut self) -> PersonUpdateResult {
        match self.state {
            PersonState::Arrived => {
                self.state = PersonState::Leaving;
                self.exit_timer = self.exit_ticks;
                PersonUpdateResult::Continue
            }
            PersonState::Leaving => {
                self.exit_timer = self.exit_timer.saturating_sub(1);
                if self.exit_timer == 0 {
                    PersonUpdateResult::Remove
                } else {
                    PersonUpdateResult::Continue
                }
            }
            _ => PersonUpdateResult::Continue,
        }
    }
}
