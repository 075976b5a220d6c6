//! VTOL state machine and movement
//!
//! A VTOL is always in exactly one place from the vertiports' point of view:
//! holding a slot (landed, taking off, landing with clearance), waiting in a
//! hovering queue, or in flight.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::BTreeMap;

use super::bounded_wait::{BoundedWait, RecoveryAction};
use super::clock::SimClock;
use super::config::SimConfig;
use super::network::Network;
use super::person::Person;
use super::route::{RouteMode, RoutePlan};
use super::types::{
    LandingDecision, PersonId, Position, StationId, VtolId, VtolState,
};
use super::vertiport::Vertiport;

/// Everything needed to (re)create a VTOL in its initial state
#[derive(Debug, Clone, PartialEq)]
pub struct VtolManifest {
    pub label: String,
    pub stops: Vec<StationId>,
    pub mode: RouteMode,
    pub speed: f32,
    /// Earliest tick the VTOL may leave its first stop
    pub departure_tick: u64,
}

/// Result of a VTOL update indicating what happened this tick
#[derive(Debug, Clone, PartialEq)]
pub enum VtolUpdateResult {
    Continue,
    /// Started the takeoff maneuver for a new leg
    LegStarted { from: StationId, to: StationId },
    /// Left the ground; `granted` are queued VTOLs handed the freed slot
    Departed {
        from: StationId,
        boarded: usize,
        granted: Vec<VtolId>,
    },
    /// Destination full, joined its hovering queue
    Queued(StationId),
    /// A queued VTOL was cleared to land
    Cleared(StationId),
    Landed { station: StationId, alighted: usize },
    /// No path to the next stop
    Stalled { at: StationId, next: StationId },
    /// Landed-stall recovery gave up on an unreachable stop
    SkippedStop { at: StationId, skipped: StationId },
    /// Hovering-stall recovery picked another destination
    Diverted { from: StationId, to: StationId },
}

#[derive(Debug, Clone)]
pub struct Vtol {
    pub id: VtolId,
    pub label: String,
    pub speed: f32,
    pub position: Position,
    manifest: VtolManifest,
    state: VtolState,
    /// Station the VTOL is on (landed or taking off)
    station: Option<StationId>,
    /// Target of the current leg
    destination: Option<StationId>,
    /// Stations still to overfly on this leg; the last one is `destination`
    waypoints: Vec<StationId>,
    route: RoutePlan,
    /// Stop abandoned by a diversion, flown to before the route continues
    resume_stop: Option<StationId>,
    onboard: Vec<PersonId>,
    state_timer: u32,
    /// Holds a slot at `destination` and is completing the landing maneuver
    landing_cleared: bool,
    stalled: bool,
    departure_tick: u64,
    landed_wait: BoundedWait,
    hover_wait: BoundedWait,
    pub hover_count: usize,
    pub legs_completed: usize,
}

impl Vtol {
    pub fn new(id: VtolId, manifest: VtolManifest, position: Position, config: &SimConfig) -> Self {
        let route = RoutePlan::new(manifest.stops.clone(), manifest.mode);
        Self {
            id,
            label: manifest.label.clone(),
            speed: manifest.speed,
            position,
            state: VtolState::Landed,
            station: route.first(),
            destination: None,
            waypoints: Vec::new(),
            route,
            resume_stop: None,
            onboard: Vec::new(),
            state_timer: 0,
            landing_cleared: false,
            stalled: false,
            departure_tick: manifest.departure_tick,
            landed_wait: BoundedWait::new(config.max_landed_ticks, RecoveryAction::ReattemptDeparture),
            hover_wait: BoundedWait::new(config.max_hover_ticks, RecoveryAction::Divert),
            hover_count: 0,
            legs_completed: 0,
            manifest,
        }
    }

    /// Put the VTOL back into its manifest's initial state
    ///
    /// The caller is responsible for clearing vertiport bookkeeping and the
    /// onboard passengers first.
    pub fn reset(&mut self, position: Position, config: &SimConfig) {
        *self = Vtol::new(self.id, self.manifest.clone(), position, config);
    }

    /// Settle the VTOL at its first stop after asking that vertiport for a slot
    pub fn place(&mut self, decision: LandingDecision) {
        match decision {
            LandingDecision::Granted => {
                self.state = VtolState::Landed;
                self.station = self.route.first();
                self.destination = None;
            }
            LandingDecision::Queued => {
                self.state = VtolState::Hovering;
                self.station = None;
                self.destination = self.route.first();
                self.hover_count += 1;
            }
        }
    }

    pub fn state(&self) -> VtolState {
        self.state
    }

    pub fn station(&self) -> Option<StationId> {
        self.station
    }

    pub fn destination(&self) -> Option<StationId> {
        self.destination
    }

    pub fn waypoints(&self) -> &[StationId] {
        &self.waypoints
    }

    pub fn route(&self) -> &RoutePlan {
        &self.route
    }

    pub fn manifest(&self) -> &VtolManifest {
        &self.manifest
    }

    pub fn onboard(&self) -> &[PersonId] {
        &self.onboard
    }

    /// Empty the onboard list, returning who was on it
    pub fn unload_all(&mut self) -> Vec<PersonId> {
        std::mem::take(&mut self.onboard)
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn is_landing_cleared(&self) -> bool {
        self.landing_cleared
    }

    /// A one-shot VTOL parked at the end of its route
    pub fn is_finished(&self) -> bool {
        self.state == VtolState::Landed && self.next_stop().is_none()
    }

    fn next_stop(&self) -> Option<StationId> {
        self.resume_stop.or_else(|| self.route.peek_next())
    }

    fn commit_next_stop(&mut self) {
        if self.resume_stop.take().is_none() {
            self.route.advance();
        }
    }

    /// Update VTOL state and movement for one tick
    pub fn update(
        &mut self,
        clock: &SimClock,
        config: &SimConfig,
        network: &mut Network,
        vertiports: &mut BTreeMap<StationId, Vertiport>,
        persons: &mut BTreeMap<PersonId, Person>,
    ) -> Result<VtolUpdateResult> {
        self.state_timer = self.state_timer.saturating_sub(1);

        match self.state {
            VtolState::Landed => self.update_landed(clock, config, network),
            VtolState::TakingOff => self.update_taking_off(config, vertiports, persons),
            VtolState::Flying => self.update_flying(config, network),
            VtolState::Landing => self.update_landing(config, vertiports, persons),
            VtolState::Hovering => self.update_hovering(config, network, vertiports),
        }
    }

    fn update_landed(
        &mut self,
        clock: &SimClock,
        config: &SimConfig,
        network: &mut Network,
    ) -> Result<VtolUpdateResult> {
        let station = self.station.context("Landed VTOL has no station")?;

        if clock.tick() < self.departure_tick || self.state_timer > 0 {
            return Ok(VtolUpdateResult::Continue);
        }

        let Some(next) = self.next_stop() else {
            self.landed_wait.reset();
            return Ok(VtolUpdateResult::Continue);
        };

        let Some(path) = network.route(station, next) else {
            if !self.stalled {
                warn!(
                    "{} ({}) has no route from {} to {}, holding",
                    self.label, self.id, station, next
                );
                self.stalled = true;
            }

            if let Some(RecoveryAction::ReattemptDeparture) = self.landed_wait.tick() {
                warn!(
                    "{} ({}) gave up on {} after {} ticks",
                    self.label,
                    self.id,
                    next,
                    self.landed_wait.max_ticks()
                );
                self.commit_next_stop();
                self.stalled = false;
                return Ok(VtolUpdateResult::SkippedStop { at: station, skipped: next });
            }

            return Ok(VtolUpdateResult::Stalled { at: station, next });
        };

        self.commit_next_stop();
        self.stalled = false;
        self.landed_wait.reset();

        if path.len() < 2 {
            // Next stop is the station we're on; count it as visited.
            self.state_timer = config.dwell_ticks;
            return Ok(VtolUpdateResult::Continue);
        }

        self.destination = Some(next);
        self.waypoints = path[1..].to_vec();
        self.state = VtolState::TakingOff;
        self.state_timer = config.takeoff_ticks;
        debug!("{} taking off from {} towards {}", self.id, station, next);

        Ok(VtolUpdateResult::LegStarted { from: station, to: next })
    }

    fn update_taking_off(
        &mut self,
        config: &SimConfig,
        vertiports: &mut BTreeMap<StationId, Vertiport>,
        persons: &mut BTreeMap<PersonId, Person>,
    ) -> Result<VtolUpdateResult> {
        if self.state_timer > 0 {
            return Ok(VtolUpdateResult::Continue);
        }

        let origin = self.station.context("Departing VTOL has no station")?;
        let destination = self.destination.context("Departing VTOL has no destination")?;
        let vertiport = vertiports
            .get_mut(&origin)
            .context("Origin vertiport not found")?;

        let free_seats = config.seat_capacity.saturating_sub(self.onboard.len());
        let boarding = vertiport.take_passengers_for(destination, free_seats);
        let boarded = boarding.len();
        for person_id in boarding {
            let person = persons
                .get_mut(&person_id)
                .context("Boarding passenger not found")?;
            person.begin_boarding(self.id)?;
            self.onboard.push(person_id);
            person.take_seat()?;
        }

        let granted = vertiport.takeoff(self.id)?;
        self.station = None;
        self.state = VtolState::Flying;
        debug!("{} airborne from {} with {} aboard", self.id, origin, self.onboard.len());

        Ok(VtolUpdateResult::Departed {
            from: origin,
            boarded,
            granted,
        })
    }

    fn update_flying(&mut self, config: &SimConfig, network: &Network) -> Result<VtolUpdateResult> {
        let Some(&target_id) = self.waypoints.first() else {
            self.state = VtolState::Landing;
            return Ok(VtolUpdateResult::Continue);
        };

        let target = network.position(target_id)?;
        let (position, reached) =
            self.position
                .step_towards(&target, self.speed, config.arrival_epsilon);
        self.position = position;

        if reached {
            self.waypoints.remove(0);
            if self.waypoints.is_empty() {
                self.state = VtolState::Landing;
                self.landing_cleared = false;
            }
        }

        Ok(VtolUpdateResult::Continue)
    }

    fn update_landing(
        &mut self,
        config: &SimConfig,
        vertiports: &mut BTreeMap<StationId, Vertiport>,
        persons: &mut BTreeMap<PersonId, Person>,
    ) -> Result<VtolUpdateResult> {
        let destination = self.destination.context("Landing VTOL has no destination")?;

        if !self.landing_cleared {
            let vertiport = vertiports
                .get_mut(&destination)
                .context("Destination vertiport not found")?;

            match vertiport.request_landing(self.id) {
                LandingDecision::Granted => {
                    self.landing_cleared = true;
                    self.state_timer = config.landing_ticks;
                }
                LandingDecision::Queued => {
                    self.state = VtolState::Hovering;
                    self.hover_wait.reset();
                    self.hover_count += 1;
                    debug!("{} hovering over {}", self.id, destination);
                    return Ok(VtolUpdateResult::Queued(destination));
                }
            }
        }

        if self.state_timer > 0 {
            return Ok(VtolUpdateResult::Continue);
        }

        self.complete_landing(destination, config, vertiports, persons)
    }

    fn complete_landing(
        &mut self,
        station: StationId,
        config: &SimConfig,
        vertiports: &mut BTreeMap<StationId, Vertiport>,
        persons: &mut BTreeMap<PersonId, Person>,
    ) -> Result<VtolUpdateResult> {
        let vertiport = vertiports
            .get_mut(&station)
            .context("Landing vertiport not found")?;

        self.state = VtolState::Landed;
        self.station = Some(station);
        self.destination = None;
        self.position = vertiport.position;
        self.landing_cleared = false;
        self.state_timer = config.dwell_ticks;
        self.landed_wait.reset();
        self.legs_completed += 1;

        let mut staying = Vec::with_capacity(self.onboard.len());
        let mut alighted = 0;
        for person_id in std::mem::take(&mut self.onboard) {
            let person = persons
                .get_mut(&person_id)
                .context("Onboard passenger not found")?;
            if person.destination == station {
                person.arrive()?;
                vertiport.record_arrival(person_id);
                alighted += 1;
            } else {
                staying.push(person_id);
            }
        }
        self.onboard = staying;

        debug!("{} landed at {}, {} passengers off", self.id, station, alighted);
        Ok(VtolUpdateResult::Landed { station, alighted })
    }

    fn update_hovering(
        &mut self,
        config: &SimConfig,
        network: &mut Network,
        vertiports: &mut BTreeMap<StationId, Vertiport>,
    ) -> Result<VtolUpdateResult> {
        let destination = self.destination.context("Hovering VTOL has no destination")?;
        let vertiport = vertiports
            .get_mut(&destination)
            .context("Hovering vertiport not found")?;

        if vertiport.take_clearance(self.id) {
            self.state = VtolState::Landing;
            self.landing_cleared = true;
            self.state_timer = config.landing_ticks;
            self.hover_wait.reset();
            return Ok(VtolUpdateResult::Cleared(destination));
        }

        match self.hover_wait.tick() {
            Some(RecoveryAction::Divert) => self.divert(destination, network, vertiports),
            _ => Ok(VtolUpdateResult::Continue),
        }
    }

    /// Leave the hovering queue at `from` for the nearest reachable station,
    /// preferring one with a free slot
    fn divert(
        &mut self,
        from: StationId,
        network: &mut Network,
        vertiports: &mut BTreeMap<StationId, Vertiport>,
    ) -> Result<VtolUpdateResult> {
        let candidates = network.reachable_from(from);
        let choice = candidates
            .iter()
            .find(|station| {
                vertiports
                    .get(*station)
                    .is_some_and(|vertiport| vertiport.has_free_slot())
            })
            .or_else(|| candidates.first())
            .copied();

        let Some(alternative) = choice else {
            warn!(
                "{} ({}) cannot leave {}: no other station is reachable",
                self.label, self.id, from
            );
            return Ok(VtolUpdateResult::Continue);
        };

        let path = network
            .route(from, alternative)
            .context("Diversion target not routable")?;

        vertiports
            .get_mut(&from)
            .context("Hovering vertiport not found")?
            .abandon(self.id);

        // A second diversion keeps the first abandoned stop.
        if self.resume_stop.is_none() {
            self.resume_stop = Some(from);
        }
        self.destination = Some(alternative);
        self.waypoints = path[1..].to_vec();
        self.state = VtolState::Flying;
        self.landing_cleared = false;
        self.hover_wait.reset();

        info!(
            "{} ({}) diverted from {} to {} after hovering too long",
            self.label, self.id, from, alternative
        );
        Ok(VtolUpdateResult::Diverted { from, to: alternative })
    }
}
