//! Main simulation world that ties everything together
//!
//! Owns the clock and every registry, and drives one tick at a time in a
//! fixed order: demand, VTOLs, hovering-queue release, passengers.

use anyhow::{Context, Result};
use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::clock::SimClock;
use super::config::{is_valid_speed, SimConfig};
use super::demand::{DemandModel, DemandRecord};
use super::error::SimError;
use super::network::Network;
use super::person::{Person, PersonUpdateResult};
use super::route::RouteMode;
use super::snapshot::{PersonView, SimCommand, SimSnapshot, VertiportView, VtolView};
use super::stats::SimStats;
use super::types::{PersonId, Position, SimId, StationId, VtolId, VtolState};
use super::vertiport::Vertiport;
use super::vtol::{Vtol, VtolManifest};

/// The main simulation world
pub struct SimWorld {
    /// Station graph for routing
    pub network: Network,

    /// All vertiports, keyed by station
    pub vertiports: BTreeMap<StationId, Vertiport>,

    /// All VTOLs, in creation order
    pub vtols: BTreeMap<VtolId, Vtol>,

    /// Passengers currently in the simulation
    pub persons: BTreeMap<PersonId, Person>,

    /// Passenger demand driving spawns
    pub demand: DemandModel,

    pub config: SimConfig,

    clock: SimClock,

    /// Next ID to assign
    next_id: usize,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,

    paused: bool,

    stats: SimStats,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(config: SimConfig, rng: Option<StdRng>) -> Self {
        Self {
            network: Network::new(),
            vertiports: BTreeMap::new(),
            vtols: BTreeMap::new(),
            persons: BTreeMap::new(),
            demand: DemandModel::default(),
            clock: SimClock::new(config.tick_secs, config.start_time_secs),
            config,
            next_id: 0,
            rng,
            paused: false,
            stats: SimStats::default(),
        }
    }

    pub fn new() -> Self {
        Self::new_internal(SimConfig::default(), None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(seed: u64) -> Self {
        Self::new_internal(SimConfig::default(), Some(StdRng::seed_from_u64(seed)))
    }

    pub fn with_config(config: SimConfig, seed: Option<u64>) -> Self {
        Self::new_internal(config, seed.map(StdRng::seed_from_u64))
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Add a vertiport
    pub fn add_station(&mut self, name: &str, capacity: usize, position: Position) -> Result<StationId> {
        if self.network.station_by_name(name).is_some() {
            return Err(SimError::DuplicateStation(name.to_string()).into());
        }
        if capacity == 0 {
            return Err(SimError::InvalidCapacity {
                name: name.to_string(),
                capacity: 0,
            }
            .into());
        }

        let id = StationId(self.next_sim_id());
        self.vertiports
            .insert(id, Vertiport::new(id, name, position, capacity));
        self.network.add_station(id, name, position);
        Ok(id)
    }

    /// Add a one-way link; returns `false` if it already existed
    pub fn add_link(&mut self, from: StationId, to: StationId) -> Result<bool> {
        self.network.add_link(from, to)
    }

    /// Add links in both directions between two stations
    pub fn add_two_way_link(&mut self, a: StationId, b: StationId) -> Result<()> {
        self.add_link(a, b)?;
        self.add_link(b, a)?;
        Ok(())
    }

    pub fn station_id(&self, name: &str) -> Result<StationId> {
        self.network
            .station_by_name(name)
            .ok_or_else(|| SimError::UnknownStation(name.to_string()).into())
    }

    pub fn station_name(&self, id: StationId) -> Option<&str> {
        self.vertiports.get(&id).map(|vertiport| vertiport.name.as_str())
    }

    pub fn add_demand(&mut self, record: DemandRecord) -> Result<()> {
        for station in [record.origin, record.destination] {
            if !self.vertiports.contains_key(&station) {
                return Err(SimError::UnknownStation(station.to_string()).into());
            }
        }
        if record.origin == record.destination {
            return Err(SimError::InvalidDemand(format!(
                "origin and destination are both {}",
                record.origin
            ))
            .into());
        }

        self.demand.push(record);
        Ok(())
    }

    /// Add a VTOL that follows a fixed list of stops
    ///
    /// A circular route given with its closing stop repeated (`A, B, A`) is
    /// stored without the repeat.
    pub fn add_route_vtol(
        &mut self,
        label: &str,
        mut stops: Vec<StationId>,
        mode: RouteMode,
        speed: Option<f32>,
    ) -> Result<VtolId> {
        if mode == RouteMode::Circular && stops.len() > 2 && stops.first() == stops.last() {
            stops.pop();
        }
        if stops.len() < 2 {
            return Err(SimError::InvalidRoute {
                vehicle: label.to_string(),
                reason: "needs at least two stops".to_string(),
            }
            .into());
        }
        if let Some(unknown) = stops.iter().find(|stop| !self.vertiports.contains_key(*stop)) {
            return Err(SimError::UnknownStation(unknown.to_string()).into());
        }
        let speed = self.resolve_speed(label, speed)?;

        self.create_vtol(VtolManifest {
            label: label.to_string(),
            stops,
            mode,
            speed,
            departure_tick: 0,
        })
    }

    /// Add a one-shot VTOL flying from `origin` to `destination`
    ///
    /// It waits at the origin until `start_secs` (time of day) and overflies
    /// any intermediate stations on the way.
    pub fn spawn_vtol(
        &mut self,
        origin: StationId,
        destination: StationId,
        start_secs: u32,
        speed: Option<f32>,
    ) -> Result<VtolId> {
        if origin == destination {
            return Err(SimError::InvalidRoute {
                vehicle: format!("{origin}->{destination}"),
                reason: "origin and destination are the same".to_string(),
            }
            .into());
        }
        let speed = self.resolve_speed(&format!("{origin}->{destination}"), speed)?;
        if self.network.route(origin, destination).is_none() {
            return Err(SimError::NoRoute {
                from: origin,
                to: destination,
            }
            .into());
        }

        let label = format!(
            "{}-{}",
            self.station_name(origin).unwrap_or("?"),
            self.station_name(destination).unwrap_or("?")
        );
        let id = self.create_vtol(VtolManifest {
            label,
            stops: vec![origin, destination],
            mode: RouteMode::OneShot,
            speed,
            departure_tick: self.clock.tick_at(start_secs),
        })?;
        info!("Spawned {} from {} to {}", id, origin, destination);
        Ok(id)
    }

    /// Explicit speed, else the configured default; either must be usable
    fn resolve_speed(&self, vehicle: &str, speed: Option<f32>) -> Result<f32> {
        let speed = speed.unwrap_or(self.config.default_speed);
        if !is_valid_speed(speed) {
            return Err(SimError::InvalidRoute {
                vehicle: vehicle.to_string(),
                reason: format!("speed must be a positive number, got {speed}"),
            }
            .into());
        }
        Ok(speed)
    }

    fn create_vtol(&mut self, manifest: VtolManifest) -> Result<VtolId> {
        let first = *manifest.stops.first().context("Route has no stops")?;
        let position = self.network.position(first)?;

        let id = VtolId(self.next_sim_id());
        let mut vtol = Vtol::new(id, manifest, position, &self.config);
        let decision = self
            .vertiports
            .get_mut(&first)
            .context("First stop vertiport not found")?
            .request_landing(id);
        vtol.place(decision);

        self.vtols.insert(id, vtol);
        self.stats.vtols_spawned += 1;
        Ok(id)
    }

    /// Add a waiting passenger at `origin`
    pub fn add_person(&mut self, origin: StationId, destination: StationId) -> Result<PersonId> {
        if !self.vertiports.contains_key(&destination) {
            return Err(SimError::UnknownStation(destination.to_string()).into());
        }
        if origin == destination {
            return Err(SimError::InvalidDemand(format!(
                "passenger origin and destination are both {origin}"
            ))
            .into());
        }

        let id = PersonId(self.next_sim_id());
        self.vertiports
            .get_mut(&origin)
            .context("Origin vertiport not found")?
            .add_waiting_passenger(id, destination);
        self.persons.insert(
            id,
            Person::new(
                id,
                origin,
                destination,
                self.clock.tick(),
                self.config.person_exit_ticks,
            ),
        );
        self.stats.passengers_spawned += 1;
        Ok(id)
    }

    /// Put every VTOL back at the start of its route
    ///
    /// Passengers aboard at that moment leave the simulation.
    pub fn restart_routes(&mut self) -> Result<()> {
        for vtol in self.vtols.values_mut() {
            for vertiport in self.vertiports.values_mut() {
                vertiport.evict(vtol.id);
            }
            for person_id in vtol.unload_all() {
                self.persons.remove(&person_id);
                self.stats.passengers_dropped += 1;
            }

            let first = vtol.route().first().context("Route has no stops")?;
            vtol.reset(self.network.position(first)?, &self.config);
        }

        // Place only after every slot is released, so creation order decides
        // who gets the first stop when it is oversubscribed.
        for vtol in self.vtols.values_mut() {
            let first = vtol.route().first().context("Route has no stops")?;
            let decision = self
                .vertiports
                .get_mut(&first)
                .context("First stop vertiport not found")?
                .request_landing(vtol.id);
            vtol.place(decision);
        }

        info!("Restarted {} routes", self.vtols.len());
        Ok(())
    }

    /// Apply a command from the presentation layer
    pub fn apply(&mut self, command: SimCommand) -> Result<()> {
        match command {
            SimCommand::Pause => self.pause(),
            SimCommand::Resume => self.resume(),
            SimCommand::TogglePause => self.toggle_pause(),
            SimCommand::RestartRoutes => self.restart_routes()?,
            SimCommand::SpawnVtol {
                origin,
                destination,
                start_secs,
                speed,
            } => {
                self.spawn_vtol(origin, destination, start_secs, speed)?;
            }
        }
        Ok(())
    }

    /// Spawn this tick's passengers from the active demand
    fn spawn_demand(&mut self) {
        let time_of_day = self.clock.time_of_day();
        let tick_secs = self.clock.tick_secs();
        let spawns = match &mut self.rng {
            Some(rng) => self.demand.spawn_trials(time_of_day, tick_secs, rng),
            None => self
                .demand
                .spawn_trials(time_of_day, tick_secs, &mut rand::rng()),
        };

        for (origin, destination) in spawns {
            if let Err(err) = self.add_person(origin, destination) {
                error!("Failed to spawn passenger {origin}->{destination}: {err:#}");
            }
        }
    }

    /// Update all VTOLs in creation order
    fn update_vtols(&mut self) {
        for vtol in self.vtols.values_mut() {
            let was_stalled = vtol.is_stalled();
            let result = vtol.update(
                &self.clock,
                &self.config,
                &mut self.network,
                &mut self.vertiports,
                &mut self.persons,
            );

            match result {
                Ok(result) => self.stats.record(&result, was_stalled),
                Err(err) => error!("{} ({}) update failed: {err:#}", vtol.label, vtol.id),
            }
        }
    }

    /// Hand any free slots to hovering VTOLs
    fn release_queues(&mut self) {
        for vertiport in self.vertiports.values_mut() {
            let granted = vertiport.release_hovering();
            if !granted.is_empty() {
                debug!("{} cleared {:?} to land", vertiport.name, granted);
            }
        }
    }

    fn update_persons(&mut self) {
        let mut leaving = Vec::new();
        for person in self.persons.values_mut() {
            if person.update() == PersonUpdateResult::Remove {
                leaving.push((person.id, person.destination));
            }
        }

        for (person_id, destination) in leaving {
            self.persons.remove(&person_id);
            if let Some(vertiport) = self.vertiports.get_mut(&destination) {
                vertiport.remove_arrival(person_id);
            }
            self.stats.passengers_exited += 1;
        }
    }

    /// Main simulation tick
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }

        self.clock.advance();
        self.spawn_demand();
        self.update_vtols();
        self.release_queues();
        self.update_persons();

        #[cfg(debug_assertions)]
        if let Err(err) = self.check_invariants() {
            panic!("tick {}: {err:#}", self.clock.tick());
        }
    }

    /// Run `ticks` ticks
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Verify slot bookkeeping against VTOL and passenger states
    pub fn check_invariants(&self) -> Result<()> {
        for vertiport in self.vertiports.values() {
            if vertiport.occupants().len() > vertiport.capacity {
                return Err(SimError::Invariant(format!(
                    "{} holds {} VTOLs with capacity {}",
                    vertiport.name,
                    vertiport.occupants().len(),
                    vertiport.capacity
                ))
                .into());
            }
        }

        for vtol in self.vtols.values() {
            self.check_vtol_location(vtol)?;
        }

        let mut owners: BTreeMap<PersonId, usize> = BTreeMap::new();
        for vertiport in self.vertiports.values() {
            for person_id in vertiport.waiting_passengers().chain(vertiport.arrived()) {
                *owners.entry(*person_id).or_default() += 1;
            }
        }
        for vtol in self.vtols.values() {
            for person_id in vtol.onboard() {
                *owners.entry(*person_id).or_default() += 1;
            }
        }
        for person_id in self.persons.keys() {
            let count = owners.get(person_id).copied().unwrap_or(0);
            if count != 1 {
                return Err(SimError::Invariant(format!(
                    "{person_id} is held in {count} places"
                ))
                .into());
            }
        }

        Ok(())
    }

    fn check_vtol_location(&self, vtol: &Vtol) -> Result<()> {
        let occupied: Vec<StationId> = self
            .vertiports
            .values()
            .filter(|vertiport| vertiport.is_occupant(vtol.id))
            .map(|vertiport| vertiport.id)
            .collect();
        let queued: Vec<StationId> = self
            .vertiports
            .values()
            .filter(|vertiport| vertiport.is_queued(vtol.id))
            .map(|vertiport| vertiport.id)
            .collect();

        let consistent = match vtol.state() {
            VtolState::Landed | VtolState::TakingOff => {
                queued.is_empty() && vtol.station().is_some_and(|s| occupied == [s])
            }
            VtolState::Flying => occupied.is_empty() && queued.is_empty(),
            VtolState::Landing if vtol.is_landing_cleared() => {
                queued.is_empty() && vtol.destination().is_some_and(|d| occupied == [d])
            }
            VtolState::Landing => occupied.is_empty() && queued.is_empty(),
            VtolState::Hovering => vtol.destination().is_some_and(|d| {
                let waiting = occupied.is_empty() && queued == [d];
                let cleared = queued.is_empty()
                    && occupied == [d]
                    && self
                        .vertiports
                        .get(&d)
                        .is_some_and(|vertiport| vertiport.has_clearance(vtol.id));
                waiting || cleared
            }),
        };

        if consistent {
            Ok(())
        } else {
            Err(SimError::Invariant(format!(
                "{} is {} but occupies {:?} and is queued at {:?}",
                vtol.id,
                vtol.state(),
                occupied,
                queued
            ))
            .into())
        }
    }

    fn name_of(&self, station: Option<StationId>) -> Option<String> {
        station
            .and_then(|id| self.station_name(id))
            .map(str::to_string)
    }

    /// Read-only view of the current state
    pub fn snapshot(&self) -> SimSnapshot {
        let vtols = self
            .vtols
            .values()
            .map(|vtol| VtolView {
                id: vtol.id,
                label: vtol.label.clone(),
                position: vtol.position,
                state: vtol.state(),
                station: self.name_of(vtol.station()),
                destination: self.name_of(vtol.destination()),
                onboard: vtol.onboard().len(),
                stalled: vtol.is_stalled(),
            })
            .collect();

        let vertiports = self
            .vertiports
            .values()
            .map(|vertiport| {
                let occupancy = vertiport.occupancy();
                VertiportView {
                    id: vertiport.id,
                    name: vertiport.name.clone(),
                    position: vertiport.position,
                    occupied: occupancy.occupied,
                    capacity: occupancy.capacity,
                    hovering: occupancy.hovering,
                    waiting: occupancy.waiting,
                }
            })
            .collect();

        let persons = self
            .persons
            .values()
            .map(|person| PersonView {
                id: person.id,
                station: self.name_of(person.station()),
                destination: self
                    .name_of(Some(person.destination))
                    .unwrap_or_default(),
                state: person.state(),
            })
            .collect();

        SimSnapshot {
            tick: self.clock.tick(),
            time_of_day: self.clock.to_string(),
            paused: self.paused,
            vtols,
            vertiports,
            persons,
            stats: self.stats.clone(),
        }
    }

    /// Create the built-in five-station demo world
    pub fn create_demo_world() -> Result<Self> {
        Self::build_demo_world(SimWorld::new())
    }

    /// Create the demo world with a seeded RNG for reproducible simulations
    pub fn create_demo_world_with_seed(seed: u64) -> Result<Self> {
        Self::build_demo_world(SimWorld::new_with_seed(seed))
    }

    /// Populate a world with the demo stations, links, routes and demand
    pub fn build_demo_world(mut world: SimWorld) -> Result<Self> {
        let stations = [
            ("V1", 2, Position::new(0.0, 0.0)),
            ("V2", 1, Position::new(120.0, 0.0)),
            ("V3", 2, Position::new(160.0, 100.0)),
            ("V4", 1, Position::new(60.0, 160.0)),
            ("V5", 2, Position::new(-40.0, 100.0)),
        ];

        let mut ids = Vec::with_capacity(stations.len());
        for (name, capacity, position) in stations {
            ids.push(world.add_station(name, capacity, position)?);
        }
        let [v1, v2, v3, v4, v5] = [ids[0], ids[1], ids[2], ids[3], ids[4]];

        // Ring, plus a V1-V3 shortcut and a one-way V4 -> V1 return
        for (a, b) in [(v1, v2), (v2, v3), (v3, v4), (v4, v5), (v5, v1), (v1, v3)] {
            world.add_two_way_link(a, b)?;
        }
        world.add_link(v4, v1)?;

        world.add_route_vtol("A1", vec![v1, v2, v3, v1], RouteMode::Circular, None)?;
        world.add_route_vtol("A2", vec![v1, v3, v5], RouteMode::PingPong, None)?;
        world.add_route_vtol("A3", vec![v2, v4], RouteMode::PingPong, Some(5.0))?;
        world.add_route_vtol("A4", vec![v5, v4, v3, v5], RouteMode::Circular, None)?;

        let hours = |h: u32| h * 3600;
        let demand = [
            (hours(4), hours(6), v1, v3, 20),
            (hours(4), hours(6), v2, v4, 12),
            (hours(4), hours(7), v3, v5, 10),
            (hours(5), hours(8), v5, v1, 15),
            (hours(6), hours(9), v4, v2, 10),
            (hours(6), hours(9), v1, v2, 18),
        ];
        for (start_secs, end_secs, origin, destination, count) in demand {
            world.add_demand(DemandRecord {
                start_secs,
                end_secs,
                origin,
                destination,
                count,
            })?;
        }

        Ok(world)
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        let stats = self.network.stats();
        println!("=== Vertiport Simulation Summary ===");
        println!(
            "Tick: {} ({}){}",
            self.clock.tick(),
            self.clock,
            if self.paused { " [paused]" } else { "" }
        );
        println!(
            "Stations: {}, Links: {} ({} two-way pairs, {} one-way)",
            stats.stations, stats.links, stats.bidirectional_pairs, stats.one_way_links
        );

        let mut by_state: BTreeMap<&str, usize> = BTreeMap::new();
        for vtol in self.vtols.values() {
            *by_state.entry(vtol.state().as_str()).or_default() += 1;
        }
        let states: Vec<String> = by_state
            .iter()
            .map(|(state, count)| format!("{state}={count}"))
            .collect();
        println!("VTOLs: {} [{}]", self.vtols.len(), states.join(", "));
        println!("Passengers in system: {}", self.persons.len());
        println!();

        println!("--- Vertiports ---");
        for vertiport in self.vertiports.values() {
            let occupancy = vertiport.occupancy();
            println!(
                "  {:<4} slots={}/{} hovering={} waiting={} ({:.0}% full)",
                vertiport.name,
                occupancy.occupied,
                occupancy.capacity,
                occupancy.hovering,
                occupancy.waiting,
                occupancy.occupancy_rate * 100.0
            );
        }

        println!("--- VTOLs ---");
        for vtol in self.vtols.values() {
            let place = match (vtol.station(), vtol.destination()) {
                (Some(station), _) => format!("at {}", self.name_of(Some(station)).unwrap_or_default()),
                (None, Some(destination)) => {
                    format!("to {}", self.name_of(Some(destination)).unwrap_or_default())
                }
                (None, None) => "-".to_string(),
            };
            println!(
                "  {:<8} {:<10} {:<10} position=({:.1}, {:.1}) onboard={}{}",
                vtol.label,
                vtol.state(),
                place,
                vtol.position.x,
                vtol.position.y,
                vtol.onboard().len(),
                if vtol.is_stalled() { " STALLED" } else { "" }
            );
        }

        println!("--- Totals ---");
        println!(
            "  Passengers: spawned={} delivered={} dropped={} ({:.1}% delivered)",
            self.stats.passengers_spawned,
            self.stats.passengers_delivered,
            self.stats.passengers_dropped,
            self.stats.delivery_rate() * 100.0
        );
        println!(
            "  Flights: departures={} landings={} queued={} diversions={} stalls={} skipped={}",
            self.stats.departures,
            self.stats.landings,
            self.stats.times_queued,
            self.stats.diversions,
            self.stats.stalls,
            self.stats.skipped_stops
        );
    }

    /// Draw a visual map of the world in the terminal
    pub fn draw_map(&self) {
        let positions = self.network.positions();
        if positions.is_empty() {
            return;
        }

        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for pos in positions.values() {
            min_x = min_x.min(pos.x);
            max_x = max_x.max(pos.x);
            min_y = min_y.min(pos.y);
            max_y = max_y.max(pos.y);
        }

        // Fit the wider axis into 60 columns; rows are about twice as tall
        let span = (max_x - min_x).max(max_y - min_y).max(1.0);
        let scale = 60.0 / span;
        let width = ((max_x - min_x) * scale) as usize + 3;
        let height = ((max_y - min_y) * scale * 0.5) as usize + 3;

        let mut grid = vec![vec![' '; width]; height];

        let to_grid = |pos: &Position| -> (usize, usize) {
            let col = ((pos.x - min_x) * scale) as usize + 1;
            // Flip the Y axis so north is up
            let row = ((max_y - pos.y) * scale * 0.5) as usize + 1;
            (row.min(height - 1), col.min(width - 1))
        };

        for (from, to) in self.network.links() {
            let (Some(start), Some(end)) = (positions.get(&from), positions.get(&to)) else {
                continue;
            };
            let (start_row, start_col) = to_grid(start);
            let (end_row, end_col) = to_grid(end);

            // Bresenham line
            let dx = (end_col as i32 - start_col as i32).abs();
            let dy = (end_row as i32 - start_row as i32).abs();
            let sx = if start_col < end_col { 1 } else { -1 };
            let sy = if start_row < end_row { 1 } else { -1 };

            let mut err = dx - dy;
            let mut x = start_col as i32;
            let mut y = start_row as i32;

            loop {
                if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
                    let cell = &mut grid[y as usize][x as usize];
                    if *cell == ' ' {
                        *cell = '·';
                    }
                }

                if x == end_col as i32 && y == end_row as i32 {
                    break;
                }

                let e2 = 2 * err;
                if e2 > -dy {
                    err -= dy;
                    x += sx;
                }
                if e2 < dx {
                    err += dx;
                    y += sy;
                }
            }
        }

        for vtol in self.vtols.values() {
            if vtol.state() == VtolState::Flying || vtol.state() == VtolState::Hovering {
                let (row, col) = to_grid(&vtol.position);
                grid[row][col] = if vtol.state() == VtolState::Hovering { 'h' } else { '>' };
            }
        }

        // Stations last so they are never hidden; show the free slot count
        for vertiport in self.vertiports.values() {
            let (row, col) = to_grid(&vertiport.position);
            let free = vertiport.occupancy().available;
            grid[row][col] = char::from_digit(free.min(9) as u32, 10).unwrap_or('#');
        }

        println!("\n=== Network Map ===");
        println!("Legend: digit=vertiport (free slots), >=VTOL in flight, h=hovering, ·=link");
        println!();
        for row in &grid {
            let line: String = row.iter().collect();
            println!("{}", line.trim_end());
        }
        for vertiport in self.vertiports.values() {
            println!(
                "  {} at ({:.0}, {:.0})",
                vertiport.name, vertiport.position.x, vertiport.position.y
            );
        }
        println!();
    }
}
