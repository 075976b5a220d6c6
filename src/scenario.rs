//! Scenario file loaders
//!
//! A scenario directory holds:
//!
//! ```text
//! stations.csv   name;capacity;x;y
//! links.csv      adjacency matrix, header `X;V1;V2;...`, `x` marks row -> column
//! demand.csv     start;end;origin;destination;count   (times as HH:MM)
//! routes.json    [{"vtol_id": "A1", "route": ["V1", "V2"], "mode": "ping_pong", "speed": 4.0}]
//! ```
//!
//! `demand.csv` and `routes.json` are optional. Every loader has a `_reader`
//! variant taking any `Read`, for tests and embedded data.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::simulation::{
    is_valid_speed, parse_time_of_day, DemandRecord, Position, RouteMode, SimConfig, SimError,
    SimResult, SimWorld,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationRecord {
    pub name: String,
    pub capacity: i64,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandRow {
    pub start_secs: u32,
    pub end_secs: u32,
    pub origin: String,
    pub destination: String,
    pub count: u32,
}

#[derive(Deserialize)]
struct RawDemandRow {
    start: String,
    end: String,
    origin: String,
    destination: String,
    count: u32,
}

/// Manifest IDs show up both as numbers and as strings
#[derive(Deserialize)]
#[serde(untagged)]
enum RawVtolId {
    Text(String),
    Number(u64),
}

#[derive(Deserialize)]
struct RawRouteRecord {
    vtol_id: RawVtolId,
    route: Vec<String>,
    #[serde(default)]
    mode: Option<RouteMode>,
    #[serde(default)]
    speed: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRecord {
    pub vtol_id: String,
    pub route: Vec<String>,
    pub mode: Option<RouteMode>,
    pub speed: Option<f32>,
}

impl RouteRecord {
    /// Explicit mode, else circular when the route closes on itself and
    /// ping-pong otherwise
    pub fn resolved_mode(&self) -> RouteMode {
        match self.mode {
            Some(mode) => mode,
            None if self.route.len() > 2 && self.route.first() == self.route.last() => {
                RouteMode::Circular
            }
            None => RouteMode::PingPong,
        }
    }
}

/// Everything needed to build a world, still referring to stations by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    pub stations: Vec<StationRecord>,
    pub links: Vec<LinkRecord>,
    pub demand: Vec<DemandRow>,
    pub routes: Vec<RouteRecord>,
}

fn semicolon_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_reader(reader)
}

pub fn load_stations_reader<R: Read>(reader: R) -> SimResult<Vec<StationRecord>> {
    let mut stations: Vec<StationRecord> = Vec::new();
    let mut seen = HashSet::new();

    for result in semicolon_reader(reader).deserialize::<StationRecord>() {
        let station = result?;
        if station.capacity < 1 {
            return Err(SimError::InvalidCapacity {
                name: station.name,
                capacity: station.capacity,
            });
        }
        if !seen.insert(station.name.clone()) {
            return Err(SimError::DuplicateStation(station.name));
        }
        stations.push(station);
    }

    Ok(stations)
}

pub fn load_links_reader<R: Read>(reader: R) -> SimResult<Vec<LinkRecord>> {
    let mut csv_reader = semicolon_reader(reader);
    let columns: Vec<String> = csv_reader
        .headers()?
        .iter()
        .skip(1)
        .map(str::to_string)
        .collect();

    let mut links = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let Some(from) = record.get(0) else {
            continue;
        };

        for (column, cell) in columns.iter().zip(record.iter().skip(1)) {
            if !cell.eq_ignore_ascii_case("x") {
                continue;
            }
            if column == from {
                return Err(SimError::SelfLoop(from.to_string()));
            }
            links.push(LinkRecord {
                from: from.to_string(),
                to: column.clone(),
            });
        }
    }

    Ok(links)
}

pub fn load_demand_reader<R: Read>(reader: R) -> SimResult<Vec<DemandRow>> {
    let mut rows = Vec::new();

    for result in semicolon_reader(reader).deserialize::<RawDemandRow>() {
        let raw = result?;
        let parse = |text: &str| {
            parse_time_of_day(text)
                .ok_or_else(|| SimError::InvalidDemand(format!("bad time {text:?}")))
        };
        let start_secs = parse(&raw.start)?;
        let end_secs = parse(&raw.end)?;

        if end_secs <= start_secs {
            return Err(SimError::InvalidDemand(format!(
                "window {}-{} for {}->{} is empty",
                raw.start, raw.end, raw.origin, raw.destination
            )));
        }
        if raw.origin == raw.destination {
            return Err(SimError::InvalidDemand(format!(
                "origin and destination are both {}",
                raw.origin
            )));
        }

        rows.push(DemandRow {
            start_secs,
            end_secs,
            origin: raw.origin,
            destination: raw.destination,
            count: raw.count,
        });
    }

    Ok(rows)
}

pub fn load_routes_reader<R: Read>(reader: R) -> SimResult<Vec<RouteRecord>> {
    let raw: Vec<RawRouteRecord> = serde_json::from_reader(reader)?;

    raw.into_iter()
        .map(|record| {
            let vtol_id = match record.vtol_id {
                RawVtolId::Text(text) => text,
                RawVtolId::Number(number) => number.to_string(),
            };
            if record.route.len() < 2 {
                return Err(SimError::InvalidRoute {
                    vehicle: vtol_id,
                    reason: "needs at least two stops".to_string(),
                });
            }
            if let Some(speed) = record.speed.filter(|speed| !is_valid_speed(*speed)) {
                return Err(SimError::InvalidRoute {
                    vehicle: vtol_id,
                    reason: format!("speed must be a positive number, got {speed}"),
                });
            }
            Ok(RouteRecord {
                vtol_id,
                route: record.route,
                mode: record.mode,
                speed: record.speed,
            })
        })
        .collect()
}

fn open(path: &Path) -> SimResult<std::io::BufReader<std::fs::File>> {
    Ok(std::io::BufReader::new(std::fs::File::open(path)?))
}

impl Scenario {
    /// Load a scenario directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let stations_path = dir.join("stations.csv");
        let links_path = dir.join("links.csv");
        let demand_path = dir.join("demand.csv");
        let routes_path = dir.join("routes.json");

        let stations = open(&stations_path)
            .and_then(load_stations_reader)
            .with_context(|| format!("Failed to load {}", stations_path.display()))?;
        let links = open(&links_path)
            .and_then(load_links_reader)
            .with_context(|| format!("Failed to load {}", links_path.display()))?;

        let demand = if demand_path.exists() {
            open(&demand_path)
                .and_then(load_demand_reader)
                .with_context(|| format!("Failed to load {}", demand_path.display()))?
        } else {
            Vec::new()
        };

        let routes = if routes_path.exists() {
            open(&routes_path)
                .and_then(load_routes_reader)
                .with_context(|| format!("Failed to load {}", routes_path.display()))?
        } else {
            Vec::new()
        };

        info!(
            "Loaded scenario from {}: {} stations, {} links, {} demand rows, {} routes",
            dir.display(),
            stations.len(),
            links.len(),
            demand.len(),
            routes.len()
        );

        Ok(Self {
            stations,
            links,
            demand,
            routes,
        })
    }
}

impl SimWorld {
    /// Build a world from loaded scenario records
    ///
    /// Fails on the first record that names an unknown station or is
    /// otherwise invalid; no partially built world is returned.
    pub fn from_scenario(scenario: &Scenario, config: SimConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;
        let mut world = SimWorld::with_config(config, seed);

        for station in &scenario.stations {
            let capacity = usize::try_from(station.capacity)
                .ok()
                .filter(|capacity| *capacity > 0)
                .ok_or_else(|| SimError::InvalidCapacity {
                    name: station.name.clone(),
                    capacity: station.capacity,
                })?;
            world.add_station(&station.name, capacity, Position::new(station.x, station.y))?;
        }

        for link in &scenario.links {
            let from = world.station_id(&link.from)?;
            let to = world.station_id(&link.to)?;
            world.add_link(from, to)?;
        }

        for row in &scenario.demand {
            let record = DemandRecord {
                start_secs: row.start_secs,
                end_secs: row.end_secs,
                origin: world.station_id(&row.origin)?,
                destination: world.station_id(&row.destination)?,
                count: row.count,
            };
            world.add_demand(record)?;
        }

        for route in &scenario.routes {
            let stops = route
                .route
                .iter()
                .map(|name| world.station_id(name))
                .collect::<Result<Vec<_>>>()?;
            world
                .add_route_vtol(&route.vtol_id, stops, route.resolved_mode(), route.speed)
                .with_context(|| format!("Failed to add VTOL {}", route.vtol_id))?;
        }

        Ok(world)
    }
}
