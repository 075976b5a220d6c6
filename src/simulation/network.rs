//! Vertiport network graph for routing
//!
//! Links are directional: a link A→B can only be flown from A to B.

use anyhow::{Context, Result};
use ordered_float::OrderedFloat;
use petgraph::algo::{astar, dijkstra};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

use super::error::SimError;
use super::types::{Position, StationId};

/// Edge data for the network graph
#[derive(Debug, Clone, Copy)]
pub struct LinkEdge {
    pub distance: OrderedFloat<f32>,
}

impl LinkEdge {
    pub fn between(from: &Position, to: &Position) -> Self {
        Self {
            distance: OrderedFloat(from.distance(to)),
        }
    }
}

/// Derived link statistics, informational only
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NetworkStats {
    pub stations: usize,
    pub links: usize,
    /// Unordered station pairs linked in both directions
    pub bidirectional_pairs: usize,
    /// Links whose reverse link does not exist
    pub one_way_links: usize,
    /// Share of links that belong to a bidirectional pair
    pub bidirectional_ratio: f32,
}

#[derive(Default)]
pub struct Network {
    /// The underlying petgraph directed graph
    graph: DiGraph<StationId, LinkEdge>,

    /// Maps station IDs to their node indices in the graph
    station_to_node: HashMap<StationId, NodeIndex>,

    /// Station names, for lookups coming from configuration
    names: HashMap<String, StationId>,

    /// Station positions
    positions: HashMap<StationId, Position>,

    /// Cached path results
    path_cache: HashMap<StationId, HashMap<StationId, Option<Vec<StationId>>>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a station to the network graph
    pub fn add_station(&mut self, station_id: StationId, name: &str, position: Position) {
        if self.station_to_node.contains_key(&station_id) {
            return;
        }

        let node_index = self.graph.add_node(station_id);
        self.station_to_node.insert(station_id, node_index);
        self.names.insert(name.to_string(), station_id);
        self.positions.insert(station_id, position);
        self.path_cache.clear();
    }

    /// Adds a directional link from `from` to `to`
    ///
    /// Returns `Ok(false)` when the link already existed.
    pub fn add_link(&mut self, from: StationId, to: StationId) -> Result<bool> {
        if from == to {
            return Err(SimError::SelfLoop(from.to_string()).into());
        }

        let from_node = self.node(from)?;
        let to_node = self.node(to)?;

        if self.graph.find_edge(from_node, to_node).is_some() {
            return Ok(false);
        }

        let edge = LinkEdge::between(&self.positions[&from], &self.positions[&to]);
        self.graph.add_edge(from_node, to_node, edge);
        self.path_cache.clear();
        Ok(true)
    }

    fn node(&self, station_id: StationId) -> Result<NodeIndex> {
        self.station_to_node
            .get(&station_id)
            .copied()
            .ok_or_else(|| SimError::UnknownStation(station_id.to_string()).into())
    }

    /// Whether a direct link exists in the given direction
    pub fn has_link(&self, from: StationId, to: StationId) -> bool {
        match (self.station_to_node.get(&from), self.station_to_node.get(&to)) {
            (Some(from_node), Some(to_node)) => {
                self.graph.find_edge(*from_node, *to_node).is_some()
            }
            _ => false,
        }
    }

    pub fn is_bidirectional(&self, a: StationId, b: StationId) -> bool {
        self.has_link(a, b) && self.has_link(b, a)
    }

    /// Finds the shortest route between two stations using A* (Dijkstra with null heuristic)
    ///
    /// The result starts with `start` and ends with `end`. `None` means no
    /// path exists following link directions.
    pub fn route(&mut self, start: StationId, end: StationId) -> Option<Vec<StationId>> {
        if let Some(cached) = self.path_cache.get(&start).and_then(|paths| paths.get(&end)) {
            return cached.clone();
        }

        let path = self.compute_route(start, end);
        self.path_cache
            .entry(start)
            .or_default()
            .insert(end, path.clone());
        path
    }

    fn compute_route(&self, start: StationId, end: StationId) -> Option<Vec<StationId>> {
        let start_node = *self.station_to_node.get(&start)?;
        let end_node = *self.station_to_node.get(&end)?;

        if start_node == end_node {
            return Some(vec![start]);
        }

        let (_, node_path) = astar(
            &self.graph,
            start_node,
            |node| node == end_node,
            |edge| edge.weight().distance,
            |_| OrderedFloat(0.0),
        )?;

        Some(node_path.into_iter().map(|node| self.graph[node]).collect())
    }

    /// Every station reachable from `from`, nearest (by path length) first
    pub fn reachable_from(&self, from: StationId) -> Vec<StationId> {
        let Some(&start_node) = self.station_to_node.get(&from) else {
            return Vec::new();
        };

        let costs = dijkstra(&self.graph, start_node, None, |edge| edge.weight().distance);

        let mut reachable: Vec<(OrderedFloat<f32>, StationId)> = costs
            .into_iter()
            .filter(|(node, _)| *node != start_node)
            .map(|(node, cost)| (cost, self.graph[node]))
            .collect();
        reachable.sort();
        reachable.into_iter().map(|(_, station)| station).collect()
    }

    /// Stations directly reachable from a station
    pub fn neighbors(&self, station_id: StationId) -> Vec<StationId> {
        let Some(&node) = self.station_to_node.get(&station_id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<StationId> = self
            .graph
            .edges(node)
            .map(|edge| self.graph[edge.target()])
            .collect();
        neighbors.sort();
        neighbors
    }

    pub fn station_by_name(&self, name: &str) -> Option<StationId> {
        self.names.get(name).copied()
    }

    pub fn position(&self, station_id: StationId) -> Result<Position> {
        self.positions
            .get(&station_id)
            .copied()
            .with_context(|| format!("Station {} has no position", station_id))
    }

    pub fn positions(&self) -> &HashMap<StationId, Position> {
        &self.positions
    }

    /// All links as (from, to) pairs
    pub fn links(&self) -> Vec<(StationId, StationId)> {
        let mut links: Vec<_> = self
            .graph
            .edge_references()
            .map(|edge| (self.graph[edge.source()], self.graph[edge.target()]))
            .collect();
        links.sort();
        links
    }

    pub fn station_count(&self) -> usize {
        self.station_to_node.len()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn stats(&self) -> NetworkStats {
        let links = self.links();
        let paired = links
            .iter()
            .filter(|(from, to)| self.has_link(*to, *from))
            .count();
        let one_way_links = links.len() - paired;

        NetworkStats {
            stations: self.station_count(),
            links: links.len(),
            bidirectional_pairs: paired / 2,
            one_way_links,
            bidirectional_ratio: if links.is_empty() {
                0.0
            } else {
                paired as f32 / links.len() as f32
            },
        }
    }
}
