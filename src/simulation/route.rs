//! Route plans and their traversal modes

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::StationId;

/// How a VTOL walks its list of stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Visit every stop once, then hold at the last one
    OneShot,
    /// After the last stop, continue with the first
    Circular,
    /// Walk forward to the last stop, then backward to the first, and repeat
    PingPong,
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RouteMode::OneShot => "one-shot",
            RouteMode::Circular => "circular",
            RouteMode::PingPong => "ping-pong",
        };
        f.write_str(text)
    }
}

/// An ordered list of stops plus a cursor
///
/// The cursor points at the stop the VTOL last departed towards (or started
/// at). `peek_next` is pure; `advance` commits to the stop `peek_next`
/// returned, including any direction reversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    stops: Vec<StationId>,
    mode: RouteMode,
    index: usize,
    reverse: bool,
}

impl RoutePlan {
    pub fn new(stops: Vec<StationId>, mode: RouteMode) -> Self {
        Self {
            stops,
            mode,
            index: 0,
            reverse: false,
        }
    }

    fn next_position(&self) -> Option<(usize, bool)> {
        let len = self.stops.len();
        if len < 2 {
            return None;
        }

        match self.mode {
            RouteMode::OneShot => (self.index + 1 < len).then_some((self.index + 1, false)),
            RouteMode::Circular => Some(((self.index + 1) % len, false)),
            RouteMode::PingPong => {
                if !self.reverse {
                    if self.index + 1 < len {
                        Some((self.index + 1, false))
                    } else {
                        Some((self.index - 1, true))
                    }
                } else if self.index > 0 {
                    Some((self.index - 1, true))
                } else {
                    Some((self.index + 1, false))
                }
            }
        }
    }

    /// The stop after the current one, without moving the cursor
    pub fn peek_next(&self) -> Option<StationId> {
        self.next_position().map(|(index, _)| self.stops[index])
    }

    /// Move the cursor to the next stop and return it
    pub fn advance(&mut self) -> Option<StationId> {
        let (index, reverse) = self.next_position()?;
        self.index = index;
        self.reverse = reverse;
        Some(self.stops[index])
    }

    /// Whether a one-shot route has reached its last stop
    pub fn is_finished(&self) -> bool {
        self.next_position().is_none()
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.reverse = false;
    }

    pub fn first(&self) -> Option<StationId> {
        self.stops.first().copied()
    }

    pub fn current(&self) -> Option<StationId> {
        self.stops.get(self.index).copied()
    }

    pub fn stops(&self) -> &[StationId] {
        &self.stops
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }
}
