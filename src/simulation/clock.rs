//! Simulation clock
//!
//! Owned by the coordinator and handed by reference to whatever needs the
//! current time. Ticks are the canonical unit; time of day is derived.

use std::fmt;

use super::types::SECS_PER_DAY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    tick: u64,
    tick_secs: u32,
    start_time_secs: u32,
}

impl SimClock {
    pub fn new(tick_secs: u32, start_time_secs: u32) -> Self {
        Self {
            tick: 0,
            tick_secs: tick_secs.max(1),
            start_time_secs,
        }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn tick_secs(&self) -> u32 {
        self.tick_secs
    }

    /// Simulated seconds since the start of day zero
    pub fn elapsed_secs(&self) -> u64 {
        self.start_time_secs as u64 + self.tick * self.tick_secs as u64
    }

    /// Seconds since midnight of the current simulated day
    pub fn time_of_day(&self) -> u32 {
        (self.elapsed_secs() % SECS_PER_DAY as u64) as u32
    }

    /// First tick at or after the next occurrence of the given time of day
    ///
    /// A time earlier than now on the current simulated day means tomorrow.
    pub fn tick_at(&self, time_of_day_secs: u32) -> u64 {
        let day = SECS_PER_DAY as u64;
        let now = self.elapsed_secs();
        let mut target = (now / day) * day + (time_of_day_secs as u64 % day);
        if target < now {
            target += day;
        }
        let offset = target.saturating_sub(self.start_time_secs as u64);
        offset.div_ceil(self.tick_secs as u64)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_time_of_day(self.time_of_day()))
    }
}

/// Render seconds since midnight as `HH:MM`
pub fn format_time_of_day(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 3600, (secs % 3600) / 60)
}

/// Parse `HH:MM` into seconds since midnight
pub fn parse_time_of_day(text: &str) -> Option<u32> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    if hours > 24 || minutes > 59 || (hours == 24 && minutes > 0) {
        return None;
    }
    Some(hours * 3600 + minutes * 60)
}
