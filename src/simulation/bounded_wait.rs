//! Bounded-wait policy used for anti-stuck recovery
//!
//! One policy object is attached to each VTOL state that can stall. The state
//! ticks it while no progress is made, resets it on progress, and receives the
//! recovery action once the budget is exhausted.

/// What a stalled VTOL does once its wait budget runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Landed too long: skip the unreachable stop and try departing again
    ReattemptDeparture,
    /// Hovered too long: leave the queue and fly to another reachable station
    Divert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedWait {
    max_ticks: u32,
    elapsed: u32,
    action: RecoveryAction,
}

impl BoundedWait {
    pub fn new(max_ticks: u32, action: RecoveryAction) -> Self {
        Self {
            max_ticks,
            elapsed: 0,
            action,
        }
    }

    /// Count one tick without progress
    ///
    /// Returns the recovery action on the tick the budget is exceeded and
    /// starts a fresh budget, so a recovery that fails is retried after
    /// another `max_ticks`.
    pub fn tick(&mut self) -> Option<RecoveryAction> {
        self.elapsed += 1;
        if self.elapsed > self.max_ticks {
            self.elapsed = 0;
            Some(self.action)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn max_ticks(&self) -> u32 {
        self.max_ticks
    }

    pub fn action(&self) -> RecoveryAction {
        self.action
    }
}
