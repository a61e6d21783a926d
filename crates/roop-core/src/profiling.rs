//! Per-phase timing for the most recent tick.
//!
//! [`TickProfile`] is always defined so callers can name it, but the engine
//! only records one when the `profiling` feature is enabled.

use std::time::Duration;

/// Per-phase timing from the most recent tick.
#[derive(Debug, Clone, Default)]
pub struct TickProfile {
    pub production: Duration,
    pub settlement: Duration,
    pub total: Duration,
    pub tick: u64,
}

impl TickProfile {
    /// Returns the name and duration of the slowest phase. Ties go to the
    /// later phase.
    pub fn bottleneck_phase(&self) -> (&'static str, Duration) {
        if self.settlement >= self.production {
            ("settlement", self.settlement)
        } else {
            ("production", self.production)
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
