//! Simulation state, step outcomes and the determinism hash.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Counters the engine carries from tick to tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimState {
    /// Completed ticks. Incremented once per settlement phase.
    pub tick: u64,
}

impl SimState {
    pub fn new() -> Self {
        Self { tick: 0 }
    }
}

// ---------------------------------------------------------------------------
// Halting
// ---------------------------------------------------------------------------

/// Why the engine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// A halt operator received a non-empty value during production.
    Operator { dump: bool },
    /// Settlement started with no data cells left.
    NoData,
}

/// Result of a single `Engine::step()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Both phases ran; the program continues.
    Running,
    /// The program stopped during this step (or had already stopped).
    Halted(HaltReason),
}

impl StepOutcome {
    pub fn is_halted(self) -> bool {
        matches!(self, StepOutcome::Halted(_))
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// Running FNV-1a (64-bit) digest over grid contents. Two engines that
/// agree on tick and every cell produce the same digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(u64);

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl StateHash {
    pub fn new() -> Self {
        Self(FNV_OFFSET)
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.0 = bytes
            .iter()
            .fold(self.0, |acc, &b| (acc ^ u64::from(b)).wrapping_mul(FNV_PRIME));
    }

    /// Cell-kind discriminant.
    pub fn tag(&mut self, tag: u8) {
        self.bytes(&[tag]);
    }

    pub fn unsigned(&mut self, v: u64) {
        self.bytes(&v.to_le_bytes());
    }

    pub fn number(&mut self, n: i64) {
        self.bytes(&n.to_le_bytes());
    }

    /// Length first, so adjacent strings cannot run together.
    pub fn text(&mut self, s: &str) {
        self.unsigned(s.len() as u64);
        self.bytes(s.as_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
