//! The tick engine: owns the grid and drives the two-phase pipeline.
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - The current [`Grid`]
//! - A [`SimState`] (tick counter)
//! - A seeded [`SimRng`] for the random operator
//! - A [`Console`] for the I/O operators
//! - The halt state
//!
//! # Tick Pipeline
//!
//! Each `step()` runs:
//! 1. **Production** -- operators fire against the frozen grid; the next
//!    grid replaces the current one. A halt raised here stops the program
//!    before settlement and the tick counter is not advanced.
//! 2. **Settlement** -- data cells fall; the tick counter is incremented.
//!    Settlement on a grid with no data halts the program.

use crate::cell::Cell;
use crate::grid::Grid;
use crate::production::{self, ProductionReport};
use crate::query::GridSnapshot;
use crate::rng::SimRng;
use crate::services::{Console, Services};
use crate::settlement::{self, Settlement};
use crate::sim::{HaltReason, SimState, StateHash, StepOutcome};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The ROOP tick engine.
#[derive(Debug)]
pub struct Engine<C: Console> {
    grid: Grid,

    /// Simulation state (tick counter).
    pub sim_state: SimState,

    rng: SimRng,
    console: C,

    /// Set once the program has stopped; never cleared.
    halted: Option<HaltReason>,

    /// What the most recent production phase did.
    last_report: ProductionReport,

    /// Timing profile for the most recent tick (profiling feature only).
    #[cfg(feature = "profiling")]
    pub(crate) last_profile: Option<crate::profiling::TickProfile>,
}

impl<C: Console> Engine<C> {
    /// Create an engine over a loaded grid. `seed` drives the random
    /// operator; equal seeds give equal runs.
    pub fn new(grid: Grid, console: C, seed: u64) -> Self {
        Self {
            grid,
            sim_state: SimState::new(),
            rng: SimRng::new(seed),
            console,
            halted: None,
            last_report: ProductionReport::default(),
            #[cfg(feature = "profiling")]
            last_profile: None,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Ticks completed so far.
    pub fn tick(&self) -> u64 {
        self.sim_state.tick
    }

    pub fn halted(&self) -> Option<HaltReason> {
        self.halted
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    pub fn last_report(&self) -> &ProductionReport {
        &self.last_report
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    /// Run phase 1 only. Returns the halt reason if a halt operator fired;
    /// with a dump requested, every value is printed before returning.
    ///
    /// Does nothing once the engine has halted.
    pub fn produce(&mut self) -> Option<HaltReason> {
        if self.halted.is_some() {
            return self.halted;
        }

        let mut services = Services::new(&mut self.console, &mut self.rng, self.sim_state.tick);
        let (next, report) = production::produce(&self.grid, &mut services);
        self.grid = next;

        log::trace!(
            "tick {}: {} fired, {} failed, {} writes, {} consumed",
            self.sim_state.tick,
            report.fired,
            report.failed,
            report.writes,
            report.consumed
        );

        if let Some(request) = report.halt {
            log::debug!(
                "halt operator at tick {} (dump: {})",
                self.sim_state.tick,
                request.dump
            );
            self.halted = Some(HaltReason::Operator { dump: request.dump });
            if request.dump {
                self.dump_values();
            }
        }
        self.last_report = report;
        self.halted
    }

    /// Run phase 2 and advance the tick counter. A grid with no data halts
    /// the engine; the counter still advances.
    ///
    /// Does nothing once the engine has halted.
    pub fn settle(&mut self) -> Option<HaltReason> {
        if self.halted.is_some() {
            return self.halted;
        }

        match settlement::settle(&mut self.grid) {
            Settlement::NoData => {
                log::debug!("no data left at tick {}", self.sim_state.tick);
                self.halted = Some(HaltReason::NoData);
            }
            Settlement::Settled { moves } => {
                log::trace!("tick {}: {moves} moves", self.sim_state.tick);
            }
        }
        self.sim_state.tick += 1;
        self.halted
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Run one full tick.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(reason) = self.halted {
            return StepOutcome::Halted(reason);
        }

        #[cfg(feature = "profiling")]
        let step_start = std::time::Instant::now();

        #[cfg(feature = "profiling")]
        let phase_start = std::time::Instant::now();
        let produced = self.produce();
        #[cfg(feature = "profiling")]
        let production_dur = phase_start.elapsed();

        #[cfg(feature = "profiling")]
        let phase_start = std::time::Instant::now();
        if produced.is_none() {
            self.settle();
        }
        #[cfg(feature = "profiling")]
        let settlement_dur = phase_start.elapsed();

        #[cfg(feature = "profiling")]
        {
            self.last_profile = Some(crate::profiling::TickProfile {
                production: production_dur,
                settlement: settlement_dur,
                total: step_start.elapsed(),
                tick: self.sim_state.tick,
            });
        }

        match self.halted {
            Some(reason) => StepOutcome::Halted(reason),
            None => StepOutcome::Running,
        }
    }

    /// Step until the program halts.
    pub fn run(&mut self) -> HaltReason {
        self.run_with(|_| {})
    }

    /// Step until the program halts, calling `before_tick` ahead of every
    /// tick. Debuggers hook in here.
    pub fn run_with(&mut self, mut before_tick: impl FnMut(&mut Self)) -> HaltReason {
        loop {
            if let Some(reason) = self.halted {
                return reason;
            }
            before_tick(self);
            self.step();
        }
    }

    /// Step at most `max_ticks` times. Returns the halt reason if the
    /// program stopped within the limit.
    pub fn run_for(&mut self, max_ticks: u64) -> Option<HaltReason> {
        for _ in 0..max_ticks {
            if let StepOutcome::Halted(reason) = self.step() {
                return Some(reason);
            }
        }
        self.halted
    }

    /// Print every number and string in raster order, each followed by a
    /// space. Markers are skipped.
    pub fn dump_values(&mut self) {
        for (_, data) in self.grid.data_cells() {
            match &data.value {
                Value::Number(n) => self.console.write_number(*n),
                Value::String(s) => self.console.write_text(s),
                _ => continue,
            }
            self.console.write_text(" ");
        }
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// An owned copy of the current grid for debug views.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::capture(&self.grid, self.sim_state.tick)
    }

    /// FNV-1a over the tick counter, the generator state and every cell.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.unsigned(self.sim_state.tick);
        h.unsigned(self.rng.state());
        h.unsigned(self.grid.width() as u64);
        h.unsigned(self.grid.height() as u64);
        for cell in self.grid.cells() {
            match cell {
                Cell::Empty => h.tag(0),
                Cell::Border => h.tag(1),
                Cell::Data(data) => {
                    h.tag(2);
                    h.tag(data.drift as u8);
                    match &data.value {
                        Value::None => h.tag(0),
                        Value::Number(n) => {
                            h.tag(1);
                            h.number(*n);
                        }
                        Value::String(s) => {
                            h.tag(2);
                            h.text(s);
                        }
                        Value::Input => h.tag(3),
                        Value::Output => h.tag(4),
                    }
                }
                Cell::Operator(op) => {
                    h.tag(3);
                    h.unsigned(u64::from(op.symbol()));
                }
                Cell::Pipe(kind) => {
                    h.tag(4);
                    h.unsigned(u64::from(kind.symbol()));
                }
            }
        }
        h.finish()
    }

    /// Get the timing profile from the most recent tick.
    /// Only available with the `profiling` feature.
    #[cfg(feature = "profiling")]
    pub fn last_tick_profile(&self) -> Option<&crate::profiling::TickProfile> {
        self.last_profile.as_ref()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
