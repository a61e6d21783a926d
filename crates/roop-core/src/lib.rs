//! Roop Core -- the tick engine for the ROOP grid language.
//!
//! A program is a rectangular grid of cells framed by a border ring. Data
//! values sit in cells, operators compute new values from their four
//! neighbours, and pipes carry produced values across the grid.
//!
//! # Two-Phase Tick Pipeline
//!
//! Each call to [`engine::Engine::step`] advances the program by one tick:
//!
//! 1. **Production** -- Every operator, in raster order, is matched against
//!    a frozen snapshot of its neighbours. Results are placed into a fresh
//!    grid, directly or through the pipe network; consumed inputs are
//!    cleared once the scan completes.
//! 2. **Settlement** -- Data cells fall one cell at a time until nothing can
//!    move, restarting the raster scan after every move.
//!
//! The engine halts when a halt operator receives a non-empty value or when
//! settlement starts with no data left on the grid.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Owns the grid, tick counter, RNG and console.
//! - [`grid::Grid`] -- Flat row-major cell storage addressed by [`grid::Pos`].
//! - [`cell::Cell`] -- Empty, Border, Data, Operator or Pipe.
//! - [`value::Value`] -- Tagged data value with [`value::TypeSet`] masks.
//! - [`operator::OperatorCode`] -- Closed operator catalog with static
//!   signature tables.
//! - [`services::Services`] -- The handle operators use for I/O, randomness,
//!   the tick counter and halting.

pub mod cell;
pub mod dir;
pub mod engine;
pub mod grid;
pub mod number;
pub mod operator;
pub mod production;
pub mod profiling;
pub mod query;
pub mod rng;
pub mod router;
pub mod semantics;
pub mod services;
pub mod settlement;
pub mod sim;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
