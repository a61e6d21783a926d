//! Read-only query API for inspecting program state.
//!
//! Snapshot types are owned copies -- no references into engine storage --
//! so they can be serialized, diffed or handed to a debugger front end.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dir::Drift;
use crate::grid::Grid;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Value snapshot
// ---------------------------------------------------------------------------

/// One data cell, addressed in framed coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSnapshot {
    pub x: usize,
    pub y: usize,
    pub value: Value,
    pub drift: Drift,
}

// ---------------------------------------------------------------------------
// Grid snapshot
// ---------------------------------------------------------------------------

/// The whole grid at the start of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Ticks completed so far.
    pub tick: u64,
    pub width: usize,
    pub height: usize,
    /// One glyph string per row, border included.
    pub rows: Vec<String>,
    /// Data cells in raster order.
    pub values: Vec<ValueSnapshot>,
}

impl GridSnapshot {
    pub fn capture(grid: &Grid, tick: u64) -> Self {
        let values = grid
            .data_cells()
            .map(|(pos, data)| ValueSnapshot {
                x: pos.x,
                y: pos.y,
                value: data.value.clone(),
                drift: data.drift,
            })
            .collect();
        Self {
            tick,
            width: grid.width(),
            height: grid.height(),
            rows: grid.render(),
            values,
        }
    }
}

/// The text debug view: the glyph grid, a blank gap, then every number and
/// string with its coordinate.
impl fmt::Display for GridSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        f.write_str("\n\n")?;
        for v in &self.values {
            match &v.value {
                Value::Number(n) => writeln!(f, "({},{}) {n}", v.x, v.y)?,
                Value::String(s) => writeln!(f, "({},{}) \"{s}\"", v.x, v.y)?,
                _ => {}
            }
        }
        Ok(())
    }
}
