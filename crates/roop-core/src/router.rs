//! The pipe router: a walk that decides where a produced value lands.
//!
//! A value enters the router from an operator's placement or from a special
//! operator re-emitting below itself. Each hop inspects the cell being
//! entered:
//!
//! - **Empty** -- the value is written there.
//! - **Special operator** -- the value is handed to its receive handler and
//!   anything it re-emits is placed one cell below the operator.
//! - **Pipe** -- the pipe picks the next direction (or forks, teleports or
//!   absorbs) and the walk continues.
//! - anything else -- the hop fails.
//!
//! # Cycles
//!
//! The only state a walk depends on is the grid, its own position and its
//! direction. If a walk re-enters a (cell, direction) pair already on its
//! own path without any grid write in between, it would repeat forever; the
//! router fails that walk instead. No other limit is imposed.
//!
//! Straight pipe runs and teleporter jumps are followed in a loop, so only
//! duplicator forks and special-operator re-emits nest.

use std::collections::HashSet;

use crate::cell::{Cell, DataCell, PipeKind};
use crate::dir::Dir;
use crate::grid::{Grid, Pos};
use crate::operator::OperatorCode;
use crate::semantics;
use crate::services::Services;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Places values into the next-tick grid during production.
pub struct Router<'g, 's, 'c> {
    grid: &'g mut Grid,
    services: &'s mut Services<'c>,
    /// (cell, direction) states on the current path since the last write.
    trail: HashSet<(Pos, Dir)>,
    writes: u64,
}

impl<'g, 's, 'c> Router<'g, 's, 'c> {
    pub fn new(grid: &'g mut Grid, services: &'s mut Services<'c>) -> Self {
        Self {
            grid,
            services,
            trail: HashSet::new(),
            writes: 0,
        }
    }

    pub fn services(&mut self) -> &mut Services<'c> {
        &mut *self.services
    }

    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    /// Number of cells written through this router so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// The placement rule. Nothing to place always succeeds. An overwriting
    /// placement or an Empty target takes the value directly; a pipe or
    /// special operator routes it onward in direction `dir`; anything else
    /// fails.
    pub fn place(&mut self, data: Option<DataCell>, target: Pos, dir: Dir, overwrite: bool) -> bool {
        let Some(data) = data else {
            return true;
        };
        let Some(cell) = self.grid.get(target) else {
            return false;
        };
        if overwrite || cell.is_empty() {
            self.write(target, data);
            return true;
        }
        if cell.is_routable() {
            return self.send(data, target, dir);
        }
        false
    }

    fn write(&mut self, pos: Pos, data: DataCell) {
        self.grid.set(pos, Cell::Data(data));
        self.writes += 1;
        // Earlier path states are live again once the grid has changed.
        self.trail.clear();
    }

    /// Carry `data` into `pos`, travelling in direction `dir`. Path states
    /// this walk adds are dropped again when it returns.
    fn send(&mut self, data: DataCell, pos: Pos, dir: Dir) -> bool {
        let mut entered = Vec::new();
        let delivered = self.walk(data, pos, dir, &mut entered);
        for state in &entered {
            self.trail.remove(state);
        }
        delivered
    }

    /// Step one cell from `pos` in `dir` and send the value there.
    fn advance(&mut self, data: DataCell, pos: Pos, dir: Dir) -> bool {
        match self.grid.step(pos, dir) {
            Some(next) => self.send(data, next, dir),
            None => false,
        }
    }

    /// Follow single-exit pipes and teleporter jumps iteratively. Only
    /// duplicators and special operators start a nested walk.
    fn walk(&mut self, data: DataCell, mut pos: Pos, mut dir: Dir, entered: &mut Vec<(Pos, Dir)>) -> bool {
        loop {
            if !self.trail.insert((pos, dir)) {
                log::warn!("pipe loop at {pos} heading {dir:?}; value {} dropped", data.value);
                return false;
            }
            entered.push((pos, dir));

            let kind = match self.grid.get(pos) {
                Some(Cell::Empty) => {
                    self.write(pos, data);
                    return true;
                }
                Some(Cell::Operator(op)) if op.code.is_special() => {
                    let code = op.code;
                    return self.deliver(code, &data, pos);
                }
                Some(Cell::Pipe(kind)) => *kind,
                _ => return false,
            };

            let (from, exit) = match kind {
                PipeKind::Eraser => return true,
                PipeKind::Duplicator => return self.fork(data, pos, dir),
                PipeKind::Teleporter => match self.partner(pos, dir) {
                    Some(partner) => (partner, dir),
                    None => return false,
                },
                _ => match kind.exit(dir) {
                    Some(exit) => (pos, exit),
                    None => return false,
                },
            };
            pos = match self.grid.step(from, exit) {
                Some(next) => next,
                None => return false,
            };
            dir = exit;
        }
    }

    /// Hand the value to a special operator and place whatever it re-emits
    /// one cell below it.
    fn deliver(&mut self, code: OperatorCode, data: &DataCell, pos: Pos) -> bool {
        let emitted = semantics::receive(code, data, self.services);
        match self.grid.step(pos, Dir::Down) {
            Some(below) => self.place(emitted, below, Dir::Down, false),
            None => emitted.is_none(),
        }
    }

    /// Both perpendicular branches always run; either one succeeding is enough.
    fn fork(&mut self, data: DataCell, pos: Pos, dir: Dir) -> bool {
        let (first, second) = if dir.is_vertical() {
            (Dir::Right, Dir::Left)
        } else {
            (Dir::Up, Dir::Down)
        };
        let a = self.advance(data.clone(), pos, first);
        let b = self.advance(data, pos, second);
        a || b
    }

    /// Scan ahead for the partner teleporter. Reaching the border first
    /// fails. The value carries on one cell past the partner.
    fn partner(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let mut cur = pos;
        loop {
            cur = self.grid.step(cur, dir)?;
            if self.grid.is_edge(cur) {
                return None;
            }
            if self.grid[cur] == Cell::Pipe(PipeKind::Teleporter) {
                return Some(cur);
            }
        }
    }
}
