//! Tick phase 1: operator dispatch and placement.
//!
//! Every operator reads the grid as it was at the start of the tick and
//! writes into a separate next-tick grid, so no operator ever sees another
//! operator's output from the same tick. Operators are visited in raster
//! order; when two of them target the same cell the first writer wins and
//! the later placement fails.
//!
//! Consumption is deferred: a per-cell persist flag is cleared for every
//! matched input of an invocation that placed something, and once the scan
//! is complete every flagged data cell is emptied in the next grid.

use crate::cell::{Cell, DataCell};
use crate::dir::Dir;
use crate::grid::{Grid, Pos};
use crate::operator::{Operator, Signature, Sides};
use crate::router::Router;
use crate::semantics;
use crate::services::{HaltRequest, Services};
use crate::value::TypeSet;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What happened during one production phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionReport {
    /// Signatures whose computation succeeded.
    pub fired: usize,
    /// Signatures whose computation failed (division by zero and the like).
    pub failed: usize,
    /// Cells written through placement or routing.
    pub writes: u64,
    /// Input cells emptied by consumption.
    pub consumed: usize,
    /// Halt raised by a halt operator, if any.
    pub halt: Option<HaltRequest>,
}

// ---------------------------------------------------------------------------
// Production
// ---------------------------------------------------------------------------

/// Run phase 1 over `grid` and return the next-tick grid.
pub fn produce(grid: &Grid, services: &mut Services<'_>) -> (Grid, ProductionReport) {
    let mut next = grid.clone();
    let mut persist = vec![true; grid.cells().len()];
    let mut report = ProductionReport::default();

    {
        let mut producer = Producer {
            grid,
            router: Router::new(&mut next, services),
            persist: &mut persist,
            report: &mut report,
        };
        for pos in grid.interior() {
            let Cell::Operator(op) = grid[pos] else {
                continue;
            };
            if op.code.is_axis() {
                producer.fire_axis(pos, op);
            } else {
                producer.fire_joint(pos, op);
            }
        }
        producer.report.writes = producer.router.writes();
    }

    for pos in grid.interior() {
        if !persist[grid.index_of(pos)] && matches!(next[pos], Cell::Data(_)) {
            next.set(pos, Cell::Empty);
            report.consumed += 1;
        }
    }

    report.halt = services.halt_request();
    (next, report)
}

fn around(pos: Pos) -> Sides<Pos> {
    Sides::new(
        Pos::new(pos.x, pos.y - 1),
        Pos::new(pos.x - 1, pos.y),
        Pos::new(pos.x + 1, pos.y),
        Pos::new(pos.x, pos.y + 1),
    )
}

fn admits(req: TypeSet, cell: Option<&DataCell>) -> bool {
    req.admits(cell.map(|d| &d.value))
}

struct Producer<'a, 'n, 's, 'c> {
    grid: &'a Grid,
    router: Router<'n, 's, 'c>,
    persist: &'a mut Vec<bool>,
    report: &'a mut ProductionReport,
}

impl Producer<'_, '_, '_, '_> {
    fn consume(&mut self, req: TypeSet, pos: Pos) {
        if !req.is_none() {
            let i = self.grid.index_of(pos);
            self.persist[i] = false;
        }
    }

    /// Joint dispatch: the first conforming signature is the only one run,
    /// whether or not its computation succeeds.
    fn fire_joint(&mut self, pos: Pos, op: Operator) {
        let grid = self.grid;
        let at = around(pos);
        let neighbors = Sides::new(
            grid.value_at(at.up),
            grid.value_at(at.left),
            grid.value_at(at.right),
            grid.value_at(at.down),
        );

        let Some((index, sig)) = op.signatures().iter().enumerate().find(|(_, s)| {
            admits(s.req.up, neighbors.up)
                && admits(s.req.left, neighbors.left)
                && admits(s.req.right, neighbors.right)
                && admits(s.req.down, neighbors.down)
        }) else {
            return;
        };

        let result = semantics::execute_joint(op.code, index, &neighbors, self.router.services());
        let placed = match result {
            Ok(emission) => {
                self.report.fired += 1;
                if sig.emits_nothing() {
                    true
                } else {
                    let overwrite = op.code.overwrites();
                    let mut placed = false;
                    if !sig.out.up.is_none() {
                        placed |= self.router.place(emission.up, at.up, Dir::Up, overwrite);
                    }
                    if !sig.out.left.is_none() {
                        placed |= self.router.place(emission.left, at.left, Dir::Left, overwrite);
                    }
                    if !sig.out.right.is_none() {
                        placed |= self.router.place(emission.right, at.right, Dir::Right, overwrite);
                    }
                    if !sig.out.down.is_none() {
                        placed |= self.router.place(emission.down, at.down, Dir::Down, overwrite);
                    }
                    placed
                }
            }
            Err(e) => {
                log::trace!("{} at {pos}: {e}", op.symbol());
                self.report.failed += 1;
                false
            }
        };

        if placed && op.consumes() {
            self.consume(sig.req.up, at.up);
            self.consume(sig.req.left, at.left);
            self.consume(sig.req.right, at.right);
            self.consume(sig.req.down, at.down);
        }
    }

    /// Axis dispatch: the vertical and horizontal pairs each take the first
    /// signature that fits them. Vertical runs first when both fit the same
    /// signature.
    fn fire_axis(&mut self, pos: Pos, op: Operator) {
        let grid = self.grid;
        let at = around(pos);
        let mut vertical_done = false;
        let mut horizontal_done = false;

        for (index, sig) in op.signatures().iter().enumerate() {
            let vertical = !vertical_done
                && admits(sig.req.up, grid.value_at(at.up))
                && admits(sig.req.down, grid.value_at(at.down));
            let horizontal = !horizontal_done
                && admits(sig.req.up, grid.value_at(at.left))
                && admits(sig.req.down, grid.value_at(at.right));
            if !vertical && !horizontal {
                continue;
            }
            if vertical {
                self.fire_pair(op, index, sig, (at.up, Dir::Up), (at.down, Dir::Down));
            }
            if horizontal {
                self.fire_pair(op, index, sig, (at.left, Dir::Left), (at.right, Dir::Right));
            }
            vertical_done |= vertical;
            horizontal_done |= horizontal;
            if vertical_done && horizontal_done {
                break;
            }
        }
    }

    fn fire_pair(
        &mut self,
        op: Operator,
        index: usize,
        sig: &Signature,
        (back, back_dir): (Pos, Dir),
        (fwd, fwd_dir): (Pos, Dir),
    ) {
        let first = self.grid.value_at(back);
        let second = self.grid.value_at(fwd);
        let result = semantics::execute_axis(op.code, index, first, second, self.router.services());
        let placed = match result {
            Ok(emission) => {
                self.report.fired += 1;
                if sig.emits_nothing() {
                    true
                } else {
                    let overwrite = op.code.overwrites();
                    let mut placed = false;
                    if !sig.out.up.is_none() {
                        placed |= self.router.place(emission.backward, back, back_dir, overwrite);
                    }
                    if !sig.out.down.is_none() {
                        placed |= self.router.place(emission.forward, fwd, fwd_dir, overwrite);
                    }
                    placed
                }
            }
            Err(e) => {
                log::trace!("{} between {back} and {fwd}: {e}", op.symbol());
                self.report.failed += 1;
                false
            }
        };

        if placed && op.consumes() {
            self.consume(sig.req.up, back);
            self.consume(sig.req.down, fwd);
        }
    }
}
