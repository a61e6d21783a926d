//! Tick phase 2: gravity.
//!
//! Every data cell starts the phase heading down. The grid is scanned in
//! raster order and the first unsettled cell that can move does so, after
//! which the scan restarts from the top. A cell that moves is settled for
//! the rest of the phase. When a cell heading down hits something settled it
//! turns to its drift direction; when a sideways cell hits something settled,
//! or meets a cell heading straight back at it, it settles where it is.
//!
//! Headings are only ever down, left or right, so the phase always ends.

use crate::cell::Cell;
use crate::dir::Dir;
use crate::grid::Grid;

/// Per-cell state for one settlement phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Empty; a mover may enter.
    Vacant,
    /// Walls, operators, pipes and data that has settled.
    Fixed,
    /// Data still trying to move.
    Moving(Dir),
}

/// Outcome of one settlement phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The grid held no data at all; the program halts.
    NoData,
    /// Every data cell settled after `moves` single-cell moves.
    Settled { moves: usize },
}

/// Run phase 2 on `grid` in place.
pub fn settle(grid: &mut Grid) -> Settlement {
    let mut slots: Vec<Slot> = grid
        .cells()
        .iter()
        .map(|cell| match cell {
            Cell::Data(_) => Slot::Moving(Dir::Down),
            Cell::Empty => Slot::Vacant,
            _ => Slot::Fixed,
        })
        .collect();

    if !slots.iter().any(|s| matches!(s, Slot::Moving(_))) {
        return Settlement::NoData;
    }

    let mut moves = 0;
    'scan: loop {
        let mut unsettled = false;
        for pos in grid.interior() {
            let i = grid.index_of(pos);
            let Slot::Moving(heading) = slots[i] else {
                continue;
            };
            unsettled = true;

            let Some(target) = grid.step(pos, heading) else {
                slots[i] = Slot::Fixed;
                continue;
            };
            let t = grid.index_of(target);
            match slots[t] {
                Slot::Vacant => {
                    grid.shift(pos, target);
                    slots[t] = Slot::Fixed;
                    slots[i] = Slot::Vacant;
                    moves += 1;
                    continue 'scan;
                }
                Slot::Fixed => {
                    slots[i] = if heading == Dir::Down {
                        let drift = grid.value_at(pos).map(|d| d.drift).unwrap_or_default();
                        Slot::Moving(drift.as_dir())
                    } else {
                        Slot::Fixed
                    };
                }
                Slot::Moving(other) if other == heading.invert() => {
                    slots[i] = Slot::Fixed;
                }
                Slot::Moving(_) => {}
            }
        }
        if !unsettled {
            break;
        }
    }

    Settlement::Settled { moves }
}
