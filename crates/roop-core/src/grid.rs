//! Rectangular cell storage framed by a border ring.
//!
//! Cells are stored row-major in a flat `Vec` and addressed by [`Pos`].
//! Nothing outside this module holds references between cells; the router
//! and both tick phases work purely with coordinates.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, DataCell};
use crate::dir::Dir;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a set of rows cannot form a grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid must be at least 2x2, got {width}x{height}")]
    TooSmall { width: usize, height: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("border ring broken at {0}")]
    OpenBorder(Pos),
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A grid coordinate: column `x`, row `y`, both counted from the top-left
/// border cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-empty grid of the given outer size, border ring included.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width < 2 || height < 2 {
            return Err(GridError::TooSmall { width, height });
        }
        let mut grid = Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        };
        for pos in grid.positions() {
            if grid.is_edge(pos) {
                grid.set(pos, Cell::Border);
            }
        }
        Ok(grid)
    }

    /// Build a grid from rows that already include the border ring.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width < 2 || height < 2 {
            return Err(GridError::TooSmall { width, height });
        }
        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }
        let grid = Self {
            width,
            height,
            cells,
        };
        if let Some(pos) = grid
            .positions()
            .find(|&p| grid.is_edge(p) && grid[p] != Cell::Border)
        {
            return Err(GridError::OpenBorder(pos));
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell slice.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Flat index of `pos`.
    pub fn index_of(&self, pos: Pos) -> usize {
        pos.y * self.width + pos.x
    }

    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        if pos.x < self.width && pos.y < self.height {
            self.cells.get(self.index_of(pos))
        } else {
            None
        }
    }

    /// Replace the cell at `pos`.
    pub fn set(&mut self, pos: Pos, cell: Cell) {
        let i = self.index_of(pos);
        self.cells[i] = cell;
    }

    /// Move the cell at `from` to `to`, leaving `from` empty.
    pub fn shift(&mut self, from: Pos, to: Pos) {
        let i = self.index_of(from);
        let cell = std::mem::take(&mut self.cells[i]);
        self.set(to, cell);
    }

    pub fn value_at(&self, pos: Pos) -> Option<&DataCell> {
        self.get(pos).and_then(Cell::as_data)
    }

    /// Whether `pos` lies on the border ring.
    pub fn is_edge(&self, pos: Pos) -> bool {
        pos.x == 0 || pos.y == 0 || pos.x + 1 == self.width || pos.y + 1 == self.height
    }

    /// The neighbour of `pos` in direction `dir`, if it is on the grid.
    pub fn step(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.offset();
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        (x < self.width && y < self.height).then_some(Pos::new(x, y))
    }

    /// Every coordinate in raster order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |y| (0..w).map(move |x| Pos::new(x, y)))
    }

    /// Every non-border coordinate in raster order: top to bottom, left to
    /// right. This order breaks every tie in both tick phases.
    pub fn interior(&self) -> impl Iterator<Item = Pos> + use<> {
        let (w, h) = (self.width, self.height);
        (1..h.saturating_sub(1)).flat_map(move |y| (1..w - 1).map(move |x| Pos::new(x, y)))
    }

    /// Interior data cells in raster order.
    pub fn data_cells(&self) -> impl Iterator<Item = (Pos, &DataCell)> {
        self.interior()
            .filter_map(|p| self.value_at(p).map(|d| (p, d)))
    }

    pub fn has_data(&self) -> bool {
        self.cells.iter().any(|c| matches!(c, Cell::Data(_)))
    }

    /// One string of glyphs per row.
    pub fn render(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(Cell::glyph).collect())
            .collect()
    }
}

impl Index<Pos> for Grid {
    type Output = Cell;

    fn index(&self, pos: Pos) -> &Cell {
        &self.cells[self.index_of(pos)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_framed() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.render(), vec!["####", "#  #", "####"]);
    }

    #[test]
    fn too_small_rejected() {
        assert_eq!(
            Grid::new(1, 5),
            Err(GridError::TooSmall {
                width: 1,
                height: 5
            })
        );
    }

    #[test]
    fn ragged_rows_rejected() {
        let rows = vec![
            vec![Cell::Border; 3],
            vec![Cell::Border, Cell::Border],
            vec![Cell::Border; 3],
        ];
        assert!(matches!(
            Grid::from_rows(rows),
            Err(GridError::Ragged { row: 1, .. })
        ));
    }

    #[test]
    fn open_border_rejected() {
        let rows = vec![
            vec![Cell::Border; 3],
            vec![Cell::Border, Cell::Empty, Cell::Empty],
            vec![Cell::Border; 3],
        ];
        assert_eq!(
            Grid::from_rows(rows),
            Err(GridError::OpenBorder(Pos::new(2, 1)))
        );
    }

    #[test]
    fn interior_is_raster_order() {
        let grid = Grid::new(4, 4).unwrap();
        let order: Vec<_> = grid.interior().collect();
        assert_eq!(
            order,
            vec![Pos::new(1, 1), Pos::new(2, 1), Pos::new(1, 2), Pos::new(2, 2)]
        );
    }

    #[test]
    fn border_only_grid_has_no_interior() {
        let grid = Grid::new(2, 3).unwrap();
        assert_eq!(grid.interior().count(), 0);
    }

    #[test]
    fn step_stays_on_grid() {
        let grid = Grid::new(3, 3).unwrap();
        assert_eq!(grid.step(Pos::new(0, 0), Dir::Up), None);
        assert_eq!(grid.step(Pos::new(2, 1), Dir::Right), None);
        assert_eq!(grid.step(Pos::new(1, 1), Dir::Down), Some(Pos::new(1, 2)));
    }

    #[test]
    fn shift_moves_and_vacates() {
        let mut grid = Grid::new(3, 4).unwrap();
        grid.set(Pos::new(1, 1), Cell::data(5_i64));
        grid.shift(Pos::new(1, 1), Pos::new(1, 2));
        assert_eq!(grid[Pos::new(1, 1)], Cell::Empty);
        assert_eq!(grid.value_at(Pos::new(1, 2)).unwrap().value.as_number(), 5);
    }
}
