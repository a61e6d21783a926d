//! Travel directions for the router and settlement.

use serde::{Deserialize, Serialize};

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Left,
    Right,
    Down,
}

impl Dir {
    /// The opposite direction.
    pub fn invert(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
        }
    }

    /// Column and row delta for one step.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
            Dir::Down => (0, 1),
        }
    }

    /// Clockwise quarter turn.
    pub fn turn_right(self) -> Dir {
        match self {
            Dir::Up => Dir::Right,
            Dir::Left => Dir::Up,
            Dir::Right => Dir::Down,
            Dir::Down => Dir::Left,
        }
    }

    /// Counter-clockwise quarter turn.
    pub fn turn_left(self) -> Dir {
        match self {
            Dir::Up => Dir::Left,
            Dir::Left => Dir::Down,
            Dir::Right => Dir::Up,
            Dir::Down => Dir::Right,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Dir::Up | Dir::Down)
    }
}

/// The sideways direction a data cell slides in once it lands on something.
///
/// Only ever horizontal, so a landed cell can never climb back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Drift {
    Left,
    #[default]
    Right,
}

impl Drift {
    pub fn flip(self) -> Drift {
        match self {
            Drift::Left => Drift::Right,
            Drift::Right => Drift::Left,
        }
    }

    pub fn as_dir(self) -> Dir {
        match self {
            Drift::Left => Dir::Left,
            Drift::Right => Dir::Right,
        }
    }
}
