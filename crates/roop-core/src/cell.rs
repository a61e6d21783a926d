//! The five cell variants that make up a grid.

use serde::{Deserialize, Serialize};

use crate::dir::{Dir, Drift};
use crate::operator::Operator;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Data cells
// ---------------------------------------------------------------------------

/// A value sitting on the grid together with its sideways drift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataCell {
    pub value: Value,
    pub drift: Drift,
}

impl DataCell {
    /// A freshly produced value. New values drift right.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            drift: Drift::Right,
        }
    }

    pub fn with_drift(mut self, drift: Drift) -> Self {
        self.drift = drift;
        self
    }
}

// ---------------------------------------------------------------------------
// Pipes
// ---------------------------------------------------------------------------

/// The routing behaviour of a pipe cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipeKind {
    /// `-`
    Horizontal,
    /// `|`
    Vertical,
    /// `+`
    Intersection,
    /// `*`
    Bouncer,
    /// `>`
    TurnRight,
    /// `<`
    TurnLeft,
    /// `%`
    Duplicator,
    /// `!`
    Teleporter,
    /// `x`
    Eraser,
}

impl PipeKind {
    pub fn from_symbol(ch: char) -> Option<Self> {
        Some(match ch {
            '-' => PipeKind::Horizontal,
            '|' => PipeKind::Vertical,
            '+' => PipeKind::Intersection,
            '*' => PipeKind::Bouncer,
            '>' => PipeKind::TurnRight,
            '<' => PipeKind::TurnLeft,
            '%' => PipeKind::Duplicator,
            '!' => PipeKind::Teleporter,
            'x' => PipeKind::Eraser,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            PipeKind::Horizontal => '-',
            PipeKind::Vertical => '|',
            PipeKind::Intersection => '+',
            PipeKind::Bouncer => '*',
            PipeKind::TurnRight => '>',
            PipeKind::TurnLeft => '<',
            PipeKind::Duplicator => '%',
            PipeKind::Teleporter => '!',
            PipeKind::Eraser => 'x',
        }
    }

    /// The direction a value leaves in, for the single-exit pipe kinds.
    /// `None` for duplicators, teleporters and erasers.
    pub fn exit(self, entering: Dir) -> Option<Dir> {
        match self {
            PipeKind::Horizontal if entering == Dir::Left => Some(Dir::Left),
            PipeKind::Horizontal => Some(Dir::Right),
            PipeKind::Vertical if entering == Dir::Up => Some(Dir::Up),
            PipeKind::Vertical => Some(Dir::Down),
            PipeKind::Intersection => Some(entering),
            PipeKind::Bouncer => Some(entering.invert()),
            PipeKind::TurnRight => Some(entering.turn_right()),
            PipeKind::TurnLeft => Some(entering.turn_left()),
            PipeKind::Duplicator | PipeKind::Teleporter | PipeKind::Eraser => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// One grid coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Border,
    Data(DataCell),
    Operator(Operator),
    Pipe(PipeKind),
}

impl Cell {
    /// Wrap a fresh value in a data cell.
    pub fn data(value: impl Into<Value>) -> Self {
        Cell::Data(DataCell::new(value))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_data(&self) -> Option<&DataCell> {
        match self {
            Cell::Data(d) => Some(d),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        self.as_data().map(|d| &d.value)
    }

    /// Whether the router may enter this cell as a pipe hop or endpoint.
    pub fn is_routable(&self) -> bool {
        match self {
            Cell::Pipe(_) => true,
            Cell::Operator(op) => op.code.is_special(),
            _ => false,
        }
    }

    /// Single-character rendering used by the debug view.
    pub fn glyph(&self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Border => '#',
            Cell::Data(d) => match d.value {
                Value::Number(_) => '$',
                Value::String(_) => '@',
                Value::Input => 'I',
                Value::Output => 'O',
                Value::None => '?',
            },
            Cell::Operator(op) => op.symbol(),
            Cell::Pipe(kind) => kind.symbol(),
        }
    }
}
