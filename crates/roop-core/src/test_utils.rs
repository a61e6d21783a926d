//! Grid builders and a scripted console for tests and benchmarks.
//!
//! Compiled for this crate's own tests, and for other crates through the
//! `test-utils` feature.

use std::io::Cursor;

use crate::cell::{Cell, DataCell, PipeKind};
use crate::engine::Engine;
use crate::grid::{Grid, Pos};
use crate::operator::Operator;
use crate::services::StreamConsole;
use crate::value::Value;

// ===========================================================================
// Console
// ===========================================================================

/// An in-memory console: scripted input, captured output.
pub type BufferConsole = StreamConsole<Cursor<Vec<u8>>, Vec<u8>>;

pub fn buffer_console(input: &str) -> BufferConsole {
    StreamConsole::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

/// Everything written to a buffer console so far.
pub fn output_text(console: &BufferConsole) -> String {
    String::from_utf8_lossy(console.output()).into_owned()
}

// ===========================================================================
// Grid builders
// ===========================================================================

/// The cell a single character stands for. Digits are numbers, `I`/`O` are
/// markers, `#` is a wall; pipes and operator letters map as in source
/// files. Anything else is empty.
pub fn cell_for(ch: char) -> Cell {
    if let Some(d) = ch.to_digit(10) {
        return Cell::data(Value::Number(i64::from(d)));
    }
    match ch {
        '#' => Cell::Border,
        'I' => Cell::data(Value::Input),
        'O' => Cell::data(Value::Output),
        _ => PipeKind::from_symbol(ch)
            .map(Cell::Pipe)
            .or_else(|| Operator::from_symbol(ch).map(Cell::Operator))
            .unwrap_or(Cell::Empty),
    }
}

/// Frame single-character rows in a border ring. Row `j`, column `i` of the
/// input lands at `Pos::new(i + 1, j + 1)`; short rows are padded with
/// empty cells.
pub fn grid(rows: &[&str]) -> Grid {
    let inner = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let width = inner + 2;
    let mut out = vec![vec![Cell::Border; width]];
    for row in rows {
        let mut line = vec![Cell::Border];
        line.extend(row.chars().map(cell_for));
        line.resize(width - 1, Cell::Empty);
        line.push(Cell::Border);
        out.push(line);
    }
    out.push(vec![Cell::Border; width]);
    Grid::from_rows(out).unwrap()
}

/// Put a value at `(x, y)`, replacing whatever is there.
pub fn put(grid: &mut Grid, x: usize, y: usize, value: impl Into<Value>) {
    grid.set(Pos::new(x, y), Cell::Data(DataCell::new(value)));
}

/// The value at `(x, y)`, or `Value::None` when the cell holds no data.
pub fn value_at(grid: &Grid, x: usize, y: usize) -> Value {
    grid.value_at(Pos::new(x, y))
        .map(|d| d.value.clone())
        .unwrap_or_default()
}

/// An engine over `grid` with scripted input and a fixed seed.
pub fn engine(grid: Grid, input: &str) -> Engine<BufferConsole> {
    Engine::new(grid, buffer_console(input), 0)
}
