//! Program source to framed grid.
//!
//! Loading runs in two steps:
//!
//! 1. **Framing** -- the text is split into lines, every line is padded to
//!    the longest one, and the whole block is wrapped in a ring of `#`.
//! 2. **Scanning** -- cells are read in raster order. A literal opener reads
//!    ahead until its closer and erases everything it read, so the cells it
//!    covered scan as empty later on. The literal's value lands in the
//!    opener's cell.
//!
//! Coordinates in errors are framed: the first character of the first line
//! is `(1, 1)`.

use roop_core::cell::{Cell, PipeKind};
use roop_core::grid::{Grid, GridError, Pos};
use roop_core::number::Number;
use roop_core::operator::Operator;
use roop_core::value::Value;

use crate::constants;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that abort loading before any tick runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("character not valid '{ch}' {at}")]
    InvalidCharacter { ch: char, at: Pos },

    #[error("unclosed literal {at}")]
    UnterminatedLiteral { at: Pos },

    #[error("unknown constant '{name}' {at}")]
    UnknownConstant { name: String, at: Pos },

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl LoadError {
    /// Framed coordinate of the offending cell, if the error has one.
    pub fn position(&self) -> Option<Pos> {
        match self {
            LoadError::InvalidCharacter { at, .. }
            | LoadError::UnterminatedLiteral { at }
            | LoadError::UnknownConstant { at, .. } => Some(*at),
            LoadError::Grid(_) => None,
        }
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Frame and scan `source` into a grid.
pub fn load(source: &str) -> Result<Grid, LoadError> {
    let grid = Scanner::new(frame(source)).scan()?;
    log::debug!("loaded {}x{} grid", grid.width(), grid.height());
    Ok(grid)
}

/// Split `source` into lines and wrap them in a `#` ring. A trailing newline
/// does not start a new line; a trailing `\r` is dropped from every line.
pub fn frame(source: &str) -> Vec<Vec<char>> {
    let lines: Vec<Vec<char>> = source
        .split_terminator('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).chars().collect())
        .collect();
    let inner = lines.iter().map(Vec::len).max().unwrap_or(0);
    let width = inner + 2;

    let mut rows = Vec::with_capacity(lines.len() + 2);
    rows.push(vec!['#'; width]);
    for line in lines {
        let mut row = Vec::with_capacity(width);
        row.push('#');
        row.extend(line);
        row.resize(width - 1, ' ');
        row.push('#');
        rows.push(row);
    }
    rows.push(vec!['#'; width]);
    rows
}

// ===========================================================================
// Scanner
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    Comment,
    Number,
    Text,
    Constant,
}

struct Scanner {
    src: Vec<Vec<char>>,
    width: usize,
    height: usize,
}

impl Scanner {
    fn new(src: Vec<Vec<char>>) -> Self {
        let height = src.len();
        let width = src.first().map_or(0, Vec::len);
        Self { src, width, height }
    }

    fn scan(mut self) -> Result<Grid, LoadError> {
        let mut rows = Vec::with_capacity(self.height);
        for y in 0..self.height {
            let mut row = Vec::with_capacity(self.width);
            for x in 0..self.width {
                // Re-read every cell: literals erase cells ahead of the scan.
                let ch = self.src[y][x];
                row.push(self.cell(ch, Pos::new(x, y))?);
            }
            rows.push(row);
        }
        Ok(Grid::from_rows(rows)?)
    }

    fn cell(&mut self, ch: char, at: Pos) -> Result<Cell, LoadError> {
        let cell = match ch {
            ' ' => Cell::Empty,
            '#' => Cell::Border,
            'I' => Cell::data(Value::Input),
            'O' => Cell::data(Value::Output),
            '{' | '(' | '"' | '/' | '[' | '\'' | '\\' => self.literal(ch, at)?,
            '0'..='9' => Cell::data(Number::from(ch as u8 - b'0')),
            _ => PipeKind::from_symbol(ch)
                .map(Cell::Pipe)
                .or_else(|| Operator::from_symbol(ch).map(Cell::Operator))
                .ok_or(LoadError::InvalidCharacter { ch, at })?,
        };
        Ok(cell)
    }

    fn literal(&mut self, open: char, at: Pos) -> Result<Cell, LoadError> {
        let (close, kind) = match open {
            '{' => ('}', LiteralKind::Comment),
            '(' => (')', LiteralKind::Number),
            '[' => (']', LiteralKind::Number),
            '"' => ('"', LiteralKind::Text),
            '\'' => ('\'', LiteralKind::Text),
            '/' => ('/', LiteralKind::Constant),
            _ => ('\\', LiteralKind::Constant),
        };
        let horizontal = matches!(open, '{' | '(' | '"' | '/');

        let mut number: Number = 0;
        let mut negative = false;
        let mut text = String::new();
        let mut first = true;
        let mut escaped = false;
        let Pos { mut x, mut y } = at;

        loop {
            if horizontal {
                x += 1;
            } else {
                y += 1;
            }
            if x == self.width - 1 || y == self.height - 1 {
                return Err(LoadError::UnterminatedLiteral { at });
            }

            let ch = std::mem::replace(&mut self.src[y][x], ' ');
            if !escaped && ch == close {
                break;
            }

            match kind {
                LiteralKind::Comment => {}
                LiteralKind::Number => {
                    if let Some(d) = ch.to_digit(10) {
                        number = number.wrapping_mul(10).wrapping_add(Number::from(d));
                    } else if first && ch == '-' {
                        negative = true;
                    } else {
                        // Any other character ends the number and is dropped.
                        break;
                    }
                }
                LiteralKind::Text => {
                    if escaped {
                        text.push(unescape(ch));
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else {
                        text.push(ch);
                    }
                }
                LiteralKind::Constant => text.push(ch),
            }
            first = false;
        }

        Ok(match kind {
            LiteralKind::Comment => Cell::Empty,
            LiteralKind::Number => {
                Cell::data(if negative { number.wrapping_neg() } else { number })
            }
            LiteralKind::Text => Cell::data(text),
            LiteralKind::Constant => match constants::lookup(&text) {
                Some(value) => Cell::data(value),
                None => return Err(LoadError::UnknownConstant { name: text, at }),
            },
        })
    }
}

fn unescape(ch: char) -> char {
    match ch {
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0b',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roop_core::operator::OperatorCode;

    fn value(grid: &Grid, x: usize, y: usize) -> Value {
        grid.value_at(Pos::new(x, y))
            .map(|d| d.value.clone())
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Framing
    // -----------------------------------------------------------------------

    #[test]
    fn frame_pads_and_borders() {
        let rows = frame("ab\nc\n");
        let text: Vec<String> = rows.iter().map(|r| r.iter().collect()).collect();
        assert_eq!(text, vec!["####", "#ab#", "#c #", "####"]);
    }

    #[test]
    fn frame_extra_newline_adds_blank_row() {
        assert_eq!(frame("5\n\n").len(), 4);
        assert_eq!(frame("5").len(), 3);
    }

    #[test]
    fn frame_strips_carriage_returns() {
        let rows = frame("ab\r\nc\r\n");
        assert_eq!(rows[1], vec!['#', 'a', 'b', '#']);
    }

    #[test]
    fn empty_source_is_smallest_grid() {
        let grid = load("").unwrap();
        assert_eq!((grid.width(), grid.height()), (2, 2));
    }

    // -----------------------------------------------------------------------
    // Single cells
    // -----------------------------------------------------------------------

    #[test]
    fn symbols_map_to_cells() {
        let grid = load("7I O\n#-Ax\nhX%a\n").unwrap();
        assert_eq!(value(&grid, 1, 1), Value::Number(7));
        assert_eq!(value(&grid, 2, 1), Value::Input);
        assert_eq!(grid[Pos::new(3, 1)], Cell::Empty);
        assert_eq!(value(&grid, 4, 1), Value::Output);
        assert_eq!(grid[Pos::new(1, 2)], Cell::Border);
        assert_eq!(grid[Pos::new(2, 2)], Cell::Pipe(PipeKind::Horizontal));
        assert_eq!(grid[Pos::new(4, 2)], Cell::Pipe(PipeKind::Eraser));
        assert_eq!(grid[Pos::new(3, 3)], Cell::Pipe(PipeKind::Duplicator));

        let Cell::Operator(add) = grid[Pos::new(3, 2)] else {
            panic!("expected an operator");
        };
        assert_eq!(add.code, OperatorCode::Add);
        assert!(add.consumes());
        let Cell::Operator(peek) = grid[Pos::new(4, 3)] else {
            panic!("expected an operator");
        };
        assert_eq!(peek.code, OperatorCode::Add);
        assert!(!peek.consumes());
        let Cell::Operator(dump) = grid[Pos::new(1, 3)] else {
            panic!("expected an operator");
        };
        assert_eq!(dump.code, OperatorCode::HaltDump);
    }

    #[test]
    fn invalid_character_reports_framed_position() {
        let err = load("  \n Q\n").unwrap_err();
        assert_eq!(
            err,
            LoadError::InvalidCharacter {
                ch: 'Q',
                at: Pos::new(2, 2)
            }
        );
        assert_eq!(err.to_string(), "character not valid 'Q' (2,2)");
    }

    // -----------------------------------------------------------------------
    // Literals
    // -----------------------------------------------------------------------

    #[test]
    fn number_literals() {
        let grid = load("(123) (-45)\n").unwrap();
        assert_eq!(value(&grid, 1, 1), Value::Number(123));
        assert_eq!(value(&grid, 7, 1), Value::Number(-45));
        // Everything the literal covered is empty.
        for x in 2..=5 {
            assert_eq!(grid[Pos::new(x, 1)], Cell::Empty);
        }
    }

    #[test]
    fn vertical_number_literal() {
        let grid = load("[\n1\n2\n]\n").unwrap();
        assert_eq!(value(&grid, 1, 1), Value::Number(12));
        assert_eq!(grid[Pos::new(1, 2)], Cell::Empty);
        assert_eq!(grid[Pos::new(1, 4)], Cell::Empty);
    }

    #[test]
    fn number_literal_stops_at_stray_character() {
        // The `a` ends the literal and is erased; the closer is scanned on
        // its own and rejected.
        let err = load("(12a)\n").unwrap_err();
        assert_eq!(
            err,
            LoadError::InvalidCharacter {
                ch: ')',
                at: Pos::new(5, 1)
            }
        );
        let grid = load("(12a \n").unwrap();
        assert_eq!(value(&grid, 1, 1), Value::Number(12));
    }

    #[test]
    fn string_literal_with_escapes() {
        let grid = load(r#""a\tb\"c\\""#).unwrap();
        assert_eq!(value(&grid, 1, 1), Value::from("a\tb\"c\\"));
    }

    #[test]
    fn vertical_string_literal() {
        let grid = load("'\nh\ni\n'\n").unwrap();
        assert_eq!(value(&grid, 1, 1), Value::from("hi"));
    }

    #[test]
    fn comments_erase_their_span() {
        let grid = load("{ QQQ } 5\n").unwrap();
        assert_eq!(grid[Pos::new(1, 1)], Cell::Empty);
        assert_eq!(value(&grid, 9, 1), Value::Number(5));
    }

    #[test]
    fn constants_resolve() {
        let grid = load("/dd/ /65/\n\\\nr\nn\n\\\n").unwrap();
        assert_eq!(value(&grid, 1, 1), Value::from("0123456789"));
        assert_eq!(value(&grid, 6, 1), Value::from("A"));
        assert_eq!(value(&grid, 1, 2), Value::from("IVXLCDM"));
    }

    #[test]
    fn unknown_constant() {
        let err = load(" /nope/\n").unwrap_err();
        assert_eq!(
            err,
            LoadError::UnknownConstant {
                name: "nope".into(),
                at: Pos::new(2, 1)
            }
        );
    }

    #[test]
    fn unterminated_literal() {
        let err = load("\"abc\n").unwrap_err();
        assert_eq!(err, LoadError::UnterminatedLiteral { at: Pos::new(1, 1) });
        assert_eq!(err.position(), Some(Pos::new(1, 1)));

        let err = load(" [\n 1\n").unwrap_err();
        assert_eq!(err, LoadError::UnterminatedLiteral { at: Pos::new(2, 1) });
    }

    #[test]
    fn literal_crosses_interior_walls() {
        let grid = load("\"a#b\"\n").unwrap();
        assert_eq!(value(&grid, 1, 1), Value::from("a#b"));
    }
}
