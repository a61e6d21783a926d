//! The operator catalog: codes, flags and ordered signature tables.
//!
//! Every operator code owns a static, ordered list of [`Signature`]s. A
//! joint operator matches a signature against all four neighbours at once;
//! an axis operator matches the vertical pair (up, down) and the horizontal
//! pair (left, right) independently, reading the signature's `up` slot as
//! the first element of the pair and its `down` slot as the second.

use serde::{Deserialize, Serialize};

use crate::value::TypeSet;

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// One item per neighbour, in placement order: up, left, right, down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides<T> {
    pub up: T,
    pub left: T,
    pub right: T,
    pub down: T,
}

impl<T> Sides<T> {
    pub const fn new(up: T, left: T, right: T, down: T) -> Self {
        Self {
            up,
            left,
            right,
            down,
        }
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// A (requirement, outcome) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub req: Sides<TypeSet>,
    pub out: Sides<TypeSet>,
}

impl Signature {
    /// True when no side produces a value. A successful execution of such a
    /// signature counts as placed without writing anything.
    pub fn emits_nothing(&self) -> bool {
        self.out.up.is_none()
            && self.out.left.is_none()
            && self.out.right.is_none()
            && self.out.down.is_none()
    }
}

const NO: TypeSet = TypeSet::NONE;
const NUM: TypeSet = TypeSet::NUMBER;
const STR: TypeSet = TypeSet::STRING;
const NS: TypeSet = TypeSet::NOR_S;
const ANY: TypeSet = TypeSet::ANY;
const IN: TypeSet = TypeSet::INPUT;
const OUT: TypeSet = TypeSet::OUTPUT;

/// Requirement and outcome, each ordered up, left, right, down.
const fn sig(req: [TypeSet; 4], out: [TypeSet; 4]) -> Signature {
    Signature {
        req: Sides::new(req[0], req[1], req[2], req[3]),
        out: Sides::new(out[0], out[1], out[2], out[3]),
    }
}

/// Axis signature: first input, second input, first output, second output.
const fn axis(first: TypeSet, second: TypeSet, out_first: TypeSet, out_second: TypeSet) -> Signature {
    sig([first, NO, NO, second], [out_first, NO, NO, out_second])
}

static WRITE_TEXT: [Signature; 3] = [
    sig([IN, NO, NO, OUT], [NO, NO, NO, NO]),
    sig([NS, NO, NO, OUT], [NO, NO, NO, NO]),
    sig([IN, NO, NO, NO], [NO, NO, NO, STR]),
];

static WRITE_NUMBER: [Signature; 3] = [
    sig([IN, NO, NO, OUT], [NO, NO, NO, NO]),
    sig([NS, NO, NO, OUT], [NO, NO, NO, NO]),
    sig([IN, NO, NO, NO], [NO, NO, NO, NUM]),
];

static REDIRECT: [Signature; 7] = [
    sig([ANY, ANY, ANY, NO], [ANY, ANY, ANY, NO]),
    sig([ANY, ANY, NO, NO], [NO, ANY, NO, NO]),
    sig([ANY, NO, ANY, NO], [ANY, NO, ANY, NO]),
    sig([ANY, NO, NO, NO], [ANY, NO, NO, NO]),
    sig([NO, ANY, ANY, NO], [NO, ANY, ANY, NO]),
    sig([NO, ANY, NO, NO], [NO, ANY, NO, NO]),
    sig([NO, NO, ANY, NO], [NO, NO, ANY, NO]),
];

static SWAP: [Signature; 1] = [axis(ANY, ANY, ANY, ANY)];

/// Shared by Lower, Upper, Reverse and Random.
static UNARY_SAME: [Signature; 2] = [axis(NUM, NO, NO, NUM), axis(STR, NO, NO, STR)];

static PRIME: [Signature; 2] = [axis(NUM, NO, NO, NUM), axis(STR, NO, NO, NUM)];

static NOT: [Signature; 1] = [axis(ANY, NO, NO, NUM)];

static CONVERT: [Signature; 4] = [
    axis(NUM, NO, NO, STR),
    axis(STR, NO, NO, NUM),
    axis(IN, NO, NO, OUT),
    axis(OUT, NO, NO, IN),
];

/// Shared by Add, Subtract and Multiply: three operands, then each pair,
/// numbers before the mixed form.
static ARITHMETIC: [Signature; 8] = [
    sig([NUM, NUM, NUM, NO], [NO, NO, NO, NUM]),
    sig([NS, NS, NS, NO], [NO, NO, NO, STR]),
    sig([NUM, NUM, NO, NO], [NO, NO, NO, NUM]),
    sig([NS, NS, NO, NO], [NO, NO, NO, STR]),
    sig([NUM, NO, NUM, NO], [NO, NO, NO, NUM]),
    sig([NS, NO, NS, NO], [NO, NO, NO, STR]),
    sig([NO, NUM, NUM, NO], [NO, NO, NO, NUM]),
    sig([NO, NS, NS, NO], [NO, NO, NO, STR]),
];

static GREATER: [Signature; 8] = [
    sig([NUM, NUM, NUM, NO], [NO, NO, NO, NUM]),
    sig([NS, NS, NS, NO], [NO, NO, NO, NUM]),
    sig([NUM, NUM, NO, NO], [NO, NO, NO, NUM]),
    sig([NS, NS, NO, NO], [NO, NO, NO, NUM]),
    sig([NUM, NO, NUM, NO], [NO, NO, NO, NUM]),
    sig([NS, NO, NS, NO], [NO, NO, NO, NUM]),
    sig([NO, NUM, NUM, NO], [NO, NO, NO, NUM]),
    sig([NO, NS, NS, NO], [NO, NO, NO, NUM]),
];

static DIVIDE: [Signature; 6] = [
    sig([NUM, NUM, NUM, NO], [NO, NO, NO, NUM]),
    sig([NUM, NUM, NO, NO], [NO, NO, NO, NUM]),
    sig([NUM, NO, NUM, NO], [NO, NO, NO, NUM]),
    sig([NO, NUM, NUM, NO], [NO, NO, NO, NUM]),
    sig([STR, NUM, NO, NO], [NO, NO, STR, STR]),
    sig([STR, STR, NO, NO], [NO, NO, STR, STR]),
];

static REMAINDER: [Signature; 5] = [
    sig([NUM, NUM, NUM, NO], [NO, NO, NO, NUM]),
    sig([NS, NS, NS, NO], [NO, NO, NO, STR]),
    sig([NUM, NUM, NO, NO], [NO, NO, NO, NUM]),
    sig([NUM, NO, NUM, NO], [NO, NO, NO, NUM]),
    sig([NO, NUM, NUM, NO], [NO, NO, NO, NUM]),
];

static FACTOR: [Signature; 2] = [
    sig([NUM, NUM, NO, NO], [NO, NO, NO, NUM]),
    sig([NS, NS, NO, NO], [NO, NO, NO, NUM]),
];

static EQUAL: [Signature; 4] = [
    sig([ANY, ANY, ANY, NO], [NO, NO, NO, NUM]),
    sig([ANY, ANY, NO, NO], [NO, NO, NO, NUM]),
    sig([ANY, NO, ANY, NO], [NO, NO, NO, NUM]),
    sig([NO, ANY, ANY, NO], [NO, NO, NO, NUM]),
];

static PASS: [Signature; 1] = [sig([ANY, NO, NO, NO], [NO, NO, NO, ANY])];

static SINK: [Signature; 3] = [
    axis(ANY, ANY, NO, NO),
    axis(ANY, NO, NO, NO),
    axis(NO, ANY, NO, NO),
];

static TICK_STAMP: [Signature; 1] = [sig([ANY, NO, NO, NO], [NO, NO, NO, NUM])];

static HALT: [Signature; 1] = [sig([ANY, NO, NO, NO], [NO, NO, NO, NO])];

// ---------------------------------------------------------------------------
// Operator codes
// ---------------------------------------------------------------------------

/// The closed set of operator codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorCode {
    /// `W`: console text I/O.
    WriteText,
    /// `w`: console number I/O.
    WriteNumber,
    /// `C`: copies neighbours back in place, steering their drift.
    Redirect,
    /// `c`: exchanges the two cells of an axis.
    Swap,
    /// `L`: absolute value / lowercase.
    Lower,
    /// `U`: sign / uppercase.
    Upper,
    Add,
    Subtract,
    /// Product / repetition.
    Multiply,
    /// Division / string cut and split.
    Divide,
    /// Remainder / string replace.
    Remainder,
    /// `F`: gcd / substring search.
    Factor,
    /// `P`: primality / string length.
    Prime,
    /// `Z`: digit or character reversal.
    Reverse,
    /// `N`: emptiness test.
    Not,
    Equal,
    /// `G`: strictly decreasing chain.
    Greater,
    /// `K`
    Random,
    /// `Y`: number/string and marker conversion.
    Convert,
    /// `V`
    Pass,
    /// `X`
    Sink,
    /// `T`
    TickStamp,
    /// `H`
    Halt,
    /// `h`
    HaltDump,
}

impl OperatorCode {
    /// The ordered signature table for this code.
    pub fn signatures(self) -> &'static [Signature] {
        match self {
            OperatorCode::WriteText => &WRITE_TEXT,
            OperatorCode::WriteNumber => &WRITE_NUMBER,
            OperatorCode::Redirect => &REDIRECT,
            OperatorCode::Swap => &SWAP,
            OperatorCode::Lower
            | OperatorCode::Upper
            | OperatorCode::Reverse
            | OperatorCode::Random => &UNARY_SAME,
            OperatorCode::Prime => &PRIME,
            OperatorCode::Not => &NOT,
            OperatorCode::Convert => &CONVERT,
            OperatorCode::Add | OperatorCode::Subtract | OperatorCode::Multiply => &ARITHMETIC,
            OperatorCode::Greater => &GREATER,
            OperatorCode::Divide => &DIVIDE,
            OperatorCode::Remainder => &REMAINDER,
            OperatorCode::Factor => &FACTOR,
            OperatorCode::Equal => &EQUAL,
            OperatorCode::Pass => &PASS,
            OperatorCode::Sink => &SINK,
            OperatorCode::TickStamp => &TICK_STAMP,
            OperatorCode::Halt | OperatorCode::HaltDump => &HALT,
        }
    }

    /// Axis operators resolve the vertical and horizontal pairs independently.
    pub fn is_axis(self) -> bool {
        matches!(
            self,
            OperatorCode::Swap
                | OperatorCode::Lower
                | OperatorCode::Upper
                | OperatorCode::Prime
                | OperatorCode::Reverse
                | OperatorCode::Not
                | OperatorCode::Random
                | OperatorCode::Convert
                | OperatorCode::Sink
        )
    }

    /// Special operators are also endpoints of the pipe network.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            OperatorCode::Pass
                | OperatorCode::Sink
                | OperatorCode::TickStamp
                | OperatorCode::Halt
                | OperatorCode::HaltDump
        )
    }

    /// Overwriting operators write over whatever occupies the target cell.
    pub fn overwrites(self) -> bool {
        matches!(self, OperatorCode::Redirect | OperatorCode::Swap)
    }

    /// Codes that never consume their inputs, whatever the letter case.
    fn always_peeks(self) -> bool {
        matches!(
            self,
            OperatorCode::WriteText
                | OperatorCode::WriteNumber
                | OperatorCode::Redirect
                | OperatorCode::Swap
                | OperatorCode::HaltDump
        )
    }

    /// Codes whose lowercase letter is a different code rather than a
    /// peeking variant.
    fn has_own_letter(self) -> bool {
        self.always_peeks() || matches!(self, OperatorCode::Halt | OperatorCode::Sink)
    }

    fn letter(self) -> char {
        match self {
            OperatorCode::WriteText => 'W',
            OperatorCode::WriteNumber => 'w',
            OperatorCode::Redirect => 'C',
            OperatorCode::Swap => 'c',
            OperatorCode::Lower => 'L',
            OperatorCode::Upper => 'U',
            OperatorCode::Add => 'A',
            OperatorCode::Subtract => 'S',
            OperatorCode::Multiply => 'M',
            OperatorCode::Divide => 'D',
            OperatorCode::Remainder => 'R',
            OperatorCode::Factor => 'F',
            OperatorCode::Prime => 'P',
            OperatorCode::Reverse => 'Z',
            OperatorCode::Not => 'N',
            OperatorCode::Equal => 'E',
            OperatorCode::Greater => 'G',
            OperatorCode::Random => 'K',
            OperatorCode::Convert => 'Y',
            OperatorCode::Pass => 'V',
            OperatorCode::Sink => 'X',
            OperatorCode::TickStamp => 'T',
            OperatorCode::Halt => 'H',
            OperatorCode::HaltDump => 'h',
        }
    }
}

// ---------------------------------------------------------------------------
// Operator cells
// ---------------------------------------------------------------------------

/// The contents of an operator cell: a code plus its consumption flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operator {
    pub code: OperatorCode,
    /// When set, matched inputs survive the tick.
    pub peek: bool,
}

impl Operator {
    pub fn new(code: OperatorCode) -> Self {
        Self {
            code,
            peek: code.always_peeks(),
        }
    }

    /// Parse an operator letter. Lowercase selects the peeking variant, or
    /// a separate code for `w`, `c` and `h`. `x` is a pipe, not an operator.
    pub fn from_symbol(ch: char) -> Option<Self> {
        use OperatorCode::*;

        let lower = ch.is_ascii_lowercase();
        let code = match ch {
            'W' => WriteText,
            'w' => WriteNumber,
            'C' => Redirect,
            'c' => Swap,
            'H' => Halt,
            'h' => HaltDump,
            'X' => Sink,
            _ => match ch.to_ascii_uppercase() {
                'L' => Lower,
                'U' => Upper,
                'A' => Add,
                'S' => Subtract,
                'M' => Multiply,
                'D' => Divide,
                'R' => Remainder,
                'F' => Factor,
                'P' => Prime,
                'Z' => Reverse,
                'N' => Not,
                'E' => Equal,
                'G' => Greater,
                'K' => Random,
                'Y' => Convert,
                'V' => Pass,
                'T' => TickStamp,
                _ => return None,
            },
        };
        Some(Self {
            code,
            peek: lower || code.always_peeks(),
        })
    }

    /// The letter this operator was written as.
    pub fn symbol(&self) -> char {
        let letter = self.code.letter();
        if self.peek && !self.code.has_own_letter() {
            letter.to_ascii_lowercase()
        } else {
            letter
        }
    }

    pub fn consumes(&self) -> bool {
        !self.peek
    }

    pub fn signatures(&self) -> &'static [Signature] {
        self.code.signatures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTERS: &str = "WwCcLlUuAaSsMmDdRrFfPpZzNnEeGgKkYyVvXTtHh";

    #[test]
    fn every_letter_round_trips() {
        for ch in LETTERS.chars() {
            let op = Operator::from_symbol(ch).unwrap();
            assert_eq!(op.symbol(), ch, "letter {ch}");
        }
    }

    #[test]
    fn non_operators_rejected() {
        for ch in "xBbIOoQq1-#".chars() {
            assert!(Operator::from_symbol(ch).is_none(), "letter {ch}");
        }
    }

    #[test]
    fn lowercase_peeks() {
        assert!(Operator::from_symbol('A').unwrap().consumes());
        assert!(!Operator::from_symbol('a').unwrap().consumes());
        assert!(Operator::from_symbol('H').unwrap().consumes());
        assert!(!Operator::from_symbol('h').unwrap().consumes());
        assert!(Operator::from_symbol('X').unwrap().consumes());
    }

    #[test]
    fn io_and_redirect_always_peek() {
        for ch in ['W', 'w', 'C', 'c'] {
            assert!(!Operator::from_symbol(ch).unwrap().consumes(), "letter {ch}");
        }
    }

    #[test]
    fn flags() {
        assert!(OperatorCode::Swap.is_axis());
        assert!(OperatorCode::Swap.overwrites());
        assert!(OperatorCode::Sink.is_axis());
        assert!(OperatorCode::Sink.is_special());
        assert!(!OperatorCode::Add.is_axis());
        assert!(OperatorCode::TickStamp.is_special());
        assert!(!OperatorCode::Redirect.is_special());
    }

    #[test]
    fn axis_signatures_only_use_up_and_down() {
        for ch in LETTERS.chars() {
            let op = Operator::from_symbol(ch).unwrap();
            if !op.code.is_axis() {
                continue;
            }
            for s in op.signatures() {
                assert!(s.req.left.is_none() && s.req.right.is_none());
                assert!(s.out.left.is_none() && s.out.right.is_none());
            }
        }
    }

    #[test]
    fn redirect_outcomes() {
        let sigs = OperatorCode::Redirect.signatures();
        assert_eq!(sigs.len(), 7);
        // Up and left present but right absent: only left is copied back.
        assert_eq!(sigs[1].out, Sides::new(NO, ANY, NO, NO));
        assert!(sigs.iter().all(|s| s.out.down.is_none()));
    }

    #[test]
    fn halt_and_sink_emit_nothing() {
        assert!(OperatorCode::Halt.signatures()[0].emits_nothing());
        assert!(OperatorCode::Sink.signatures().iter().all(Signature::emits_nothing));
        assert!(!OperatorCode::Add.signatures()[0].emits_nothing());
    }
}
