//! What each operator computes once a signature has matched.
//!
//! Three entry points mirror the three ways an operator runs:
//!
//! - [`execute_joint`] for joint operators matched against all four
//!   neighbours, yielding one optional value per side.
//! - [`execute_axis`] for axis operators matched against one pair, yielding a
//!   `{backward, forward}` pair (toward up/left and toward down/right).
//! - [`receive`] for special operators reached through the pipe network.
//!
//! A returned `None` on a side means nothing is produced there; placing
//! nothing always succeeds.
//!
//! String positions, lengths and random picks count `char`s, not bytes.
//! For ASCII text the two agree.

use crate::cell::DataCell;
use crate::dir::Drift;
use crate::number::{self, Number};
use crate::operator::{OperatorCode, Sides};
use crate::services::Services;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A matched signature whose computation failed. The operator produces
/// nothing and consumes nothing this tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("repetition needs exactly one string operand")]
    RepeatOperands,

    #[error("{0:?} is not a number")]
    NotANumber(String),
}

// ---------------------------------------------------------------------------
// Emissions
// ---------------------------------------------------------------------------

/// Joint operator output, one optional value per side.
pub type JointEmission = Sides<Option<DataCell>>;

/// Axis operator output for one matched pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisEmission {
    /// Toward up (vertical pair) or left (horizontal pair).
    pub backward: Option<DataCell>,
    /// Toward down (vertical pair) or right (horizontal pair).
    pub forward: Option<DataCell>,
}

fn down(value: impl Into<Value>) -> JointEmission {
    Sides {
        down: Some(DataCell::new(value)),
        ..Sides::default()
    }
}

fn forward(value: impl Into<Value>) -> AxisEmission {
    AxisEmission {
        backward: None,
        forward: Some(DataCell::new(value)),
    }
}

static NO_VALUE: Value = Value::None;

fn value_of(cell: Option<&DataCell>) -> &Value {
    cell.map_or(&NO_VALUE, |d| &d.value)
}

// ---------------------------------------------------------------------------
// Joint operators
// ---------------------------------------------------------------------------

/// Run signature `index` of a joint operator against its neighbours.
pub fn execute_joint(
    code: OperatorCode,
    index: usize,
    neighbors: &Sides<Option<&DataCell>>,
    services: &mut Services<'_>,
) -> Result<JointEmission, ExecError> {
    let up = value_of(neighbors.up);
    let left = value_of(neighbors.left);
    let right = value_of(neighbors.right);
    let ops = operands(index, up, left, right);

    let emission = match code {
        OperatorCode::WriteText => match index {
            0 => {
                let token = services.read_token();
                services.write_text(&token);
                JointEmission::default()
            }
            1 => {
                services.write_text(&up.to_text());
                JointEmission::default()
            }
            _ => down(services.read_token()),
        },
        OperatorCode::WriteNumber => match index {
            0 => {
                let n = services.read_number();
                services.write_number(n);
                JointEmission::default()
            }
            1 => {
                services.write_text(&up.to_text());
                JointEmission::default()
            }
            _ => down(services.read_number()),
        },
        OperatorCode::Redirect => redirect(code, index, neighbors),
        OperatorCode::Add => {
            if index % 2 == 0 {
                down(ops.iter().fold(0, |acc: Number, v| acc.wrapping_add(v.as_number())))
            } else {
                down(ops.iter().map(|v| v.to_text()).collect::<String>())
            }
        }
        OperatorCode::Subtract => {
            if index % 2 == 0 {
                let first = ops[0].as_number();
                down(ops[1..].iter().fold(first, |acc, v| acc.wrapping_sub(v.as_number())))
            } else {
                let first = ops[0].to_text().into_owned();
                down(ops[1..].iter().fold(first, |acc, v| remove_all(&acc, &v.to_text())))
            }
        }
        OperatorCode::Multiply => {
            if index % 2 == 0 {
                down(ops.iter().fold(1, |acc: Number, v| acc.wrapping_mul(v.as_number())))
            } else {
                down(repeat(&ops)?)
            }
        }
        OperatorCode::Divide => match index {
            0 => down(divide(divide(up.as_number(), left.as_number())?, right.as_number())?),
            1 => down(divide(up.as_number(), left.as_number())?),
            2 => down(divide(up.as_number(), right.as_number())?),
            3 => down(divide(left.as_number(), right.as_number())?),
            4 => split_emission(cut(&up.to_text(), left.as_number())),
            _ => split_emission(split(&up.to_text(), &left.to_text())),
        },
        OperatorCode::Remainder => match index {
            0 => down(remainder(remainder(up.as_number(), left.as_number())?, right.as_number())?),
            1 => down(replace_all(&up.to_text(), &left.to_text(), &right.to_text())),
            2 => down(remainder(up.as_number(), left.as_number())?),
            3 => down(remainder(up.as_number(), right.as_number())?),
            _ => down(remainder(left.as_number(), right.as_number())?),
        },
        OperatorCode::Factor => match index {
            0 => down(number::gcd(up.as_number(), left.as_number())),
            _ => down(find(&up.to_text(), &left.to_text())),
        },
        OperatorCode::Equal => {
            let equal = match index {
                0 => up == left && up == right,
                1 => up == left,
                2 => up == right,
                _ => left == right,
            };
            down(equal)
        }
        OperatorCode::Greater => {
            let greater = if index % 2 == 0 {
                ops.windows(2).all(|w| w[0].as_number() > w[1].as_number())
            } else {
                ops.windows(2).all(|w| w[0].to_text() > w[1].to_text())
            };
            down(greater)
        }
        OperatorCode::Pass => Sides {
            down: neighbors.up.cloned(),
            ..Sides::default()
        },
        OperatorCode::TickStamp => {
            if up.is_empty() {
                JointEmission::default()
            } else {
                down(services.tick())
            }
        }
        OperatorCode::Halt | OperatorCode::HaltDump => {
            if !up.is_empty() {
                services.halt(code == OperatorCode::HaltDump);
            }
            JointEmission::default()
        }
        // Axis codes never reach the joint path.
        _ => JointEmission::default(),
    };
    Ok(emission)
}

/// The operand list for the eight-signature arithmetic layout: all three,
/// then up+left, up+right, left+right.
fn operands<'v>(index: usize, up: &'v Value, left: &'v Value, right: &'v Value) -> Vec<&'v Value> {
    match index / 2 {
        0 => vec![up, left, right],
        1 => vec![up, left],
        2 => vec![up, right],
        _ => vec![left, right],
    }
}

/// Copies each matched neighbour back onto itself: the up copy flips its
/// drift, the left copy drifts left, the right copy drifts right.
fn redirect(
    code: OperatorCode,
    index: usize,
    neighbors: &Sides<Option<&DataCell>>,
) -> JointEmission {
    let out = code.signatures()[index].out;
    let copy = |emit: bool, cell: Option<&DataCell>, drift: fn(Drift) -> Drift| {
        emit.then(|| cell.map(|d| d.clone().with_drift(drift(d.drift))))
            .flatten()
    };
    Sides {
        up: copy(!out.up.is_none(), neighbors.up, Drift::flip),
        left: copy(!out.left.is_none(), neighbors.left, |_| Drift::Left),
        right: copy(!out.right.is_none(), neighbors.right, |_| Drift::Right),
        down: None,
    }
}

fn split_emission((first, rest): (String, String)) -> JointEmission {
    Sides {
        down: Some(DataCell::new(first)),
        right: Some(DataCell::new(rest)),
        ..Sides::default()
    }
}

fn divide(a: Number, b: Number) -> Result<Number, ExecError> {
    if b == 0 {
        return Err(ExecError::DivisionByZero);
    }
    number::div(a, b).ok_or(ExecError::Overflow)
}

fn remainder(a: Number, b: Number) -> Result<Number, ExecError> {
    if b == 0 {
        return Err(ExecError::DivisionByZero);
    }
    number::rem(a, b).ok_or(ExecError::Overflow)
}

// ---------------------------------------------------------------------------
// String helpers
// ---------------------------------------------------------------------------

/// Remove `pattern` until it no longer occurs, rescanning from the start so
/// occurrences formed by a removal are removed too.
fn remove_all(s: &str, pattern: &str) -> String {
    let mut s = s.to_string();
    if pattern.is_empty() {
        return s;
    }
    while let Some(pos) = s.find(pattern) {
        s.replace_range(pos..pos + pattern.len(), "");
    }
    s
}

/// Longest string repetition may build. Larger products fail with
/// [`ExecError::Overflow`].
pub const MAX_REPEAT_BYTES: usize = 1 << 24;

/// Repeat the single string operand by the product of the numeric ones.
fn repeat(ops: &[&Value]) -> Result<String, ExecError> {
    let mut text = None;
    let mut count: Number = 1;
    for v in ops {
        match v {
            Value::String(s) if text.is_none() => text = Some(s.as_str()),
            Value::Number(n) => count = count.wrapping_mul(*n),
            _ => return Err(ExecError::RepeatOperands),
        }
    }
    let text = text.ok_or(ExecError::RepeatOperands)?;
    if count < 1 {
        return Ok(String::new());
    }
    let count = usize::try_from(count).map_err(|_| ExecError::Overflow)?;
    match text.len().checked_mul(count) {
        Some(bytes) if bytes <= MAX_REPEAT_BYTES => Ok(text.repeat(count)),
        _ => Err(ExecError::Overflow),
    }
}

/// Non-overlapping left-to-right replacement. An empty `from` changes nothing.
fn replace_all(s: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        s.to_string()
    } else {
        s.replace(from, to)
    }
}

/// Index in `char`s of the first `needle` in `hay`, or -1. Empty inputs never match.
fn find(hay: &str, needle: &str) -> Number {
    if hay.is_empty() || needle.is_empty() {
        return -1;
    }
    match hay.find(needle) {
        Some(byte) => hay[..byte].chars().count() as Number,
        None => -1,
    }
}

/// Cut after `at` `char`s; negative positions count from the end.
/// The position is clamped to the string.
fn cut(s: &str, at: Number) -> (String, String) {
    let len = s.chars().count() as Number;
    let at = if at < 0 { at.saturating_add(len) } else { at };
    let at = at.clamp(0, len) as usize;
    let byte = s.char_indices().nth(at).map_or(s.len(), |(i, _)| i);
    (s[..byte].to_string(), s[byte..].to_string())
}

/// Split at the first `delimiter`. A missing or empty delimiter leaves the
/// whole string in front.
fn split(s: &str, delimiter: &str) -> (String, String) {
    if delimiter.is_empty() {
        return (s.to_string(), String::new());
    }
    match s.split_once(delimiter) {
        Some((head, tail)) => (head.to_string(), tail.to_string()),
        None => (s.to_string(), String::new()),
    }
}

// ---------------------------------------------------------------------------
// Axis operators
// ---------------------------------------------------------------------------

/// Run signature `index` of an axis operator against one pair.
pub fn execute_axis(
    code: OperatorCode,
    index: usize,
    first: Option<&DataCell>,
    second: Option<&DataCell>,
    services: &mut Services<'_>,
) -> Result<AxisEmission, ExecError> {
    let value = value_of(first);
    let emission = match code {
        OperatorCode::Swap => AxisEmission {
            backward: second.cloned(),
            forward: first.cloned(),
        },
        OperatorCode::Lower => match value {
            Value::String(s) => forward(s.to_ascii_lowercase()),
            _ => forward(number::abs(value.as_number())),
        },
        OperatorCode::Upper => match value {
            Value::String(s) => forward(s.to_ascii_uppercase()),
            _ => forward(number::sign(value.as_number())),
        },
        OperatorCode::Prime => match value {
            // Length in chars.
            Value::String(s) => forward(s.chars().count() as Number),
            _ => forward(number::is_prime(value.as_number())),
        },
        OperatorCode::Reverse => match value {
            Value::String(s) => forward(s.chars().rev().collect::<String>()),
            _ => forward(number::reverse_digits(value.as_number())),
        },
        OperatorCode::Not => forward(value.is_empty()),
        OperatorCode::Random => match value {
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                if chars.is_empty() {
                    forward(String::new())
                } else {
                    let i = services.random(chars.len() as Number) as usize;
                    forward(chars[i].to_string())
                }
            }
            _ => forward(services.random(value.as_number())),
        },
        OperatorCode::Convert => match (index, value) {
            (0, _) => forward(number::to_text(value.as_number())),
            (1, Value::String(s)) => match number::from_text(s) {
                Some(n) => forward(n),
                None => return Err(ExecError::NotANumber(s.clone())),
            },
            (2, _) => forward(Value::Output),
            (3, _) => forward(Value::Input),
            _ => AxisEmission::default(),
        },
        // Sink and the joint codes produce nothing here.
        _ => AxisEmission::default(),
    };
    Ok(emission)
}

// ---------------------------------------------------------------------------
// Pipe endpoints
// ---------------------------------------------------------------------------

/// Deliver a routed value to a special operator. Returns the value to
/// re-emit one cell below the operator, if any.
pub fn receive(code: OperatorCode, data: &DataCell, services: &mut Services<'_>) -> Option<DataCell> {
    match code {
        OperatorCode::Pass => Some(data.clone()),
        OperatorCode::TickStamp => {
            (!data.value.is_empty()).then(|| DataCell::new(services.tick()))
        }
        OperatorCode::Halt | OperatorCode::HaltDump => {
            if !data.value.is_empty() {
                services.halt(code == OperatorCode::HaltDump);
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_console;
    use crate::rng::SimRng;

    fn num(n: Number) -> DataCell {
        DataCell::new(n)
    }

    fn text(s: &str) -> DataCell {
        DataCell::new(s)
    }

    fn joint(
        code: OperatorCode,
        index: usize,
        cells: [Option<&DataCell>; 3],
    ) -> Result<JointEmission, ExecError> {
        let mut console = buffer_console("");
        let mut rng = SimRng::new(1);
        let mut services = Services::new(&mut console, &mut rng, 0);
        let neighbors = Sides::new(cells[0], cells[1], cells[2], None);
        execute_joint(code, index, &neighbors, &mut services)
    }

    fn axis(code: OperatorCode, index: usize, first: &DataCell) -> Result<AxisEmission, ExecError> {
        let mut console = buffer_console("");
        let mut rng = SimRng::new(1);
        let mut services = Services::new(&mut console, &mut rng, 0);
        execute_axis(code, index, Some(first), None, &mut services)
    }

    fn down_value(e: JointEmission) -> Value {
        e.down.unwrap().value
    }

    fn forward_value(e: AxisEmission) -> Value {
        e.forward.unwrap().value
    }

    #[test]
    fn add_numbers_and_text() {
        let (a, b, c) = (num(1), num(2), num(3));
        let e = joint(OperatorCode::Add, 0, [Some(&a), Some(&b), Some(&c)]).unwrap();
        assert_eq!(down_value(e), Value::Number(6));

        let s = text("x");
        let e = joint(OperatorCode::Add, 3, [Some(&s), Some(&b), None]).unwrap();
        assert_eq!(down_value(e), Value::from("x2"));

        let e = joint(OperatorCode::Add, 7, [None, Some(&b), Some(&s)]).unwrap();
        assert_eq!(down_value(e), Value::from("2x"));
    }

    #[test]
    fn subtract_removes_every_occurrence() {
        let (s, p) = (text("aabbab"), text("ab"));
        let e = joint(OperatorCode::Subtract, 3, [Some(&s), Some(&p), None]).unwrap();
        assert_eq!(down_value(e), Value::from(""));

        let (s, p) = (text("banana"), text("an"));
        let e = joint(OperatorCode::Subtract, 3, [Some(&s), Some(&p), None]).unwrap();
        assert_eq!(down_value(e), Value::from("ba"));
    }

    #[test]
    fn subtract_numbers_left_to_right() {
        let (a, b, c) = (num(10), num(3), num(2));
        let e = joint(OperatorCode::Subtract, 0, [Some(&a), Some(&b), Some(&c)]).unwrap();
        assert_eq!(down_value(e), Value::Number(5));
    }

    #[test]
    fn multiply_repeats_single_string() {
        let (s, n, m) = (text("ab"), num(2), num(3));
        let e = joint(OperatorCode::Multiply, 1, [Some(&n), Some(&s), Some(&m)]).unwrap();
        assert_eq!(down_value(e), Value::from("abababababab"));

        let zero = num(0);
        let e = joint(OperatorCode::Multiply, 3, [Some(&s), Some(&zero), None]).unwrap();
        assert_eq!(down_value(e), Value::from(""));
    }

    #[test]
    fn multiply_refuses_huge_repetition() {
        let (s, n) = (text("a"), num(Number::MAX));
        assert_eq!(
            joint(OperatorCode::Multiply, 3, [Some(&s), Some(&n), None]),
            Err(ExecError::Overflow)
        );

        let limit = num(MAX_REPEAT_BYTES as Number);
        let e = joint(OperatorCode::Multiply, 3, [Some(&s), Some(&limit), None]).unwrap();
        assert_eq!(e.down.unwrap().value.as_str().map(str::len), Some(MAX_REPEAT_BYTES));

        let over = num(MAX_REPEAT_BYTES as Number + 1);
        assert_eq!(
            joint(OperatorCode::Multiply, 3, [Some(&s), Some(&over), None]),
            Err(ExecError::Overflow)
        );
    }

    #[test]
    fn string_positions_count_chars() {
        let word = text("héllo");
        let e = joint(OperatorCode::Divide, 4, [Some(&word), Some(&num(2)), None]).unwrap();
        assert_eq!(e.down.unwrap().value, Value::from("hé"));
        assert_eq!(e.right.unwrap().value, Value::from("llo"));
        assert_eq!(forward_value(axis(OperatorCode::Prime, 1, &word).unwrap()), Value::Number(5));
    }

    #[test]
    fn multiply_rejects_two_strings() {
        let (s, t) = (text("a"), text("b"));
        assert_eq!(
            joint(OperatorCode::Multiply, 3, [Some(&s), Some(&t), None]),
            Err(ExecError::RepeatOperands)
        );
    }

    #[test]
    fn divide_failures() {
        let (a, z) = (num(5), num(0));
        assert_eq!(
            joint(OperatorCode::Divide, 1, [Some(&a), Some(&z), None]),
            Err(ExecError::DivisionByZero)
        );
        let (min, neg) = (num(Number::MIN), num(-1));
        assert_eq!(
            joint(OperatorCode::Divide, 1, [Some(&min), Some(&neg), None]),
            Err(ExecError::Overflow)
        );
    }

    #[test]
    fn divide_cuts_strings() {
        let s = text("hello");
        let at = num(-2);
        let e = joint(OperatorCode::Divide, 4, [Some(&s), Some(&at), None]).unwrap();
        assert_eq!(e.down.unwrap().value, Value::from("hel"));
        assert_eq!(e.right.unwrap().value, Value::from("lo"));

        let far = num(99);
        let e = joint(OperatorCode::Divide, 4, [Some(&s), Some(&far), None]).unwrap();
        assert_eq!(e.down.unwrap().value, Value::from("hello"));
        assert_eq!(e.right.unwrap().value, Value::from(""));
    }

    #[test]
    fn divide_splits_strings() {
        let (s, d) = (text("a,b,c"), text(","));
        let e = joint(OperatorCode::Divide, 5, [Some(&s), Some(&d), None]).unwrap();
        assert_eq!(e.down.unwrap().value, Value::from("a"));
        assert_eq!(e.right.unwrap().value, Value::from("b,c"));
    }

    #[test]
    fn remainder_replaces_text() {
        let (s, from, to) = (text("aXbX"), text("X"), text("--"));
        let e = joint(OperatorCode::Remainder, 1, [Some(&s), Some(&from), Some(&to)]).unwrap();
        assert_eq!(down_value(e), Value::from("a--b--"));

        let empty = text("");
        let e = joint(OperatorCode::Remainder, 1, [Some(&s), Some(&empty), Some(&to)]).unwrap();
        assert_eq!(down_value(e), Value::from("aXbX"));
    }

    #[test]
    fn factor_gcd_and_find() {
        let (a, b) = (num(12), num(18));
        let e = joint(OperatorCode::Factor, 0, [Some(&a), Some(&b), None]).unwrap();
        assert_eq!(down_value(e), Value::Number(6));

        let (hay, needle) = (text("héllo"), text("l"));
        let e = joint(OperatorCode::Factor, 1, [Some(&hay), Some(&needle), None]).unwrap();
        assert_eq!(down_value(e), Value::Number(2));

        let missing = text("z");
        let e = joint(OperatorCode::Factor, 1, [Some(&hay), Some(&missing), None]).unwrap();
        assert_eq!(down_value(e), Value::Number(-1));
    }

    #[test]
    fn greater_is_strict_chain() {
        let (a, b, c) = (num(3), num(2), num(2));
        let e = joint(OperatorCode::Greater, 0, [Some(&a), Some(&b), Some(&c)]).unwrap();
        assert_eq!(down_value(e), Value::Number(0));

        let (x, y) = (text("b"), num(10));
        let e = joint(OperatorCode::Greater, 3, [Some(&x), Some(&y), None]).unwrap();
        assert_eq!(down_value(e), Value::Number(1));
    }

    #[test]
    fn equal_compares_tag_and_payload() {
        let (a, b) = (num(5), text("5"));
        let e = joint(OperatorCode::Equal, 1, [Some(&a), Some(&b), None]).unwrap();
        assert_eq!(down_value(e), Value::Number(0));
        let c = num(5).with_drift(Drift::Left);
        let e = joint(OperatorCode::Equal, 1, [Some(&a), Some(&c), None]).unwrap();
        assert_eq!(down_value(e), Value::Number(1));
    }

    #[test]
    fn redirect_steers_drift() {
        let up = num(1);
        let left = num(2).with_drift(Drift::Left);
        let right = num(3).with_drift(Drift::Left);
        let e = joint(OperatorCode::Redirect, 0, [Some(&up), Some(&left), Some(&right)]).unwrap();
        assert_eq!(e.up.unwrap().drift, Drift::Left);
        assert_eq!(e.left.unwrap().drift, Drift::Left);
        assert_eq!(e.right.unwrap().drift, Drift::Right);
        assert!(e.down.is_none());
    }

    #[test]
    fn redirect_up_and_left_only_copies_left() {
        let (up, left) = (num(1), num(2));
        let e = joint(OperatorCode::Redirect, 1, [Some(&up), Some(&left), None]).unwrap();
        assert!(e.up.is_none());
        assert_eq!(e.left.unwrap().value, Value::Number(2));
    }

    #[test]
    fn pass_keeps_drift() {
        let up = num(4).with_drift(Drift::Left);
        let e = joint(OperatorCode::Pass, 0, [Some(&up), None, None]).unwrap();
        assert_eq!(e.down.unwrap(), up);
    }

    #[test]
    fn write_text_reads_and_writes() {
        let mut console = buffer_console("hello there");
        let mut rng = SimRng::new(1);
        let mut services = Services::new(&mut console, &mut rng, 0);
        let none = Sides::default();
        let e = execute_joint(OperatorCode::WriteText, 2, &none, &mut services).unwrap();
        assert_eq!(e.down.unwrap().value, Value::from("hello"));
        let up = num(-3);
        let n = Sides::new(Some(&up), None, None, None);
        execute_joint(OperatorCode::WriteNumber, 1, &n, &mut services).unwrap();
        execute_joint(OperatorCode::WriteText, 0, &none, &mut services).unwrap();
        drop(services);
        assert_eq!(console.output(), b"-3there");
    }

    #[test]
    fn tick_stamp_skips_empty() {
        let zero = num(0);
        let e = joint(OperatorCode::TickStamp, 0, [Some(&zero), None, None]).unwrap();
        assert!(e.down.is_none());
    }

    #[test]
    fn axis_unary_operators() {
        assert_eq!(forward_value(axis(OperatorCode::Lower, 0, &num(-4)).unwrap()), Value::Number(4));
        assert_eq!(forward_value(axis(OperatorCode::Lower, 1, &text("AbC")).unwrap()), Value::from("abc"));
        assert_eq!(forward_value(axis(OperatorCode::Upper, 0, &num(-4)).unwrap()), Value::Number(-1));
        assert_eq!(forward_value(axis(OperatorCode::Prime, 0, &num(7)).unwrap()), Value::Number(1));
        assert_eq!(forward_value(axis(OperatorCode::Prime, 1, &text("abc")).unwrap()), Value::Number(3));
        assert_eq!(forward_value(axis(OperatorCode::Reverse, 1, &text("abc")).unwrap()), Value::from("cba"));
        assert_eq!(forward_value(axis(OperatorCode::Not, 0, &text("")).unwrap()), Value::Number(1));
        assert_eq!(forward_value(axis(OperatorCode::Not, 0, &num(3)).unwrap()), Value::Number(0));
    }

    #[test]
    fn convert_round_trip_and_failure() {
        let encoded = forward_value(axis(OperatorCode::Convert, 0, &num(-120)).unwrap());
        assert_eq!(encoded, Value::from("-120"));
        let decoded = forward_value(axis(OperatorCode::Convert, 1, &DataCell::new(encoded)).unwrap());
        assert_eq!(decoded, Value::Number(-120));
        assert_eq!(
            axis(OperatorCode::Convert, 1, &text("12x")),
            Err(ExecError::NotANumber("12x".into()))
        );
        let marker = DataCell::new(Value::Input);
        assert_eq!(forward_value(axis(OperatorCode::Convert, 2, &marker).unwrap()), Value::Output);
    }

    #[test]
    fn random_string_picks_a_char() {
        let v = forward_value(axis(OperatorCode::Random, 1, &text("xyz")).unwrap());
        assert!(["x", "y", "z"].contains(&v.as_str().unwrap()));
        let v = forward_value(axis(OperatorCode::Random, 1, &text("")).unwrap());
        assert_eq!(v, Value::from(""));
    }

    #[test]
    fn swap_exchanges_pair() {
        let mut console = buffer_console("");
        let mut rng = SimRng::new(1);
        let mut services = Services::new(&mut console, &mut rng, 0);
        let (a, b) = (num(1), text("b"));
        let e = execute_axis(OperatorCode::Swap, 0, Some(&a), Some(&b), &mut services).unwrap();
        assert_eq!(e.backward, Some(b));
        assert_eq!(e.forward, Some(a));
    }

    #[test]
    fn receive_handlers() {
        let mut console = buffer_console("");
        let mut rng = SimRng::new(1);
        let mut services = Services::new(&mut console, &mut rng, 9);
        let v = num(3);
        assert_eq!(receive(OperatorCode::Pass, &v, &mut services), Some(v.clone()));
        assert_eq!(receive(OperatorCode::Sink, &v, &mut services), None);
        assert_eq!(
            receive(OperatorCode::TickStamp, &v, &mut services).map(|d| d.value),
            Some(Value::Number(9))
        );
        assert_eq!(receive(OperatorCode::TickStamp, &num(0), &mut services), None);
        assert_eq!(services.halt_request(), None);
        receive(OperatorCode::HaltDump, &v, &mut services);
        assert_eq!(services.halt_request().map(|h| h.dump), Some(true));
    }
}
