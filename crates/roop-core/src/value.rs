//! Tagged data values and the type masks operators match them against.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::number::{self, Number};

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A data value. `None` is the absence of data.
///
/// Equality compares tag and payload; the two markers carry no payload and
/// are only equal to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    #[default]
    None,
    Number(Number),
    String(String),
    /// Marks a cell that reads from the console.
    Input,
    /// Marks a cell that writes to the console.
    Output,
}

impl Value {
    /// The single-bit type set for this value's tag.
    pub fn kind(&self) -> TypeSet {
        match self {
            Value::None => TypeSet::NONE,
            Value::Number(_) => TypeSet::NUMBER,
            Value::String(_) => TypeSet::STRING,
            Value::Input => TypeSet::INPUT,
            Value::Output => TypeSet::OUTPUT,
        }
    }

    /// Numbers in decimal, strings verbatim, everything else as `""`.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Number(n) => Cow::Owned(number::to_text(*n)),
            Value::String(s) => Cow::Borrowed(s),
            _ => Cow::Borrowed(""),
        }
    }

    /// `None`, `0` and `""` are empty. The markers never are.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::None => true,
            Value::Number(n) => *n == 0,
            Value::String(s) => s.is_empty(),
            Value::Input | Value::Output => false,
        }
    }

    /// Numeric payload, or 0 for anything that is not a number.
    pub fn as_number(&self) -> Number {
        match self {
            Value::Number(n) => *n,
            _ => 0,
        }
    }

    /// String payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Number(Number::from(b))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("none"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Input => f.write_str("I"),
            Value::Output => f.write_str("O"),
        }
    }
}

// ---------------------------------------------------------------------------
// Type sets
// ---------------------------------------------------------------------------

/// Bitmask over the value tags, used as a signature requirement or outcome.
///
/// As a requirement, `NONE` always conforms. As an outcome, `NONE` means no
/// value is produced on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeSet(u8);

impl TypeSet {
    pub const NONE: TypeSet = TypeSet(0b0000);
    pub const NUMBER: TypeSet = TypeSet(0b0001);
    pub const STRING: TypeSet = TypeSet(0b0010);
    pub const INPUT: TypeSet = TypeSet(0b0100);
    pub const OUTPUT: TypeSet = TypeSet(0b1000);
    /// Number or String.
    pub const NOR_S: TypeSet = TypeSet(0b0011);
    /// Any value at all.
    pub const ANY: TypeSet = TypeSet(0b1111);

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn intersects(self, other: TypeSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether a neighbour holding `value` (or nothing) satisfies this requirement.
    pub fn admits(self, value: Option<&Value>) -> bool {
        if self.is_none() {
            return true;
        }
        value.is_some_and(|v| self.intersects(v.kind()))
    }
}
