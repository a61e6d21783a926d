//! The scalar integer type and its arithmetic helpers.
//!
//! Addition, subtraction, multiplication and negation wrap on overflow.
//! Division and remainder are checked: a zero divisor or the single
//! overflowing case (`MIN / -1`) reports failure instead.

/// The language's only numeric type.
pub type Number = i64;

/// Truncating division. `None` on a zero divisor or overflow.
pub fn div(a: Number, b: Number) -> Option<Number> {
    a.checked_div(b)
}

/// Remainder with the sign of the dividend. `None` on a zero divisor or overflow.
pub fn rem(a: Number, b: Number) -> Option<Number> {
    a.checked_rem(b)
}

/// -1, 0 or 1.
pub fn sign(n: Number) -> Number {
    n.signum()
}

/// Absolute value; `MIN` wraps to itself.
pub fn abs(n: Number) -> Number {
    n.wrapping_abs()
}

/// Primality of `|n|`.
pub fn is_prime(n: Number) -> bool {
    let n = n.unsigned_abs();
    if n < 2 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut i: u64 = 3;
    while i.saturating_mul(i) <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Greatest common divisor of `|a|` and `|b|`.
pub fn gcd(a: Number, b: Number) -> Number {
    let mut a = a.unsigned_abs();
    let mut b = b.unsigned_abs();
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a as Number
}

/// Reverse the decimal digits of `n`, keeping its sign. `120` becomes `21`.
pub fn reverse_digits(n: Number) -> Number {
    let mut m = n.unsigned_abs();
    let mut out: u64 = 0;
    while m != 0 {
        out = out.wrapping_mul(10).wrapping_add(m % 10);
        m /= 10;
    }
    let out = out as Number;
    if n < 0 { out.wrapping_neg() } else { out }
}

/// Canonical decimal rendering.
pub fn to_text(n: Number) -> String {
    n.to_string()
}

/// Parse a canonical decimal rendering (optional sign, digits, nothing else).
pub fn from_text(s: &str) -> Option<Number> {
    s.parse().ok()
}
