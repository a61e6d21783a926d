//! Named constants, written `/name/` or `\name\` in program text.

use roop_core::number::Number;
use roop_core::value::Value;

const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const OCTAL: &str = "01234567";
const LOWER_HEX: &str = "0123456789abcdef";
const UPPER_HEX: &str = "0123456789ABCDEF";
const ANY_HEX: &str = "0123456789abcdefABCDEF";
const BASE64: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const BASE58: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const BASE36: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ROMAN: &str = "IVXLCDM";

/// The value a constant name stands for, or `None` if the name is unknown.
///
/// Besides the named tables, a name made only of digits (the empty name
/// included) is the one-character string whose code is the number mod 128.
pub fn lookup(name: &str) -> Option<Value> {
    let text = match name {
        "ll" => LOWER.to_string(),
        "ul" => UPPER.to_string(),
        "al" => format!("{LOWER}{UPPER}"),
        "aa" => (0u8..=127).map(char::from).collect(),
        "pa" => (32u8..=126).map(char::from).collect(),
        "dd" => DIGITS.to_string(),
        "od" => OCTAL.to_string(),
        "lhd" => LOWER_HEX.to_string(),
        "uhd" => UPPER_HEX.to_string(),
        "ahd" => ANY_HEX.to_string(),
        "b64" => BASE64.to_string(),
        "b58" => BASE58.to_string(),
        "b36" => BASE36.to_string(),
        "rn" => ROMAN.to_string(),
        "min" => return Some(Value::Number(Number::MIN)),
        "max" => return Some(Value::Number(Number::MAX)),
        _ => return ascii_code(name).map(|c| Value::String(c.to_string())),
    };
    Some(Value::String(text))
}

fn ascii_code(digits: &str) -> Option<char> {
    let mut code = 0u32;
    for ch in digits.chars() {
        code = (code * 10 + ch.to_digit(10)?) % 128;
    }
    char::from_u32(code)
}
