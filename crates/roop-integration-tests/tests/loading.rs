//! Integration test: program text through the loader into a runnable
//! engine, including the errors that stop a program before tick 0.

use roop_core::engine::Engine;
use roop_core::grid::Pos;
use roop_core::test_utils::*;
use roop_core::value::Value;
use roop_loader::{load, LoadError};

#[test]
fn literals_and_constants_feed_operators() {
    // "/65/" is the string "A"; the adder concatenates the 7 after it.
    let mut engine = Engine::new(load(" /65/\n7A\n\n").unwrap(), buffer_console(""), 0);
    engine.produce();
    assert_eq!(value_at(engine.grid(), 2, 3), Value::from("A7"));
}

#[test]
fn vertical_literal_reads_downwards() {
    let grid = load("[\n4\n2\n]\n").unwrap();
    assert_eq!(value_at(&grid, 1, 1), Value::Number(42));
    assert_eq!(grid.data_cells().count(), 1);
}

#[test]
fn comment_is_erased() {
    let grid = load("{ note 5 }\n").unwrap();
    assert!(!grid.has_data());
}

#[test]
fn invalid_character_reports_framed_position() {
    let err = load("A \n Q\n").unwrap_err();
    assert_eq!(err, LoadError::InvalidCharacter { ch: 'Q', at: Pos::new(2, 2) });
    assert_eq!(err.to_string(), "character not valid 'Q' (2,2)");
}

#[test]
fn unclosed_literal_is_fatal() {
    let err = load("\"abc\n").unwrap_err();
    assert!(matches!(err, LoadError::UnterminatedLiteral { .. }));
    assert_eq!(err.position(), Some(Pos::new(1, 1)));
}

#[test]
fn unknown_constant_is_fatal() {
    let err = load("/nope/\n").unwrap_err();
    assert!(matches!(err, LoadError::UnknownConstant { ref name, .. } if name == "nope"));
}

#[test]
fn crlf_source_loads_like_lf() {
    let unix = load("5 \n A\n").unwrap();
    let dos = load("5 \r\n A\r\n").unwrap();
    assert_eq!(unix.render(), dos.render());
}
