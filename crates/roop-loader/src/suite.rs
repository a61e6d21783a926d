//! Test-suite files.
//!
//! A suite file starts with `@` and holds any number of cases. Each case is
//! a header line followed by a program:
//!
//! ```text
//! @falls 2 1 3 n 5
//! 5
//!
//!
//! @greets 0 1 2 s hi there
//! ...
//! ```
//!
//! The header is `name tick x y kind [payload]`. `kind` is one of `e` (no
//! value), `n <number>`, `s <text>` (the rest of the line after a single
//! separator), `i` or `o`. The program runs up to the next `@` or the end of
//! the file. A case passes when, right after production in tick `tick`, the
//! framed cell `(x, y)` holds the expected value.

use std::fmt;

use roop_core::cell::Cell;
use roop_core::engine::Engine;
use roop_core::grid::Pos;
use roop_core::number::Number;
use roop_core::services::Console;
use roop_core::value::Value;

use crate::source::{self, LoadError};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuiteError {
    #[error("a test suite must start with '@'")]
    MissingMarker,

    #[error("case {case}: malformed header: {detail}")]
    Header { case: usize, detail: String },

    #[error("case '{name}': {source}")]
    Load { name: String, source: LoadError },
}

// ===========================================================================
// Cases
// ===========================================================================

/// What a case expects to find in its probe cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// Anything that is not a data cell.
    Empty,
    Number(Number),
    Text(String),
    Input,
    Output,
}

impl Expected {
    pub fn matches(&self, cell: &Cell) -> bool {
        match (self, cell.value()) {
            (Expected::Empty, None) => true,
            (Expected::Number(n), Some(Value::Number(v))) => n == v,
            (Expected::Text(s), Some(Value::String(v))) => s == v,
            (Expected::Input, Some(Value::Input)) => true,
            (Expected::Output, Some(Value::Output)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    /// Tick whose production phase is checked.
    pub tick: u64,
    /// Framed coordinate of the probe cell.
    pub at: Pos,
    pub expected: Expected,
    /// Program text, newline-terminated.
    pub program: String,
}

// ===========================================================================
// Parsing
// ===========================================================================

/// Parse a suite file. The text must start with `@`.
pub fn parse_suite(text: &str) -> Result<Vec<TestCase>, SuiteError> {
    let body = text.strip_prefix('@').ok_or(SuiteError::MissingMarker)?;
    let mut cases = Vec::new();
    for (index, section) in body.split('@').enumerate() {
        if section.trim().is_empty() {
            log::warn!("suite section {index} is empty; skipped");
            continue;
        }
        cases.push(parse_case(index, section)?);
    }
    Ok(cases)
}

fn parse_case(case: usize, section: &str) -> Result<TestCase, SuiteError> {
    let mut rest = section;

    let name = required(&mut rest, "name", case)?.to_string();
    let tick = parse_field(required(&mut rest, "tick", case)?, "tick", case)?;
    let x = parse_field(required(&mut rest, "x", case)?, "x", case)?;
    let y = parse_field(required(&mut rest, "y", case)?, "y", case)?;

    let mut chars = rest.trim_start().chars();
    let kind = chars.next().ok_or_else(|| header(case, "missing kind"))?;
    rest = chars.as_str();

    let expected = match kind {
        'e' => Expected::Empty,
        'i' => Expected::Input,
        'o' => Expected::Output,
        'n' => {
            let token = first_line(rest).split_whitespace().next().unwrap_or("");
            Expected::Number(parse_field(token, "number", case)?)
        }
        's' => {
            // Exactly one separator, then the rest of the line verbatim.
            let mut after = rest.chars();
            if after.next().is_some_and(|c| c != '\n') {
                rest = after.as_str();
            }
            Expected::Text(first_line(rest).trim_end_matches('\r').to_string())
        }
        other => {
            log::warn!("case '{name}': unknown kind '{other}', expecting no value");
            Expected::Empty
        }
    };

    let program = match rest.find('\n') {
        Some(end) => &rest[end + 1..],
        None => "",
    };

    Ok(TestCase {
        name,
        tick,
        at: Pos::new(x, y),
        expected,
        program: format!("{program}\n"),
    })
}

fn header(case: usize, detail: impl Into<String>) -> SuiteError {
    SuiteError::Header {
        case,
        detail: detail.into(),
    }
}

/// Take the next whitespace-delimited token from `rest`.
fn required<'a>(rest: &mut &'a str, what: &str, case: usize) -> Result<&'a str, SuiteError> {
    let trimmed = rest.trim_start();
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    if end == 0 {
        return Err(header(case, format!("missing {what}")));
    }
    let (token, tail) = trimmed.split_at(end);
    *rest = tail;
    Ok(token)
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or("")
}

fn parse_field<T: std::str::FromStr>(token: &str, what: &str, case: usize) -> Result<T, SuiteError> {
    token
        .parse()
        .map_err(|_| header(case, format!("bad {what} '{token}'")))
}

// ===========================================================================
// Running
// ===========================================================================

/// Load and run one case. Returns whether it passed.
pub fn run_case<C: Console>(case: &TestCase, console: C, seed: u64) -> Result<bool, LoadError> {
    let grid = source::load(&case.program)?;
    let mut engine = Engine::new(grid, console, seed);
    loop {
        let halted = engine.produce().is_some();
        if engine.tick() == case.tick {
            return Ok(engine
                .grid()
                .get(case.at)
                .is_some_and(|cell| case.expected.matches(cell)));
        }
        if halted || engine.settle().is_some() {
            return Ok(false);
        }
    }
}

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub name: String,
    pub passed: bool,
}

/// Run every case in order, sharing one console. Stops at the first case
/// that fails to load.
pub fn run_suite(
    cases: &[TestCase],
    console: &mut dyn Console,
    seed: u64,
) -> Result<SuiteReport, SuiteError> {
    let mut outcomes = Vec::with_capacity(cases.len());
    for case in cases {
        let passed = run_case(case, &mut *console, seed).map_err(|source| SuiteError::Load {
            name: case.name.clone(),
            source,
        })?;
        log::debug!(
            "case '{}': {}",
            case.name,
            if passed { "ok" } else { "fail" }
        );
        outcomes.push(CaseOutcome {
            name: case.name.clone(),
            passed,
        });
    }
    Ok(SuiteReport { outcomes })
}

// ===========================================================================
// Report
// ===========================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteReport {
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Banner, one line per case with alternating `.` and space fill, then the
/// totals.
impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*********  Tests  *********\n\n")?;
        for (i, outcome) in self.outcomes.iter().enumerate() {
            let label = format!("{}:", outcome.name);
            let status = if outcome.passed { "OK" } else { "Fail" };
            if i % 2 == 0 {
                writeln!(f, "{label:.<21} {status}")?;
            } else {
                writeln!(f, "{label:<21} {status}")?;
            }
        }
        f.write_str("\n---------------------------\n\n")?;
        writeln!(f, "OK:    {}", self.passed())?;
        writeln!(f, "Fail:  {}", self.failed())?;
        writeln!(f, "Total: {}", self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roop_core::test_utils::{buffer_console, output_text};

    #[test]
    fn parses_headers_and_programs() {
        let cases = parse_suite("@first 2 1 3 n -5\n5\n\n@second 0 2 1 s  two words\nAB\n").unwrap();
        assert_eq!(cases.len(), 2);

        assert_eq!(cases[0].name, "first");
        assert_eq!(cases[0].tick, 2);
        assert_eq!(cases[0].at, Pos::new(1, 3));
        assert_eq!(cases[0].expected, Expected::Number(-5));
        assert_eq!(cases[0].program, "5\n\n\n");

        assert_eq!(cases[1].expected, Expected::Text(" two words".into()));
        assert_eq!(cases[1].program, "AB\n\n");
    }

    #[test]
    fn bare_text_kind_expects_empty_string() {
        // The header newline is not taken as the separator, so the first
        // program line stays in the program.
        let cases = parse_suite("@blank 0 1 1 s\n\"\"\n").unwrap();
        assert_eq!(cases[0].expected, Expected::Text(String::new()));
        assert_eq!(cases[0].program, "\"\"\n\n");
        assert_eq!(run_case(&cases[0], buffer_console(""), 0), Ok(true));
    }

    #[test]
    fn marker_kinds() {
        let cases = parse_suite("@a 0 1 1 i\nI\n@b 0 1 1 o\nO\n@c 0 1 1 e\n").unwrap();
        let kinds: Vec<_> = cases.iter().map(|c| c.expected.clone()).collect();
        assert_eq!(kinds, vec![Expected::Input, Expected::Output, Expected::Empty]);
        assert_eq!(cases[2].program, "\n");
    }

    #[test]
    fn requires_marker() {
        assert_eq!(parse_suite("name 0 1 1 e\n"), Err(SuiteError::MissingMarker));
    }

    #[test]
    fn malformed_header() {
        let err = parse_suite("@name zero 1 1 e\n").unwrap_err();
        assert!(matches!(err, SuiteError::Header { case: 0, .. }));
        let err = parse_suite("@ok 0 1 1 e\n@short 1\n").unwrap_err();
        assert!(matches!(err, SuiteError::Header { case: 1, .. }));
    }

    #[test]
    fn trailing_marker_is_skipped() {
        let cases = parse_suite("@a 0 1 1 e\n5\n@\n").unwrap();
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn expected_matches_cells() {
        assert!(Expected::Empty.matches(&Cell::Empty));
        assert!(Expected::Empty.matches(&Cell::Border));
        assert!(!Expected::Empty.matches(&Cell::data(1_i64)));
        assert!(Expected::Number(3).matches(&Cell::data(3_i64)));
        assert!(!Expected::Number(3).matches(&Cell::data("3")));
        assert!(Expected::Text("3".into()).matches(&Cell::data("3")));
        assert!(Expected::Input.matches(&Cell::data(Value::Input)));
    }

    #[test]
    fn case_checks_after_production() {
        // The sum is written below the adder in tick 0 and has fallen one
        // cell by the production phase of tick 1.
        let suite = "@sum 0 2 3 n 5\n 2\n3A\n\n\n\
                     @fallen 1 2 4 n 5\n 2\n3A\n\n\n\
                     @wrong 0 2 3 n 6\n 2\n3A\n\n\n";
        let cases = parse_suite(suite).unwrap();
        let mut console = buffer_console("");
        let report = run_suite(&cases, &mut console, 0).unwrap();
        let passed: Vec<bool> = report.outcomes.iter().map(|o| o.passed).collect();
        assert_eq!(passed, vec![true, true, false]);
        assert_eq!(output_text(&console), "");
    }

    #[test]
    fn halted_program_fails_later_probe() {
        let cases = parse_suite("@halts 3 1 1 e\n5\nH\n").unwrap();
        assert!(!run_case(&cases[0], buffer_console(""), 0).unwrap());
    }

    #[test]
    fn halt_in_probe_tick_still_checks() {
        let cases = parse_suite("@halts 0 1 1 n 5\n5\nh\n").unwrap();
        assert!(run_case(&cases[0], buffer_console(""), 0).unwrap());
    }

    #[test]
    fn load_failure_names_case() {
        let cases = parse_suite("@bad 0 1 1 e\nQ\n").unwrap();
        let mut console = buffer_console("");
        let err = run_suite(&cases, &mut console, 0).unwrap_err();
        assert_eq!(
            err,
            SuiteError::Load {
                name: "bad".into(),
                source: LoadError::InvalidCharacter {
                    ch: 'Q',
                    at: Pos::new(1, 1)
                }
            }
        );
    }

    #[test]
    fn report_layout() {
        let report = SuiteReport {
            outcomes: vec![
                CaseOutcome {
                    name: "add".into(),
                    passed: true,
                },
                CaseOutcome {
                    name: "sub".into(),
                    passed: false,
                },
            ],
        };
        let expected = "*********  Tests  *********\n\n\
                        add:................. OK\n\
                        sub:                  Fail\n\
                        \n---------------------------\n\n\
                        OK:    1\n\
                        Fail:  1\n\
                        Total: 2\n";
        assert_eq!(report.to_string(), expected);
    }
}
