//! The engine services handle threaded into every operator execution.
//!
//! Operators never reach global state. Console I/O, randomness, the tick
//! counter and the halt signal all go through a [`Services`] value that the
//! engine builds at the start of each tick.

use std::io::{BufRead, Write};

use crate::number::{self, Number};
use crate::rng::SimRng;

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// Blocking line-oriented console used by the I/O operators.
pub trait Console {
    /// Write text verbatim.
    fn write_text(&mut self, text: &str);

    /// Write a number in decimal.
    fn write_number(&mut self, n: Number) {
        self.write_text(&number::to_text(n));
    }

    /// The next whitespace-delimited token, or `""` at end of input.
    fn read_token(&mut self) -> String;

    /// Read lines until one starts with an integer and return it. Returns 0
    /// at end of input.
    fn read_number(&mut self) -> Number;
}

impl<C: Console + ?Sized> Console for &mut C {
    fn write_text(&mut self, text: &str) {
        (**self).write_text(text);
    }

    fn write_number(&mut self, n: Number) {
        (**self).write_number(n);
    }

    fn read_token(&mut self) -> String {
        (**self).read_token()
    }

    fn read_number(&mut self) -> Number {
        (**self).read_number()
    }
}

/// The integer a line starts with, after optional leading whitespace.
/// `" -12abc"` gives -12; `"abc"` and out-of-range values give `None`.
pub fn leading_number(line: &str) -> Option<Number> {
    let line = line.trim_start();
    let sign_len = usize::from(line.starts_with(['-', '+']));
    let digits = line[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    line[..sign_len + digits].parse().ok()
}

/// A [`Console`] over any buffered reader and writer.
///
/// Output is flushed after every write so prompts appear before the next
/// blocking read.
#[derive(Debug)]
pub struct StreamConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Discard input up to and including the next newline. Debuggers use
    /// this to wait for Enter.
    pub fn skip_line(&mut self) -> std::io::Result<()> {
        self.input.read_until(b'\n', &mut Vec::new()).map(|_| ())
    }
}

impl<R: BufRead, W: Write> Console for StreamConsole<R, W> {
    fn write_text(&mut self, text: &str) {
        let result = self
            .output
            .write_all(text.as_bytes())
            .and_then(|()| self.output.flush());
        if let Err(e) = result {
            log::warn!("console write failed: {e}");
        }
    }

    fn read_token(&mut self) -> String {
        let mut token = Vec::new();
        loop {
            let buf = match self.input.fill_buf() {
                Ok(buf) => buf,
                Err(e) => {
                    log::warn!("console read failed: {e}");
                    break;
                }
            };
            if buf.is_empty() {
                break;
            }
            let mut used = 0;
            let mut done = false;
            for &b in buf {
                if b.is_ascii_whitespace() {
                    if token.is_empty() {
                        used += 1;
                        continue;
                    }
                    done = true;
                    break;
                }
                token.push(b);
                used += 1;
            }
            self.input.consume(used);
            if done {
                break;
            }
        }
        String::from_utf8_lossy(&token).into_owned()
    }

    fn read_number(&mut self) -> Number {
        let mut line = String::new();
        loop {
            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) => return 0,
                Ok(_) => {
                    if let Some(n) = leading_number(&line) {
                        return n;
                    }
                }
                Err(e) => {
                    log::warn!("console read failed: {e}");
                    return 0;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// A halt raised by a halt operator during production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaltRequest {
    /// Print every data value before stopping.
    pub dump: bool,
}

/// Everything an operator may touch outside the grid. Lives for one tick.
pub struct Services<'a> {
    console: &'a mut dyn Console,
    rng: &'a mut SimRng,
    tick: u64,
    halt: Option<HaltRequest>,
}

impl<'a> Services<'a> {
    pub fn new(console: &'a mut dyn Console, rng: &'a mut SimRng, tick: u64) -> Self {
        Self {
            console,
            rng,
            tick,
            halt: None,
        }
    }

    pub fn write_text(&mut self, text: &str) {
        self.console.write_text(text);
    }

    pub fn write_number(&mut self, n: Number) {
        self.console.write_number(n);
    }

    pub fn read_token(&mut self) -> String {
        self.console.read_token()
    }

    pub fn read_number(&mut self) -> Number {
        self.console.read_number()
    }

    /// See [`SimRng::random`].
    pub fn random(&mut self, n: Number) -> Number {
        self.rng.random(n)
    }

    /// The current tick as a program value.
    pub fn tick(&self) -> Number {
        Number::try_from(self.tick).unwrap_or(Number::MAX)
    }

    /// Request a halt at the end of production. A later request replaces an
    /// earlier one within the same tick.
    pub fn halt(&mut self, dump: bool) {
        self.halt = Some(HaltRequest { dump });
    }

    pub fn halt_request(&self) -> Option<HaltRequest> {
        self.halt
    }
}
