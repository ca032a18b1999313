//! Trailing context after error lines.

use crate::classify::is_error;
use std::io::{self, Write};

/// What happens to a single line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emit {
    /// Not printed.
    Skip,
    /// An error line: printed after a `key:` header.
    Match,
    /// Printed as context for the most recent error line.
    Context,
}

/// Per-object counter of how many more lines to print after an error.
///
/// The window is idle until an error line arms it with `size` lines. Every
/// following non-error line uses one of them up. Another error line while
/// armed re-arms it from the start, so windows never stack: after the last
/// error of a run exactly `size` more lines are printed (fewer if the object
/// ends first).
///
/// A window of size 0 prints error lines only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextWindow {
    size: usize,
    remaining: usize,
}

impl ContextWindow {
    pub fn new(size: usize) -> Self {
        Self { size, remaining: 0 }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Context lines still owed to the last error line.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_armed(&self) -> bool {
        self.remaining > 0
    }

    /// Advance over one line and decide whether it gets printed.
    pub fn advance(&mut self, is_error: bool) -> Emit {
        if is_error {
            self.remaining = self.size;
            return Emit::Match;
        }
        match self.remaining {
            0 => Emit::Skip,
            _ => {
                self.remaining -= 1;
                Emit::Context
            },
        }
    }
}

/// Writes the lines a [`ContextWindow`] selects for one object.
///
/// Output is byte-exact: every error line is preceded by `key:<key>\n`
/// (once per error line, not once per object) and every printed line is
/// written as read, minus its line terminator, followed by `\n`.
pub struct Emitter<'k, W> {
    key: &'k str,
    window: ContextWindow,
    out: W,
    matches: u64,
    emitted: u64,
}

impl<'k, W: Write> Emitter<'k, W> {
    pub fn new(key: &'k str, context: usize, out: W) -> Self {
        Self {
            key,
            window: ContextWindow::new(context),
            out,
            matches: 0,
            emitted: 0,
        }
    }

    /// Classify one line (without its terminator) and print it if selected.
    pub fn line(&mut self, line: &[u8]) -> io::Result<Emit> {
        let emit = self.window.advance(is_error(line));
        match emit {
            Emit::Skip => return Ok(emit),
            Emit::Match => {
                writeln!(self.out, "key:{}", self.key)?;
                self.matches += 1;
            },
            Emit::Context => {},
        }
        self.out.write_all(line)?;
        self.out.write_all(b"\n")?;
        self.emitted += 1;
        Ok(emit)
    }

    /// Error lines seen so far.
    pub fn matches(&self) -> u64 {
        self.matches
    }

    /// Error and context lines printed so far (headers not included).
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
