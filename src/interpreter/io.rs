//! Output and input seams of the interpreter
//!
//! `observe` writes through an [`OutputSink`]; `induce x from external` reads
//! through an [`InputSource`]. The defaults talk to the process's stdout and
//! stdin; [`MockTerminal`] and [`ScriptedInput`] stand in for them in tests
//! and embedders.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// Destination of observed values, one line per `observe`
pub trait OutputSink {
    fn write_line(&mut self, text: &str) -> io::Result<()>;
}

/// Source of external input, one line per declaration
pub trait InputSource {
    /// Read one line without its terminator; `None` once input is exhausted
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Writes to the process's standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", text)?;
        out.flush()
    }
}

/// Reads from the process's standard input, printing a prompt first
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl InputSource for StdinSource {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        {
            let mut out = io::stdout().lock();
            write!(out, "{}", prompt).ok()?;
            out.flush().ok()?;
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

/// Output sink that records every line.
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to the interpreter.
#[derive(Debug, Clone, Default)]
pub struct MockTerminal {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Output joined with newlines
    pub fn output(&self) -> String {
        self.lines.borrow().join("\n")
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl OutputSink for MockTerminal {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        // Multi-line values are split so each entry is one terminal line
        self.lines
            .borrow_mut()
            .extend(text.split('\n').map(str::to_string));
        Ok(())
    }
}

/// Input source fed from a fixed list of lines
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.lines.pop_front()
    }
}
