//! Core interpreter engine for HypnoScript
//!
//! This module contains the main [`Interpreter`] struct and the program driver.
//! The interpreter walks the AST directly; statement execution, expressions,
//! loops, jumps, sessions and linking live in sibling modules as further
//! `impl Interpreter` blocks.
//!
//! # Execution Order
//!
//! 1. Hoist top-level suggestion, session and tranceify declarations, in
//!    declaration order
//! 2. Merge `mindLink`ed files; linked names that collide with a hoisted
//!    declaration are skipped
//! 3. Run every `entrance` block, in declaration order
//! 4. Run the remaining top-level statements
//!
//! # Control Flow
//!
//! Every statement executor returns a [`ControlFlow`]. `Normal` continues with
//! the next statement; the other variants unwind until a loop, a statement
//! list holding the target label, or a call boundary consumes them.

use super::constants::MAX_CALL_DEPTH;
use super::errors::{AssertionFailure, RuntimeError};
use super::io::{InputSource, OutputSink, StdinSource, StdoutSink};
use crate::memory::session::SessionInstance;
use crate::memory::symbols::SymbolTable;
use crate::memory::value::Value;
use crate::parser::ast::{Program, SessionDecl, SourceLocation, Stmt, TranceifyDecl};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info_span};

/// Outcome of executing a statement
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Normal,
    Break,
    Continue,
    Jump(String),
    Return(Value),
}

pub struct Interpreter {
    pub(crate) symbols: SymbolTable,
    /// Session declarations by name
    pub(crate) sessions: FxHashMap<String, Rc<SessionDecl>>,
    /// Per-session static instances holding `dominant` members
    pub(crate) statics: FxHashMap<String, Rc<RefCell<SessionInstance>>>,
    pub(crate) records: FxHashMap<String, Rc<TranceifyDecl>>,
    pub(crate) output: Box<dyn OutputSink>,
    pub(crate) input: Box<dyn InputSource>,
    pub(crate) assertion_failures: Vec<AssertionFailure>,
    /// Canonical paths of files already merged by `mindLink`
    pub(crate) linked: FxHashSet<PathBuf>,
    pub(crate) base_dir: PathBuf,
    pub(crate) call_depth: usize,
    pub(crate) max_call_depth: usize,
    /// Location of the last `snap`, `sink` or `sinkTo` executed
    pub(crate) signal_location: SourceLocation,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter writing to stdout and reading external input from stdin
    pub fn new() -> Self {
        Interpreter {
            symbols: SymbolTable::new(),
            sessions: FxHashMap::default(),
            statics: FxHashMap::default(),
            records: FxHashMap::default(),
            output: Box::new(StdoutSink),
            input: Box::new(StdinSource),
            assertion_failures: Vec::new(),
            linked: FxHashSet::default(),
            base_dir: PathBuf::from("."),
            call_depth: 0,
            max_call_depth: MAX_CALL_DEPTH,
            signal_location: SourceLocation::new(1, 1),
        }
    }

    pub fn with_output(mut self, output: impl OutputSink + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn with_input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Directory against which `mindLink` paths are resolved
    pub fn with_base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Assertion failures recorded by the last `execute`
    pub fn assertion_failures(&self) -> &[AssertionFailure] {
        &self.assertion_failures
    }

    /// Current value of a global variable, mainly for embedders and tests
    pub fn global(&self, name: &str) -> Option<&Value> {
        if !self.symbols.is_defined_globally(name) {
            return None;
        }
        self.symbols.resolve(name).and_then(|symbol| symbol.value.as_ref())
    }

    /// Run a whole program
    pub fn execute(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let _span = info_span!("execute").entered();
        self.reset();

        for stmt in &program.statements {
            if let Stmt::FunctionDecl(_) | Stmt::SessionDecl(_) | Stmt::TranceifyDecl(_) = stmt {
                self.declare(stmt)?;
            }
        }
        // Linked names already declared here are skipped
        for stmt in &program.statements {
            if let Stmt::MindLink { path, location } = stmt {
                self.link_file(path, *location)?;
            }
        }

        for stmt in &program.statements {
            if let Stmt::Entrance { body, .. } = stmt {
                match self.execute_block(body)? {
                    ControlFlow::Return(_) => return self.finish(),
                    flow => self.reject_escape(flow)?,
                }
            }
        }

        let flow = self.execute_list(&program.statements, true)?;
        self.reject_escape(flow)?;
        self.finish()
    }

    fn finish(&mut self) -> Result<(), RuntimeError> {
        debug!(
            assertion_failures = self.assertion_failures.len(),
            "execution finished"
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.symbols.reset();
        self.sessions.clear();
        self.statics.clear();
        self.records.clear();
        self.assertion_failures.clear();
        self.linked.clear();
        self.call_depth = 0;
    }

    /// Fail on a loop or jump signal that left the region able to consume it.
    /// `Normal` and `Return` pass.
    pub(crate) fn reject_escape(&self, flow: ControlFlow) -> Result<(), RuntimeError> {
        let location = self.signal_location;
        match flow {
            ControlFlow::Normal | ControlFlow::Return(_) => Ok(()),
            ControlFlow::Break => Err(RuntimeError::JumpOutsideLoop {
                keyword: "snap".to_string(),
                location,
            }),
            ControlFlow::Continue => Err(RuntimeError::JumpOutsideLoop {
                keyword: "sink".to_string(),
                location,
            }),
            ControlFlow::Jump(label) => Err(RuntimeError::UnresolvedLabel { label, location }),
        }
    }

    pub(crate) fn write_line(&mut self, text: &str) -> Result<(), RuntimeError> {
        self.output
            .write_line(text)
            .map_err(|e| RuntimeError::Output {
                message: e.to_string(),
            })
    }
}
