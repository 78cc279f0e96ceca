//! Loop statement execution (`while`, `loop`).
//!
//! `snap` and `sink` are reported by the body as [`LoopBodyResult`] so the loop
//! driver can react without inspecting the raw [`ControlFlow`]. `awaken` and
//! an unresolved `sinkTo` inside a body end the loop immediately and the signal
//! propagates to the enclosing context.

use super::engine::{ControlFlow, Interpreter};
use super::errors::RuntimeError;
use crate::parser::ast::{Expr, Stmt};

/// How a loop body ended
pub(crate) enum LoopBodyResult {
    /// Ran to completion or hit `sink`: iterate again
    Continue,
    /// `snap`: leave the loop normally
    Break,
    /// Any other signal: unwind and hand it to the caller
    Exit(ControlFlow),
}

impl Interpreter {
    /// Execute one iteration of `body` in a fresh scope
    pub(crate) fn execute_loop_body(
        &mut self,
        body: &[Stmt],
    ) -> Result<LoopBodyResult, RuntimeError> {
        Ok(match self.execute_block(body)? {
            ControlFlow::Normal | ControlFlow::Continue => LoopBodyResult::Continue,
            ControlFlow::Break => LoopBodyResult::Break,
            flow => LoopBodyResult::Exit(flow),
        })
    }

    /// `while (condition) { body }`
    pub(crate) fn execute_while(
        &mut self,
        condition: &Expr,
        body: &[Stmt],
    ) -> Result<ControlFlow, RuntimeError> {
        while self.evaluate(condition)?.is_truthy() {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => break,
                LoopBodyResult::Exit(flow) => return Ok(flow),
            }
        }
        Ok(ControlFlow::Normal)
    }

    /// `loop (init; condition; iteration) { body }`
    ///
    /// The init statement gets its own scope around the whole loop; a missing
    /// condition loops until `snap`.
    pub(crate) fn execute_loop(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        iteration: Option<&Expr>,
        body: &[Stmt],
    ) -> Result<ControlFlow, RuntimeError> {
        self.symbols.enter_scope();
        let result = self.run_counted_loop(init, condition, iteration, body);
        self.symbols.exit_scope();
        result
    }

    fn run_counted_loop(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        iteration: Option<&Expr>,
        body: &[Stmt],
    ) -> Result<ControlFlow, RuntimeError> {
        if let Some(init) = init {
            let flow = self.execute_statement(init)?;
            if flow != ControlFlow::Normal {
                return Ok(flow);
            }
        }

        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition)?.is_truthy() {
                    break;
                }
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break => break,
                LoopBodyResult::Exit(flow) => return Ok(flow),
            }

            if let Some(iteration) = iteration {
                self.evaluate(iteration)?;
            }
        }
        Ok(ControlFlow::Normal)
    }
}
