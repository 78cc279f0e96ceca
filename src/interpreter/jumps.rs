//! Statement lists and labeled jumps
//!
//! `sinkTo L` is resolved by the nearest enclosing statement list that contains
//! `label L`: execution resumes right after the label, which may lie before or
//! after the jump. Lists without the label pass the signal outward.

use super::engine::{ControlFlow, Interpreter};
use super::errors::RuntimeError;
use crate::parser::ast::Stmt;
use tracing::trace;

impl Interpreter {
    /// Execute `stmts` in the current scope.
    ///
    /// With `top_level` set, statements already handled by hoisting (mindLinks,
    /// declarations, entrance blocks) are skipped.
    pub(crate) fn execute_list(
        &mut self,
        stmts: &[Stmt],
        top_level: bool,
    ) -> Result<ControlFlow, RuntimeError> {
        let mut index = 0;
        while index < stmts.len() {
            let stmt = &stmts[index];
            index += 1;

            if top_level && Self::is_hoisted(stmt) {
                continue;
            }

            match self.execute_statement(stmt)? {
                ControlFlow::Normal => {}
                ControlFlow::Jump(label) => match Self::find_label(stmts, &label) {
                    Some(position) => {
                        trace!(label = %label, position, "sinkTo resolved");
                        index = position + 1;
                    }
                    None => return Ok(ControlFlow::Jump(label)),
                },
                flow => return Ok(flow),
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn find_label(stmts: &[Stmt], label: &str) -> Option<usize> {
        stmts
            .iter()
            .position(|stmt| matches!(stmt, Stmt::Label { name, .. } if name == label))
    }

    fn is_hoisted(stmt: &Stmt) -> bool {
        matches!(
            stmt,
            Stmt::MindLink { .. }
                | Stmt::FunctionDecl(_)
                | Stmt::SessionDecl(_)
                | Stmt::TranceifyDecl(_)
                | Stmt::Entrance { .. }
        )
    }
}
