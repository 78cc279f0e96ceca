//! `mindLink` at run time
//!
//! The linked file is parsed and its top-level declarations are executed into
//! the global scope: variables, suggestions, sessions, tranceify types and
//! nested links. Its other statements and entrance blocks do not run. Names
//! that are already defined are skipped, as are files linked before.

use super::engine::Interpreter;
use super::errors::RuntimeError;
use crate::parser::ast::{Program, SourceLocation, Stmt};
use crate::parser::Parser;
use std::fs;
use std::mem;
use std::path::Path;
use tracing::debug;

impl Interpreter {
    pub(crate) fn link_file(&mut self, path: &str, location: SourceLocation) -> Result<(), RuntimeError> {
        let full_path = self.base_dir.join(path);
        let key = full_path.canonicalize().unwrap_or_else(|_| full_path.clone());
        if !self.linked.insert(key) {
            debug!(path, "mindLink already merged");
            return Ok(());
        }

        let failure = |message: String| RuntimeError::LinkFailure {
            path: path.to_string(),
            message,
            location,
        };
        let source = fs::read_to_string(&full_path).map_err(|e| failure(e.to_string()))?;
        let program = Parser::new(&source)
            .parse_program()
            .map_err(|e| failure(e.to_string()))?;

        let parent = full_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let saved_base = mem::replace(&mut self.base_dir, parent);
        let result = self.merge_linked(&program);
        self.base_dir = saved_base;
        result
    }

    fn merge_linked(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let mut merged = 0usize;
        for stmt in &program.statements {
            if let Some(name) = stmt.declared_name() {
                if self.symbols.is_defined_globally(name) {
                    debug!(name, "linked declaration skipped, name already defined");
                    continue;
                }
            }

            match stmt {
                Stmt::MindLink { path, location } => self.link_file(path, *location)?,
                Stmt::FunctionDecl(_) | Stmt::SessionDecl(_) | Stmt::TranceifyDecl(_) => {
                    self.declare(stmt)?;
                    merged += 1;
                }
                Stmt::VarDecl(decl) => {
                    self.execute_var_decl(decl)?;
                    merged += 1;
                }
                _ => {}
            }
        }
        debug!(merged, "mindLink merged");
        Ok(())
    }
}
