//! `mindLink` handling for the checker
//!
//! A linked file is parsed and checked by a nested [`TypeChecker`] that shares
//! the set of already-linked files, so a file is merged at most once and
//! inclusion cycles terminate. The nested checker's diagnostics are merged
//! with the file name prepended; its global declarations are merged when the
//! name is still free, and collisions only warn.

use super::diagnostics::{Diagnostic, DiagnosticCode};
use super::engine::TypeChecker;
use crate::memory::symbols::SymbolKind;
use crate::parser::ast::SourceLocation;
use crate::parser::Parser;
use std::fs;
use std::path::Path;
use tracing::debug;

impl TypeChecker {
    pub(crate) fn check_mind_link(&mut self, path: &str, location: SourceLocation) {
        let full_path = self.base_dir.join(path);
        let key = full_path.canonicalize().unwrap_or_else(|_| full_path.clone());

        if !self.linked.borrow_mut().insert(key) {
            debug!(path, "mindLink already merged");
            return;
        }

        let source = match fs::read_to_string(&full_path) {
            Ok(source) => source,
            Err(e) => {
                self.error(
                    DiagnosticCode::LinkFailure,
                    format!("Cannot read linked file '{}': {}", path, e),
                    location,
                );
                return;
            }
        };

        let program = match Parser::new(&source).parse_program() {
            Ok(program) => program,
            Err(e) => {
                self.error(
                    DiagnosticCode::LinkFailure,
                    format!("Cannot parse linked file '{}': {}", path, e),
                    location,
                );
                return;
            }
        };

        let mut nested = TypeChecker::new().with_base_dir(full_path.parent().unwrap_or(Path::new(".")));
        nested.linked = self.linked.clone();
        nested.check(&program);

        for diagnostic in nested.reporter.all() {
            self.reporter.report(Diagnostic {
                message: format!("{}: {}", path, diagnostic.message),
                ..diagnostic.clone()
            });
        }

        let mut merged = 0usize;
        for symbol in nested.symbols.global_symbols() {
            if matches!(symbol.kind, SymbolKind::Label) {
                continue;
            }
            if self.symbols.define_global(symbol.clone()) {
                merged += 1;
                match symbol.kind {
                    SymbolKind::Session => {
                        if let Some(info) = nested.sessions.get(&symbol.name) {
                            self.sessions.insert(symbol.name.clone(), info.clone());
                        }
                    }
                    SymbolKind::Record => {
                        if let Some(info) = nested.records.get(&symbol.name) {
                            self.records.insert(symbol.name.clone(), info.clone());
                        }
                    }
                    _ => {}
                }
            } else {
                self.error(
                    DiagnosticCode::LinkCollision,
                    format!(
                        "'{}' from linked file '{}' collides with an existing declaration and is skipped",
                        symbol.name, path
                    ),
                    location,
                );
            }
        }

        debug!(path, merged, "mindLink merged");
    }
}
