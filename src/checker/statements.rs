//! Statement checking
//!
//! Declarations define symbols in the current scope (redeclaration is an
//! error, and the first definition wins). Control flow keeps track of loop
//! nesting for `snap`/`sink` and of the labels of every enclosing statement
//! list for `sinkTo`. Both are reset at suggestion boundaries.

use super::diagnostics::DiagnosticCode;
use super::engine::TypeChecker;
use super::types::HypnoType;
use crate::memory::symbols::{Symbol, SymbolKind};
use crate::parser::ast::*;

impl TypeChecker {
    /// Check a statement list whose scope is managed by the caller
    pub(crate) fn check_block(&mut self, statements: &[Stmt]) {
        self.labels.push(Self::labels_of(statements));
        for stmt in statements {
            self.check_statement(stmt);
        }
        self.labels.pop();
    }

    /// Check a statement list in its own block scope
    pub(crate) fn check_scoped_block(&mut self, statements: &[Stmt]) {
        self.symbols.enter_scope();
        self.check_block(statements);
        self.symbols.exit_scope();
    }

    pub(crate) fn check_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl(decl) => self.check_var_decl(decl),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_condition(condition, "if");
                self.check_scoped_block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_scoped_block(else_branch);
                }
            }

            Stmt::While { condition, body, .. } => {
                self.check_condition(condition, "while");
                self.loop_depth += 1;
                self.check_scoped_block(body);
                self.loop_depth -= 1;
            }

            Stmt::Loop {
                init,
                condition,
                iteration,
                body,
                ..
            } => {
                self.symbols.enter_scope();
                if let Some(init) = init {
                    self.check_statement(init);
                }
                if let Some(condition) = condition {
                    self.check_condition(condition, "loop");
                }
                if let Some(iteration) = iteration {
                    self.infer(iteration);
                }
                self.loop_depth += 1;
                self.check_scoped_block(body);
                self.loop_depth -= 1;
                self.symbols.exit_scope();
            }

            Stmt::FunctionDecl(decl) => {
                self.declare_function(decl);
                self.check_function_body(decl, None);
            }

            Stmt::SessionDecl(decl) => {
                self.declare_session_name(decl);
                self.collect_session_members(decl);
                self.check_session_bodies(decl);
            }

            Stmt::TranceifyDecl(decl) => {
                self.declare_record_name(decl);
                self.collect_record_fields(decl);
                self.check_record_initializers(decl);
            }

            Stmt::Observe { expr, .. } | Stmt::Expression { expr, .. } => {
                self.infer(expr);
            }

            Stmt::Return { expr, location } => self.check_return(expr.as_ref(), *location),

            Stmt::Break { location } => self.check_in_loop("snap", *location),
            Stmt::Continue { location } => self.check_in_loop("sink", *location),

            Stmt::Jump { label, location } => {
                if !self.labels.iter().any(|list| list.contains(label)) {
                    self.error(
                        DiagnosticCode::UnknownLabel,
                        format!("Label '{}' is not defined in an enclosing block", label),
                        *location,
                    );
                }
            }

            Stmt::Label { name, location } => {
                if !self.symbols.define(Symbol::new(name, SymbolKind::Label)) {
                    self.error(
                        DiagnosticCode::Redeclaration,
                        format!("Label '{}' is already declared in this scope", name),
                        *location,
                    );
                }
            }

            Stmt::Assert { condition, .. } => self.check_condition(condition, "assert"),

            // Only reachable through a hand-built AST; the parser keeps these top-level
            Stmt::Entrance { body, .. } => self.check_scoped_block(body),
            Stmt::MindLink { path, location } => self.check_mind_link(path, *location),
        }
    }

    fn check_var_decl(&mut self, decl: &VarDecl) {
        let declared = decl
            .type_name
            .as_deref()
            .map(|name| self.resolve_type_name(name, decl.location));

        let var_type = if decl.from_external {
            // External input is a string unless a type says how to parse it
            Some(declared.unwrap_or(HypnoType::String))
        } else {
            let actual = decl.initializer.as_ref().map(|init| self.infer(init));
            match (declared, actual) {
                (Some(declared), Some(actual)) => {
                    if !declared.is_compatible_with(&actual) {
                        self.error(
                            DiagnosticCode::TypeMismatch,
                            format!(
                                "Type mismatch for variable '{}': declared {}, got {}",
                                decl.name, declared, actual
                            ),
                            decl.location,
                        );
                    }
                    Some(declared)
                }
                (Some(declared), None) => Some(declared),
                (None, Some(actual)) => {
                    if matches!(actual, HypnoType::Unknown | HypnoType::Void) {
                        self.error(
                            DiagnosticCode::CannotInferType,
                            format!("Cannot infer type of variable '{}' from its initializer", decl.name),
                            decl.location,
                        );
                        Some(HypnoType::Unknown)
                    } else {
                        Some(actual)
                    }
                }
                // Typed by its first assignment
                (None, None) => None,
            }
        };

        let mut symbol = Symbol::new(&decl.name, SymbolKind::Variable);
        symbol.type_name = var_type.map(|t| t.to_string());
        if !self.symbols.define(symbol) {
            self.error(
                DiagnosticCode::Redeclaration,
                format!("Variable '{}' is already declared in this scope", decl.name),
                decl.location,
            );
        }
    }

    /// Conditions should be boolean; anything else only warns
    fn check_condition(&mut self, condition: &Expr, context: &str) {
        let ty = self.infer(condition);
        if !ty.is_boolean() && !ty.is_unknown() {
            self.error(
                DiagnosticCode::NonBooleanCondition,
                format!("{} condition should be boolean, got {}", context, ty),
                condition.location(),
            );
        }
    }

    fn check_return(&mut self, expr: Option<&Expr>, location: SourceLocation) {
        let actual = expr.map(|e| self.infer(e));

        let Some(context) = self.function.clone() else {
            // Top-level awaken ends the program
            return;
        };

        match actual {
            Some(_) if context.imperative => self.error(
                DiagnosticCode::InvalidReturn,
                format!("Imperative suggestion '{}' cannot awaken with a value", context.name),
                location,
            ),
            Some(actual) => {
                if context.return_type == HypnoType::Void {
                    self.error(
                        DiagnosticCode::InvalidReturn,
                        format!("Suggestion '{}' returns void but awakens with {}", context.name, actual),
                        location,
                    );
                } else if !context.return_type.is_compatible_with(&actual) {
                    self.error(
                        DiagnosticCode::TypeMismatch,
                        format!(
                            "Return type mismatch in '{}': expected {}, got {}",
                            context.name, context.return_type, actual
                        ),
                        location,
                    );
                }
            }
            None => {
                if !matches!(context.return_type, HypnoType::Void | HypnoType::Any | HypnoType::Unknown) {
                    self.error(
                        DiagnosticCode::InvalidReturn,
                        format!(
                            "Suggestion '{}' must awaken with a value of type {}",
                            context.name, context.return_type
                        ),
                        location,
                    );
                }
            }
        }
    }

    fn check_in_loop(&mut self, keyword: &str, location: SourceLocation) {
        if self.loop_depth == 0 {
            self.error(
                DiagnosticCode::JumpOutsideLoop,
                format!("'{}' used outside of a loop", keyword),
                location,
            );
        }
    }
}
