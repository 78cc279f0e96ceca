//! Statement execution
//!
//! Each statement returns a [`ControlFlow`] describing how execution continues.
//! Blocks get a fresh scope that is dropped again even when the block fails.

use super::engine::{ControlFlow, Interpreter};
use super::errors::{AssertionFailure, RuntimeError};
use crate::memory::session::SessionInstance;
use crate::memory::symbols::{Symbol, SymbolKind};
use crate::memory::value::Value;
use crate::parser::ast::{MemberDecl, SessionDecl, SourceLocation, Stmt, VarDecl};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

impl Interpreter {
    /// Run a statement list in its own block scope
    pub(crate) fn execute_block(&mut self, stmts: &[Stmt]) -> Result<ControlFlow, RuntimeError> {
        self.symbols.enter_scope();
        let result = self.execute_list(stmts, false);
        self.symbols.exit_scope();
        result
    }

    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match stmt {
            Stmt::VarDecl(decl) => {
                self.execute_var_decl(decl)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block(else_branch)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }

            Stmt::While {
                condition, body, ..
            } => self.execute_while(condition, body),

            Stmt::Loop {
                init,
                condition,
                iteration,
                body,
                ..
            } => self.execute_loop(init.as_deref(), condition.as_ref(), iteration.as_ref(), body),

            Stmt::FunctionDecl(_) | Stmt::SessionDecl(_) | Stmt::TranceifyDecl(_) => {
                self.declare(stmt)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Observe { expr, .. } => {
                let value = self.evaluate(expr)?;
                self.write_line(&value.to_string())?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Return { expr, .. } => {
                let value = match expr {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Ok(ControlFlow::Return(value))
            }

            Stmt::Break { location } => {
                self.signal_location = *location;
                Ok(ControlFlow::Break)
            }

            Stmt::Continue { location } => {
                self.signal_location = *location;
                Ok(ControlFlow::Continue)
            }

            Stmt::Jump { label, location } => {
                self.signal_location = *location;
                Ok(ControlFlow::Jump(label.clone()))
            }

            // Labels are only markers for the enclosing list
            Stmt::Label { .. } => Ok(ControlFlow::Normal),

            Stmt::Assert {
                condition,
                message,
                location,
            } => {
                if !self.evaluate(condition)?.is_truthy() {
                    let failure = AssertionFailure {
                        message: message
                            .clone()
                            .unwrap_or_else(|| "Assertion failed".to_string()),
                        location: *location,
                    };
                    debug!(%failure, "assertion failed");
                    self.assertion_failures.push(failure);
                }
                Ok(ControlFlow::Normal)
            }

            Stmt::Entrance { body, .. } => self.execute_block(body),

            Stmt::MindLink { path, location } => {
                self.link_file(path, *location)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Expression { expr, .. } => {
                self.evaluate(expr)?;
                Ok(ControlFlow::Normal)
            }
        }
    }

    /// Define a variable in the current scope
    pub(crate) fn execute_var_decl(&mut self, decl: &VarDecl) -> Result<(), RuntimeError> {
        let value = if decl.from_external {
            self.read_external(decl)?
        } else if let Some(init) = &decl.initializer {
            self.evaluate(init)?
        } else {
            self.default_value(decl.type_name.as_deref(), decl.location)?
        };

        let mut symbol = Symbol::new(&decl.name, SymbolKind::Variable).with_value(value);
        symbol.type_name = decl.type_name.clone();
        self.define(symbol, decl.location)
    }

    /// Value of a declaration without initializer: an empty record for
    /// tranceify types, null otherwise
    pub(crate) fn default_value(
        &mut self,
        type_name: Option<&str>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match type_name {
            Some(name) if self.records.contains_key(name) => {
                self.build_record(name, &[], location)
            }
            _ => Ok(Value::Null),
        }
    }

    fn read_external(&mut self, decl: &VarDecl) -> Result<Value, RuntimeError> {
        let prompt = format!("{}: ", decl.name);
        let line = self
            .input
            .read_line(&prompt)
            .ok_or_else(|| RuntimeError::InputUnavailable {
                name: decl.name.clone(),
                location: decl.location,
            })?;

        let invalid = |expected: &str| RuntimeError::InvalidInput {
            name: decl.name.clone(),
            input: line.clone(),
            expected: expected.to_string(),
            location: decl.location,
        };

        match decl.type_name.as_deref() {
            Some("number" | "int" | "float" | "double") => line
                .trim()
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| invalid("number")),
            Some("boolean" | "bool") => match line.trim() {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(invalid("boolean")),
            },
            _ => Ok(Value::String(line.clone())),
        }
    }

    /// Bind a suggestion, session or tranceify declaration in the current scope
    pub(crate) fn declare(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::FunctionDecl(decl) => {
                let symbol = Symbol::new(&decl.name, SymbolKind::Function)
                    .with_value(Value::Function(Rc::clone(decl)));
                self.define(symbol, decl.location)
            }
            Stmt::SessionDecl(decl) => {
                let statics = self.build_static_instance(decl)?;
                let symbol = Symbol::new(&decl.name, SymbolKind::Session)
                    .with_type(&decl.name)
                    .with_value(Value::Session(Rc::clone(&statics)));
                self.define(symbol, decl.location)?;
                self.sessions.insert(decl.name.clone(), Rc::clone(decl));
                self.statics.insert(decl.name.clone(), statics);
                Ok(())
            }
            Stmt::TranceifyDecl(decl) => {
                let symbol = Symbol::new(&decl.name, SymbolKind::Record).with_type(&decl.name);
                self.define(symbol, decl.location)?;
                self.records.insert(decl.name.clone(), Rc::clone(decl));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// The instance behind `SessionName.member`, holding only dominant members
    fn build_static_instance(
        &mut self,
        decl: &SessionDecl,
    ) -> Result<Rc<RefCell<SessionInstance>>, RuntimeError> {
        let mut instance = SessionInstance::new(&decl.name);
        for member in decl.members.iter().filter(|m| m.dominant) {
            if !member.exposed {
                instance.concealed.insert(member.name().to_string());
            }
            match &member.declaration {
                MemberDecl::Field(field) => {
                    let value = match &field.initializer {
                        Some(init) => self.evaluate_detached(init)?,
                        None => Value::Null,
                    };
                    instance.fields.insert(field.name.clone(), value);
                }
                MemberDecl::Method(method) => {
                    instance
                        .methods
                        .insert(method.name.clone(), Rc::clone(method));
                }
            }
        }
        Ok(Rc::new(RefCell::new(instance)))
    }

    pub(crate) fn define(
        &mut self,
        symbol: Symbol,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let name = symbol.name.clone();
        if self.symbols.define(symbol) {
            Ok(())
        } else {
            Err(RuntimeError::Redefinition { name, location })
        }
    }
}
