//! Calls, session instantiation and method dispatch
//!
//! A call is resolved in this order:
//! 1. method on a session instance (`obj.method(..)`)
//! 2. user suggestion bound to the name
//! 3. session instantiation (`Name(..)`)
//! 4. intrinsics (`drift`, `Observe`)
//!
//! Every call runs in a scope hanging off the global scope, so callees never
//! see their caller's locals. Methods additionally get `this` bound to the
//! receiving instance.

use super::constants::{STACK_RED_ZONE, STACK_SEGMENT_SIZE};
use super::engine::{ControlFlow, Interpreter};
use super::errors::RuntimeError;
use crate::memory::session::SessionInstance;
use crate::memory::symbols::{Symbol, SymbolKind};
use crate::memory::value::Value;
use crate::parser::ast::{Expr, FunctionDecl, MemberDecl, SessionDecl, SourceLocation, CONSTRUCTOR_NAME, THIS_NAME};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

type Instance = Rc<RefCell<SessionInstance>>;

impl Interpreter {
    pub(crate) fn evaluate_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Expr::FieldAccess { object, field, .. } => {
                let target = self.evaluate(object)?;
                let method = self.member_value(&target, field, object.is_this(), location)?;
                let args = self.evaluate_args(args)?;
                match (method, target) {
                    (Value::Function(decl), Value::Session(instance)) => {
                        let receiver = self.receiver_for(&instance, &decl);
                        self.call_function(&decl, args, Some(receiver), location)
                    }
                    (Value::Function(decl), _) => self.call_function(&decl, args, None, location),
                    _ => Err(RuntimeError::NotCallable {
                        name: field.clone(),
                        location,
                    }),
                }
            }

            Expr::Identifier(name, _) => {
                let resolved = self
                    .symbols
                    .resolve(name)
                    .map(|symbol| (symbol.kind, symbol.value.clone()));
                match resolved {
                    Some((_, Some(Value::Function(decl)))) => {
                        let args = self.evaluate_args(args)?;
                        self.call_function(&decl, args, None, location)
                    }
                    Some((SymbolKind::Session, _)) => {
                        let args = self.evaluate_args(args)?;
                        self.instantiate_session(name, args, location)
                    }
                    Some(_) => Err(RuntimeError::NotCallable {
                        name: name.clone(),
                        location,
                    }),
                    None => {
                        let args = self.evaluate_args(args)?;
                        self.call_intrinsic(name, args, location)
                    }
                }
            }

            other => match self.evaluate(other)? {
                Value::Function(decl) => {
                    let args = self.evaluate_args(args)?;
                    self.call_function(&decl, args, None, location)
                }
                value => Err(RuntimeError::NotCallable {
                    name: value.type_name(),
                    location,
                }),
            },
        }
    }

    fn evaluate_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.evaluate(arg)).collect()
    }

    /// Dominant methods run against the static instance even when reached
    /// through an ordinary instance
    fn receiver_for(&self, instance: &Instance, method: &Rc<FunctionDecl>) -> Instance {
        if method.dominant {
            let name = instance.borrow().name.clone();
            if let Some(statics) = self.statics.get(&name) {
                return Rc::clone(statics);
            }
        }
        Rc::clone(instance)
    }

    /// Run a suggestion or method body with its arguments bound.
    ///
    /// The value of the first `awaken` is the call's value; imperative
    /// suggestions always yield null.
    pub(crate) fn call_function(
        &mut self,
        decl: &Rc<FunctionDecl>,
        args: Vec<Value>,
        receiver: Option<Instance>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if args.len() != decl.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: decl.name.clone(),
                expected: decl.params.len(),
                got: args.len(),
                location,
            });
        }
        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.max_call_depth,
                location,
            });
        }

        self.call_depth += 1;
        self.symbols.enter_detached_scope();
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
            self.run_body(decl, args, receiver)
        });
        self.symbols.exit_scope();
        self.call_depth -= 1;

        match result? {
            ControlFlow::Return(_) if decl.imperative => Ok(Value::Null),
            ControlFlow::Return(value) => Ok(value),
            flow => {
                self.reject_escape(flow)?;
                Ok(Value::Null)
            }
        }
    }

    fn run_body(
        &mut self,
        decl: &FunctionDecl,
        args: Vec<Value>,
        receiver: Option<Instance>,
    ) -> Result<ControlFlow, RuntimeError> {
        if let Some(instance) = receiver {
            self.symbols
                .define(Symbol::new(THIS_NAME, SymbolKind::Parameter).with_value(Value::Session(instance)));
        }
        for (param, arg) in decl.params.iter().zip(args) {
            let mut symbol = Symbol::new(&param.name, SymbolKind::Parameter).with_value(arg);
            symbol.type_name = param.type_name.clone();
            self.define(symbol, decl.location)?;
        }
        self.execute_list(&decl.body, false)
    }

    /// Create a fresh instance: non-dominant fields from their initializers,
    /// then the constructor, if any, with `this` bound
    pub(crate) fn instantiate_session(
        &mut self,
        name: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let decl = self
            .sessions
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location,
            })?;

        // Field initializers may instantiate sessions in turn
        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.max_call_depth,
                location,
            });
        }
        self.call_depth += 1;
        let built = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
            self.build_instance(&decl, location)
        });
        self.call_depth -= 1;

        let instance = Rc::new(RefCell::new(built?));
        debug!(session = name, "session instantiated");

        match decl.constructor() {
            Some(constructor) => {
                let constructor = Rc::clone(constructor);
                self.call_function(&constructor, args, Some(Rc::clone(&instance)), location)?;
            }
            None if !args.is_empty() => {
                return Err(RuntimeError::ArgumentCountMismatch {
                    function: name.to_string(),
                    expected: 0,
                    got: args.len(),
                    location,
                });
            }
            None => {}
        }

        Ok(Value::Session(instance))
    }

    fn build_instance(&mut self, decl: &SessionDecl, location: SourceLocation) -> Result<SessionInstance, RuntimeError> {
        let mut instance = SessionInstance::new(&decl.name);
        for member in decl.members.iter().filter(|m| !m.dominant) {
            if !member.exposed {
                instance.concealed.insert(member.name().to_string());
            }
            match &member.declaration {
                MemberDecl::Field(field) => {
                    let value = match &field.initializer {
                        Some(init) => self.evaluate_detached(init)?,
                        None => self.default_value(field.type_name.as_deref(), location)?,
                    };
                    instance.fields.insert(field.name.clone(), value);
                }
                MemberDecl::Method(method) if method.name == CONSTRUCTOR_NAME => {}
                MemberDecl::Method(method) => {
                    instance
                        .methods
                        .insert(method.name.clone(), Rc::clone(method));
                }
            }
        }

        Ok(instance)
    }
}
