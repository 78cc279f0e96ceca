//! Session instances
//!
//! A [`SessionInstance`] is the runtime object produced by instantiating a
//! `session` declaration. Instances live behind `Rc<RefCell<_>>` inside
//! [`Value::Session`](super::value::Value::Session), so a method call mutates
//! the very instance it was invoked on.

use super::value::Value;
use crate::parser::ast::FunctionDecl;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct SessionInstance {
    pub name: String,
    pub fields: FxHashMap<String, Value>,
    pub methods: FxHashMap<String, Rc<FunctionDecl>>,
    /// Members declared `conceal`; reachable only through `this`
    pub concealed: FxHashSet<String>,
}

impl SessionInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_concealed(&self, member: &str) -> bool {
        self.concealed.contains(member)
    }
}
