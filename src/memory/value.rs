//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime
//! values in the HypnoScript interpreter.
//!
//! # Value Types
//!
//! - [`Value::Number`]: every numeric value, `int` included, is an `f64`
//! - [`Value::String`] and [`Value::Boolean`]
//! - [`Value::Array`]: ordered list of values
//! - [`Value::Record`]: tranceify value with fields in declaration order
//! - [`Value::Session`]: shared, mutable session instance
//! - [`Value::Function`]: a suggestion used as a value
//! - [`Value::Null`]: result of calls that produce nothing
//!
//! # Sharing
//!
//! Records and arrays have value semantics: assigning one copies it. Sessions
//! are reference types, so two bindings of the same instance observe each
//! other's mutations and compare equal only by identity.

use super::session::SessionInstance;
use crate::parser::ast::FunctionDecl;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Array(Vec<Value>),
    Record(Record),
    Session(Rc<RefCell<SessionInstance>>),
    Function(Rc<FunctionDecl>),
    #[default]
    Null,
}

/// A tranceify value: ordered field name → value pairs
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub type_name: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(name, _)| name == field).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields.iter_mut().find(|(name, _)| name == field).map(|(_, v)| v)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Session(a), Value::Session(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl Value {
    /// Name of the value's runtime type, as used in error messages
    pub fn type_name(&self) -> String {
        match self {
            Value::Number(_) => "number".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Boolean(_) => "boolean".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Record(record) => record.type_name.clone(),
            Value::Session(instance) => instance.borrow().name.clone(),
            Value::Function(_) => "suggestion".to_string(),
            Value::Null => "null".to_string(),
        }
    }

    /// Numeric view used by arithmetic and comparisons
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Truthiness used by conditions, `!`, `&&` and `||`
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Null => false,
            Value::Array(_) | Value::Record(_) | Value::Session(_) | Value::Function(_) => true,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole numbers print without a fractional part: 5, not 5.0
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Record(record) => {
                write!(f, "{} {{ ", record.type_name)?;
                for (i, (name, value)) in record.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str(" }")
            }
            Value::Session(instance) => write!(f, "<session {}>", instance.borrow().name),
            Value::Function(decl) => write!(f, "<suggestion {}>", decl.name),
            Value::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Number(-3.0).to_string(), "-3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_record_display_keeps_field_order() {
        let record = Value::Record(Record {
            type_name: "Person".to_string(),
            fields: vec![
                ("name".to_string(), Value::from("Alice")),
                ("age".to_string(), Value::Number(30.0)),
            ],
        });
        assert_eq!(record.to_string(), "Person { name: Alice, age: 30 }");
    }

    #[test]
    fn test_sessions_compare_by_identity() {
        let a = Rc::new(RefCell::new(SessionInstance::new("S")));
        let b = Rc::new(RefCell::new(SessionInstance::new("S")));
        assert_eq!(Value::Session(a.clone()), Value::Session(a.clone()));
        assert_ne!(Value::Session(a), Value::Session(b));
    }

    #[test]
    fn test_truthiness_and_coercion() {
        assert!(!Value::Null.is_truthy());
        assert!(Value::Number(0.5).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert_eq!(Value::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(Value::Boolean(true).as_number(), Some(1.0));
        assert_eq!(Value::Array(vec![]).as_number(), None);
    }
}
