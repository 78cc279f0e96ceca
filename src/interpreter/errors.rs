//! Runtime error types for the HypnoScript interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to parse errors or checker diagnostics),
//! and [`AssertionFailure`], the one failure that does not stop a run.
//!
//! All runtime errors are fatal: they abort the current `execute` call and are
//! returned to the caller.

use crate::parser::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Identifier not found in any enclosing scope
    #[error("Undefined variable '{name}' at line {}", .location.line)]
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },

    /// Call target that is neither a suggestion, a session nor an intrinsic
    #[error("Undefined function '{name}' at line {}", .location.line)]
    UndefinedFunction {
        name: String,
        location: SourceLocation,
    },

    /// Operand of the wrong runtime type
    #[error("Type error at line {}: expected {expected}, got {got}", .location.line)]
    TypeError {
        expected: String,
        got: String,
        location: SourceLocation,
    },

    /// Field or method not present on a record or session
    #[error("'{type_name}' has no member '{member}' (line {})", .location.line)]
    MissingMember {
        type_name: String,
        member: String,
        location: SourceLocation,
    },

    /// Concealed member accessed from outside its session
    #[error("Member '{member}' of session '{type_name}' is concealed (line {})", .location.line)]
    ConcealedMember {
        type_name: String,
        member: String,
        location: SourceLocation,
    },

    /// Attempted to call something that is not a suggestion
    #[error("'{name}' is not callable (line {})", .location.line)]
    NotCallable {
        name: String,
        location: SourceLocation,
    },

    /// Wrong number of arguments
    #[error(
        "'{function}' expects {expected} arguments, got {got} (line {})",
        .location.line
    )]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
        location: SourceLocation,
    },

    /// Division or modulo by zero
    #[error("Division by zero at line {}", .location.line)]
    DivisionByZero { location: SourceLocation },

    /// Name declared twice in the same scope
    #[error("'{name}' is already defined in this scope (line {})", .location.line)]
    Redefinition {
        name: String,
        location: SourceLocation,
    },

    /// Assignment to something that is not a variable, field or element
    #[error("Cannot assign to {target} (line {})", .location.line)]
    InvalidAssignment {
        target: String,
        location: SourceLocation,
    },

    /// Type names used where a value is required
    #[error("'{name}' is a type, not a value (line {})", .location.line)]
    NotAValue {
        name: String,
        location: SourceLocation,
    },

    /// `sinkTo` with no matching label in any enclosing statement list
    #[error("Label '{label}' not found (sinkTo at line {})", .location.line)]
    UnresolvedLabel {
        label: String,
        location: SourceLocation,
    },

    /// `snap` or `sink` with no enclosing loop
    #[error("'{keyword}' outside of a loop at line {}", .location.line)]
    JumpOutsideLoop {
        keyword: String,
        location: SourceLocation,
    },

    /// Record literal naming an unknown tranceify
    #[error("Unknown type '{name}' at line {}", .location.line)]
    UnknownType {
        name: String,
        location: SourceLocation,
    },

    /// `from external` with an exhausted input source
    #[error("No input available for '{name}' (line {})", .location.line)]
    InputUnavailable {
        name: String,
        location: SourceLocation,
    },

    /// External input that does not parse as the declared type
    #[error("Invalid input '{input}' for '{name}': expected {expected} (line {})", .location.line)]
    InvalidInput {
        name: String,
        input: String,
        expected: String,
        location: SourceLocation,
    },

    /// Linked file could not be read or parsed
    #[error("Cannot link '{path}': {message} (line {})", .location.line)]
    LinkFailure {
        path: String,
        message: String,
        location: SourceLocation,
    },

    /// Array or string index outside its bounds
    #[error("Index {index} out of bounds for length {len} at line {}", .location.line)]
    IndexOutOfBounds {
        index: i64,
        len: usize,
        location: SourceLocation,
    },

    /// Recursion deeper than the configured limit
    #[error("Maximum call depth of {limit} exceeded at line {}", .location.line)]
    CallDepthExceeded {
        limit: usize,
        location: SourceLocation,
    },

    /// Writing to the output sink failed
    #[error("Output error: {message}")]
    Output { message: String },
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::UndefinedVariable { location, .. }
            | RuntimeError::UndefinedFunction { location, .. }
            | RuntimeError::TypeError { location, .. }
            | RuntimeError::MissingMember { location, .. }
            | RuntimeError::ConcealedMember { location, .. }
            | RuntimeError::NotCallable { location, .. }
            | RuntimeError::ArgumentCountMismatch { location, .. }
            | RuntimeError::DivisionByZero { location }
            | RuntimeError::Redefinition { location, .. }
            | RuntimeError::InvalidAssignment { location, .. }
            | RuntimeError::NotAValue { location, .. }
            | RuntimeError::UnresolvedLabel { location, .. }
            | RuntimeError::JumpOutsideLoop { location, .. }
            | RuntimeError::UnknownType { location, .. }
            | RuntimeError::InputUnavailable { location, .. }
            | RuntimeError::InvalidInput { location, .. }
            | RuntimeError::LinkFailure { location, .. }
            | RuntimeError::IndexOutOfBounds { location, .. }
            | RuntimeError::CallDepthExceeded { location, .. } => Some(location),
            RuntimeError::Output { .. } => None,
        }
    }

    pub(crate) fn type_error(expected: &str, got: String, location: SourceLocation) -> Self {
        RuntimeError::TypeError {
            expected: expected.to_string(),
            got,
            location,
        }
    }
}

/// A failed `assert` statement. Recorded; execution continues.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionFailure {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Assertion failed at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}
