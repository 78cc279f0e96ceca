//! Diagnostics produced by the type checker
//!
//! Errors and warnings are kept in separate channels of a
//! [`DiagnosticReporter`]; callers inspect them after a check pass and clear
//! them before reusing the reporter.

use crate::parser::ast::SourceLocation;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("Error"),
            Severity::Warning => f.write_str("Warning"),
        }
    }
}

/// Stable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    UndefinedVariable,
    TypeMismatch,
    CannotInferType,
    Redeclaration,
    InvalidOperands,
    UnknownType,
    UnknownMember,
    ConcealedMember,
    ArgumentCount,
    DuplicateMember,
    InvalidReturn,
    UnknownLabel,
    JumpOutsideLoop,
    NotCallable,
    InvalidAssignment,
    LinkFailure,
    // Warnings
    UnknownFunction,
    LinkCollision,
    NonBooleanCondition,
}

impl DiagnosticCode {
    /// Short code such as `E001`
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticCode::UndefinedVariable => "E001",
            DiagnosticCode::TypeMismatch => "E002",
            DiagnosticCode::CannotInferType => "E003",
            DiagnosticCode::Redeclaration => "E004",
            DiagnosticCode::InvalidOperands => "E005",
            DiagnosticCode::UnknownType => "E006",
            DiagnosticCode::UnknownMember => "E007",
            DiagnosticCode::ConcealedMember => "E008",
            DiagnosticCode::ArgumentCount => "E009",
            DiagnosticCode::DuplicateMember => "E010",
            DiagnosticCode::InvalidReturn => "E011",
            DiagnosticCode::UnknownLabel => "E012",
            DiagnosticCode::JumpOutsideLoop => "E013",
            DiagnosticCode::NotCallable => "E014",
            DiagnosticCode::InvalidAssignment => "E015",
            DiagnosticCode::LinkFailure => "E016",
            DiagnosticCode::UnknownFunction => "W001",
            DiagnosticCode::LinkCollision => "W002",
            DiagnosticCode::NonBooleanCondition => "W003",
        }
    }

    /// Human description of the diagnostic category
    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticCode::UndefinedVariable => "undefined variable",
            DiagnosticCode::TypeMismatch => "type mismatch",
            DiagnosticCode::CannotInferType => "cannot infer type",
            DiagnosticCode::Redeclaration => "redeclaration",
            DiagnosticCode::InvalidOperands => "invalid operands",
            DiagnosticCode::UnknownType => "unknown type",
            DiagnosticCode::UnknownMember => "unknown member",
            DiagnosticCode::ConcealedMember => "concealed member",
            DiagnosticCode::ArgumentCount => "argument count mismatch",
            DiagnosticCode::DuplicateMember => "duplicate member",
            DiagnosticCode::InvalidReturn => "invalid awaken",
            DiagnosticCode::UnknownLabel => "unknown label",
            DiagnosticCode::JumpOutsideLoop => "jump outside loop",
            DiagnosticCode::NotCallable => "not callable",
            DiagnosticCode::InvalidAssignment => "invalid assignment",
            DiagnosticCode::LinkFailure => "mindLink failure",
            DiagnosticCode::UnknownFunction => "unknown function",
            DiagnosticCode::LinkCollision => "mindLink name collision",
            DiagnosticCode::NonBooleanCondition => "non-boolean condition",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticCode::UnknownFunction
            | DiagnosticCode::LinkCollision
            | DiagnosticCode::NonBooleanCondition => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single checker finding
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub code: DiagnosticCode,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            line: location.line,
            column: location.column,
            code,
        }
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}:{} - {}",
            self.code,
            self.severity(),
            self.line,
            self.column,
            self.message
        )
    }
}

/// Accumulates diagnostics across a check pass
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReporter {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a diagnostic to the error or warning channel by its code
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors followed by warnings
    pub fn all(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_routes_by_severity() {
        let mut reporter = DiagnosticReporter::new();
        let loc = SourceLocation::new(2, 4);
        reporter.report(Diagnostic::new(DiagnosticCode::UndefinedVariable, "Undefined variable 'x'", loc));
        reporter.report(Diagnostic::new(DiagnosticCode::UnknownFunction, "Unknown function 'Foo'", loc));

        assert_eq!(reporter.errors().len(), 1);
        assert_eq!(reporter.warnings().len(), 1);
        assert_eq!(
            reporter.errors()[0].to_string(),
            "[E001] Error at 2:4 - Undefined variable 'x'"
        );

        reporter.clear();
        assert!(!reporter.has_errors());
        assert_eq!(reporter.all().count(), 0);
    }

    #[test]
    fn test_code_descriptions() {
        assert_eq!(DiagnosticCode::UndefinedVariable.description(), "undefined variable");
        assert_eq!(DiagnosticCode::LinkCollision.code(), "W002");
        assert_eq!(DiagnosticCode::TypeMismatch.severity(), Severity::Error);
    }
}
