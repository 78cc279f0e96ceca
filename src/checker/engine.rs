//! Type checker coordinator
//!
//! This module owns the [`TypeChecker`] state and drives the two passes:
//!
//! 1. **Collection**: session and tranceify names, top-level suggestions,
//!    `mindLink` merges, then session member and tranceify field tables. All
//!    names are known before any statement is checked, so types may refer to
//!    each other in any order.
//! 2. **Checking**: entrance blocks first, then the remaining top-level
//!    statements in order (the order they execute in), then the bodies of
//!    top-level suggestions and session members.
//!
//! Statement and expression rules live in `statements` and `expressions` as
//! further `impl TypeChecker` blocks. The checker never stops at an error:
//! everything goes to the [`DiagnosticReporter`].

use super::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticReporter};
use super::types::HypnoType;
use crate::memory::symbols::{Symbol, SymbolKind, SymbolTable};
use crate::memory::value::Value;
use crate::parser::ast::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info_span};

/// What a session member is, as seen by the checker
#[derive(Debug, Clone)]
pub(crate) enum MemberKind {
    Field(HypnoType),
    Method(Rc<FunctionDecl>),
}

#[derive(Debug, Clone)]
pub(crate) struct MemberInfo {
    pub kind: MemberKind,
    pub exposed: bool,
    pub dominant: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SessionInfo {
    pub members: FxHashMap<String, MemberInfo>,
    pub constructor_params: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct RecordInfo {
    pub fields: Vec<(String, HypnoType)>,
}

impl RecordInfo {
    pub fn field(&self, name: &str) -> Option<&HypnoType> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

/// The suggestion whose body is being checked
#[derive(Debug, Clone)]
pub(crate) struct FunctionContext {
    pub name: String,
    pub return_type: HypnoType,
    pub imperative: bool,
}

/// Bodies whose checking waits until all top-level statements are seen
enum Deferred {
    Function(Rc<FunctionDecl>),
    Session(Rc<SessionDecl>),
    Record(Rc<TranceifyDecl>),
}

/// Static checker for HypnoScript programs
pub struct TypeChecker {
    pub(crate) symbols: SymbolTable,
    pub(crate) sessions: FxHashMap<String, SessionInfo>,
    pub(crate) records: FxHashMap<String, RecordInfo>,
    pub(crate) reporter: DiagnosticReporter,
    pub(crate) base_dir: PathBuf,
    /// Files already merged through `mindLink`, shared with nested checkers
    pub(crate) linked: Rc<RefCell<FxHashSet<PathBuf>>>,
    pub(crate) function: Option<FunctionContext>,
    pub(crate) loop_depth: usize,
    /// Labels of each enclosing statement list, innermost last
    pub(crate) labels: Vec<Vec<String>>,
    deferred: Vec<Deferred>,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            sessions: FxHashMap::default(),
            records: FxHashMap::default(),
            reporter: DiagnosticReporter::new(),
            base_dir: PathBuf::from("."),
            linked: Rc::new(RefCell::new(FxHashSet::default())),
            function: None,
            loop_depth: 0,
            labels: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Directory against which `mindLink` paths are resolved
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn reporter(&self) -> &DiagnosticReporter {
        &self.reporter
    }

    /// Check a whole program. Diagnostics accumulate in [`Self::reporter`].
    pub fn check(&mut self, program: &Program) {
        let _span = info_span!("check", statements = program.statements.len()).entered();

        self.collect_declarations(&program.statements);

        for stmt in &program.statements {
            if let Stmt::Entrance { body, .. } = stmt {
                self.check_scoped_block(body);
            }
        }

        // Top-level labels are visible to jumps anywhere at top level
        self.labels.push(Self::labels_of(&program.statements));
        for stmt in &program.statements {
            match stmt {
                Stmt::Entrance { .. } | Stmt::MindLink { .. } => {}
                Stmt::FunctionDecl(decl) => self.deferred.push(Deferred::Function(decl.clone())),
                Stmt::SessionDecl(decl) => self.deferred.push(Deferred::Session(decl.clone())),
                Stmt::TranceifyDecl(decl) => self.deferred.push(Deferred::Record(decl.clone())),
                _ => self.check_statement(stmt),
            }
        }
        self.labels.pop();

        for deferred in std::mem::take(&mut self.deferred) {
            match deferred {
                Deferred::Function(decl) => self.check_function_body(&decl, None),
                Deferred::Session(decl) => self.check_session_bodies(&decl),
                Deferred::Record(decl) => self.check_record_initializers(&decl),
            }
        }

        debug!(
            errors = self.reporter.errors().len(),
            warnings = self.reporter.warnings().len(),
            "check finished"
        );
    }

    pub(crate) fn error(&mut self, code: DiagnosticCode, message: impl Into<String>, location: SourceLocation) {
        self.reporter.report(Diagnostic::new(code, message, location));
    }

    // ===== Pass 1: collection =====

    fn collect_declarations(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            match stmt {
                Stmt::SessionDecl(decl) => self.declare_session_name(decl),
                Stmt::TranceifyDecl(decl) => self.declare_record_name(decl),
                _ => {}
            }
        }

        for stmt in statements {
            if let Stmt::FunctionDecl(decl) = stmt {
                self.declare_function(decl);
            }
        }

        for stmt in statements {
            if let Stmt::MindLink { path, location } = stmt {
                self.check_mind_link(path, *location);
            }
        }

        for stmt in statements {
            match stmt {
                Stmt::SessionDecl(decl) => self.collect_session_members(decl),
                Stmt::TranceifyDecl(decl) => self.collect_record_fields(decl),
                _ => {}
            }
        }
    }

    pub(crate) fn declare_session_name(&mut self, decl: &SessionDecl) {
        let symbol = Symbol::new(&decl.name, SymbolKind::Session).with_type(&decl.name);
        if self.symbols.define(symbol) {
            self.sessions.insert(decl.name.clone(), SessionInfo::default());
        } else {
            self.error(
                DiagnosticCode::Redeclaration,
                format!("Session '{}' is already declared", decl.name),
                decl.location,
            );
        }
    }

    pub(crate) fn declare_record_name(&mut self, decl: &TranceifyDecl) {
        let symbol = Symbol::new(&decl.name, SymbolKind::Record).with_type(&decl.name);
        if self.symbols.define(symbol) {
            self.records.insert(decl.name.clone(), RecordInfo::default());
        } else {
            self.error(
                DiagnosticCode::Redeclaration,
                format!("Tranceify '{}' is already declared", decl.name),
                decl.location,
            );
        }
    }

    pub(crate) fn declare_function(&mut self, decl: &Rc<FunctionDecl>) {
        let symbol = Symbol::new(&decl.name, SymbolKind::Function).with_value(Value::Function(decl.clone()));
        if !self.symbols.define(symbol) {
            self.error(
                DiagnosticCode::Redeclaration,
                format!("Suggestion '{}' is already declared", decl.name),
                decl.location,
            );
        }
    }

    pub(crate) fn collect_session_members(&mut self, decl: &SessionDecl) {
        let mut info = SessionInfo::default();

        for member in &decl.members {
            let name = member.name().to_string();
            if info.members.contains_key(&name) {
                self.error(
                    DiagnosticCode::DuplicateMember,
                    format!("Duplicate member '{}' in session '{}'", name, decl.name),
                    member.location(),
                );
                continue;
            }

            let kind = match &member.declaration {
                MemberDecl::Field(field) => MemberKind::Field(self.field_type(field)),
                MemberDecl::Method(method) => {
                    if method.name == CONSTRUCTOR_NAME {
                        info.constructor_params = method.params.len();
                    }
                    MemberKind::Method(method.clone())
                }
            };

            info.members.insert(
                name,
                MemberInfo {
                    kind,
                    exposed: member.exposed,
                    dominant: member.dominant,
                },
            );
        }

        self.sessions.insert(decl.name.clone(), info);
    }

    pub(crate) fn collect_record_fields(&mut self, decl: &TranceifyDecl) {
        let mut info = RecordInfo::default();

        for field in &decl.members {
            if info.field(&field.name).is_some() {
                self.error(
                    DiagnosticCode::DuplicateMember,
                    format!("Duplicate field '{}' in tranceify '{}'", field.name, decl.name),
                    field.location,
                );
                continue;
            }
            let ty = self.field_type(field);
            info.fields.push((field.name.clone(), ty));
        }

        self.records.insert(decl.name.clone(), info);
    }

    /// Declared type, else the type of a literal initializer, else `any`
    fn field_type(&mut self, field: &VarDecl) -> HypnoType {
        if let Some(type_name) = &field.type_name {
            return self.resolve_type_name(type_name, field.location);
        }
        match &field.initializer {
            Some(Expr::Number(..)) => HypnoType::Number,
            Some(Expr::String(..)) => HypnoType::String,
            Some(Expr::Boolean(..)) => HypnoType::Boolean,
            Some(Expr::ArrayLiteral(..)) => HypnoType::Array,
            Some(Expr::RecordLiteral { type_name, .. }) if self.records.contains_key(type_name) => {
                HypnoType::Record(type_name.clone())
            }
            _ => HypnoType::Any,
        }
    }

    // ===== Type names =====

    /// Resolve a written type name, reporting unknown names
    pub(crate) fn resolve_type_name(&mut self, name: &str, location: SourceLocation) -> HypnoType {
        match self.lookup_type_name(name) {
            Some(ty) => ty,
            None => {
                self.error(DiagnosticCode::UnknownType, format!("Unknown type '{}'", name), location);
                HypnoType::Unknown
            }
        }
    }

    /// Resolve a type name without reporting
    pub(crate) fn lookup_type_name(&self, name: &str) -> Option<HypnoType> {
        if let Some(ty) = HypnoType::builtin(name) {
            Some(ty)
        } else if self.sessions.contains_key(name) {
            Some(HypnoType::Session(name.to_string()))
        } else if self.records.contains_key(name) {
            Some(HypnoType::Record(name.to_string()))
        } else {
            None
        }
    }

    /// Declared return type of a suggestion: `void` if imperative, `any` if undeclared
    pub(crate) fn return_type_of(&self, decl: &FunctionDecl) -> HypnoType {
        if decl.imperative {
            return HypnoType::Void;
        }
        decl.return_type
            .as_deref()
            .map(|name| self.lookup_type_name(name).unwrap_or(HypnoType::Unknown))
            .unwrap_or(HypnoType::Any)
    }

    pub(crate) fn param_types_of(&self, decl: &FunctionDecl) -> Vec<HypnoType> {
        decl.params
            .iter()
            .map(|p| match &p.type_name {
                Some(name) => self.lookup_type_name(name).unwrap_or(HypnoType::Unknown),
                None => HypnoType::Any,
            })
            .collect()
    }

    // ===== Deferred bodies =====

    /// Check a suggestion body in a fresh call scope. `owner` binds `this`.
    pub(crate) fn check_function_body(&mut self, decl: &FunctionDecl, owner: Option<&str>) {
        for param in &decl.params {
            if let Some(type_name) = &param.type_name {
                self.resolve_type_name(type_name, decl.location);
            }
        }
        if let Some(type_name) = &decl.return_type {
            self.resolve_type_name(type_name, decl.location);
            if decl.imperative {
                self.error(
                    DiagnosticCode::InvalidReturn,
                    format!("Imperative suggestion '{}' cannot declare a return type", decl.name),
                    decl.location,
                );
            }
        }

        let context = FunctionContext {
            name: decl.name.clone(),
            return_type: self.return_type_of(decl),
            imperative: decl.imperative,
        };
        let saved_function = self.function.replace(context);
        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        let saved_labels = std::mem::take(&mut self.labels);

        self.symbols.enter_detached_scope();
        if let Some(session) = owner {
            self.symbols
                .define(Symbol::new(THIS_NAME, SymbolKind::Parameter).with_type(session));
        }
        let param_types = self.param_types_of(decl);
        for (param, ty) in decl.params.iter().zip(param_types) {
            let symbol = Symbol::new(&param.name, SymbolKind::Parameter).with_type(ty.to_string());
            if !self.symbols.define(symbol) {
                self.error(
                    DiagnosticCode::Redeclaration,
                    format!("Parameter '{}' is declared twice in '{}'", param.name, decl.name),
                    decl.location,
                );
            }
        }
        self.check_block(&decl.body);
        self.symbols.exit_scope();

        self.labels = saved_labels;
        self.loop_depth = saved_loops;
        self.function = saved_function;
    }

    pub(crate) fn check_session_bodies(&mut self, decl: &SessionDecl) {
        for member in &decl.members {
            match &member.declaration {
                MemberDecl::Field(field) => self.check_field_initializer(field, &decl.name),
                MemberDecl::Method(method) => self.check_function_body(method, Some(&decl.name)),
            }
        }
    }

    pub(crate) fn check_record_initializers(&mut self, decl: &TranceifyDecl) {
        for field in &decl.members {
            self.check_field_initializer(field, &decl.name);
        }
    }

    /// Field initializers run in a call scope at instantiation time
    fn check_field_initializer(&mut self, field: &VarDecl, owner: &str) {
        let Some(init) = &field.initializer else {
            return;
        };
        self.symbols.enter_detached_scope();
        let actual = self.infer(init);
        self.symbols.exit_scope();

        if let Some(type_name) = &field.type_name {
            let declared = self.lookup_type_name(type_name).unwrap_or(HypnoType::Unknown);
            if !declared.is_compatible_with(&actual) {
                self.error(
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "Type mismatch for field '{}.{}': declared {}, got {}",
                        owner, field.name, declared, actual
                    ),
                    field.location,
                );
            }
        }
    }

    /// Names of the labels placed directly in a statement list
    pub(crate) fn labels_of(statements: &[Stmt]) -> Vec<String> {
        statements
            .iter()
            .filter_map(|s| match s {
                Stmt::Label { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}
