//! Expression type inference
//!
//! Every expression gets a [`HypnoType`]. When an operand is already `unknown`
//! (its problem was reported where it arose) the surrounding expression stays
//! quiet and propagates `unknown`.

use super::builtins::builtin_return_type;
use super::diagnostics::DiagnosticCode;
use super::engine::{MemberInfo, MemberKind, TypeChecker};
use super::types::HypnoType;
use crate::memory::symbols::SymbolKind;
use crate::memory::value::Value;
use crate::parser::ast::*;
use std::rc::Rc;

impl TypeChecker {
    /// Infer the type of an expression, reporting problems along the way
    pub(crate) fn infer(&mut self, expr: &Expr) -> HypnoType {
        match expr {
            Expr::Number(..) => HypnoType::Number,
            Expr::String(..) => HypnoType::String,
            Expr::Boolean(..) => HypnoType::Boolean,
            Expr::ArrayLiteral(elements, _) => {
                for element in elements {
                    self.infer(element);
                }
                HypnoType::Array
            }

            Expr::Identifier(name, location) => self.infer_identifier(name, *location),

            Expr::Binary {
                op,
                left,
                right,
                location,
            } => {
                let left_type = self.infer(left);
                let right_type = self.infer(right);
                self.infer_binary(*op, left_type, right_type, *location)
            }

            Expr::Unary { op, operand, location } => {
                let ty = self.infer(operand);
                self.infer_unary(*op, ty, *location)
            }

            Expr::Call { callee, args, location } => self.infer_call(callee, args, *location),

            Expr::FieldAccess {
                object,
                field,
                location,
            } => {
                let object_type = self.infer(object);
                match self.lookup_member(object, &object_type, field, *location) {
                    Some(MemberKind::Field(ty)) => ty,
                    Some(MemberKind::Method(_)) => HypnoType::Any,
                    None if object_type.is_unknown() => HypnoType::Unknown,
                    None if object_type == HypnoType::Any => HypnoType::Any,
                    None => HypnoType::Unknown,
                }
            }

            Expr::Index {
                object,
                index,
                location,
            } => {
                let object_type = self.infer(object);
                let index_type = self.infer(index);
                if !index_type.is_numeric() && !index_type.is_unknown() {
                    self.error(
                        DiagnosticCode::InvalidOperands,
                        format!("Index must be numeric, got {}", index_type),
                        *location,
                    );
                }
                match object_type {
                    HypnoType::Array | HypnoType::Any => HypnoType::Any,
                    HypnoType::String => HypnoType::String,
                    HypnoType::Unknown => HypnoType::Unknown,
                    other => {
                        self.error(
                            DiagnosticCode::InvalidOperands,
                            format!("Cannot index into a value of type {}", other),
                            *location,
                        );
                        HypnoType::Unknown
                    }
                }
            }

            Expr::Assign {
                target,
                value,
                location,
            } => self.infer_assignment(target, value, *location),

            Expr::RecordLiteral {
                type_name,
                fields,
                location,
            } => self.infer_record_literal(type_name, fields, *location),
        }
    }

    fn infer_identifier(&mut self, name: &str, location: SourceLocation) -> HypnoType {
        let Some((kind, type_name)) = self.symbols.resolve(name).map(|s| (s.kind, s.type_name.clone())) else {
            self.error(
                DiagnosticCode::UndefinedVariable,
                format!("Undefined variable '{}'", name),
                location,
            );
            return HypnoType::Unknown;
        };

        match kind {
            SymbolKind::Function | SymbolKind::Builtin | SymbolKind::Module => HypnoType::Any,
            SymbolKind::Label => {
                self.error(
                    DiagnosticCode::NotCallable,
                    format!("Label '{}' cannot be used as a value", name),
                    location,
                );
                HypnoType::Unknown
            }
            _ => match type_name {
                Some(type_name) => self.lookup_type_name(&type_name).unwrap_or(HypnoType::Unknown),
                None => {
                    self.error(
                        DiagnosticCode::CannotInferType,
                        format!("Type of '{}' is unknown; declare a type or initialize it", name),
                        location,
                    );
                    HypnoType::Unknown
                }
            },
        }
    }

    fn infer_binary(
        &mut self,
        op: BinaryOp,
        left: HypnoType,
        right: HypnoType,
        location: SourceLocation,
    ) -> HypnoType {
        use HypnoType as T;

        match op {
            BinaryOp::Eq | BinaryOp::Ne => T::Boolean,

            BinaryOp::Add if left == T::String || right == T::String => T::String,

            _ if left.is_unknown() || right.is_unknown() => {
                if op.is_arithmetic() {
                    T::Unknown
                } else {
                    T::Boolean
                }
            }

            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                if left.is_numeric() && right.is_numeric() {
                    match (&left, &right) {
                        (T::Int, T::Int) if op != BinaryOp::Div => T::Int,
                        (T::Any, T::Any) => T::Any,
                        _ => T::Number,
                    }
                } else {
                    self.error(
                        DiagnosticCode::InvalidOperands,
                        format!("Operator '{}' cannot be applied to {} and {}", op, left, right),
                        location,
                    );
                    T::Unknown
                }
            }

            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                if !(left.is_numeric() && right.is_numeric()) {
                    self.error(
                        DiagnosticCode::InvalidOperands,
                        format!("Comparison '{}' requires numeric operands, got {} and {}", op, left, right),
                        location,
                    );
                }
                T::Boolean
            }

            BinaryOp::And | BinaryOp::Or => {
                if !(left.is_boolean() && right.is_boolean()) {
                    self.error(
                        DiagnosticCode::InvalidOperands,
                        format!("Logical '{}' requires boolean operands, got {} and {}", op, left, right),
                        location,
                    );
                }
                T::Boolean
            }
        }
    }

    fn infer_unary(&mut self, op: UnaryOp, operand: HypnoType, location: SourceLocation) -> HypnoType {
        if operand.is_unknown() {
            return match op {
                UnaryOp::Not => HypnoType::Boolean,
                _ => HypnoType::Unknown,
            };
        }

        match op {
            UnaryOp::Not => {
                if !operand.is_boolean() {
                    self.error(
                        DiagnosticCode::InvalidOperands,
                        format!("Operator '!' requires a boolean operand, got {}", operand),
                        location,
                    );
                }
                HypnoType::Boolean
            }
            UnaryOp::Neg | UnaryOp::Plus => {
                if operand.is_numeric() {
                    operand
                } else {
                    self.error(
                        DiagnosticCode::InvalidOperands,
                        format!("Operator '{}' requires a numeric operand, got {}", op, operand),
                        location,
                    );
                    HypnoType::Unknown
                }
            }
        }
    }

    fn infer_call(&mut self, callee: &Expr, args: &[Expr], location: SourceLocation) -> HypnoType {
        let arg_types: Vec<HypnoType> = args.iter().map(|arg| self.infer(arg)).collect();

        match callee {
            Expr::Identifier(name, _) => self.infer_named_call(name, &arg_types, location),

            Expr::FieldAccess { object, field, .. } => {
                let object_type = self.infer(object);
                match self.lookup_member(object, &object_type, field, location) {
                    Some(MemberKind::Method(method)) => self.check_call_signature(&method, &arg_types, location),
                    Some(MemberKind::Field(ty)) if matches!(ty, HypnoType::Any | HypnoType::Unknown) => ty,
                    Some(MemberKind::Field(ty)) => {
                        self.error(
                            DiagnosticCode::NotCallable,
                            format!("Member '{}' of type {} is not callable", field, ty),
                            location,
                        );
                        HypnoType::Unknown
                    }
                    None if object_type == HypnoType::Any => HypnoType::Any,
                    None => HypnoType::Unknown,
                }
            }

            other => {
                let ty = self.infer(other);
                if !matches!(ty, HypnoType::Any | HypnoType::Unknown) {
                    self.error(
                        DiagnosticCode::NotCallable,
                        format!("Value of type {} is not callable", ty),
                        location,
                    );
                }
                HypnoType::Any
            }
        }
    }

    fn infer_named_call(&mut self, name: &str, arg_types: &[HypnoType], location: SourceLocation) -> HypnoType {
        let symbol = self.symbols.resolve(name).map(|s| (s.kind, s.value.clone(), s.type_name.clone()));

        match symbol {
            Some((SymbolKind::Function, Some(Value::Function(decl)), _)) => {
                self.check_call_signature(&decl, arg_types, location)
            }
            Some((SymbolKind::Session, _, _)) => {
                let expected = self.sessions.get(name).map(|s| s.constructor_params).unwrap_or(0);
                if expected != arg_types.len() {
                    self.error(
                        DiagnosticCode::ArgumentCount,
                        format!(
                            "Session '{}' constructor expects {} arguments, got {}",
                            name,
                            expected,
                            arg_types.len()
                        ),
                        location,
                    );
                }
                HypnoType::Session(name.to_string())
            }
            Some((SymbolKind::Record, _, _)) => {
                self.error(
                    DiagnosticCode::NotCallable,
                    format!("Tranceify '{}' is built with a record literal, not called", name),
                    location,
                );
                HypnoType::Record(name.to_string())
            }
            Some((_, _, type_name)) => {
                let ty = type_name
                    .and_then(|t| self.lookup_type_name(&t))
                    .unwrap_or(HypnoType::Unknown);
                if !matches!(ty, HypnoType::Any | HypnoType::Unknown) {
                    self.error(
                        DiagnosticCode::NotCallable,
                        format!("'{}' of type {} is not callable", name, ty),
                        location,
                    );
                }
                HypnoType::Any
            }
            None => match builtin_return_type(name) {
                Some(ty) => ty,
                None => {
                    self.error(
                        DiagnosticCode::UnknownFunction,
                        format!("Unknown function '{}'", name),
                        location,
                    );
                    HypnoType::Unknown
                }
            },
        }
    }

    /// Arity and argument types against a suggestion; yields its return type
    fn check_call_signature(&mut self, decl: &Rc<FunctionDecl>, arg_types: &[HypnoType], location: SourceLocation) -> HypnoType {
        if decl.params.len() != arg_types.len() {
            self.error(
                DiagnosticCode::ArgumentCount,
                format!(
                    "Suggestion '{}' expects {} arguments, got {}",
                    decl.name,
                    decl.params.len(),
                    arg_types.len()
                ),
                location,
            );
        } else {
            let param_types = self.param_types_of(decl);
            for (i, (expected, actual)) in param_types.iter().zip(arg_types).enumerate() {
                if !expected.is_compatible_with(actual) {
                    self.error(
                        DiagnosticCode::TypeMismatch,
                        format!(
                            "Argument {} of '{}' expects {}, got {}",
                            i + 1,
                            decl.name,
                            expected,
                            actual
                        ),
                        location,
                    );
                }
            }
        }
        self.return_type_of(decl)
    }

    /// Member lookup on a session or record type, with visibility rules.
    ///
    /// Session members reached through the session name itself must be
    /// `dominant`; concealed members are only reachable through `this`.
    fn lookup_member(
        &mut self,
        object: &Expr,
        object_type: &HypnoType,
        member: &str,
        location: SourceLocation,
    ) -> Option<MemberKind> {
        match object_type {
            HypnoType::Session(session) => {
                let info: Option<MemberInfo> = self
                    .sessions
                    .get(session)
                    .and_then(|s| s.members.get(member))
                    .cloned();
                let Some(info) = info else {
                    self.error(
                        DiagnosticCode::UnknownMember,
                        format!("Session '{}' has no member '{}'", session, member),
                        location,
                    );
                    return None;
                };

                let static_access = matches!(
                    object,
                    Expr::Identifier(name, _)
                        if self.symbols.resolve(name).map(|s| s.kind) == Some(SymbolKind::Session)
                );
                if static_access && !info.dominant {
                    self.error(
                        DiagnosticCode::UnknownMember,
                        format!("'{}' is not a dominant member of session '{}'", member, session),
                        location,
                    );
                    return None;
                }
                if !info.exposed && !object.is_this() {
                    self.error(
                        DiagnosticCode::ConcealedMember,
                        format!("Member '{}' of session '{}' is concealed", member, session),
                        location,
                    );
                }
                Some(info.kind)
            }
            HypnoType::Record(record) => {
                let field = self.records.get(record).and_then(|r| r.field(member)).cloned();
                match field {
                    Some(ty) => Some(MemberKind::Field(ty)),
                    None => {
                        self.error(
                            DiagnosticCode::UnknownMember,
                            format!("Tranceify '{}' has no field '{}'", record, member),
                            location,
                        );
                        None
                    }
                }
            }
            HypnoType::Any | HypnoType::Unknown => None,
            other => {
                self.error(
                    DiagnosticCode::UnknownMember,
                    format!("Type {} has no member '{}'", other, member),
                    location,
                );
                None
            }
        }
    }

    fn infer_assignment(&mut self, target: &Expr, value: &Expr, location: SourceLocation) -> HypnoType {
        let value_type = self.infer(value);

        match target {
            Expr::Identifier(name, name_loc) => {
                let Some((kind, type_name)) = self.symbols.resolve(name).map(|s| (s.kind, s.type_name.clone())) else {
                    self.error(
                        DiagnosticCode::UndefinedVariable,
                        format!("Undefined variable '{}'", name),
                        *name_loc,
                    );
                    return value_type;
                };
                if !matches!(kind, SymbolKind::Variable | SymbolKind::Parameter) {
                    self.error(
                        DiagnosticCode::InvalidAssignment,
                        format!("Cannot assign to '{}'", name),
                        location,
                    );
                    return value_type;
                }

                match type_name {
                    Some(type_name) => {
                        let target_type = self.lookup_type_name(&type_name).unwrap_or(HypnoType::Unknown);
                        if !target_type.is_compatible_with(&value_type) {
                            self.error(
                                DiagnosticCode::TypeMismatch,
                                format!("Cannot assign {} to '{}' of type {}", value_type, name, target_type),
                                location,
                            );
                        }
                    }
                    None => {
                        // First assignment types an untyped declaration
                        if let Some(symbol) = self.symbols.resolve_mut(name) {
                            symbol.type_name = Some(value_type.to_string());
                        }
                    }
                }
            }
            Expr::FieldAccess { .. } | Expr::Index { .. } => {
                let target_type = self.infer(target);
                if !target_type.is_compatible_with(&value_type) {
                    self.error(
                        DiagnosticCode::TypeMismatch,
                        format!("Cannot assign {} to a member of type {}", value_type, target_type),
                        location,
                    );
                }
            }
            _ => self.error(DiagnosticCode::InvalidAssignment, "Invalid assignment target", location),
        }

        value_type
    }

    fn infer_record_literal(&mut self, type_name: &str, fields: &[(String, Expr)], location: SourceLocation) -> HypnoType {
        let Some(record) = self.records.get(type_name).cloned() else {
            for (_, value) in fields {
                self.infer(value);
            }
            self.error(
                DiagnosticCode::UnknownType,
                format!("Unknown tranceify type '{}'", type_name),
                location,
            );
            return HypnoType::Unknown;
        };

        let mut seen: Vec<&str> = Vec::new();
        for (name, value) in fields {
            let actual = self.infer(value);
            if seen.contains(&name.as_str()) {
                self.error(
                    DiagnosticCode::DuplicateMember,
                    format!("Field '{}' is given twice", name),
                    value.location(),
                );
                continue;
            }
            seen.push(name);

            match record.field(name) {
                Some(expected) if !expected.is_compatible_with(&actual) => self.error(
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "Field '{}.{}' expects {}, got {}",
                        type_name, name, expected, actual
                    ),
                    value.location(),
                ),
                Some(_) => {}
                None => self.error(
                    DiagnosticCode::UnknownMember,
                    format!("Tranceify '{}' has no field '{}'", type_name, name),
                    value.location(),
                ),
            }
        }

        HypnoType::Record(type_name.to_string())
    }
}
