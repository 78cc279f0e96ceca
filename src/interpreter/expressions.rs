//! Expression evaluation
//!
//! Arithmetic and ordering coerce both operands to numbers; `+` concatenates
//! when either side is a string. Equality is structural, except that sessions
//! and suggestions compare by identity. `&&` and `||` short-circuit on
//! truthiness and always yield a boolean.
//!
//! Assignment writes through places (`x`, `a.b`, `a[i]`, and any nesting of
//! them): records and arrays are values, so the containing variable is updated
//! in place; sessions are shared, so a field write lands in the instance.

use super::engine::Interpreter;
use super::errors::RuntimeError;
use crate::memory::symbols::SymbolKind;
use crate::memory::value::{Record, Value};
use crate::parser::ast::{BinaryOp, Expr, SourceLocation, UnaryOp};
use std::cmp::Ordering;

impl Interpreter {
    pub(crate) fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number(n, _) => Ok(Value::Number(*n)),
            Expr::String(s, _) => Ok(Value::String(s.clone())),
            Expr::Boolean(b, _) => Ok(Value::Boolean(*b)),
            Expr::Identifier(name, location) => self.lookup_value(name, *location),

            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
                ..
            } => {
                let result =
                    self.evaluate(left)?.is_truthy() && self.evaluate(right)?.is_truthy();
                Ok(Value::Boolean(result))
            }
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
                ..
            } => {
                let result =
                    self.evaluate(left)?.is_truthy() || self.evaluate(right)?.is_truthy();
                Ok(Value::Boolean(result))
            }
            Expr::Binary {
                op,
                left,
                right,
                location,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary_op(*op, left, right, *location)
            }

            Expr::Unary {
                op,
                operand,
                location,
            } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Boolean(!value.is_truthy())),
                    UnaryOp::Neg => Ok(Value::Number(-number(&value, *location)?)),
                    UnaryOp::Plus => Ok(Value::Number(number(&value, *location)?)),
                }
            }

            Expr::Call {
                callee,
                args,
                location,
            } => self.evaluate_call(callee, args, *location),

            Expr::FieldAccess {
                object,
                field,
                location,
            } => {
                let target = self.evaluate(object)?;
                self.member_value(&target, field, object.is_this(), *location)
            }

            Expr::Index {
                object,
                index,
                location,
            } => {
                let target = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                index_value(&target, &index, *location)
            }

            Expr::Assign {
                target,
                value,
                location,
            } => {
                let value = self.evaluate(value)?;
                self.assign_to(target, value.clone(), *location)?;
                Ok(value)
            }

            Expr::RecordLiteral {
                type_name,
                fields,
                location,
            } => self.build_record(type_name, fields, *location),

            Expr::ArrayLiteral(items, _) => {
                let values = items
                    .iter()
                    .map(|item| self.evaluate(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
        }
    }

    /// Evaluate in a scope that sees only globals, as field initializers do
    pub(crate) fn evaluate_detached(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.symbols.enter_detached_scope();
        let result = self.evaluate(expr);
        self.symbols.exit_scope();
        result
    }

    fn lookup_value(&self, name: &str, location: SourceLocation) -> Result<Value, RuntimeError> {
        let symbol = self
            .symbols
            .resolve(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
                location,
            })?;

        match (&symbol.value, symbol.kind) {
            (Some(value), _) => Ok(value.clone()),
            (None, SymbolKind::Record) => Err(RuntimeError::NotAValue {
                name: name.to_string(),
                location,
            }),
            (None, _) => Ok(Value::Null),
        }
    }

    /// Read `target.field`
    pub(crate) fn member_value(
        &self,
        target: &Value,
        field: &str,
        via_this: bool,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match target {
            Value::Record(record) => {
                record
                    .get(field)
                    .cloned()
                    .ok_or_else(|| RuntimeError::MissingMember {
                        type_name: record.type_name.clone(),
                        member: field.to_string(),
                        location,
                    })
            }
            Value::Session(instance) => {
                let instance = instance.borrow();
                if instance.is_concealed(field) && !via_this {
                    return Err(RuntimeError::ConcealedMember {
                        type_name: instance.name.clone(),
                        member: field.to_string(),
                        location,
                    });
                }
                if let Some(value) = instance.fields.get(field) {
                    return Ok(value.clone());
                }
                if let Some(method) = instance.methods.get(field) {
                    return Ok(Value::Function(method.clone()));
                }
                // Dominant members are reachable from every instance too
                let statics = self
                    .statics
                    .get(&instance.name)
                    .ok_or_else(|| missing(&instance.name, field, location))?
                    .borrow();
                if statics.is_concealed(field) && !via_this {
                    return Err(RuntimeError::ConcealedMember {
                        type_name: instance.name.clone(),
                        member: field.to_string(),
                        location,
                    });
                }
                if let Some(value) = statics.fields.get(field) {
                    return Ok(value.clone());
                }
                match statics.methods.get(field) {
                    Some(method) => Ok(Value::Function(method.clone())),
                    None => Err(missing(&instance.name, field, location)),
                }
            }
            other => Err(RuntimeError::type_error(
                "record or session",
                other.type_name(),
                location,
            )),
        }
    }

    /// Store `value` into the place described by `target`
    fn assign_to(
        &mut self,
        target: &Expr,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let mut value = Some(value);
        self.modify_place(target, location, &mut |slot| {
            if let Some(value) = value.take() {
                *slot = value;
            }
            Ok(())
        })
    }

    /// Apply `update` to the storage slot named by `place`.
    ///
    /// Nested places recurse outward to the owning variable or session, so
    /// `a.b[0].c = v` rewrites `a` in place.
    fn modify_place(
        &mut self,
        place: &Expr,
        location: SourceLocation,
        update: &mut dyn FnMut(&mut Value) -> Result<(), RuntimeError>,
    ) -> Result<(), RuntimeError> {
        match place {
            Expr::Identifier(name, ident_location) => {
                let symbol = self.symbols.resolve_mut(name).ok_or_else(|| {
                    RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        location: *ident_location,
                    }
                })?;
                if !matches!(symbol.kind, SymbolKind::Variable | SymbolKind::Parameter) {
                    return Err(RuntimeError::InvalidAssignment {
                        target: format!("'{}'", name),
                        location,
                    });
                }
                update(symbol.value.get_or_insert(Value::Null))
            }

            Expr::FieldAccess { object, field, .. } => {
                if let Value::Session(instance) = self.evaluate(object)? {
                    let via_this = object.is_this();
                    let mut instance = instance.borrow_mut();
                    if instance.is_concealed(field) && !via_this {
                        return Err(RuntimeError::ConcealedMember {
                            type_name: instance.name.clone(),
                            member: field.clone(),
                            location,
                        });
                    }
                    if let Some(slot) = instance.fields.get_mut(field) {
                        return update(slot);
                    }
                    let name = instance.name.clone();
                    drop(instance);
                    return self.modify_static_field(&name, field, via_this, location, update);
                }

                self.modify_place(object, location, &mut |slot| match slot {
                    Value::Record(record) => {
                        let type_name = record.type_name.clone();
                        match record.get_mut(field) {
                            Some(field_slot) => update(field_slot),
                            None => Err(missing(&type_name, field, location)),
                        }
                    }
                    other => Err(RuntimeError::type_error(
                        "record or session",
                        other.type_name(),
                        location,
                    )),
                })
            }

            Expr::Index { object, index, .. } => {
                let index = self.evaluate(index)?;
                self.modify_place(object, location, &mut |slot| match slot {
                    Value::Array(items) => {
                        let position = array_position(&index, items.len(), location)?;
                        update(&mut items[position])
                    }
                    other => Err(RuntimeError::type_error("array", other.type_name(), location)),
                })
            }

            other => Err(RuntimeError::InvalidAssignment {
                target: describe_target(other),
                location,
            }),
        }
    }

    fn modify_static_field(
        &mut self,
        session: &str,
        field: &str,
        via_this: bool,
        location: SourceLocation,
        update: &mut dyn FnMut(&mut Value) -> Result<(), RuntimeError>,
    ) -> Result<(), RuntimeError> {
        let statics = self
            .statics
            .get(session)
            .cloned()
            .ok_or_else(|| missing(session, field, location))?;
        let mut statics = statics.borrow_mut();
        if statics.is_concealed(field) && !via_this {
            return Err(RuntimeError::ConcealedMember {
                type_name: session.to_string(),
                member: field.to_string(),
                location,
            });
        }
        match statics.fields.get_mut(field) {
            Some(slot) => update(slot),
            None => Err(missing(session, field, location)),
        }
    }

    /// Build a tranceify value. Fields keep declaration order; omitted fields
    /// take their declared initializer, or null.
    pub(crate) fn build_record(
        &mut self,
        type_name: &str,
        given: &[(String, Expr)],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let decl = self
            .records
            .get(type_name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownType {
                name: type_name.to_string(),
                location,
            })?;

        if let Some((name, _)) = given
            .iter()
            .find(|(name, _)| !decl.members.iter().any(|member| &member.name == name))
        {
            return Err(missing(type_name, name, location));
        }

        let mut fields = Vec::with_capacity(decl.members.len());
        for member in &decl.members {
            let value = match given.iter().find(|(name, _)| name == &member.name) {
                Some((_, expr)) => self.evaluate(expr)?,
                None => match &member.initializer {
                    Some(init) => self.evaluate_detached(init)?,
                    None => Value::Null,
                },
            };
            fields.push((member.name.clone(), value));
        }

        Ok(Value::Record(Record {
            type_name: type_name.to_string(),
            fields,
        }))
    }
}

fn missing(type_name: &str, member: &str, location: SourceLocation) -> RuntimeError {
    RuntimeError::MissingMember {
        type_name: type_name.to_string(),
        member: member.to_string(),
        location,
    }
}

fn describe_target(expr: &Expr) -> String {
    match expr {
        Expr::Call { .. } => "a call result".to_string(),
        Expr::Number(..) | Expr::String(..) | Expr::Boolean(..) => "a literal".to_string(),
        _ => "this expression".to_string(),
    }
}

fn number(value: &Value, location: SourceLocation) -> Result<f64, RuntimeError> {
    value
        .as_number()
        .ok_or_else(|| RuntimeError::type_error("number", value.type_name(), location))
}

pub(crate) fn binary_op(
    op: BinaryOp,
    left: Value,
    right: Value,
    location: SourceLocation,
) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => match (&left, &right) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::String(format!("{}{}", left, right)))
            }
            _ => Ok(Value::Number(number(&left, location)? + number(&right, location)?)),
        },
        BinaryOp::Sub => Ok(Value::Number(number(&left, location)? - number(&right, location)?)),
        BinaryOp::Mul => Ok(Value::Number(number(&left, location)? * number(&right, location)?)),
        BinaryOp::Div | BinaryOp::Mod => {
            let l = number(&left, location)?;
            let r = number(&right, location)?;
            if r == 0.0 {
                return Err(RuntimeError::DivisionByZero { location });
            }
            Ok(Value::Number(if op == BinaryOp::Div { l / r } else { l % r }))
        }
        BinaryOp::Eq => Ok(Value::Boolean(values_equal(&left, &right))),
        BinaryOp::Ne => Ok(Value::Boolean(!values_equal(&left, &right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = number(&left, location)?
                .partial_cmp(&number(&right, location)?)
                // NaN compares false with everything
                .map(|ordering| match op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::Le => ordering != Ordering::Greater,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                })
                .unwrap_or(false);
            Ok(Value::Boolean(ordering))
        }
        BinaryOp::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
    }
}

/// Structural equality; sessions and suggestions by identity
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    left == right
}

fn index_value(target: &Value, index: &Value, location: SourceLocation) -> Result<Value, RuntimeError> {
    match target {
        Value::Array(items) => {
            let position = array_position(index, items.len(), location)?;
            Ok(items[position].clone())
        }
        Value::String(s) => {
            let len = s.chars().count();
            let position = array_position(index, len, location)?;
            Ok(s.chars()
                .nth(position)
                .map(|c| Value::String(c.to_string()))
                .unwrap_or_default())
        }
        other => Err(RuntimeError::type_error("array", other.type_name(), location)),
    }
}

fn array_position(index: &Value, len: usize, location: SourceLocation) -> Result<usize, RuntimeError> {
    let raw = number(index, location)?;
    if raw.fract() != 0.0 {
        return Err(RuntimeError::type_error("integer index", raw.to_string(), location));
    }
    let position = raw as i64;
    if position < 0 || position as usize >= len {
        return Err(RuntimeError::IndexOutOfBounds {
            index: position,
            len,
            location,
        });
    }
    Ok(position as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    #[test]
    fn test_add_concatenates_with_strings() {
        let v = binary_op(BinaryOp::Add, Value::from("n = "), Value::Number(5.0), loc()).unwrap();
        assert_eq!(v, Value::from("n = 5"));
        let v = binary_op(BinaryOp::Add, Value::Number(1.5), Value::from("x"), loc()).unwrap();
        assert_eq!(v, Value::from("1.5x"));
    }

    #[test]
    fn test_arithmetic_coerces_numeric_strings_and_booleans() {
        let v = binary_op(BinaryOp::Mul, Value::from(" 4 "), Value::Boolean(true), loc()).unwrap();
        assert_eq!(v, Value::Number(4.0));
        let err = binary_op(BinaryOp::Sub, Value::from("abc"), Value::Number(1.0), loc());
        assert!(matches!(err, Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn test_division_and_modulo_by_zero() {
        for op in [BinaryOp::Div, BinaryOp::Mod] {
            let err = binary_op(op, Value::Number(1.0), Value::Number(0.0), loc());
            assert!(matches!(err, Err(RuntimeError::DivisionByZero { .. })));
        }
    }

    #[test]
    fn test_comparisons() {
        let lt = binary_op(BinaryOp::Lt, Value::Number(1.0), Value::from("2"), loc()).unwrap();
        assert_eq!(lt, Value::Boolean(true));
        let ge = binary_op(BinaryOp::Ge, Value::Number(2.0), Value::Number(2.0), loc()).unwrap();
        assert_eq!(ge, Value::Boolean(true));
        let nan = binary_op(BinaryOp::Gt, Value::Number(f64::NAN), Value::Number(0.0), loc()).unwrap();
        assert_eq!(nan, Value::Boolean(false));
    }

    #[test]
    fn test_equality_is_structural_without_coercion() {
        assert!(values_equal(
            &Value::Array(vec![Value::Number(1.0)]),
            &Value::Array(vec![Value::Number(1.0)])
        ));
        assert!(!values_equal(&Value::Number(5.0), &Value::from("5")));
    }

    #[test]
    fn test_indexing_bounds() {
        let arr = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(index_value(&arr, &Value::Number(1.0), loc()).unwrap(), Value::Number(2.0));
        assert!(matches!(
            index_value(&arr, &Value::Number(2.0), loc()),
            Err(RuntimeError::IndexOutOfBounds { index: 2, len: 2, .. })
        ));
        assert_eq!(
            index_value(&Value::from("héllo"), &Value::Number(1.0), loc()).unwrap(),
            Value::from("é")
        );
    }
}
