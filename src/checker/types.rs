//! Static types used by the checker

use std::fmt;

/// A HypnoScript static type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HypnoType {
    Number,
    Int,
    String,
    Boolean,
    Array,
    Void,
    /// Accepts and is accepted by everything (untyped parameters, undeclared returns)
    Any,
    /// Result of an expression that already produced a diagnostic
    Unknown,
    Session(String),
    Record(String),
}

impl HypnoType {
    /// Map a built-in type name; user type names are resolved by the checker
    pub fn builtin(name: &str) -> Option<HypnoType> {
        let ty = match name {
            "number" | "float" | "double" => HypnoType::Number,
            "int" => HypnoType::Int,
            "string" => HypnoType::String,
            "boolean" | "bool" => HypnoType::Boolean,
            "array" => HypnoType::Array,
            "void" => HypnoType::Void,
            "any" => HypnoType::Any,
            "unknown" => HypnoType::Unknown,
            _ => return None,
        };
        Some(ty)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, HypnoType::Number | HypnoType::Int | HypnoType::Any)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, HypnoType::Boolean | HypnoType::Any)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, HypnoType::Unknown)
    }

    /// Identical types, number/int, and anything involving `any` are compatible.
    /// `unknown` is compatible with everything so errors do not cascade.
    pub fn is_compatible_with(&self, other: &HypnoType) -> bool {
        match (self, other) {
            (HypnoType::Any, _) | (_, HypnoType::Any) => true,
            (HypnoType::Unknown, _) | (_, HypnoType::Unknown) => true,
            (HypnoType::Number, HypnoType::Int) | (HypnoType::Int, HypnoType::Number) => true,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for HypnoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HypnoType::Number => f.write_str("number"),
            HypnoType::Int => f.write_str("int"),
            HypnoType::String => f.write_str("string"),
            HypnoType::Boolean => f.write_str("boolean"),
            HypnoType::Array => f.write_str("array"),
            HypnoType::Void => f.write_str("void"),
            HypnoType::Any => f.write_str("any"),
            HypnoType::Unknown => f.write_str("unknown"),
            HypnoType::Session(name) | HypnoType::Record(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatibility_rules() {
        assert!(HypnoType::Number.is_compatible_with(&HypnoType::Int));
        assert!(HypnoType::Int.is_compatible_with(&HypnoType::Number));
        assert!(HypnoType::Any.is_compatible_with(&HypnoType::String));
        assert!(!HypnoType::Number.is_compatible_with(&HypnoType::String));
        assert!(!HypnoType::Session("A".into()).is_compatible_with(&HypnoType::Session("B".into())));
        assert!(HypnoType::Record("P".into()).is_compatible_with(&HypnoType::Record("P".into())));
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(HypnoType::builtin("number"), Some(HypnoType::Number));
        assert_eq!(HypnoType::builtin("Person"), None);
        assert_eq!(HypnoType::Session("Counter".into()).to_string(), "Counter");
    }
}
