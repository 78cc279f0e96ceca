//! Scoped symbol table
//!
//! This module provides the lexical environment shared by the type checker and
//! the interpreter (each owns its own instance):
//! - [`Symbol`]: a named entry with optional declared type and runtime value
//! - [`SymbolKind`]: what the name denotes
//! - [`SymbolTable`]: a stack of scopes linked to their lexical parents
//!
//! # Scope Layout
//!
//! Scopes live in an arena and are entered and exited in LIFO order. Each scope
//! records the *lexical* parent used for lookups separately from the scope that
//! was active when it was entered. Block scopes use the current scope as their
//! parent; call scopes ([`SymbolTable::enter_detached_scope`]) hang directly off
//! the global scope so a callee never sees its caller's locals.
//!
//! ```text
//! global ─┬─ block ── block          (lookup walks right to left)
//!         └─ call  ── block
//! ```

use super::value::Value;
use rustc_hash::FxHashMap;

/// What a symbol denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Session,
    Record,
    Parameter,
    Label,
    Builtin,
    Module,
}

/// A named entry in a scope
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub type_name: Option<String>,
    pub value: Option<Value>,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            value: None,
            kind,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Debug, Clone, Default)]
struct Scope {
    symbols: FxHashMap<String, Symbol>,
    /// Lexical parent used for lookups
    parent: Option<usize>,
    /// Scope that was current before this one was entered
    resume: usize,
}

/// Stack of lexical scopes rooted at a global scope
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table holding only the global scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            current: 0,
        }
    }

    /// Enter a block scope nested in the current one
    pub fn enter_scope(&mut self) {
        self.push_scope(Some(self.current));
    }

    /// Enter a call scope whose parent is the global scope
    pub fn enter_detached_scope(&mut self) {
        self.push_scope(Some(0));
    }

    fn push_scope(&mut self, parent: Option<usize>) {
        self.scopes.push(Scope {
            symbols: FxHashMap::default(),
            parent,
            resume: self.current,
        });
        self.current = self.scopes.len() - 1;
    }

    /// Leave the innermost scope. The global scope is never removed.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            if let Some(scope) = self.scopes.pop() {
                self.current = scope.resume;
            }
        }
    }

    /// Number of scopes above the global one
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn is_global(&self) -> bool {
        self.current == 0
    }

    /// Define a symbol in the current scope.
    ///
    /// Returns `false` and leaves the existing entry untouched when the name is
    /// already defined in this scope.
    pub fn define(&mut self, symbol: Symbol) -> bool {
        Self::define_in(&mut self.scopes[self.current], symbol)
    }

    /// Define a symbol in the global scope regardless of nesting
    pub fn define_global(&mut self, symbol: Symbol) -> bool {
        Self::define_in(&mut self.scopes[0], symbol)
    }

    fn define_in(scope: &mut Scope, symbol: Symbol) -> bool {
        if scope.symbols.contains_key(&symbol.name) {
            return false;
        }
        scope.symbols.insert(symbol.name.clone(), symbol);
        true
    }

    pub fn is_defined_locally(&self, name: &str) -> bool {
        self.scopes[self.current].symbols.contains_key(name)
    }

    pub fn is_defined_globally(&self, name: &str) -> bool {
        self.scopes[0].symbols.contains_key(name)
    }

    /// Look a name up through the current scope chain
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        let index = self.find_scope(name)?;
        self.scopes[index].symbols.get(name)
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let index = self.find_scope(name)?;
        self.scopes[index].symbols.get_mut(name)
    }

    fn find_scope(&self, name: &str) -> Option<usize> {
        let mut index = Some(self.current);
        while let Some(i) = index {
            let scope = &self.scopes[i];
            if scope.symbols.contains_key(name) {
                return Some(i);
            }
            index = scope.parent;
        }
        None
    }

    /// Overwrite the value of a visible symbol. Returns `false` if unresolved.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.resolve_mut(name) {
            Some(symbol) => {
                symbol.value = Some(value);
                true
            }
            None => false,
        }
    }

    /// All symbols of the global scope, in no particular order
    pub fn global_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.scopes[0].symbols.values()
    }

    /// Drop everything and start over with an empty global scope
    pub fn reset(&mut self) {
        self.scopes.truncate(1);
        self.scopes[0].symbols.clear();
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, n: f64) -> Symbol {
        Symbol::new(name, SymbolKind::Variable).with_value(Value::Number(n))
    }

    #[test]
    fn test_redefinition_does_not_overwrite() {
        let mut table = SymbolTable::new();
        assert!(table.define(var("x", 1.0)));
        assert!(!table.define(var("x", 2.0)));
        assert_eq!(table.resolve("x").unwrap().value, Some(Value::Number(1.0)));
    }

    #[test]
    fn test_lookup_walks_outward_and_shadowing() {
        let mut table = SymbolTable::new();
        table.define(var("x", 1.0));
        table.enter_scope();
        assert!(table.resolve("x").is_some());
        assert!(!table.is_defined_locally("x"));
        assert!(table.define(var("x", 2.0)));
        assert_eq!(table.resolve("x").unwrap().value, Some(Value::Number(2.0)));
        table.exit_scope();
        assert_eq!(table.resolve("x").unwrap().value, Some(Value::Number(1.0)));
    }

    #[test]
    fn test_detached_scope_hides_caller_locals() {
        let mut table = SymbolTable::new();
        table.define(var("global", 0.0));
        table.enter_scope();
        table.define(var("local", 1.0));
        table.enter_detached_scope();
        assert!(table.resolve("global").is_some());
        assert!(table.resolve("local").is_none());
        table.exit_scope();
        assert!(table.resolve("local").is_some());
        table.exit_scope();
        assert_eq!(table.depth(), 0);
    }

    #[test]
    fn test_global_scope_survives_extra_exit() {
        let mut table = SymbolTable::new();
        table.define(var("x", 1.0));
        table.exit_scope();
        assert!(table.is_global());
        assert!(table.resolve("x").is_some());
    }

    #[test]
    fn test_assign_targets_defining_scope() {
        let mut table = SymbolTable::new();
        table.define(var("x", 1.0));
        table.enter_scope();
        assert!(table.assign("x", Value::Number(5.0)));
        assert!(!table.assign("missing", Value::Null));
        table.exit_scope();
        assert_eq!(table.resolve("x").unwrap().value, Some(Value::Number(5.0)));
    }
}
