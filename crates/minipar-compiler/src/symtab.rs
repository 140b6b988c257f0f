//! Compile-time symbol table: name bindings per lexical scope.

use indexmap::IndexMap;

use crate::ast::Type;

/// A name binding recorded at parse time.
///
/// `kind` is the declared type tag for variables, or one of the pseudo-kinds
/// (`FUNC`, `C_CHANNEL`, `S_CHANNEL`) for the other binding forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: Type,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: Type) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A stack of lexical scopes, innermost last.
///
/// `insert` targets the innermost scope and refuses duplicates there (no
/// shadowing within a single scope); `find` searches outward.
#[derive(Clone, Debug, Default)]
pub struct SymTable {
    scopes: Vec<IndexMap<String, Symbol>>,
}

impl SymTable {
    /// A table with only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![IndexMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    /// Inserts into the innermost scope. Returns `false` if the name is
    /// already bound there.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        let scope = self.scopes.last_mut().expect("symbol table has no scope");
        if scope.contains_key(&symbol.name) {
            return false;
        }
        scope.insert(symbol.name.clone(), symbol);
        true
    }

    /// Finds the nearest binding of `name`, searching outward.
    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }
}
