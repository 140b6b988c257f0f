//! Runtime variable frames: scope-stacked name-to-value bindings.

use std::collections::HashMap;

use crate::value::Value;

/// The variable frames of one thread of execution, innermost scope last.
///
/// Cloning produces the deep snapshot handed to `par` branches: writes
/// through the clone never reach the original.
#[derive(Clone, Debug)]
pub struct VarTable {
    scopes: Vec<HashMap<String, Value>>,
}

impl VarTable {
    /// A table with only the root frame.
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the root frame");
        self.scopes.pop();
    }

    /// Reads the nearest binding of `name`, searching outward.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Binds in the innermost scope (declaration form).
    pub fn declare(&mut self, name: &str, value: Value) {
        let scope = self.scopes.last_mut().expect("variable table has no scope");
        scope.insert(name.to_owned(), value);
    }

    /// Writes to the innermost enclosing scope already holding `name`, or
    /// binds in the innermost scope when the name is unbound anywhere.
    pub fn assign(&mut self, name: &str, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return;
            }
        }
        self.declare(name, value);
    }
}

impl Default for VarTable {
    fn default() -> Self {
        Self::new()
    }
}
