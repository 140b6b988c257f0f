use crate::ast::Type;
use crate::symtab::{SymTable, Symbol};

#[test]
fn insert_and_find() {
    let mut table = SymTable::new();
    assert!(table.insert(Symbol::new("x", Type::Number)));
    assert_eq!(table.find("x"), Some(&Symbol::new("x", Type::Number)));
    assert_eq!(table.find("y"), None);
}

#[test]
fn duplicate_in_same_scope_is_rejected() {
    let mut table = SymTable::new();
    assert!(table.insert(Symbol::new("x", Type::Number)));
    assert!(!table.insert(Symbol::new("x", Type::String)));
    // First binding wins.
    assert_eq!(table.find("x").map(|s| s.kind), Some(Type::Number));
}

#[test]
fn find_searches_outward() {
    let mut table = SymTable::new();
    table.insert(Symbol::new("outer", Type::String));
    table.push_scope();
    assert_eq!(table.find("outer").map(|s| s.kind), Some(Type::String));
}

#[test]
fn inner_scope_may_shadow_outer() {
    let mut table = SymTable::new();
    table.insert(Symbol::new("x", Type::Number));
    table.push_scope();
    assert!(table.insert(Symbol::new("x", Type::Bool)));
    assert_eq!(table.find("x").map(|s| s.kind), Some(Type::Bool));
    table.pop_scope();
    assert_eq!(table.find("x").map(|s| s.kind), Some(Type::Number));
}

#[test]
fn pop_scope_drops_bindings() {
    let mut table = SymTable::new();
    table.push_scope();
    table.insert(Symbol::new("local", Type::Number));
    table.pop_scope();
    assert_eq!(table.find("local"), None);
}
