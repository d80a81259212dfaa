//! Lexical scope chain for the type checker.
//!
//! Grounded on `faxc-sem::scope::{RibId, Rib, ScopeTree}`: an arena of
//! frames linked by an `outer` pointer, resolved by walking outward. The
//! `RibKind` tag (`Module/Function/Block/Loop`) has no counterpart here —
//! Luma has no loop construct and no module layer to distinguish, so
//! every frame is the same shape.

use luma_types::Type;
use luma_util::{define_idx, Idx, IndexVec, Symbol};
use std::collections::HashMap;
use std::sync::Arc;

define_idx! {
    /// Identity of one lexical frame within a [`ScopeTree`].
    pub struct ScopeId;
}

#[derive(Debug)]
struct Scope {
    symbols: HashMap<Symbol, Arc<Type>>,
    outer: Option<ScopeId>,
}

/// A chain of lexical frames, rooted at a scope pre-populated with the
/// language's built-ins.
pub struct ScopeTree {
    scopes: IndexVec<ScopeId, Scope>,
    current: ScopeId,
}

impl ScopeTree {
    pub fn new() -> Self {
        let mut scopes = IndexVec::new();
        let root = scopes.push(Scope { symbols: HashMap::new(), outer: None });
        let mut tree = ScopeTree { scopes, current: root };
        tree.declare(
            Symbol::intern("print"),
            Type::function(vec![Type::string()], Type::void()),
        );
        tree
    }

    pub fn enter(&mut self) {
        let frame = self.scopes.push(Scope { symbols: HashMap::new(), outer: Some(self.current) });
        self.current = frame;
    }

    pub fn exit(&mut self) {
        if let Some(outer) = self.scopes[self.current].outer {
            self.current = outer;
        }
    }

    /// Binds `name` in the current frame. Returns `false` without
    /// inserting if `name` is already bound in this same frame — callers
    /// turn that into a "already declared" diagnostic.
    pub fn declare(&mut self, name: Symbol, ty: Arc<Type>) -> bool {
        let frame = &mut self.scopes[self.current];
        if frame.symbols.contains_key(&name) {
            false
        } else {
            frame.symbols.insert(name, ty);
            true
        }
    }

    pub fn lookup(&self, name: Symbol) -> Option<Arc<Type>> {
        let mut id = self.current;
        loop {
            let frame = &self.scopes[id];
            if let Some(ty) = frame.symbols.get(&name) {
                return Some(ty.clone());
            }
            id = frame.outer?;
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_is_preregistered_in_the_root_scope() {
        let tree = ScopeTree::new();
        let ty = tree.lookup(Symbol::intern("print")).expect("print should be declared");
        assert!(matches!(*ty, Type::Function { .. }));
    }

    #[test]
    fn inner_scope_sees_outer_bindings() {
        let mut tree = ScopeTree::new();
        tree.declare(Symbol::intern("x"), Type::int());
        tree.enter();
        assert!(tree.lookup(Symbol::intern("x")).is_some());
    }

    #[test]
    fn bindings_do_not_leak_upward() {
        let mut tree = ScopeTree::new();
        tree.enter();
        tree.declare(Symbol::intern("y"), Type::int());
        tree.exit();
        assert!(tree.lookup(Symbol::intern("y")).is_none());
    }

    #[test]
    fn redeclaring_in_the_same_frame_is_rejected() {
        let mut tree = ScopeTree::new();
        assert!(tree.declare(Symbol::intern("x"), Type::int()));
        assert!(!tree.declare(Symbol::intern("x"), Type::string()));
    }
}
