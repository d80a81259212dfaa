//! The Luma type system: a small algebraic datatype shared by the parser
//! (which attaches declared types to AST nodes) and the type checker
//! (which resolves and validates them).
//!
//! Atoms are process-wide singletons compared by pointer identity — two
//! `INT`s are always the same `Arc`, which is what lets the checker use
//! `Arc::ptr_eq` as the fast path for atom equality and makes "the type of
//! any two integer literals is the same object instance" true by
//! construction rather than by convention. Composite types (`Function`,
//! `Array`, `Hash`, `Class`) are compared structurally.

use luma_util::Symbol;
use std::sync::{Arc, LazyLock};

#[derive(Clone, Debug)]
pub enum Type {
    Int,
    Float,
    String,
    Bool,
    Void,
    /// Placeholder the parser emits for an omitted type annotation; the
    /// checker must replace every occurrence before returning.
    Auto,
    /// Sentinel for an already-reported local error; propagates silently
    /// to avoid cascades.
    Unknown,
    Function { params: Vec<Arc<Type>>, ret: Arc<Type> },
    Array { elem: Arc<Type> },
    Hash { key: Arc<Type>, value: Arc<Type> },
    Class { name: Symbol },
    /// Checker-internal: never written to the type map. Threaded through
    /// statement checking to say "this subtree returns", and whether it
    /// does so on every path.
    Return { inner: Arc<Type>, always_returns: bool },
}

macro_rules! atom {
    ($name:ident, $variant:ident) => {
        static $name: LazyLock<Arc<Type>> = LazyLock::new(|| Arc::new(Type::$variant));
    };
}

atom!(INT_ATOM, Int);
atom!(FLOAT_ATOM, Float);
atom!(STRING_ATOM, String);
atom!(BOOL_ATOM, Bool);
atom!(VOID_ATOM, Void);
atom!(AUTO_ATOM, Auto);
atom!(UNKNOWN_ATOM, Unknown);

impl Type {
    pub fn int() -> Arc<Type> {
        INT_ATOM.clone()
    }
    pub fn float() -> Arc<Type> {
        FLOAT_ATOM.clone()
    }
    pub fn string() -> Arc<Type> {
        STRING_ATOM.clone()
    }
    pub fn bool() -> Arc<Type> {
        BOOL_ATOM.clone()
    }
    pub fn void() -> Arc<Type> {
        VOID_ATOM.clone()
    }
    pub fn auto() -> Arc<Type> {
        AUTO_ATOM.clone()
    }
    pub fn unknown() -> Arc<Type> {
        UNKNOWN_ATOM.clone()
    }

    pub fn function(params: Vec<Arc<Type>>, ret: Arc<Type>) -> Arc<Type> {
        Arc::new(Type::Function { params, ret })
    }

    pub fn array(elem: Arc<Type>) -> Arc<Type> {
        Arc::new(Type::Array { elem })
    }

    pub fn hash(key: Arc<Type>, value: Arc<Type>) -> Arc<Type> {
        Arc::new(Type::Hash { key, value })
    }

    pub fn class(name: Symbol) -> Arc<Type> {
        Arc::new(Type::Class { name })
    }

    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            Type::Int | Type::Float | Type::String | Type::Bool | Type::Void
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }
}

/// Structural equality, with atoms short-circuited to pointer identity.
/// `AUTO` and `UNKNOWN` only ever compare equal to themselves, never to
/// anything a caller would mistake for a resolved type.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Int, Type::Int)
            | (Type::Float, Type::Float)
            | (Type::String, Type::String)
            | (Type::Bool, Type::Bool)
            | (Type::Void, Type::Void)
            | (Type::Auto, Type::Auto)
            | (Type::Unknown, Type::Unknown) => true,
            (
                Type::Function { params: p1, ret: r1 },
                Type::Function { params: p2, ret: r2 },
            ) => p1.len() == p2.len() && p1.iter().zip(p2).all(|(a, b)| a == b) && r1 == r2,
            (Type::Array { elem: e1 }, Type::Array { elem: e2 }) => e1 == e2,
            (Type::Hash { key: k1, value: v1 }, Type::Hash { key: k2, value: v2 }) => {
                k1 == k2 && v1 == v2
            },
            (Type::Class { name: n1 }, Type::Class { name: n2 }) => n1 == n2,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::Void => write!(f, "void"),
            Type::Auto => write!(f, "auto"),
            Type::Unknown => write!(f, "unknown"),
            Type::Function { params, ret } => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") {ret}")
            },
            Type::Array { elem } => write!(f, "[{elem}]"),
            Type::Hash { key, value } => write!(f, "[{key}] {value}"),
            Type::Class { name } => write!(f, "{name}"),
            Type::Return { inner, .. } => write!(f, "{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn atoms_are_singletons() {
        assert!(Arc::ptr_eq(&Type::int(), &Type::int()));
        assert!(Arc::ptr_eq(&Type::void(), &Type::void()));
    }

    #[test]
    fn distinct_atoms_are_not_the_same_instance() {
        assert!(!Arc::ptr_eq(&Type::int(), &Type::float()));
    }

    #[test]
    fn composite_types_compare_structurally() {
        let a = Type::array(Type::int());
        let b = Type::array(Type::int());
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }

    #[test]
    fn function_types_compare_param_and_return() {
        let f1 = Type::function(vec![Type::int(), Type::string()], Type::bool());
        let f2 = Type::function(vec![Type::int(), Type::string()], Type::bool());
        let f3 = Type::function(vec![Type::int()], Type::bool());
        assert_eq!(f1, f2);
        assert_ne!(f1, f3);
    }

    #[test]
    fn classes_compare_by_name() {
        let a = Type::class(Symbol::intern("Point"));
        let b = Type::class(Symbol::intern("Point"));
        let c = Type::class(Symbol::intern("Line"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
