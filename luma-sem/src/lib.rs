//! Resolves names and checks types over a parsed [`luma_par::Ast`],
//! producing a [`TypeMap`] the compiler driver reads from directly.

mod checker;
mod scope;
mod typemap;

pub use checker::Checker;
pub use scope::ScopeTree;
pub use typemap::TypeMap;
