//! Foundation types shared by every stage of the Luma compilation pipeline:
//! string interning, typed-index vectors, and an accumulating diagnostics
//! bag. Nothing here knows about tokens, syntax, or types — those live in
//! `luma-lex`, `luma-par`, and `luma-types`.

mod diagnostics;
mod index_vec;
mod symbol;

pub use diagnostics::{Diagnostic, Diagnostics, Level};
pub use index_vec::{Idx, IndexVec};
pub use symbol::{
    Symbol, ID_PRINT, KW_AND, KW_CLASS, KW_ELSE, KW_END, KW_FALSE, KW_FN, KW_IF, KW_LET, KW_NIL,
    KW_NOT, KW_OR, KW_RETURN, KW_THEN, KW_TRUE, TY_BOOL, TY_FLOAT, TY_INT, TY_STRING, TY_VOID,
};
