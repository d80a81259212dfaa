//! Parses Luma source into an [`Ast`] with a hand-written Pratt expression
//! parser over a recursive-descent statement grammar, plus a pretty-printer
//! used to make operator-precedence resolution independently testable.

pub mod ast;
mod parser;
pub mod pretty;

pub use ast::{Ast, BinaryOp, Expr, ExprId, Param, PrefixOp, Stmt, StmtId, StringQuoting};
pub use parser::Parser;
pub use pretty::{pretty_expr, pretty_program, pretty_stmt};
