//! The checker's output: a type recorded per AST node it visits.
//!
//! Two arenas rather than one map keyed by a combined node id — the
//! typed-index generalization of a single conceptual "node identity" key,
//! kept separate because `luma-par` already hands out `ExprId`/`StmtId`
//! as distinct index spaces.

use luma_par::{Ast, ExprId, StmtId};
use luma_types::Type;
use luma_util::IndexVec;
use std::sync::Arc;

pub struct TypeMap {
    exprs: IndexVec<ExprId, Option<Arc<Type>>>,
    stmts: IndexVec<StmtId, Option<Arc<Type>>>,
}

impl TypeMap {
    /// Pre-sizes both arenas to the node counts of `ast` so insertion can
    /// target any id directly, independent of visitation order.
    pub fn for_ast(ast: &Ast) -> Self {
        let mut exprs = IndexVec::with_capacity(ast.exprs.len());
        for _ in 0..ast.exprs.len() {
            exprs.push(None);
        }
        let mut stmts = IndexVec::with_capacity(ast.stmts.len());
        for _ in 0..ast.stmts.len() {
            stmts.push(None);
        }
        TypeMap { exprs, stmts }
    }

    /// No node is ever re-typed (§5's monotonic type-map guarantee);
    /// re-insertion is a checker bug, caught here in debug builds.
    pub fn insert_expr(&mut self, id: ExprId, ty: Arc<Type>) {
        let slot = &mut self.exprs[id];
        debug_assert!(slot.is_none(), "expression {id:?} re-typed");
        *slot = Some(ty);
    }

    pub fn insert_stmt(&mut self, id: StmtId, ty: Arc<Type>) {
        let slot = &mut self.stmts[id];
        debug_assert!(slot.is_none(), "statement {id:?} re-typed");
        *slot = Some(ty);
    }

    pub fn expr_type(&self, id: ExprId) -> Option<&Arc<Type>> {
        self.exprs[id].as_ref()
    }

    pub fn stmt_type(&self, id: StmtId) -> Option<&Arc<Type>> {
        self.stmts[id].as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luma_par::Parser;

    #[test]
    fn insert_then_read_round_trips() {
        let mut parser = Parser::new("1");
        let ast = parser.parse_program();
        let mut map = TypeMap::for_ast(&ast);
        let id = ast.program[0];
        let expr_id = match ast.stmt(id) {
            luma_par::Stmt::ExpressionStatement(e) => *e,
            other => panic!("expected ExpressionStatement, got {other:?}"),
        };
        map.insert_expr(expr_id, Type::int());
        assert!(matches!(**map.expr_type(expr_id).unwrap(), Type::Int));
    }

    #[test]
    #[should_panic(expected = "re-typed")]
    fn reinserting_the_same_node_panics_in_debug() {
        let mut parser = Parser::new("1");
        let ast = parser.parse_program();
        let mut map = TypeMap::for_ast(&ast);
        let id = ast.program[0];
        let expr_id = match ast.stmt(id) {
            luma_par::Stmt::ExpressionStatement(e) => *e,
            other => panic!("expected ExpressionStatement, got {other:?}"),
        };
        map.insert_expr(expr_id, Type::int());
        map.insert_expr(expr_id, Type::int());
    }
}
