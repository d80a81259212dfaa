//! Walks a type-checked AST once, driving an [`Emitter`] to produce
//! instructions. The compiler owns AST traversal and type-map lookups; the
//! emitter owns offset arithmetic, slot assignment, and the constants pool.
//!
//! `Emitter::if_then_else`/`function`/`lambda` hand back control through
//! callbacks, and all three callbacks for one call site exist at once as
//! arguments before the emitter invokes any of them — so they can only
//! capture `&self`, never `&mut self`. Diagnostics are therefore collected
//! through a `RefCell`, the one piece of state every callback needs to
//! reach regardless of which branch runs.

use std::cell::RefCell;

use luma_par::{Ast, BinaryOp, Expr, ExprId, PrefixOp, Stmt, StmtId};
use luma_sem::TypeMap;
use luma_types::Type;
use luma_util::{Diagnostics, Symbol};

use crate::emitter::Emitter;

pub struct Compiler<'a> {
    ast: &'a Ast,
    types: &'a TypeMap,
    diagnostics: RefCell<Diagnostics>,
}

impl<'a> Compiler<'a> {
    /// The type map must come from a checker run over `ast` with no
    /// reported errors; a checker-rejected AST is a programming error here,
    /// not a runtime condition this type defends against.
    pub fn new(ast: &'a Ast, types: &'a TypeMap) -> Self {
        Compiler { ast, types, diagnostics: RefCell::new(Diagnostics::new()) }
    }

    pub fn compile<E: Emitter>(self, emitter: &mut E) -> Diagnostics {
        for &stmt in &self.ast.program {
            self.compile_stmt(stmt, emitter);
        }
        self.diagnostics.into_inner()
    }

    fn unsupported(&self, what: &str) {
        self.diagnostics
            .borrow_mut()
            .error(format!("unsupported node: {what} is not part of the compiled subset"));
    }

    fn compile_stmt<E: Emitter>(&self, id: StmtId, emitter: &mut E) {
        match self.ast.stmt(id) {
            Stmt::Let { name, value, .. } => {
                self.compile_expr(*value, emitter);
                emitter.store(*name);
            },
            Stmt::Assignment { name, value } => {
                self.compile_expr(*value, emitter);
                emitter.store(*name);
            },
            Stmt::ExpressionStatement(expr) => {
                self.compile_expr(*expr, emitter);
            },
            Stmt::Return(expr) => {
                self.compile_expr(*expr, emitter);
                emitter.return_value();
            },
            Stmt::If { cond, then_block, else_block } => {
                let (cond, then_block, else_block) = (*cond, *then_block, *else_block);
                emitter.if_then_else(
                    move |e| self.compile_expr(cond, e),
                    move |e| self.compile_stmt(then_block, e),
                    else_block.map(|b| move |e: &mut E| self.compile_stmt(b, e)),
                );
            },
            Stmt::Function { name, params, body, .. } => {
                let arg_names: Vec<Symbol> = params.iter().map(|(n, _)| *n).collect();
                let (name, body) = (*name, *body);
                emitter.function(name, &arg_names, move |e| self.compile_stmt(body, e));
            },
            Stmt::Class { .. } => {
                self.unsupported("class declarations");
            },
            Stmt::Block(stmts) => {
                for &s in stmts {
                    self.compile_stmt(s, emitter);
                }
            },
        }
    }

    fn compile_expr<E: Emitter>(&self, id: ExprId, emitter: &mut E) {
        match self.ast.expr(id) {
            Expr::Integer(lexeme) => {
                let n: i64 = lexeme.as_str().parse().unwrap_or(0);
                emitter.push_int(n);
            },
            Expr::Float(lexeme) => {
                let f: f64 = lexeme.as_str().parse().unwrap_or(0.0);
                emitter.push_float(f);
            },
            Expr::String(lexeme, _) => emitter.push_string(lexeme.as_str()),
            Expr::Boolean(b) => emitter.push_bool(*b),
            Expr::Identifier(name) => emitter.load(*name),
            Expr::Parenthesis(inner) => self.compile_expr(*inner, emitter),
            Expr::Prefix(PrefixOp::Not, operand) => {
                self.compile_expr(*operand, emitter);
                emitter.not_bool();
            },
            Expr::Prefix(PrefixOp::Neg, _) => {
                self.unsupported("unary '-'");
            },
            Expr::Binary(left, op, right) => self.compile_binary(*left, *op, *right, id, emitter),
            Expr::Call(callee, args) => {
                for &arg in args {
                    self.compile_expr(arg, emitter);
                }
                self.compile_expr(*callee, emitter);
                emitter.call(args.len());
            },
            Expr::Index(..) => self.unsupported("index expressions"),
            Expr::Field(..) => self.unsupported("field access"),
            Expr::Array(..) => self.unsupported("array literals"),
            Expr::Hash { .. } => self.unsupported("hash literals"),
            Expr::Lambda { params, body, .. } => {
                let arg_names: Vec<Symbol> = params.iter().map(|(n, _)| *n).collect();
                let body = *body;
                emitter.lambda(&arg_names, move |e| self.compile_stmt(body, e));
            },
        }
    }

    fn compile_binary<E: Emitter>(
        &self,
        left: ExprId,
        op: BinaryOp,
        right: ExprId,
        whole: ExprId,
        emitter: &mut E,
    ) {
        let left_ty = self.types.expr_type(left).cloned().unwrap_or_else(Type::unknown);
        let right_ty = self.types.expr_type(right).cloned().unwrap_or_else(Type::unknown);

        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Exp => {
                let result_ty = self.types.expr_type(whole).cloned().unwrap_or_else(Type::unknown);
                let wants_float = matches!(*result_ty, Type::Float);

                self.compile_expr(left, emitter);
                if wants_float && matches!(*left_ty, Type::Int) {
                    emitter.to_float();
                }
                self.compile_expr(right, emitter);
                if wants_float && matches!(*right_ty, Type::Int) {
                    emitter.to_float();
                }

                match (op, wants_float) {
                    (BinaryOp::Add, false) => emitter.add_int(),
                    (BinaryOp::Add, true) => emitter.add_float(),
                    (BinaryOp::Sub, false) => emitter.sub_int(),
                    (BinaryOp::Sub, true) => emitter.sub_float(),
                    (BinaryOp::Mul, false) => emitter.mul_int(),
                    (BinaryOp::Mul, true) => emitter.mul_float(),
                    (BinaryOp::Div | BinaryOp::Mod | BinaryOp::Exp, false) => emitter.div_int(),
                    (BinaryOp::Div | BinaryOp::Mod | BinaryOp::Exp, true) => emitter.div_float(),
                    _ => unreachable!(),
                }
            },
            BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
                let domain_is_string = matches!(*left_ty, Type::String);
                let domain_is_float =
                    !domain_is_string && (matches!(*left_ty, Type::Float) || matches!(*right_ty, Type::Float));

                self.compile_expr(left, emitter);
                if domain_is_float && matches!(*left_ty, Type::Int) {
                    emitter.to_float();
                }
                self.compile_expr(right, emitter);
                if domain_is_float && matches!(*right_ty, Type::Int) {
                    emitter.to_float();
                }

                match (op, domain_is_float) {
                    (BinaryOp::Lt, false) => emitter.lt_int(),
                    (BinaryOp::Lt, true) => emitter.lt_float(),
                    (BinaryOp::Lte, false) => emitter.lte_int(),
                    (BinaryOp::Lte, true) => emitter.lte_float(),
                    (BinaryOp::Gt, false) => emitter.gt_int(),
                    (BinaryOp::Gt, true) => emitter.gt_float(),
                    (BinaryOp::Gte, false) => emitter.gte_int(),
                    (BinaryOp::Gte, true) => emitter.gte_float(),
                    _ => unreachable!(),
                }
            },
            BinaryOp::Eq | BinaryOp::Neq => {
                self.compile_expr(left, emitter);
                self.compile_expr(right, emitter);
                if op == BinaryOp::Eq {
                    emitter.eq();
                } else {
                    emitter.neq();
                }
            },
            BinaryOp::And | BinaryOp::Or => {
                self.compile_expr(left, emitter);
                self.compile_expr(right, emitter);
                if op == BinaryOp::And {
                    emitter.and_bool();
                } else {
                    emitter.or_bool();
                }
            },
            BinaryOp::Concat => {
                self.compile_expr(left, emitter);
                self.compile_expr(right, emitter);
                emitter.add_string();
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Constant, Opcode};
    use crate::emitter::TapeEmitter;
    use luma_par::Parser;
    use luma_sem::Checker;

    fn compile(source: &str) -> (crate::bytecode::Bytecode, Diagnostics) {
        let mut parser = Parser::new(source);
        let ast = parser.parse_program();
        assert!(!parser.diagnostics().has_errors());
        let checker = Checker::new(&ast);
        let (types, sem_diagnostics) = checker.check_program();
        assert!(!sem_diagnostics.has_errors(), "{:?}", sem_diagnostics.iter().collect::<Vec<_>>());
        let mut emitter = TapeEmitter::new();
        let diagnostics = Compiler::new(&ast, &types).compile(&mut emitter);
        (emitter.bytecode(), diagnostics)
    }

    #[test]
    fn integer_addition() {
        let (code, diagnostics) = compile("1 + 2");
        assert!(!diagnostics.has_errors());
        assert_eq!(code.constants, vec![Constant::Int(1), Constant::Int(2)]);
        assert_eq!(
            code.tape,
            vec![
                crate::bytecode::Instruction { opcode: Opcode::Push, args: vec![0] },
                crate::bytecode::Instruction { opcode: Opcode::Push, args: vec![1] },
                crate::bytecode::Instruction { opcode: Opcode::AddInt, args: vec![] },
            ]
        );
    }

    #[test]
    fn widening_inserts_to_float_on_the_int_operand() {
        let (code, _) = compile("1 + 2.5");
        let opcodes: Vec<Opcode> = code.tape.iter().map(|i| i.opcode).collect();
        assert_eq!(opcodes, vec![Opcode::Push, Opcode::ToFloat, Opcode::Push, Opcode::AddFloat]);
    }

    #[test]
    fn mixed_comparison_widens_to_float() {
        let (code, _) = compile("1 < 2.0");
        let opcodes: Vec<Opcode> = code.tape.iter().map(|i| i.opcode).collect();
        assert_eq!(opcodes, vec![Opcode::Push, Opcode::ToFloat, Opcode::Push, Opcode::LtFloat]);
    }

    #[test]
    fn equality_never_widens() {
        let (code, _) = compile("1 == 2");
        let opcodes: Vec<Opcode> = code.tape.iter().map(|i| i.opcode).collect();
        assert_eq!(opcodes, vec![Opcode::Push, Opcode::Push, Opcode::Eq]);
    }

    #[test]
    fn if_else_produces_the_expected_jump_skeleton() {
        let (code, _) = compile("if 5 == 1 then 5 else 1 end");
        let opcodes: Vec<Opcode> = code.tape.iter().map(|i| i.opcode).collect();
        assert_eq!(
            opcodes,
            vec![Opcode::Push, Opcode::Push, Opcode::Eq, Opcode::JumpFalse, Opcode::Push, Opcode::Jump, Opcode::Push]
        );
        assert_eq!(code.tape[3].args[0], 6);
        assert_eq!(code.tape[5].args[0], 7);
    }

    #[test]
    fn index_expressions_are_reported_as_unsupported() {
        let (_, diagnostics) = compile("let xs = [1, 2] xs[0]");
        assert!(diagnostics.has_errors());
    }
}
