//! The bidirectional type checker: one depth-first pass that computes a
//! type for every node it visits and writes it into the [`TypeMap`].
//!
//! Grounded structurally on `faxc-sem::analysis::SemanticAnalyzer`'s
//! error-accumulation idiom (`type_error(msg) -> Unknown`, an `Option`-
//! free but continue-on-error traversal) rather than on `faxc-sem::infer`'s
//! unification engine: every expression's type is computed bottom-up and
//! compared against declared types directly, never solved via constraints.

use crate::scope::ScopeTree;
use crate::typemap::TypeMap;
use luma_par::{Ast, BinaryOp, Expr, ExprId, Param, PrefixOp, Stmt, StmtId};
use luma_types::Type;
use luma_util::{Diagnostics, Symbol};
use std::sync::Arc;

pub struct Checker<'a> {
    ast: &'a Ast,
    scopes: ScopeTree,
    types: TypeMap,
    diagnostics: Diagnostics,
}

impl<'a> Checker<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Checker {
            ast,
            scopes: ScopeTree::new(),
            types: TypeMap::for_ast(ast),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn check_program(mut self) -> (TypeMap, Diagnostics) {
        for &stmt in &self.ast.program {
            self.check_stmt(stmt);
        }
        (self.types, self.diagnostics)
    }

    fn check_expr(&mut self, id: ExprId) -> Arc<Type> {
        let ty = match self.ast.expr(id) {
            Expr::Integer(_) => Type::int(),
            Expr::Float(_) => Type::float(),
            Expr::String(_, _) => Type::string(),
            Expr::Boolean(_) => Type::bool(),
            Expr::Identifier(name) => self.scopes.lookup(*name).unwrap_or_else(|| {
                self.diagnostics.error(format!("not declared: {name}"));
                Type::unknown()
            }),
            Expr::Parenthesis(inner) => self.check_expr(*inner),
            Expr::Prefix(op, operand) => {
                let operand_ty = self.check_expr(*operand);
                self.check_prefix(*op, &operand_ty)
            },
            Expr::Binary(left, op, right) => {
                let left_ty = self.check_expr(*left);
                let right_ty = self.check_expr(*right);
                self.check_binary(*op, &left_ty, &right_ty)
            },
            Expr::Call(callee, args) => self.check_call(*callee, args.clone()),
            Expr::Index(callee, index) => self.check_index(*callee, *index),
            Expr::Field(object, _) => {
                // Classes carry no member type table in the present design
                // (method bodies are never checked either) — field access
                // parses and is visited here, but cannot resolve a type.
                self.check_expr(*object);
                self.diagnostics.error("field access cannot be resolved: no member type table");
                Type::unknown()
            },
            Expr::Lambda { params, return_type, body } => {
                self.check_function_like(None, &params.clone(), &return_type.clone(), *body)
            },
            Expr::Array(elements) => self.check_array(&elements.clone()),
            Expr::Hash { keys, values } => self.check_hash(&keys.clone(), &values.clone()),
        };
        self.types.insert_expr(id, ty.clone());
        ty
    }

    fn check_prefix(&mut self, op: PrefixOp, operand: &Arc<Type>) -> Arc<Type> {
        match op {
            PrefixOp::Neg => {
                if operand.is_numeric() {
                    operand.clone()
                } else {
                    self.diagnostics
                        .error(format!("unary '-' requires int or float, found {operand}"));
                    Type::unknown()
                }
            },
            PrefixOp::Not => {
                if matches!(**operand, Type::Bool) {
                    Type::bool()
                } else {
                    self.diagnostics.error(format!("unary 'not' requires bool, found {operand}"));
                    Type::unknown()
                }
            },
        }
    }

    fn check_binary(&mut self, op: BinaryOp, left: &Arc<Type>, right: &Arc<Type>) -> Arc<Type> {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Exp => {
                if left.is_numeric() && right.is_numeric() {
                    if matches!(**left, Type::Float) || matches!(**right, Type::Float) {
                        Type::float()
                    } else {
                        Type::int()
                    }
                } else {
                    self.diagnostics.error(format!(
                        "operator '{}' requires int or float operands, found {left} and {right}",
                        op.lexeme()
                    ));
                    Type::unknown()
                }
            },
            BinaryOp::Concat => {
                if matches!(**left, Type::String) && matches!(**right, Type::String) {
                    Type::string()
                } else {
                    self.diagnostics.error(format!(
                        "operator '..' requires string operands, found {left} and {right}"
                    ));
                    Type::unknown()
                }
            },
            BinaryOp::Eq | BinaryOp::Neq => {
                if left.is_atom() && !matches!(**left, Type::Void) && left == right {
                    Type::bool()
                } else {
                    self.diagnostics.error(format!(
                        "operator '{}' requires operands of the same type, found {left} and {right}",
                        op.lexeme()
                    ));
                    Type::unknown()
                }
            },
            BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
                let both_numeric = left.is_numeric() && right.is_numeric();
                let both_string = matches!(**left, Type::String) && matches!(**right, Type::String);
                if both_numeric || both_string {
                    Type::bool()
                } else {
                    self.diagnostics.error(format!(
                        "operator '{}' requires two numbers or two strings, found {left} and {right}",
                        op.lexeme()
                    ));
                    Type::unknown()
                }
            },
            BinaryOp::And | BinaryOp::Or => {
                if matches!(**left, Type::Bool) && matches!(**right, Type::Bool) {
                    Type::bool()
                } else {
                    self.diagnostics.error(format!(
                        "operator '{}' requires bool operands, found {left} and {right}",
                        op.lexeme()
                    ));
                    Type::unknown()
                }
            },
        }
    }

    fn check_call(&mut self, callee: ExprId, args: Vec<ExprId>) -> Arc<Type> {
        let callee_ty = self.check_expr(callee);
        let arg_types: Vec<Arc<Type>> = args.iter().map(|&a| self.check_expr(a)).collect();
        match &*callee_ty {
            Type::Function { params, ret } => {
                if params.len() != arg_types.len() {
                    self.diagnostics.error(format!(
                        "expected {} argument(s), found {}",
                        params.len(),
                        arg_types.len()
                    ));
                    return Type::unknown();
                }
                for (i, (expected, found)) in params.iter().zip(&arg_types).enumerate() {
                    if expected != found {
                        self.diagnostics
                            .error(format!("argument {i}: expected {expected}, found {found}"));
                        return Type::unknown();
                    }
                }
                ret.clone()
            },
            other => {
                self.diagnostics.error(format!("cannot call a value of type {other}"));
                Type::unknown()
            },
        }
    }

    fn check_index(&mut self, callee: ExprId, index: ExprId) -> Arc<Type> {
        let callee_ty = self.check_expr(callee);
        let index_ty = self.check_expr(index);
        match &*callee_ty {
            Type::Array { elem } => {
                if matches!(*index_ty, Type::Int) {
                    elem.clone()
                } else {
                    self.diagnostics.error(format!("array index must be int, found {index_ty}"));
                    Type::unknown()
                }
            },
            Type::Hash { key, value } => {
                if index_ty == *key {
                    value.clone()
                } else {
                    self.diagnostics.error(format!("hash key must be {key}, found {index_ty}"));
                    Type::unknown()
                }
            },
            other => {
                self.diagnostics.error(format!("cannot index a value of type {other}"));
                Type::unknown()
            },
        }
    }

    fn check_array(&mut self, elements: &[ExprId]) -> Arc<Type> {
        if elements.is_empty() {
            return Type::void();
        }
        let mut elem_ty: Option<Arc<Type>> = None;
        for &e in elements {
            let ty = self.check_expr(e);
            if !ty.is_atom() {
                self.diagnostics.error(format!("array elements must be an atom type, found {ty}"));
                continue;
            }
            match &elem_ty {
                None => elem_ty = Some(ty),
                Some(expected) if *expected == ty => {},
                Some(expected) => {
                    self.diagnostics
                        .error(format!("array elements must share one type: expected {expected}, found {ty}"));
                },
            }
        }
        Type::array(elem_ty.unwrap_or_else(Type::unknown))
    }

    fn check_hash(&mut self, keys: &[ExprId], values: &[ExprId]) -> Arc<Type> {
        if keys.is_empty() {
            return Type::void();
        }
        let mut key_ty: Option<Arc<Type>> = None;
        let mut value_ty: Option<Arc<Type>> = None;
        for (&k, &v) in keys.iter().zip(values) {
            let kt = self.check_expr(k);
            let vt = self.check_expr(v);
            if !kt.is_atom() {
                self.diagnostics.error(format!("hash keys must be an atom type, found {kt}"));
            } else {
                match &key_ty {
                    None => key_ty = Some(kt.clone()),
                    Some(expected) if *expected == kt => {},
                    Some(expected) => self
                        .diagnostics
                        .error(format!("hash keys must share one type: expected {expected}, found {kt}")),
                }
            }
            match &value_ty {
                None => value_ty = Some(vt.clone()),
                Some(expected) if *expected == vt => {},
                Some(expected) => self
                    .diagnostics
                    .error(format!("hash values must share one type: expected {expected}, found {vt}")),
            }
        }
        Type::hash(key_ty.unwrap_or_else(Type::unknown), value_ty.unwrap_or_else(Type::unknown))
    }

    /// Shared by `Function` and `Lambda`: opens a scope, binds parameters
    /// and (for a named function) itself for recursion, checks the body,
    /// and validates the body's resolved type against `declared_ret`.
    /// Does not re-enter the outer scope — the caller owns binding the
    /// function's own name there.
    fn check_function_like(
        &mut self,
        name: Option<Symbol>,
        params: &[Param],
        declared_ret: &Arc<Type>,
        body: StmtId,
    ) -> Arc<Type> {
        let param_types: Vec<Arc<Type>> = params.iter().map(|(_, t)| t.clone()).collect();
        let fn_type = Type::function(param_types, declared_ret.clone());

        self.scopes.enter();
        for (param_name, param_ty) in params {
            self.scopes.declare(*param_name, param_ty.clone());
        }
        if let Some(name) = name {
            self.scopes.declare(name, fn_type.clone());
        }

        let body_ty = self.check_stmt(body);
        self.scopes.exit();

        let (body_result, always_returns) = match &*body_ty {
            Type::Return { inner, always_returns } => (inner.clone(), *always_returns),
            _ => (Type::void(), false),
        };

        if !matches!(**declared_ret, Type::Void) && !always_returns {
            self.diagnostics
                .error(format!("function declared to return {declared_ret} but does not return on every path"));
        }

        if body_result != *declared_ret {
            self.diagnostics.error(format!(
                "function body resolves to {body_result}, but is declared to return {declared_ret}"
            ));
        }

        fn_type
    }

    fn check_stmt(&mut self, id: StmtId) -> Arc<Type> {
        let ty = match self.ast.stmt(id) {
            Stmt::Let { name, declared, value } => {
                let value_ty = self.check_expr(*value);
                if matches!(*value_ty, Type::Void) || matches!(*value_ty, Type::Unknown) {
                    self.diagnostics.error(format!("cannot declare '{name}' with type {value_ty}"));
                }
                let final_ty = if matches!(**declared, Type::Auto) {
                    value_ty.clone()
                } else {
                    if **declared != *value_ty {
                        self.diagnostics.error(format!(
                            "'{name}' declared as {declared}, but initializer has type {value_ty}"
                        ));
                    }
                    declared.clone()
                };
                if !self.scopes.declare(*name, final_ty.clone()) {
                    self.diagnostics.error(format!("'{name}' is already declared in this scope"));
                }
                final_ty
            },
            Stmt::Assignment { name, value } => {
                let value_ty = self.check_expr(*value);
                match self.scopes.lookup(*name) {
                    Some(declared) => {
                        if declared != value_ty {
                            self.diagnostics
                                .error(format!("cannot assign {value_ty} to '{name}' of type {declared}"));
                        }
                        declared
                    },
                    None => {
                        self.diagnostics.error(format!("not declared: {name}"));
                        Type::unknown()
                    },
                }
            },
            Stmt::Return(value) => {
                let inner = self.check_expr(*value);
                Arc::new(Type::Return { inner, always_returns: true })
            },
            Stmt::If { cond, then_block, else_block } => {
                let cond_ty = self.check_expr(*cond);
                if !matches!(*cond_ty, Type::Bool) {
                    self.diagnostics.error(format!("if condition must be bool, found {cond_ty}"));
                }
                let then_ty = self.check_stmt(*then_block);
                let else_ty = else_block.map(|b| self.check_stmt(b));
                match (&*then_ty, else_ty.as_deref()) {
                    (
                        Type::Return { inner, always_returns: then_always },
                        Some(Type::Return { always_returns: else_always, .. }),
                    ) => Arc::new(Type::Return {
                        inner: inner.clone(),
                        always_returns: *then_always && *else_always,
                    }),
                    _ => Type::void(),
                }
            },
            Stmt::Function { name, params, return_type, body } => {
                let fn_type = self.check_function_like(Some(*name), &params.clone(), &return_type.clone(), *body);
                if !self.scopes.declare(*name, fn_type.clone()) {
                    self.diagnostics.error(format!("'{name}' is already declared in this scope"));
                }
                fn_type
            },
            Stmt::Class { name, methods: _ } => {
                let class_ty = Type::class(*name);
                if !self.scopes.declare(*name, class_ty.clone()) {
                    self.diagnostics.error(format!("'{name}' is already declared in this scope"));
                }
                class_ty
            },
            Stmt::Block(stmts) => {
                let stmts = stmts.clone();
                let mut result = Type::void();
                let mut returned = false;
                for s in stmts {
                    let ty = self.check_stmt(s);
                    if !returned {
                        if let Type::Return { always_returns: true, .. } = &*ty {
                            result = ty;
                            returned = true;
                        }
                    }
                }
                result
            },
            Stmt::ExpressionStatement(expr) => self.check_expr(*expr),
        };
        self.types.insert_stmt(id, ty.clone());
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luma_par::Parser;

    fn check(source: &str) -> Diagnostics {
        let mut parser = Parser::new(source);
        let ast = parser.parse_program();
        assert!(!parser.diagnostics().has_errors(), "parse errors: {:?}", parser.diagnostics().iter().collect::<Vec<_>>());
        let checker = Checker::new(&ast);
        let (_, diagnostics) = checker.check_program();
        diagnostics
    }

    #[test]
    fn let_with_matching_declared_type_is_accepted() {
        assert!(!check("let x int = 5").has_errors());
    }

    #[test]
    fn let_with_mismatched_declared_type_is_rejected() {
        assert!(check("let x int = \"hi\"").has_errors());
    }

    #[test]
    fn undeclared_identifier_is_an_error() {
        assert!(check("x").has_errors());
    }

    #[test]
    fn arithmetic_widens_to_float_when_either_operand_is_float() {
        assert!(!check("let x = 1 + 2.0").has_errors());
    }

    #[test]
    fn equality_requires_matching_atom_kinds() {
        assert!(check("1 == 2.0").has_errors());
        assert!(!check("1 == 2").has_errors());
    }

    #[test]
    fn comparison_allows_mixed_int_and_float() {
        assert!(!check("1 < 2.0").has_errors());
    }

    #[test]
    fn and_or_require_bool_operands() {
        assert!(check("1 and 2").has_errors());
        assert!(!check("true and false").has_errors());
    }

    #[test]
    fn function_call_checks_arity_and_argument_types() {
        assert!(!check("fn add(a int, b int) int then return a + b end add(1, 2)").has_errors());
        assert!(check("fn add(a int, b int) int then return a + b end add(1)").has_errors());
    }

    #[test]
    fn function_must_return_on_every_path_when_declared_non_void() {
        assert!(check("fn f() int then let x = 1 end").has_errors());
        assert!(!check("fn f() int then return 1 end").has_errors());
    }

    #[test]
    fn if_with_returning_branches_on_both_sides_satisfies_a_function_return() {
        assert!(!check("fn f() int then if true then return 1 else return 2 end end").has_errors());
    }

    #[test]
    fn recursive_function_can_call_itself() {
        assert!(!check("fn fact(n int) int then return n end").has_errors());
    }

    #[test]
    fn class_declares_a_class_type_without_checking_methods() {
        assert!(!check("class Point fn bad() int then return \"nope\" end end").has_errors());
    }

    #[test]
    fn array_literal_requires_a_shared_atom_element_type() {
        assert!(!check("let xs = [1, 2, 3]").has_errors());
        assert!(check("let xs = [1, \"two\"]").has_errors());
    }

    #[test]
    fn print_builtin_accepts_a_string_argument() {
        assert!(!check("print(\"hi\")").has_errors());
    }
}
